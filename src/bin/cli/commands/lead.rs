use clap::Subcommand;

use crate::client::AtriumClient;
use crate::output::{self, OutputConfig};

/// Contact-form lead commands
#[derive(Subcommand, Debug)]
pub enum LeadCommands {
    /// List leads, newest first
    List,
    /// Delete a lead
    Delete {
        /// The lead ID
        id: String,
    },
}

/// Executes a lead command
pub async fn execute(
    client: &AtriumClient,
    cmd: LeadCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        LeadCommands::List => {
            let leads = client.list_leads().await?;
            output::print_leads(&leads, config);
        }
        LeadCommands::Delete { id } => {
            client.delete_lead(&id).await?;
            output::print_success(&format!("Deleted lead {}", id), config);
        }
    }
    Ok(())
}
