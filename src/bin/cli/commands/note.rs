use atrium::dto::CreateNoteDto;
use atrium::models::{NoteCategory, NotePriority};
use clap::Subcommand;

use crate::client::AtriumClient;
use crate::output::{self, OutputConfig};

/// Admin note commands
#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// List notes
    List {
        /// Only the notes of this listing
        #[clap(long)]
        listing_id: Option<String>,
    },
    /// Attach a note to a listing
    Add {
        /// The listing ID
        listing_id: String,
        #[clap(long)]
        title: String,
        #[clap(long, default_value = "")]
        body: String,
        /// general, owner, showing, legal or financial
        #[clap(long, default_value = "general")]
        category: NoteCategory,
        /// low, normal, high or urgent
        #[clap(long, default_value = "normal")]
        priority: NotePriority,
        /// Hide the note from the default views
        #[clap(long)]
        hidden: bool,
    },
    /// Delete a note
    Delete {
        /// The note ID
        id: String,
    },
}

/// Executes a note command
pub async fn execute(
    client: &AtriumClient,
    cmd: NoteCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        NoteCommands::List { listing_id } => {
            let notes = client.list_notes(listing_id.as_deref()).await?;
            output::print_notes(&notes, config);
        }
        NoteCommands::Add { listing_id, title, body, category, priority, hidden } => {
            let dto = CreateNoteDto {
                listing_id,
                title,
                body,
                category,
                priority,
                visible: !hidden,
            };
            let note = client.create_note(&dto).await?;
            output::print_note(&note, config);
        }
        NoteCommands::Delete { id } => {
            client.delete_note(&id).await?;
            output::print_success(&format!("Deleted note {}", id), config);
        }
    }
    Ok(())
}
