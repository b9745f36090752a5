use atrium::dto::{ListingPayloadDto, ListingQueryDto};
use atrium::models::ListingType;
use clap::Subcommand;
use std::io::Read;
use std::path::PathBuf;

use crate::client::AtriumClient;
use crate::output::{self, OutputConfig};

/// Listing management commands
#[derive(Subcommand, Debug)]
pub enum ListingCommands {
    /// List listings (only active ones unless --all)
    List {
        /// Include inactive listings (needs a session)
        #[clap(long)]
        all: bool,
        /// Only listings of this type
        #[clap(long = "type")]
        listing_type: Option<ListingType>,
        /// Only listings in this city
        #[clap(long)]
        city: Option<String>,
        #[clap(long)]
        min_price: Option<i64>,
        #[clap(long)]
        max_price: Option<i64>,
    },
    /// Show one listing
    Get {
        /// The listing ID
        id: String,
    },
    /// Create a listing from a JSON file
    Create {
        /// JSON payload, `-` for stdin
        file: PathBuf,
    },
    /// Replace a listing with the content of a JSON file
    Update {
        /// The listing ID
        id: String,
        /// JSON payload, `-` for stdin
        file: PathBuf,
    },
    /// Delete a listing
    Delete {
        /// The listing ID
        id: String,
    },
}

/// Reads a listing payload from a file or stdin
fn read_payload(file: &PathBuf) -> Result<ListingPayloadDto, Box<dyn std::error::Error>> {
    let content = if file.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        content
    } else {
        std::fs::read_to_string(file).map_err(|e| format!("Failed to read {}: {}", file.display(), e))?
    };
    Ok(serde_json::from_str(&content)?)
}

/// Executes a listing command
pub async fn execute(
    client: &AtriumClient,
    cmd: ListingCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ListingCommands::List { all: true, .. } => {
            let listings = client.list_all_listings().await?;
            output::print_listings(&listings, config);
        }
        ListingCommands::List { all: false, listing_type, city, min_price, max_price } => {
            let query = ListingQueryDto { listing_type, city, min_price, max_price };
            let listings = client.list_listings(&query).await?;
            output::print_listings(&listings, config);
        }
        ListingCommands::Get { id } => {
            let listing = client.get_listing(&id).await?;
            output::print_listing(&listing, config);
        }
        ListingCommands::Create { file } => {
            let listing = client.create_listing(&read_payload(&file)?).await?;
            output::print_listing(&listing, config);
        }
        ListingCommands::Update { id, file } => {
            let listing = client.update_listing(&id, &read_payload(&file)?).await?;
            output::print_listing(&listing, config);
        }
        ListingCommands::Delete { id } => {
            client.delete_listing(&id).await?;
            output::print_success(&format!("Deleted listing {}", id), config);
        }
    }
    Ok(())
}
