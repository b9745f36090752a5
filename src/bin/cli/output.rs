use atrium::models::{Lead, Listing, Note};
use clap::ValueEnum;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

/// Prints a list of listings in the specified format
pub fn print_listings(listings: &[Listing], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if listings.is_empty() {
                if !config.quiet {
                    println!("No listings found.");
                }
                return;
            }
            if config.quiet {
                for listing in listings {
                    println!("{}", listing.get_id());
                }
                return;
            }
            let max_id = listings.iter().map(|l| l.get_id().len()).max().unwrap_or(2);
            println!("{:<width$}  {:<10}  {:<8}  {:>14}  TITLE", "ID", "TYPE", "STATUS", "PRICE", width = max_id);
            for listing in listings {
                println!(
                    "{:<width$}  {:<10}  {:<8}  {:>10} {}  {}",
                    listing.get_id(),
                    listing.get_listing_type(),
                    listing.get_status(),
                    listing.get_price(),
                    listing.get_currency(),
                    listing.get_title(),
                    width = max_id
                );
            }
        }
        OutputFormat::Json => print_json(listings),
    }
}

/// Prints a single listing in the specified format
pub fn print_listing(listing: &Listing, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", listing.get_id());
                return;
            }
            println!("ID:       {}", listing.get_id());
            println!("Title:    {}", listing.get_title());
            println!("Type:     {}", listing.get_listing_type());
            println!("Status:   {}", listing.get_status());
            println!("Price:    {} {}", listing.get_price(), listing.get_currency());
            let location: Vec<String> = [listing.get_neighborhood(), listing.get_district(), listing.get_city()]
                .into_iter()
                .flatten()
                .collect();
            if !location.is_empty() {
                println!("Location: {}", location.join(", "));
            }
            println!("Details:  {}", listing.get_details());
            println!("Images:   {}", listing.get_images().len());
            println!("Created:  {}", listing.get_created_at());
        }
        OutputFormat::Json => print_json(listing),
    }
}

/// Prints a list of notes in the specified format
pub fn print_notes(notes: &[Note], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if notes.is_empty() {
                if !config.quiet {
                    println!("No notes found.");
                }
                return;
            }
            for note in notes {
                if config.quiet {
                    println!("{}", note.get_id());
                    continue;
                }
                println!(
                    "{}  [{}/{}]  {}",
                    note.get_id(),
                    note.get_category(),
                    note.get_priority(),
                    note.get_title()
                );
                if !note.get_body().is_empty() {
                    println!("    {}", note.get_body());
                }
            }
        }
        OutputFormat::Json => print_json(notes),
    }
}

pub fn print_note(note: &Note, config: &OutputConfig) {
    print_notes(std::slice::from_ref(note), config);
}

/// Prints a list of leads in the specified format
pub fn print_leads(leads: &[Lead], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if leads.is_empty() {
                if !config.quiet {
                    println!("No leads found.");
                }
                return;
            }
            for lead in leads {
                if config.quiet {
                    println!("{}", lead.get_id());
                    continue;
                }
                println!("{}  {}  <{}>  {}", lead.get_id(), lead.get_created_at(), lead.get_email(), lead.get_name());
                println!("    {}", lead.get_message());
            }
        }
        OutputFormat::Json => print_json(leads),
    }
}

/// Prints stored image references, one per line
pub fn print_images(images: &[String], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            for image in images {
                println!("{}", image);
            }
        }
        OutputFormat::Json => print_json(images),
    }
}

/// Prints a success message unless quiet
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({ "message": message })),
    }
}
