mod client;
mod commands;
mod output;

use atrium::config;
use clap::{Parser, Subcommand};
use client::AtriumClient;
use output::{OutputConfig, OutputFormat};
use std::path::PathBuf;
use std::process;

/// CLI for the Atrium real-estate backend
#[derive(Parser, Debug)]
#[clap(name = "atrium-cli", about = "CLI for the Atrium real-estate backend")]
struct Cli {
    /// Server URL to connect to
    #[clap(long, env = "ATRIUM_URL", global = true)]
    server_url: Option<String>,

    /// Admin session token from `atrium-cli login`
    #[clap(long, env = "ATRIUM_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the Argon2 hash of a password, for `admin_password_hash`
    HashPassword {
        /// The password; read from stdin when omitted
        password: Option<String>,
    },
    /// Log in as the admin and print a session token
    Login {
        #[clap(long, default_value = "admin")]
        username: String,
        /// The password; read from stdin when omitted
        #[clap(long, env = "ATRIUM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Manage listings
    #[command(subcommand)]
    Listing(commands::listing::ListingCommands),
    /// Manage admin notes
    #[command(subcommand)]
    Note(commands::note::NoteCommands),
    /// Manage contact-form leads
    #[command(subcommand)]
    Lead(commands::lead::LeadCommands),
    /// Upload image files
    Upload {
        /// The image files
        files: Vec<PathBuf>,
    },
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > config file > default
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    // Try reading from config file
    let config_dir = config::get_config_dir_path();
    if let Some(ref dir) = config_dir {
        let config_path = dir.join("config.toml");
        if let Ok(update) = config::config_from_file(Some(config_path)) {
            if let Some(url) = update.server_url {
                return url;
            }
        }
    }

    "http://localhost:3000".to_string()
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!("Could not connect to server. Is atrium running?\n  {}", err_string);
    }

    err_string
}

/// Runs a command
async fn run(client: &AtriumClient, command: Commands, config: &OutputConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::HashPassword { password } => commands::auth::hash_password(password, config),
        Commands::Login { username, password } => commands::auth::login(client, username, password, config).await,
        Commands::Listing(cmd) => commands::listing::execute(client, cmd, config).await,
        Commands::Note(cmd) => commands::note::execute(client, cmd, config).await,
        Commands::Lead(cmd) => commands::lead::execute(client, cmd, config).await,
        Commands::Upload { files } => commands::upload::execute(client, files, config).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let client = AtriumClient::new(server_url, cli.token);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    if let Err(e) = run(&client, cli.command, &output_config).await {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
