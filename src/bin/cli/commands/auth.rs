use std::io::BufRead;

use crate::client::AtriumClient;
use crate::output::{self, OutputConfig, OutputFormat};

/// Reads one line from stdin, without the line break
fn read_stdin_line() -> Result<String, Box<dyn std::error::Error>> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Prints the Argon2 hash of a password for `admin_password_hash`
///
/// The password is read from stdin when not given, so it stays out of
/// the shell history.
pub fn hash_password(password: Option<String>, config: &OutputConfig) -> Result<(), Box<dyn std::error::Error>> {
    let password = match password {
        Some(password) => password,
        None => read_stdin_line()?,
    };
    if password.is_empty() {
        return Err("Password must not be empty".into());
    }

    let hash = atrium::auth::hash_password(&password).map_err(|e| format!("Failed to hash password: {}", e))?;

    match config.format {
        OutputFormat::Human => println!("{}", hash),
        OutputFormat::Json => println!("{}", serde_json::json!({ "admin_password_hash": hash })),
    }
    Ok(())
}

/// Logs in and prints the session token
pub async fn login(
    client: &AtriumClient,
    username: String,
    password: Option<String>,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = match password {
        Some(password) => password,
        None => read_stdin_line()?,
    };

    let session = client.login(username, password).await?;

    match config.format {
        OutputFormat::Human if config.quiet => println!("{}", session.token),
        OutputFormat::Human => {
            output::print_success(&format!("Logged in as {} until {}", session.username, session.expires_at), config);
            println!("export ATRIUM_TOKEN={}", session.token);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session)?),
    }
    Ok(())
}
