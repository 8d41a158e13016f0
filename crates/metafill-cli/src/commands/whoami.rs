//! Whoami command implementation.

use crate::commands::connect;
use crate::config::{AuthOverrides, Config};
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the whoami command.
pub async fn execute_whoami(config: &Config, overrides: &AuthOverrides, formatter: &Formatter) -> Result<()> {
    let (_, credentials) = connect(config, overrides).await?;
    let user = credentials
        .user
        .ok_or_else(|| CliError::Auth("Login did not return the account".to_string()))?;

    println!("{}", formatter.format_user(&user)?);
    if let Some(expires_at) = credentials.expires_at {
        if formatter.format() == crate::config::OutputFormat::Table {
            println!("Token expires at {}", expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }
    Ok(())
}
