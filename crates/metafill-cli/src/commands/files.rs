//! Files command implementation.

use crate::cli::FilesArgs;
use crate::commands::connect;
use crate::config::{AuthOverrides, Config};
use crate::error::Result;
use crate::output::Formatter;

/// Execute the files command.
pub async fn execute_files(
    args: FilesArgs,
    config: &Config,
    overrides: &AuthOverrides,
    formatter: &Formatter,
) -> Result<()> {
    let (client, _) = connect(config, overrides).await?;

    let mut items = client.list_folder(&args.folder).await?;
    if !args.all {
        items.retain(|item| item.is_file());
    }

    println!("{}", formatter.format_files(&items)?);
    Ok(())
}
