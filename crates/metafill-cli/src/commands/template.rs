//! Template command implementation.

use crate::cli::TemplateArgs;
use crate::commands::connect;
use crate::config::{AuthOverrides, Config};
use crate::error::Result;
use crate::output::Formatter;

/// Execute the template command.
pub async fn execute_template(
    args: TemplateArgs,
    config: &Config,
    overrides: &AuthOverrides,
    formatter: &Formatter,
) -> Result<()> {
    let (client, _) = connect(config, overrides).await?;
    let template = client.template_schema(&args.template).await?;
    println!("{}", formatter.format_template(&template)?);
    Ok(())
}
