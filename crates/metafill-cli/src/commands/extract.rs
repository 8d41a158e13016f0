//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::commands::{collect_files, connect, fill_batch, report_unavailable};
use crate::config::{AuthOverrides, Config};
use crate::error::{CliError, Result};
use crate::output::{ExtractionResult, Formatter};
use metafill_coerce::Coercer;
use metafill_extractor::{BoxAiExtractor, ExtractorConfig};
use metafill_session::Session;

/// Execute the extract command.
///
/// Values are printed as extracted; nothing is written.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    overrides: &AuthOverrides,
    formatter: &Formatter,
) -> Result<()> {
    let (client, _) = connect(config, overrides).await?;
    let selection = collect_files(&client, &args.target).await?;
    report_unavailable(&selection, formatter);
    let total = selection.total();
    let unavailable = selection.unavailable.len();

    let extractor = BoxAiExtractor::new(client.clone(), ExtractorConfig::default())?;
    let coercer = Coercer::new(config.settings.coercer_config())?;
    let mut session = Session::new(extractor, client.clone(), client, coercer);
    fill_batch(session.batch_mut(), selection.files, args.target.default_config())?;

    let mut results: Vec<(_, ExtractionResult)> = Vec::with_capacity(session.batch().len());
    for file_id in session.batch().file_ids() {
        let extracted = session.extract(&file_id).await;
        let item = session.batch().get(&file_id)?;
        let result = extracted
            .map(|_| item.raw_values().cloned().unwrap_or_default())
            .map_err(|failure| failure.to_string());
        results.push((item.file().clone(), result));
    }

    println!("{}", formatter.format_extractions(&results)?);

    let failed = results.iter().filter(|(_, r)| r.is_err()).count() + unavailable;
    if failed > 0 {
        return Err(CliError::Incomplete(format!(
            "{} of {} file(s) could not be extracted",
            failed, total
        )));
    }
    Ok(())
}
