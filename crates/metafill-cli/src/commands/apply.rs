//! Apply command implementation.

use crate::cli::ApplyArgs;
use crate::commands::{collect_files, connect, fill_batch, report_unavailable};
use crate::config::{AuthOverrides, Config};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::review::InteractiveReviewer;
use metafill_coerce::{Coercer, FreeformOptions};
use metafill_extractor::{BoxAiExtractor, ExtractorConfig};
use metafill_session::{ApplyPolicy, AutoAccept, Session};

/// Execute the apply command.
pub async fn execute_apply(
    args: ApplyArgs,
    config: &Config,
    overrides: &AuthOverrides,
    formatter: &Formatter,
) -> Result<()> {
    let settings = &config.settings;
    let policy: ApplyPolicy = args.policy.map(Into::into).unwrap_or(settings.apply_policy);
    let freeform = freeform_options(&args, config);

    let (client, _) = connect(config, overrides).await?;
    let selection = collect_files(&client, &args.target).await?;
    report_unavailable(&selection, formatter);
    let total = selection.total();
    let unavailable = selection.unavailable.len();

    let extractor = BoxAiExtractor::new(client.clone(), ExtractorConfig::default())?;
    let coercer = Coercer::new(settings.coercer_config())?;
    let mut session = Session::new(extractor, client.clone(), client, coercer.clone())
        .with_policy(policy)
        .with_freeform_options(freeform)
        .with_verification(!args.no_verify);
    fill_batch(session.batch_mut(), selection.files, args.target.default_config())?;

    let report = if args.yes {
        session.run(&mut AutoAccept, None).await
    } else {
        let mut reviewer = InteractiveReviewer::new(formatter.clone(), coercer, freeform)?;
        session.run(&mut reviewer, None).await
    };

    println!("{}", formatter.format_report(&report)?);

    let failed = report.failed() + unavailable;
    if failed > 0 {
        return Err(CliError::Incomplete(format!("{} of {} file(s) failed", failed, total)));
    }
    Ok(())
}

/// Settings file options, switched on further by flags
fn freeform_options(args: &ApplyArgs, config: &Config) -> FreeformOptions {
    let mut options = config.settings.freeform_options();
    options.normalize_keys |= args.normalize_keys;
    options.filter_placeholders |= args.filter_placeholders;
    options
}
