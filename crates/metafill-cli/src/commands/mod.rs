//! Command implementations.

pub mod apply;
pub mod extract;
pub mod files;
pub mod login;
pub mod profile;
pub mod template;
pub mod whoami;

pub use self::apply::execute_apply;
pub use self::extract::execute_extract;
pub use self::files::execute_files;
pub use self::login::execute_login;
pub use self::profile::execute_profile;
pub use self::template::execute_template;
pub use self::whoami::execute_whoami;

use crate::cli::TargetArgs;
use crate::config::{AuthOverrides, Config};
use crate::error::{CliError, Result};
use crate::plan::Plan;
use metafill_domain::traits::Authenticator;
use metafill_domain::{Credentials, ExtractionConfig, FileHandle};
use crate::output::Formatter;
use metafill_sdk::{BoxAuthenticator, BoxClient, SdkError};
use metafill_session::{Batch, WorkState};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Log in with the active profile and return a client for the session.
pub async fn connect(config: &Config, overrides: &AuthOverrides) -> Result<(Arc<BoxClient>, Credentials)> {
    let profile = config.get_active_profile()?;
    let sdk_config = profile.sdk_config(&config.settings);
    let method = profile.auth_method(overrides)?;

    let authenticator = BoxAuthenticator::new(sdk_config.clone(), method)?;
    let credentials = authenticator.login().await?;
    let client = BoxClient::new(sdk_config, &credentials)?;
    Ok((Arc::new(client), credentials))
}

/// Files named by the target arguments
#[derive(Debug, Default)]
pub struct Selection {
    /// Files found, each with its plan configuration
    pub files: Vec<(FileHandle, Option<ExtractionConfig>)>,
    /// Ids that could not be used, with the reason
    pub unavailable: Vec<(String, String)>,
}

impl Selection {
    /// Files named in total
    pub fn total(&self) -> usize {
        self.files.len() + self.unavailable.len()
    }

    fn lookup_result(
        &mut self,
        id: &str,
        found: std::result::Result<FileHandle, SdkError>,
        config: Option<ExtractionConfig>,
    ) {
        match found {
            Ok(file) if file.is_file() => self.files.push((file, config)),
            Ok(file) => self.skip(id, format!("{} is not a file", file)),
            Err(e) => self.skip(id, e.to_string()),
        }
    }

    fn skip(&mut self, id: &str, reason: String) {
        warn!("Skipping {}: {}", id, reason);
        self.unavailable.push((id.to_string(), reason));
    }
}

/// Files named by the target arguments, each with its plan configuration
///
/// Order: plan entries, then file ids, then folder contents. A file named
/// twice keeps its first entry. An id that cannot be looked up is recorded in
/// [`Selection::unavailable`] and the remaining files are still collected.
pub async fn collect_files(client: &BoxClient, target: &TargetArgs) -> Result<Selection> {
    if !target.has_sources() {
        return Err(CliError::InvalidInput(
            "No files given. Pass file ids, --folder or --plan".to_string(),
        ));
    }

    let mut selection = Selection::default();
    let mut seen = HashSet::new();

    if let Some(path) = &target.plan {
        let plan = Plan::load(path)?;
        for entry in &plan.files {
            if seen.insert(entry.id.clone()) {
                let config = entry.config()?;
                let found = client.file_info(&entry.id).await;
                selection.lookup_result(&entry.id, found, config);
            }
        }
    }

    for id in &target.files {
        if seen.insert(id.clone()) {
            let found = client.file_info(id).await;
            selection.lookup_result(id, found, None);
        }
    }

    if let Some(folder) = &target.folder {
        for file in client.list_folder(folder).await? {
            if file.is_file() && seen.insert(file.id.clone()) {
                selection.files.push((file, None));
            }
        }
    }

    debug!(
        "Selected {} file(s), {} unavailable",
        selection.files.len(),
        selection.unavailable.len()
    );
    Ok(selection)
}

/// Print a warning for each id that could not be used
pub fn report_unavailable(selection: &Selection, formatter: &Formatter) {
    for (id, reason) in &selection.unavailable {
        eprintln!("{}", formatter.warning(&format!("Skipped {}: {}", id, reason)));
    }
}

/// Add the selected files to a batch
///
/// Files without a plan entry get `default_config`. Every file must end up
/// configured.
pub fn fill_batch(
    batch: &mut Batch,
    selected: Vec<(FileHandle, Option<ExtractionConfig>)>,
    default_config: Option<ExtractionConfig>,
) -> Result<()> {
    for (file, config) in selected {
        match config.or_else(|| default_config.clone()) {
            Some(config) => batch.add_configured(file, config)?,
            None => {
                batch.add(file);
            }
        }
    }

    let unconfigured = batch.count(WorkState::Unconfigured);
    if unconfigured > 0 {
        return Err(CliError::InvalidInput(format!(
            "{} file(s) have no extraction settings. Pass --template, --freeform or a plan entry",
            unconfigured
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metafill_domain::TemplateRef;

    #[test]
    fn test_fill_batch_uses_plan_then_default() {
        let mut batch = Batch::new();
        let invoice = ExtractionConfig::structured(TemplateRef::new("enterprise_1", "invoice"));
        let selected = vec![
            (FileHandle::file("1", "a.pdf"), Some(invoice.clone())),
            (FileHandle::file("2", "b.pdf"), None),
        ];

        fill_batch(&mut batch, selected, Some(ExtractionConfig::freeform(None))).unwrap();

        assert_eq!(batch.get("1").unwrap().config(), Some(&invoice));
        assert_eq!(batch.get("2").unwrap().config(), Some(&ExtractionConfig::freeform(None)));
    }

    #[test]
    fn test_fill_batch_requires_settings() {
        let mut batch = Batch::new();
        let selected = vec![(FileHandle::file("1", "a.pdf"), None)];

        let result = fill_batch(&mut batch, selected, None);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
