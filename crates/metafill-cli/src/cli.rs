//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use metafill_domain::{ExtractionConfig, TemplateRef};
use metafill_sdk::SubjectType;
use metafill_session::ApplyPolicy;
use std::path::PathBuf;

/// Metafill - Extract metadata from Box files with Box AI and write it back.
#[derive(Debug, Parser)]
#[command(name = "metafill")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Developer token; replaces the profile's credentials
    #[arg(long, global = true, env = "METAFILL_DEVELOPER_TOKEN", hide_env_values = true)]
    pub developer_token: Option<String>,

    /// Client secret for the client-credentials grant
    #[arg(long, global = true, env = "METAFILL_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check credentials and optionally store them in the profile
    Login(LoginArgs),

    /// Show the authenticated account
    Whoami,

    /// List the items of a folder
    Files(FilesArgs),

    /// Show the fields of a metadata template
    Template(TemplateArgs),

    /// Extract metadata and print it without writing
    Extract(ExtractArgs),

    /// Extract, review and write metadata
    Apply(ApplyArgs),

    /// Manage configuration profiles
    Profile(ProfileArgs),
}

/// Arguments for the login command.
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// App client id (client-credentials grant; the secret comes from --client-secret)
    #[arg(long)]
    pub client_id: Option<String>,

    /// Who the token acts as
    #[arg(long, value_enum, default_value = "enterprise")]
    pub subject_type: SubjectArg,

    /// Enterprise id or user id
    #[arg(long)]
    pub subject_id: Option<String>,

    /// Store the credentials in the active profile
    #[arg(long)]
    pub save: bool,
}

/// Arguments for the files command.
#[derive(Debug, Args)]
pub struct FilesArgs {
    /// Folder id ("0" is the root)
    #[arg(default_value = "0")]
    pub folder: String,

    /// Include folders and web links
    #[arg(short, long)]
    pub all: bool,
}

/// Arguments for the template command.
#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Template (scope/templateKey or enterprise_<id>_<templateKey>)
    pub template: TemplateRef,
}

/// Which files to process and how to extract them.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// File ids
    pub files: Vec<String>,

    /// Every file in this folder
    #[arg(long)]
    pub folder: Option<String>,

    /// Per-file extraction settings (TOML)
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Structured extraction against this template
    #[arg(short, long, conflicts_with = "freeform")]
    pub template: Option<TemplateRef>,

    /// Freeform extraction into the properties instance
    #[arg(long)]
    pub freeform: bool,

    /// Custom prompt for freeform extraction
    #[arg(long, requires = "freeform")]
    pub prompt: Option<String>,
}

impl TargetArgs {
    /// Configuration for files without their own plan entry
    pub fn default_config(&self) -> Option<ExtractionConfig> {
        match (&self.template, self.freeform) {
            (Some(template), _) => Some(ExtractionConfig::structured(template.clone())),
            (None, true) => Some(ExtractionConfig::freeform(self.prompt.clone())),
            (None, false) => None,
        }
    }

    /// Whether any file source was given
    pub fn has_sources(&self) -> bool {
        !self.files.is_empty() || self.folder.is_some() || self.plan.is_some()
    }
}

/// Arguments for the extract command.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the apply command.
#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Write without interactive review
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// What to do when some fields fail to convert
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Rewrite freeform keys to snake_case
    #[arg(long)]
    pub normalize_keys: bool,

    /// Drop placeholder-looking freeform values
    #[arg(long)]
    pub filter_placeholders: bool,

    /// Skip comparing stored metadata with what was sent
    #[arg(long)]
    pub no_verify: bool,
}

/// Arguments for profile management.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,
        /// REST API base URL
        #[arg(long)]
        api_url: Option<String>,
        /// OAuth token endpoint
        #[arg(long)]
        auth_url: Option<String>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

/// Subject argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SubjectArg {
    /// The enterprise's service account
    Enterprise,
    /// A managed user
    User,
}

/// Apply policy argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PolicyArg {
    /// Write nothing for a file with field errors
    Block,
    /// Write the fields that converted
    ApplyValid,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<SubjectArg> for SubjectType {
    fn from(subject: SubjectArg) -> Self {
        match subject {
            SubjectArg::Enterprise => SubjectType::Enterprise,
            SubjectArg::User => SubjectType::User,
        }
    }
}

impl From<PolicyArg> for ApplyPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Block => ApplyPolicy::BlockOnErrors,
            PolicyArg::ApplyValid => ApplyPolicy::ApplyValidFields,
        }
    }
}
