//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use metafill_coerce::{CoercerConfig, FreeformOptions};
use metafill_sdk::{AuthMethod, SdkConfig, DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use metafill_session::ApplyPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name
    #[serde(default = "default_profile")]
    pub active_profile: String,

    /// Available profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// File this configuration was loaded from
    #[serde(skip)]
    source: Option<PathBuf>,
}

/// Connection profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// REST API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// OAuth token endpoint
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Stored credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthMethod>,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Rewrite freeform keys to snake_case
    #[serde(default)]
    pub normalize_keys: bool,

    /// Drop placeholder-looking freeform values
    #[serde(default)]
    pub filter_placeholders: bool,

    /// What to do when some fields fail to convert
    #[serde(default)]
    pub apply_policy: ApplyPolicy,

    /// Read `03/04/2024` as April 3rd
    #[serde(default)]
    pub day_first_dates: bool,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts for throttled or failing requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

/// Secrets given on the command line or in the environment
#[derive(Debug, Clone, Default)]
pub struct AuthOverrides {
    /// Replaces the profile's auth with a developer token
    pub developer_token: Option<String>,
    /// Replaces the stored client secret
    pub client_secret: Option<String>,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".metafill").join("config.toml"))
    }

    /// Load configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`, or defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str::<Config>(&contents)?
        } else {
            Self::default()
        };
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Save configuration to the file it was loaded from.
    pub fn save(&self) -> Result<()> {
        let path = match &self.source {
            Some(path) => path.clone(),
            None => Self::path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Get the active profile.
    pub fn get_active_profile(&self) -> Result<&Profile> {
        self.profiles
            .get(&self.active_profile)
            .ok_or_else(|| CliError::Config(format!("Profile '{}' not found", self.active_profile)))
    }

    /// Get the active profile for editing.
    pub fn get_active_profile_mut(&mut self) -> Result<&mut Profile> {
        let name = self.active_profile.clone();
        self.profiles
            .get_mut(&name)
            .ok_or_else(|| CliError::Config(format!("Profile '{}' not found", name)))
    }

    /// Add or update a profile.
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Switch to a different profile.
    pub fn switch_profile(&mut self, name: String) -> Result<()> {
        if !self.profiles.contains_key(&name) {
            return Err(CliError::Config(format!("Profile '{}' does not exist", name)));
        }
        self.active_profile = name;
        Ok(())
    }
}

impl Profile {
    /// Profile for the given endpoints, without credentials
    pub fn new(api_base_url: impl Into<String>, auth_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            auth_url: auth_url.into(),
            auth: None,
        }
    }

    /// SDK configuration for this profile
    pub fn sdk_config(&self, settings: &Settings) -> SdkConfig {
        SdkConfig {
            api_base_url: self.api_base_url.clone(),
            auth_url: self.auth_url.clone(),
            timeout_secs: settings.timeout_secs,
            max_retries: settings.max_retries,
            ..SdkConfig::default()
        }
    }

    /// Credentials to log in with
    ///
    /// A developer token override wins over stored credentials; a client
    /// secret override replaces the stored secret.
    pub fn auth_method(&self, overrides: &AuthOverrides) -> Result<AuthMethod> {
        if let Some(token) = &overrides.developer_token {
            return Ok(AuthMethod::DeveloperToken { token: token.clone() });
        }

        match (&self.auth, &overrides.client_secret) {
            (
                Some(AuthMethod::ClientCredentials {
                    client_id,
                    subject_type,
                    subject_id,
                    ..
                }),
                Some(secret),
            ) => Ok(AuthMethod::ClientCredentials {
                client_id: client_id.clone(),
                client_secret: secret.clone(),
                subject_type: *subject_type,
                subject_id: subject_id.clone(),
            }),
            (Some(method), _) => Ok(method.clone()),
            (None, _) => Err(CliError::Auth(
                "No credentials configured. Run 'metafill login' or set METAFILL_DEVELOPER_TOKEN".to_string(),
            )),
        }
    }
}

impl Settings {
    /// Coercer settings
    pub fn coercer_config(&self) -> CoercerConfig {
        if self.day_first_dates {
            CoercerConfig::day_first()
        } else {
            CoercerConfig::default()
        }
    }

    /// Freeform payload settings
    pub fn freeform_options(&self) -> FreeformOptions {
        FreeformOptions {
            normalize_keys: self.normalize_keys,
            filter_placeholders: self.filter_placeholders,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            "default".to_string(),
            Profile::new(DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL),
        );

        Self {
            active_profile: "default".to_string(),
            profiles,
            settings: Settings::default(),
            source: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            normalize_keys: false,
            filter_placeholders: false,
            apply_policy: ApplyPolicy::default(),
            day_first_dates: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
