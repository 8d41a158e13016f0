//! Profile command implementation.

use crate::cli::{ProfileAction, ProfileArgs};
use crate::config::{Config, Profile};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use metafill_sdk::{AuthMethod, SdkConfig, DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL};

/// Execute the profile command.
pub async fn execute_profile(args: ProfileArgs, config: &mut Config, formatter: &Formatter) -> Result<()> {
    match args.action {
        ProfileAction::List => list_profiles(config, formatter),
        ProfileAction::Show => show_active_profile(config, formatter),
        ProfileAction::Switch { name } => switch_profile(config, name, formatter),
        ProfileAction::Set {
            name,
            api_url,
            auth_url,
        } => set_profile(config, name, api_url, auth_url, formatter),
        ProfileAction::Delete { name } => delete_profile(config, name, formatter),
    }
}

fn auth_summary(auth: Option<&AuthMethod>) -> String {
    match auth {
        None => "none".to_string(),
        Some(AuthMethod::DeveloperToken { .. }) => "developer token".to_string(),
        Some(AuthMethod::ClientCredentials {
            client_id,
            subject_type,
            subject_id,
            ..
        }) => format!(
            "client credentials (client {}, {} {})",
            client_id,
            subject_type.as_str(),
            subject_id
        ),
    }
}

fn print_profile(profile: &Profile, indent: &str) {
    println!("{}API: {}", indent, profile.api_base_url);
    println!("{}Auth URL: {}", indent, profile.auth_url);
    println!("{}Credentials: {}", indent, auth_summary(profile.auth.as_ref()));
}

/// List all profiles.
fn list_profiles(config: &Config, formatter: &Formatter) -> Result<()> {
    if config.profiles.is_empty() {
        println!("{}", formatter.info("No profiles configured"));
        return Ok(());
    }

    let mut names: Vec<&String> = config.profiles.keys().collect();
    names.sort();

    println!("Available profiles:");
    for name in names {
        let active = name == &config.active_profile;
        let marker = if active { "* " } else { "  " };
        println!(
            "{}{}",
            marker,
            if active { formatter.success(name) } else { name.clone() }
        );
        print_profile(&config.profiles[name], "    ");
    }

    Ok(())
}

/// Show the active profile.
fn show_active_profile(config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.get_active_profile()?;

    println!("Active profile: {}", formatter.success(&config.active_profile));
    print_profile(profile, "  ");

    Ok(())
}

/// Switch to a different profile.
fn switch_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    config.switch_profile(name.clone())?;
    config.save()?;
    println!("{}", formatter.success(&format!("Switched to profile '{}'", name)));
    Ok(())
}

/// Create or update a profile; stored credentials are kept.
fn set_profile(
    config: &mut Config,
    name: String,
    api_url: Option<String>,
    auth_url: Option<String>,
    formatter: &Formatter,
) -> Result<()> {
    let existing = config.profiles.get(&name).cloned();
    let action = if existing.is_some() { "Updated" } else { "Created" };

    let mut profile = existing.unwrap_or_else(|| Profile::new(DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL));
    if let Some(url) = api_url {
        profile.api_base_url = url;
    }
    if let Some(url) = auth_url {
        profile.auth_url = url;
    }

    SdkConfig {
        api_base_url: profile.api_base_url.clone(),
        auth_url: profile.auth_url.clone(),
        ..SdkConfig::default()
    }
    .validate()
    .map_err(|e| CliError::InvalidInput(e.to_string()))?;

    config.set_profile(name.clone(), profile);
    config.save()?;

    println!("{}", formatter.success(&format!("{} profile '{}'", action, name)));

    Ok(())
}

/// Delete a profile.
fn delete_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    if name == config.active_profile {
        return Err(CliError::NotPermitted("Cannot delete the active profile".to_string()));
    }

    if config.profiles.remove(&name).is_some() {
        config.save()?;
        println!("{}", formatter.success(&format!("Deleted profile '{}'", name)));
    } else {
        println!("{}", formatter.warning(&format!("Profile '{}' does not exist", name)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use metafill_sdk::SubjectType;

    fn temp_config(dir: &tempfile::TempDir) -> Config {
        Config::load_from(&dir.path().join("config.toml")).unwrap()
    }

    #[test]
    fn test_set_and_switch_profile() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = temp_config(&dir);
        let formatter = Formatter::new(OutputFormat::Table, false);

        set_profile(
            &mut config,
            "sandbox".to_string(),
            Some("http://localhost:9000/2.0".to_string()),
            None,
            &formatter,
        )
        .unwrap();

        let profile = &config.profiles["sandbox"];
        assert_eq!(profile.api_base_url, "http://localhost:9000/2.0");
        assert_eq!(profile.auth_url, DEFAULT_AUTH_URL);

        switch_profile(&mut config, "sandbox".to_string(), &formatter).unwrap();
        assert_eq!(config.active_profile, "sandbox");

        let reloaded = temp_config(&dir);
        assert_eq!(reloaded.active_profile, "sandbox");
    }

    #[test]
    fn test_update_keeps_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = temp_config(&dir);
        let formatter = Formatter::new(OutputFormat::Table, false);
        config.get_active_profile_mut().unwrap().auth = Some(AuthMethod::DeveloperToken { token: "t".into() });

        set_profile(&mut config, "default".to_string(), None, Some("http://localhost:9000/oauth2/token".into()), &formatter)
            .unwrap();

        assert!(config.profiles["default"].auth.is_some());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = temp_config(&dir);
        let formatter = Formatter::new(OutputFormat::Table, false);

        let result = set_profile(&mut config, "bad".to_string(), Some("localhost".into()), None, &formatter);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
        assert!(!config.profiles.contains_key("bad"));
    }

    #[test]
    fn test_delete_active_profile() {
        let mut config = Config::default();
        let formatter = Formatter::new(OutputFormat::Table, false);

        let result = delete_profile(&mut config, "default".to_string(), &formatter);
        assert!(result.is_err());
    }

    #[test]
    fn test_auth_summary_hides_secrets() {
        let summary = auth_summary(Some(&AuthMethod::ClientCredentials {
            client_id: "app".into(),
            client_secret: "hunter2".into(),
            subject_type: SubjectType::Enterprise,
            subject_id: "12345".into(),
        }));
        assert_eq!(summary, "client credentials (client app, enterprise 12345)");
        assert!(!summary.contains("hunter2"));
    }
}
