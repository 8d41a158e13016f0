//! Login command implementation.

use crate::cli::LoginArgs;
use crate::config::{AuthOverrides, Config};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use metafill_domain::traits::Authenticator;
use metafill_sdk::{AuthMethod, BoxAuthenticator};

/// Execute the login command.
pub async fn execute_login(
    args: LoginArgs,
    config: &mut Config,
    overrides: &AuthOverrides,
    formatter: &Formatter,
) -> Result<()> {
    let method = login_method(&args, config, overrides)?;
    let sdk_config = config.get_active_profile()?.sdk_config(&config.settings);

    let credentials = BoxAuthenticator::new(sdk_config, method.clone())?.login().await?;
    if let Some(user) = &credentials.user {
        println!("{}", formatter.success(&format!("Logged in as {} <{}>", user.name, user.login)));
    }

    if args.save {
        let name = config.active_profile.clone();
        config.get_active_profile_mut()?.auth = Some(method);
        config.save()?;
        println!("{}", formatter.success(&format!("Credentials saved to profile '{}'", name)));
    }

    Ok(())
}

/// Credentials from the arguments, falling back to the profile.
fn login_method(args: &LoginArgs, config: &Config, overrides: &AuthOverrides) -> Result<AuthMethod> {
    match &args.client_id {
        Some(client_id) => {
            let client_secret = overrides.client_secret.clone().ok_or_else(|| {
                CliError::Auth("--client-id needs --client-secret or METAFILL_CLIENT_SECRET".to_string())
            })?;
            let subject_id = args
                .subject_id
                .clone()
                .ok_or_else(|| CliError::Auth("--client-id needs --subject-id".to_string()))?;
            Ok(AuthMethod::ClientCredentials {
                client_id: client_id.clone(),
                client_secret,
                subject_type: args.subject_type.into(),
                subject_id,
            })
        }
        None => config.get_active_profile()?.auth_method(overrides),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SubjectArg;
    use metafill_sdk::SubjectType;

    fn args(client_id: Option<&str>, subject_id: Option<&str>) -> LoginArgs {
        LoginArgs {
            client_id: client_id.map(String::from),
            subject_type: SubjectArg::User,
            subject_id: subject_id.map(String::from),
            save: false,
        }
    }

    #[test]
    fn test_client_credentials_from_args() {
        let overrides = AuthOverrides {
            developer_token: None,
            client_secret: Some("secret".to_string()),
        };
        let method = login_method(&args(Some("app"), Some("77")), &Config::default(), &overrides).unwrap();
        assert_eq!(
            method,
            AuthMethod::ClientCredentials {
                client_id: "app".to_string(),
                client_secret: "secret".to_string(),
                subject_type: SubjectType::User,
                subject_id: "77".to_string(),
            }
        );
    }

    #[test]
    fn test_client_credentials_need_secret() {
        let result = login_method(&args(Some("app"), Some("77")), &Config::default(), &AuthOverrides::default());
        assert!(matches!(result, Err(CliError::Auth(_))));
    }

    #[test]
    fn test_developer_token_from_environment() {
        let overrides = AuthOverrides {
            developer_token: Some("dev".to_string()),
            client_secret: None,
        };
        let method = login_method(&args(None, None), &Config::default(), &overrides).unwrap();
        assert_eq!(method, AuthMethod::DeveloperToken { token: "dev".to_string() });
    }
}
