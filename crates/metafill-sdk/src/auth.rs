//! Token acquisition.

use crate::client::BoxClient;
use crate::config::{AuthMethod, SdkConfig};
use crate::error::SdkError;
use crate::models::TokenResponse;
use crate::transport::{http_client, send_with_retry};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use metafill_domain::traits::Authenticator;
use metafill_domain::Credentials;
use tracing::info;

/// Obtains credentials with a developer token or the client-credentials grant
///
/// Every login ends with a `users/me` call, so a bad token fails here rather
/// than on the first real request.
pub struct BoxAuthenticator {
    config: SdkConfig,
    method: AuthMethod,
    http: reqwest::Client,
}

impl BoxAuthenticator {
    /// Create an authenticator
    pub fn new(config: SdkConfig, method: AuthMethod) -> Result<Self, SdkError> {
        config.validate()?;
        if let AuthMethod::DeveloperToken { token } = &method {
            if token.trim().is_empty() {
                return Err(SdkError::Config("developer token is empty".to_string()));
            }
        }
        Ok(Self {
            http: http_client(&config)?,
            config,
            method,
        })
    }

    async fn exchange(&self) -> Result<Credentials, SdkError> {
        match &self.method {
            AuthMethod::DeveloperToken { token } => Ok(Credentials::new(token.trim())),
            AuthMethod::ClientCredentials {
                client_id,
                client_secret,
                subject_type,
                subject_id,
            } => {
                let form = [
                    ("grant_type", "client_credentials"),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                    ("box_subject_type", subject_type.as_str()),
                    ("box_subject_id", subject_id.as_str()),
                ];
                let response = send_with_retry(&self.config, || {
                    self.http.post(&self.config.auth_url).form(&form)
                })
                .await
                .map_err(|e| match e {
                    SdkError::Api { status, message, .. } if (400..500).contains(&status) => {
                        SdkError::Auth(message)
                    }
                    other => other,
                })?;

                let token: TokenResponse = response.json().await?;
                let mut credentials = Credentials::new(token.access_token);
                credentials.expires_at = token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
                Ok(credentials)
            }
        }
    }
}

#[async_trait]
impl Authenticator for BoxAuthenticator {
    type Error = SdkError;

    async fn login(&self) -> Result<Credentials, Self::Error> {
        let mut credentials = self.exchange().await?;

        let client = BoxClient::new(self.config.clone(), &credentials)?;
        let user = client.current_user().await?;
        info!("Authenticated as {} ({})", user.name, user.login);

        credentials.user = Some(user);
        Ok(credentials)
    }
}
