//! Metafill Box SDK
//!
//! Client library for the Box REST endpoints the workflow needs: token
//! acquisition, folder listing, template schemas, Box AI extraction and
//! metadata instance writes.
//!
//! # Example
//!
//! ```no_run
//! use metafill_domain::traits::{Authenticator, FileSource};
//! use metafill_sdk::{AuthMethod, BoxAuthenticator, BoxClient, SdkConfig};
//!
//! # async fn run() -> Result<(), metafill_sdk::SdkError> {
//! let config = SdkConfig::default();
//! let auth = BoxAuthenticator::new(
//!     config.clone(),
//!     AuthMethod::DeveloperToken { token: "…".into() },
//! )?;
//! let credentials = auth.login().await?;
//!
//! let client = BoxClient::new(config, &credentials)?;
//! let files = client.list_files("0").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod auth;
mod client;
mod config;
mod error;
mod models;
mod transport;

pub use auth::BoxAuthenticator;
pub use client::BoxClient;
pub use config::{
    AuthMethod, SdkConfig, SubjectType, DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL, DEFAULT_MAX_RETRIES,
    DEFAULT_TIMEOUT_SECS, MAX_PAGE_SIZE, MAX_RETRIES_LIMIT,
};
pub use error::SdkError;
