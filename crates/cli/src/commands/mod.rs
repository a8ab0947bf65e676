//! Command implementations.

pub mod admin;
pub mod comments;
pub mod drafts;

use brief_bulletin_core::ValidationError;
use brief_bulletin_portal::api::{ApiClient, ApiError};
use brief_bulletin_portal::config::{ConfigError, PortalConfig};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// API configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The REST API refused or failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Command arguments failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The configured account is not an admin.
    #[error("{0} is not an admin account")]
    NotAdmin(String),
}

/// API client for `BRIEF_API_URL`.
pub fn client() -> Result<ApiClient, CliError> {
    let config = PortalConfig::from_env()?;
    Ok(ApiClient::new(&config)?)
}

/// An API client signed in with an admin account.
pub struct AdminSession {
    api: ApiClient,
    token: SecretString,
}

impl AdminSession {
    /// Sign in with `BRIEF_ADMIN_LOGIN` / `BRIEF_ADMIN_PASSWORD`.
    pub async fn from_env() -> Result<Self, CliError> {
        let login = std::env::var("BRIEF_ADMIN_LOGIN")
            .map_err(|_| CliError::MissingEnvVar("BRIEF_ADMIN_LOGIN"))?;
        let password = std::env::var("BRIEF_ADMIN_PASSWORD")
            .map(SecretString::from)
            .map_err(|_| CliError::MissingEnvVar("BRIEF_ADMIN_PASSWORD"))?;

        Self::sign_in(client()?, &login, &password).await
    }

    /// Sign in through `api`.
    ///
    /// # Errors
    ///
    /// [`CliError::NotAdmin`] when the credentials are accepted but the
    /// account has another role.
    pub async fn sign_in(
        api: ApiClient,
        login: &str,
        password: &SecretString,
    ) -> Result<Self, CliError> {
        tracing::info!("Signing in as {login}...");
        let payload = api.login(login, password).await?;
        if !payload.role.is_admin() {
            return Err(CliError::NotAdmin(login.to_owned()));
        }
        Ok(Self {
            api,
            token: payload.token,
        })
    }
}
