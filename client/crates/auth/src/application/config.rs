//! Application Configuration
//!
//! Configuration for the identity service connection.

use std::fmt;
use std::time::Duration;

use kernel::{AppError, AppResult};
use platform::env;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// AWS region of the user pool, e.g. `eu-west-1`
    pub region: String,
    /// User pool id, e.g. `eu-west-1_AbCdEf123`
    pub user_pool_id: String,
    /// App client id
    pub client_id: String,
    /// App client secret (only for confidential app clients)
    pub client_secret: Option<String>,
    /// Endpoint override (local emulators)
    pub endpoint: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Sign in automatically after a successful confirmation
    pub auto_sign_in: bool,
    /// Refresh access tokens this long before they expire
    pub token_expiry_skew: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            user_pool_id: String::new(),
            client_id: String::new(),
            client_secret: None,
            endpoint: None,
            request_timeout: Duration::from_secs(10),
            auto_sign_in: true,
            token_expiry_skew: Duration::from_secs(60),
        }
    }
}

impl AuthConfig {
    /// Create config for development (local Cognito emulator on port 9229)
    pub fn development() -> Self {
        Self {
            user_pool_id: "local_organizer".to_string(),
            client_id: "organizer-local".to_string(),
            endpoint: Some("http://localhost:9229/".to_string()),
            ..Default::default()
        }
    }

    /// Load from `COGNITO_*` / `AUTH_*` environment variables
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let user_pool_id = env::required("COGNITO_USER_POOL_ID")?;
        let client_id = env::required("COGNITO_CLIENT_ID")?;
        let region = match env::optional("COGNITO_REGION")? {
            Some(region) => region,
            None => region_from_pool_id(&user_pool_id)
                .map(str::to_string)
                .ok_or_else(|| {
                    AppError::invalid_input(format!(
                        "Cannot derive region from user pool id {user_pool_id}"
                    ))
                    .with_action("Set COGNITO_REGION")
                })?,
        };

        let timeout_secs = env::parse_or("COGNITO_TIMEOUT_SECS", defaults.request_timeout.as_secs())?;
        if timeout_secs == 0 {
            return Err(AppError::invalid_input("COGNITO_TIMEOUT_SECS must be positive")
                .with_action("Set COGNITO_TIMEOUT_SECS to 1 or more"));
        }

        Ok(Self {
            region,
            user_pool_id,
            client_id,
            client_secret: env::optional("COGNITO_CLIENT_SECRET")?,
            endpoint: env::optional("COGNITO_ENDPOINT")?,
            request_timeout: Duration::from_secs(timeout_secs),
            auto_sign_in: env::parse_or("AUTH_AUTO_SIGN_IN", defaults.auto_sign_in)?,
            ..defaults
        })
    }

    /// Service endpoint: the override, or the regional Cognito endpoint
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://cognito-idp.{}.amazonaws.com/", self.region),
        }
    }

    /// Get client secret as str
    pub fn secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("region", &self.region)
            .field("user_pool_id", &self.user_pool_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .field("auto_sign_in", &self.auto_sign_in)
            .field("token_expiry_skew", &self.token_expiry_skew)
            .finish()
    }
}

/// `eu-west-1_AbCdEf123` -> `eu-west-1`
fn region_from_pool_id(pool_id: &str) -> Option<&str> {
    pool_id
        .split_once('_')
        .map(|(region, _)| region)
        .filter(|region| !region.is_empty())
}
