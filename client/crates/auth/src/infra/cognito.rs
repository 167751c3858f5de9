//! Amazon Cognito Identity Client
//!
//! [`IdentityClient`] over the Cognito user-pool JSON API. Tokens are kept in
//! memory only; nothing is persisted.
//!
//! ## Auto sign in
//! With `auto_sign_in` enabled the sign-up credentials are retained until the
//! same user is confirmed. After a successful confirmation the client signs in
//! and publishes [`AuthEvent::AutoSignIn`] (or `AutoSignInFailure`).

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use platform::{aws_json::JsonRpcClient, crypto};
use serde::de::IgnoredAny;
use tokio::sync::broadcast;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::{SessionToken, User, UserAttributes};
use crate::domain::identity::{
    AuthEvent, CodeDelivery, IdentityClient, SignUpHandle, SignUpRequest,
};
use crate::domain::value_object::raw_password::RawPassword;
use crate::error::{AuthError, AuthResult};
use crate::infra::dto::{
    AttributeType, AuthenticationResult, ConfirmSignUpRequest, GetUserRequest, GetUserResponse,
    InitiateAuthRequest, InitiateAuthResponse, REFRESH_TOKEN_AUTH, ResendConfirmationCodeRequest,
    ResendConfirmationCodeResponse, RevokeTokenRequest, SignUpRequestDto, SignUpResponse,
    USER_PASSWORD_AUTH,
};

const SERVICE: &str = "AWSCognitoIdentityProviderService";
const EVENT_CAPACITY: usize = 16;

/// Tokens of the signed-in user
#[derive(Debug, Clone)]
struct StoredSession {
    username: String,
    access_token: SessionToken,
    refresh_token: Option<SessionToken>,
    expires_at: DateTime<Utc>,
}

impl StoredSession {
    fn expires_within(&self, skew: Duration) -> bool {
        Utc::now() + skew >= self.expires_at
    }
}

/// Credentials retained between sign up and confirmation
struct PendingSignUp {
    username: String,
    password: RawPassword,
}

/// Cognito-backed identity client
pub struct CognitoIdentityClient {
    rpc: JsonRpcClient,
    config: AuthConfig,
    session: Mutex<Option<StoredSession>>,
    pending: Mutex<Option<PendingSignUp>>,
    events: broadcast::Sender<AuthEvent>,
}

impl CognitoIdentityClient {
    pub fn new(config: AuthConfig) -> AuthResult<Self> {
        let rpc = JsonRpcClient::new(config.endpoint(), SERVICE, config.request_timeout)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        tracing::info!(
            endpoint = %rpc.endpoint(),
            user_pool_id = %config.user_pool_id,
            "Cognito identity client ready"
        );

        Ok(Self {
            rpc,
            config,
            session: Mutex::new(None),
            pending: Mutex::new(None),
            events,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Whether tokens are held
    pub fn has_session(&self) -> bool {
        self.lock_session().is_some()
    }

    // ========================================================================
    // State
    // ========================================================================

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<StoredSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stored_session(&self) -> Option<StoredSession> {
        self.lock_session().clone()
    }

    fn store_session(&self, session: StoredSession) {
        *self.lock_session() = Some(session);
    }

    fn take_session(&self) -> Option<StoredSession> {
        self.lock_session().take()
    }

    fn retain_credentials(&self, username: &str, password: &RawPassword) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(PendingSignUp {
            username: username.to_string(),
            password: password.clone(),
        });
    }

    /// Retained credentials, if they belong to `username`
    fn take_credentials(&self, username: &str) -> Option<RawPassword> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.take() {
            Some(p) if p.username == username => Some(p.password.clone()),
            other => {
                *pending = other;
                None
            }
        }
    }

    fn publish(&self, event: AuthEvent) {
        let name = event.name();
        match self.events.send(event) {
            Ok(receivers) => tracing::debug!(event = name, receivers, "Identity event published"),
            Err(_) => tracing::debug!(event = name, "Identity event dropped: no subscribers"),
        }
    }

    fn secret_hash(&self, username: &str) -> Option<String> {
        self.config
            .secret()
            .map(|secret| crypto::secret_hash(secret, username, &self.config.client_id))
    }

    // ========================================================================
    // Calls
    // ========================================================================

    async fn initiate_auth(
        &self,
        flow: &'static str,
        username: &str,
        mut parameters: BTreeMap<&'static str, String>,
    ) -> AuthResult<AuthenticationResult> {
        if let Some(hash) = self.secret_hash(username) {
            parameters.insert("SECRET_HASH", hash);
        }
        let request = InitiateAuthRequest {
            auth_flow: flow,
            client_id: &self.config.client_id,
            auth_parameters: parameters,
        };

        let response: InitiateAuthResponse = self.rpc.call("InitiateAuth", &request).await?;
        if let Some(challenge) = response.challenge_name {
            return Err(AuthError::UnsupportedChallenge(challenge));
        }
        response
            .authentication_result
            .ok_or_else(|| AuthError::Internal("InitiateAuth returned no tokens".to_string()))
    }

    async fn fetch_user(&self, access_token: &SessionToken) -> AuthResult<User> {
        let request = GetUserRequest {
            access_token: access_token.expose(),
        };
        let response: GetUserResponse = self.rpc.call("GetUser", &request).await?;

        let attributes = UserAttributes::from_pairs(
            response
                .user_attributes
                .iter()
                .map(|a| (a.name.as_str(), a.value.as_str())),
        );
        Ok(User::new(response.username, attributes).with_token(access_token.clone()))
    }

    async fn authenticate(&self, username: &str, password: &RawPassword) -> AuthResult<User> {
        let parameters = BTreeMap::from([
            ("USERNAME", username.to_string()),
            ("PASSWORD", password.expose().to_string()),
        ]);
        let tokens = self
            .initiate_auth(USER_PASSWORD_AUTH, username, parameters)
            .await?;

        let session = StoredSession {
            username: username.to_string(),
            access_token: SessionToken::new(tokens.access_token),
            refresh_token: tokens.refresh_token.map(SessionToken::new),
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        };
        let user = self.fetch_user(&session.access_token).await?;
        self.store_session(session);

        tracing::info!(username = %user.username, "Signed in");
        Ok(user)
    }

    async fn refresh(&self, session: StoredSession) -> AuthResult<StoredSession> {
        let Some(refresh_token) = session.refresh_token.clone() else {
            return Err(AuthError::NotAuthenticated);
        };
        let parameters = BTreeMap::from([("REFRESH_TOKEN", refresh_token.expose().to_string())]);
        let tokens = self
            .initiate_auth(REFRESH_TOKEN_AUTH, &session.username, parameters)
            .await?;

        let refreshed = StoredSession {
            access_token: SessionToken::new(tokens.access_token),
            refresh_token: tokens.refresh_token.map(SessionToken::new).or(Some(refresh_token)),
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
            ..session
        };
        self.store_session(refreshed.clone());

        tracing::debug!(username = %refreshed.username, "Access token refreshed");
        Ok(refreshed)
    }

    /// Sign in with retained sign-up credentials and publish the outcome
    async fn auto_sign_in(&self, username: &str, password: &RawPassword) {
        match self.authenticate(username, password).await {
            Ok(user) => self.publish(AuthEvent::AutoSignIn(user)),
            Err(e) => {
                tracing::warn!(username, error = %e, "Auto sign in failed");
                self.publish(AuthEvent::AutoSignInFailure {
                    username: username.to_string(),
                });
            }
        }
    }

    fn expiry_skew(&self) -> Duration {
        Duration::from_std(self.config.token_expiry_skew).unwrap_or(Duration::zero())
    }
}

impl IdentityClient for CognitoIdentityClient {
    async fn current_user(&self) -> AuthResult<User> {
        let Some(mut session) = self.stored_session() else {
            return Err(AuthError::NotAuthenticated);
        };

        if session.expires_within(self.expiry_skew()) {
            session = match self.refresh(session).await {
                Ok(session) => session,
                Err(AuthError::NotAuthorized | AuthError::NotAuthenticated) => {
                    self.take_session();
                    return Err(AuthError::NotAuthenticated);
                }
                Err(e) => return Err(e),
            };
        }

        match self.fetch_user(&session.access_token).await {
            Err(AuthError::NotAuthorized) => {
                tracing::info!(username = %session.username, "Session revoked");
                self.take_session();
                Err(AuthError::NotAuthenticated)
            }
            result => result,
        }
    }

    async fn sign_in(&self, username: &str, password: &RawPassword) -> AuthResult<User> {
        self.authenticate(username, password).await
    }

    async fn sign_up(&self, request: &SignUpRequest) -> AuthResult<SignUpHandle> {
        let body = SignUpRequestDto {
            client_id: &self.config.client_id,
            username: &request.username,
            password: request.password.expose(),
            secret_hash: self.secret_hash(&request.username),
            user_attributes: vec![
                AttributeType {
                    name: "email",
                    value: &request.email,
                },
                AttributeType {
                    name: "given_name",
                    value: &request.given_name,
                },
                AttributeType {
                    name: "family_name",
                    value: &request.family_name,
                },
            ],
        };
        let response: SignUpResponse = self.rpc.call("SignUp", &body).await?;

        tracing::info!(
            username = %request.username,
            confirmed = response.user_confirmed,
            "User registered"
        );

        if self.config.auto_sign_in {
            if response.user_confirmed {
                self.auto_sign_in(&request.username, &request.password).await;
            } else {
                self.retain_credentials(&request.username, &request.password);
            }
        }

        Ok(SignUpHandle {
            username: request.username.clone(),
            user_confirmed: response.user_confirmed,
            code_delivery: response.code_delivery_details.map(CodeDelivery::from),
        })
    }

    async fn confirm_sign_up(&self, username: &str, code: &str) -> AuthResult<()> {
        let body = ConfirmSignUpRequest {
            client_id: &self.config.client_id,
            username,
            confirmation_code: code,
            secret_hash: self.secret_hash(username),
        };
        let _: IgnoredAny = self.rpc.call("ConfirmSignUp", &body).await?;
        tracing::info!(username, "Sign up confirmed");

        if let Some(password) = self.take_credentials(username) {
            self.auto_sign_in(username, &password).await;
        }
        Ok(())
    }

    async fn resend_confirmation_code(&self, username: &str) -> AuthResult<Option<CodeDelivery>> {
        let body = ResendConfirmationCodeRequest {
            client_id: &self.config.client_id,
            username,
            secret_hash: self.secret_hash(username),
        };
        let response: ResendConfirmationCodeResponse =
            self.rpc.call("ResendConfirmationCode", &body).await?;
        Ok(response.code_delivery_details.map(CodeDelivery::from))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let Some(session) = self.take_session() else {
            return Ok(());
        };
        tracing::info!(username = %session.username, "Signed out");

        let Some(refresh_token) = session.refresh_token else {
            return Ok(());
        };
        let body = RevokeTokenRequest {
            token: refresh_token.expose(),
            client_id: &self.config.client_id,
            client_secret: self.config.secret(),
        };
        let _: IgnoredAny = self.rpc.call("RevokeToken", &body).await?;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
