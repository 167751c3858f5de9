//! Identity Client Trait
//!
//! The remote identity service as seen by this crate. Implementation is in the
//! infrastructure layer (Cognito, in-memory).

use serde::Serialize;
use tokio::sync::broadcast;

use crate::domain::entity::user::User;
use crate::domain::value_object::raw_password::RawPassword;
use crate::error::AuthResult;

/// Attributes submitted by the sign-up form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub username: String,
    pub password: RawPassword,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
}

/// Where a confirmation code was sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeDelivery {
    /// Masked destination, e.g. `f***@e***.com`
    pub destination: String,
    /// `EMAIL` or `SMS`
    pub medium: String,
}

/// Result of a successful sign-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpHandle {
    pub username: String,
    /// Already confirmed (e.g. by a pre-sign-up trigger)
    pub user_confirmed: bool,
    pub code_delivery: Option<CodeDelivery>,
}

/// Event published by the identity client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Confirmation succeeded and the user was signed in with the sign-up credentials
    AutoSignIn(User),
    /// Confirmation succeeded but signing in afterwards did not
    AutoSignInFailure { username: String },
}

impl AuthEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AuthEvent::AutoSignIn(_) => "autoSignIn",
            AuthEvent::AutoSignInFailure { .. } => "autoSignIn_failure",
        }
    }
}

/// Identity client trait
///
/// Every method is one remote call. Callers never have more than one call of
/// the same kind outstanding per form.
#[trait_variant::make(IdentityClient: Send)]
pub trait LocalIdentityClient {
    /// User of the current session; `NotAuthenticated` when there is none
    async fn current_user(&self) -> AuthResult<User>;

    /// Sign in with username and password
    async fn sign_in(&self, username: &str, password: &RawPassword) -> AuthResult<User>;

    /// Register a new user; a confirmation code is sent to the email address
    async fn sign_up(&self, request: &SignUpRequest) -> AuthResult<SignUpHandle>;

    /// Confirm a registration with the emailed code
    async fn confirm_sign_up(&self, username: &str, code: &str) -> AuthResult<()>;

    /// Send the confirmation code again
    async fn resend_confirmation_code(&self, username: &str) -> AuthResult<Option<CodeDelivery>>;

    /// End the current session
    async fn sign_out(&self) -> AuthResult<()>;

    /// Subscribe to identity events; dropping the receiver unsubscribes
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
