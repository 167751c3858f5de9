//! In-Memory Identity Client
//!
//! An in-process user pool implementing [`IdentityClient`]. Used by the
//! organizer's offline mode and by tests, which can script failures and hold
//! calls in flight.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, watch};

use crate::domain::entity::user::{SessionToken, User, UserAttributes};
use crate::domain::identity::{
    AuthEvent, CodeDelivery, IdentityClient, SignUpHandle, SignUpRequest,
};
use crate::domain::value_object::raw_password::RawPassword;
use crate::error::{AuthError, AuthResult};

const EVENT_CAPACITY: usize = 16;
const MIN_PASSWORD_CHARS: usize = 8;

/// Identity operation, for counters and scripted failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CurrentUser,
    SignIn,
    SignUp,
    ConfirmSignUp,
    ResendCode,
    SignOut,
}

struct Account {
    password: RawPassword,
    attributes: UserAttributes,
    confirmed: bool,
    code: String,
}

impl Account {
    fn user(&self, username: &str) -> User {
        User::new(username, self.attributes.clone())
            .with_token(SessionToken::new(format!("memory-{username}")))
    }
}

#[derive(Default)]
struct PoolState {
    accounts: HashMap<String, Account>,
    session: Option<String>,
    auto_sign_in: Option<(String, RawPassword)>,
    failures: HashMap<Operation, VecDeque<AuthError>>,
    calls: HashMap<Operation, usize>,
    codes_issued: u32,
}

impl PoolState {
    fn next_code(&mut self) -> String {
        self.codes_issued += 1;
        format!("{:06}", (123_456 + self.codes_issued * 111_111) % 1_000_000)
    }

    fn session_user(&self) -> Option<User> {
        let username = self.session.as_deref()?;
        self.accounts.get(username).map(|a| a.user(username))
    }
}

/// In-memory identity client
pub struct InMemoryIdentityClient {
    state: Mutex<PoolState>,
    events: broadcast::Sender<AuthEvent>,
    /// `true` while calls may proceed
    gate: watch::Sender<bool>,
    auto_sign_in: bool,
}

impl Default for InMemoryIdentityClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityClient {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (gate, _) = watch::channel(true);
        Self {
            state: Mutex::new(PoolState::default()),
            events,
            gate,
            auto_sign_in: true,
        }
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    /// Add a confirmed user
    pub fn with_user(self, username: &str, password: &str, attributes: UserAttributes) -> Self {
        self.insert(username, password, attributes, true);
        self
    }

    /// Add a user that signed up but never confirmed
    pub fn with_unconfirmed_user(
        self,
        username: &str,
        password: &str,
        attributes: UserAttributes,
    ) -> Self {
        self.insert(username, password, attributes, false);
        self
    }

    /// Start with `username` signed in
    pub fn with_session(self, username: &str) -> Self {
        self.lock().session = Some(username.to_string());
        self
    }

    pub fn with_auto_sign_in(mut self, enabled: bool) -> Self {
        self.auto_sign_in = enabled;
        self
    }

    fn insert(&self, username: &str, password: &str, attributes: UserAttributes, confirmed: bool) {
        let mut state = self.lock();
        let code = state.next_code();
        state.accounts.insert(
            username.to_string(),
            Account {
                password: RawPassword::new(password),
                attributes,
                confirmed,
                code,
            },
        );
    }

    // ========================================================================
    // Test controls
    // ========================================================================

    /// Fail the next call of `operation` with `error`
    pub fn fail_next(&self, operation: Operation, error: AuthError) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Number of calls of `operation` so far, including held ones
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Current confirmation code of `username`
    pub fn confirmation_code(&self, username: &str) -> Option<String> {
        self.lock().accounts.get(username).map(|a| a.code.clone())
    }

    pub fn is_confirmed(&self, username: &str) -> bool {
        self.lock()
            .accounts
            .get(username)
            .is_some_and(|a| a.confirmed)
    }

    /// Keep every new call pending until [`InMemoryIdentityClient::release`]
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Publish an event as if the service had
    pub fn emit(&self, event: AuthEvent) {
        let name = event.name();
        if self.events.send(event).is_err() {
            tracing::debug!(event = name, "Identity event dropped: no subscribers");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call, wait for the gate, then apply a scripted failure
    async fn begin(&self, operation: Operation) -> AuthResult<()> {
        *self.lock().calls.entry(operation).or_default() += 1;

        let mut gate = self.gate.subscribe();
        // The sender lives as long as `self`
        let _ = gate.wait_for(|open| *open).await;

        match self
            .lock()
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// `foo@example.com` -> `f***@e***`
fn mask_email(email: &str) -> String {
    let initial = |s: &str| s.chars().next().map(String::from).unwrap_or_default();
    match email.split_once('@') {
        Some((local, domain)) => format!("{}***@{}***", initial(local), initial(domain)),
        None => format!("{}***", initial(email)),
    }
}

impl IdentityClient for InMemoryIdentityClient {
    async fn current_user(&self) -> AuthResult<User> {
        self.begin(Operation::CurrentUser).await?;
        self.lock()
            .session_user()
            .ok_or(AuthError::NotAuthenticated)
    }

    async fn sign_in(&self, username: &str, password: &RawPassword) -> AuthResult<User> {
        self.begin(Operation::SignIn).await?;

        let mut state = self.lock();
        let account = state.accounts.get(username).ok_or(AuthError::UserNotFound)?;
        if account.password != *password {
            return Err(AuthError::NotAuthorized);
        }
        if !account.confirmed {
            return Err(AuthError::UserNotConfirmed);
        }
        let user = account.user(username);
        state.session = Some(username.to_string());
        Ok(user)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> AuthResult<SignUpHandle> {
        self.begin(Operation::SignUp).await?;

        let mut state = self.lock();
        if state.accounts.contains_key(&request.username) {
            return Err(AuthError::UsernameExists);
        }
        if request.password.char_count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::InvalidPassword(format!(
                "Password must have length greater than or equal to {MIN_PASSWORD_CHARS}"
            )));
        }

        let code = state.next_code();
        tracing::info!(username = %request.username, code = %code, "Confirmation code issued");
        state.accounts.insert(
            request.username.clone(),
            Account {
                password: request.password.clone(),
                attributes: UserAttributes::new(&request.given_name, &request.family_name)
                    .with_email(&request.email),
                confirmed: false,
                code,
            },
        );
        if self.auto_sign_in {
            state.auto_sign_in = Some((request.username.clone(), request.password.clone()));
        }

        Ok(SignUpHandle {
            username: request.username.clone(),
            user_confirmed: false,
            code_delivery: Some(CodeDelivery {
                destination: mask_email(&request.email),
                medium: "EMAIL".to_string(),
            }),
        })
    }

    async fn confirm_sign_up(&self, username: &str, code: &str) -> AuthResult<()> {
        self.begin(Operation::ConfirmSignUp).await?;

        let auto_signed_in = {
            let mut state = self.lock();
            let account = state
                .accounts
                .get_mut(username)
                .ok_or(AuthError::UserNotFound)?;
            if account.confirmed {
                return Err(AuthError::NotAuthorized);
            }
            if account.code != code {
                return Err(AuthError::CodeMismatch);
            }
            account.confirmed = true;
            let user = account.user(username);

            match state.auto_sign_in.take() {
                Some((pending, _)) if pending == username => {
                    state.session = Some(username.to_string());
                    Some(user)
                }
                other => {
                    state.auto_sign_in = other;
                    None
                }
            }
        };

        if let Some(user) = auto_signed_in {
            self.emit(AuthEvent::AutoSignIn(user));
        }
        Ok(())
    }

    async fn resend_confirmation_code(&self, username: &str) -> AuthResult<Option<CodeDelivery>> {
        self.begin(Operation::ResendCode).await?;

        let mut state = self.lock();
        let code = state.next_code();
        let account = state
            .accounts
            .get_mut(username)
            .ok_or(AuthError::UserNotFound)?;
        if account.confirmed {
            return Err(AuthError::Service {
                code: "InvalidParameterException".to_string(),
                message: "User is already confirmed.".to_string(),
            });
        }
        tracing::info!(username, code = %code, "Confirmation code reissued");
        account.code = code;

        Ok(account.attributes.email.as_deref().map(|email| CodeDelivery {
            destination: mask_email(email),
            medium: "EMAIL".to_string(),
        }))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.begin(Operation::SignOut).await?;
        self.lock().session = None;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn pool() -> InMemoryIdentityClient {
        InMemoryIdentityClient::new()
            .with_user("david", "secret123", UserAttributes::new("David", "Johnston"))
            .with_unconfirmed_user("eindhorn", "secret123", UserAttributes::new("Ein", "Horn"))
    }

    fn request(username: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            username: username.into(),
            password: RawPassword::new(password),
            email: "foo@example.com".into(),
            given_name: "Foo".into(),
            family_name: "Bar".into(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_errors() {
        let client = pool();
        let password = RawPassword::new("secret123");

        assert_eq!(client.sign_in("nobody", &password).await, Err(AuthError::UserNotFound));
        assert_eq!(
            client.sign_in("david", &RawPassword::new("wrong")).await,
            Err(AuthError::NotAuthorized)
        );
        assert_eq!(
            client.sign_in("eindhorn", &password).await,
            Err(AuthError::UserNotConfirmed)
        );
        assert_eq!(client.current_user().await, Err(AuthError::NotAuthenticated));

        let user = client.sign_in("david", &password).await.unwrap();
        assert_eq!(client.current_user().await, Ok(user));
        assert_eq!(client.calls(Operation::SignIn), 4);
    }

    #[tokio::test]
    async fn test_sign_up_and_confirm_emits_auto_sign_in() {
        let client = pool();
        let mut events = client.subscribe();

        assert_eq!(
            client.sign_up(&request("david", "secret123")).await,
            Err(AuthError::UsernameExists)
        );
        assert!(matches!(
            client.sign_up(&request("foobar", "short")).await,
            Err(AuthError::InvalidPassword(_))
        ));

        let handle = client.sign_up(&request("foobar", "Passw0rd!")).await.unwrap();
        assert_eq!(handle.code_delivery.unwrap().destination, "f***@e***");

        assert_eq!(
            client.confirm_sign_up("foobar", "000000").await,
            Err(AuthError::CodeMismatch)
        );
        let code = client.confirmation_code("foobar").unwrap();
        client.confirm_sign_up("foobar", &code).await.unwrap();
        assert!(client.is_confirmed("foobar"));

        let AuthEvent::AutoSignIn(user) = events.try_recv().unwrap() else {
            panic!("expected an auto sign in event");
        };
        assert_eq!(user.initials(), "FB");
        assert_eq!(client.current_user().await, Ok(user));
    }

    #[tokio::test]
    async fn test_no_auto_sign_in_when_disabled() {
        let client = pool().with_auto_sign_in(false);
        let mut events = client.subscribe();
        client.sign_up(&request("foobar", "Passw0rd!")).await.unwrap();
        let code = client.confirmation_code("foobar").unwrap();
        client.confirm_sign_up("foobar", &code).await.unwrap();

        assert!(events.try_recv().is_err());
        assert_eq!(client.current_user().await, Err(AuthError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_resend_issues_new_code() {
        let client = pool();
        let before = client.confirmation_code("eindhorn").unwrap();
        client.resend_confirmation_code("eindhorn").await.unwrap();
        assert_ne!(client.confirmation_code("eindhorn").unwrap(), before);

        assert!(client.resend_confirmation_code("david").await.is_err());
    }

    #[tokio::test]
    async fn test_fail_next_is_consumed_once() {
        let client = pool().with_session("david");
        client.fail_next(Operation::SignOut, AuthError::Transport("offline".into()));

        assert!(client.sign_out().await.is_err());
        assert!(client.current_user().await.is_ok());
        assert!(client.sign_out().await.is_ok());
        assert_eq!(client.current_user().await, Err(AuthError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_hold_and_release() {
        let client = Arc::new(pool().with_session("david"));
        client.hold();

        let task = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.current_user().await }
        });
        while client.calls(Operation::CurrentUser) == 0 {
            tokio::task::yield_now().await;
        }
        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        client.release();
        let user = task.await.unwrap().unwrap();
        assert_eq!(user.username, "david");
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("foo@example.com"), "f***@e***");
        assert_eq!(mask_email("nobody"), "n***");
    }
}
