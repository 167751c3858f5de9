//! Sign In Form
//!
//! Username/password sign in with inline error mapping.

use platform::scope::{RequestScope, Ticket};

use crate::application::controller::Effect;
use crate::application::form::{FormState, InFlight, PasswordVisibility};
use crate::domain::entity::user::User;
use crate::domain::value_object::{field::Field, raw_password::RawPassword};
use crate::error::{AuthError, AuthResult};

pub const USER_DOES_NOT_EXIST: &str = "User does not exist";
pub const SIGN_IN_FAILED: &str = "Sign in failed";

/// What the controller should do after a sign in settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    SignedIn(User),
    /// Hand over to the confirmation flow for this user name
    NotConfirmed(String),
}

/// Sign in form
#[derive(Debug, Clone)]
pub struct SignInForm {
    state: FormState,
    in_flight: InFlight,
    /// User name as submitted, independent of later edits
    submitted: Option<String>,
    password: PasswordVisibility,
}

impl Default for SignInForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SignInForm {
    pub const NAME: &'static str = "Sign In Form";
    pub const TITLE: &'static str = "Sign In";
    pub const PROGRESS: &'static str = "Sign in in progress";
    pub const FIELDS: &'static [Field] = &[Field::Username, Field::Password];

    pub fn new() -> Self {
        Self {
            state: FormState::new(Self::FIELDS),
            in_flight: InFlight::default(),
            submitted: None,
            password: PasswordVisibility::default(),
        }
    }

    #[inline]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn edit(&mut self, field: Field, value: impl Into<String>) -> bool {
        self.state.edit(field, value)
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    pub fn can_submit(&self) -> bool {
        self.state.is_complete() && !self.is_busy()
    }

    #[inline]
    pub fn password_visibility(&self) -> PasswordVisibility {
        self.password
    }

    pub fn toggle_password(&mut self) {
        self.password.toggle();
    }

    /// Start a sign in; `None` while disabled
    pub fn submit(&mut self, scope: &mut RequestScope) -> Option<Effect> {
        if !self.can_submit() {
            return None;
        }

        let ticket = scope.issue();
        self.in_flight.start(ticket);

        let username = self.state.value(Field::Username).to_string();
        self.submitted = Some(username.clone());

        Some(Effect::SignIn {
            ticket,
            username,
            password: RawPassword::new(self.state.value(Field::Password)),
        })
    }

    /// Apply the result of the sign in started with `ticket`
    pub fn settle(&mut self, ticket: Ticket, result: AuthResult<User>) -> Option<SignInOutcome> {
        if !self.in_flight.finish(ticket) {
            return None;
        }
        let username = self.submitted.take().unwrap_or_default();

        match result {
            Ok(user) => Some(SignInOutcome::SignedIn(user)),
            Err(AuthError::UserNotConfirmed) => Some(SignInOutcome::NotConfirmed(username)),
            Err(AuthError::UserNotFound) => {
                self.state.set_error(Field::Username, USER_DOES_NOT_EXIST);
                None
            }
            Err(e) => {
                e.log();
                self.state.set_error(Field::Password, SIGN_IN_FAILED);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::UserAttributes;

    fn filled() -> SignInForm {
        let mut form = SignInForm::new();
        form.edit(Field::Username, "foobar");
        form.edit(Field::Password, "secret123");
        form
    }

    fn submit(form: &mut SignInForm, scope: &mut RequestScope) -> Ticket {
        match form.submit(scope) {
            Some(Effect::SignIn { ticket, username, password }) => {
                assert_eq!(username, "foobar");
                assert_eq!(password.expose(), "secret123");
                ticket
            }
            other => panic!("unexpected effect: {other:?}"),
        }
    }

    #[test]
    fn test_submit_disabled_until_complete() {
        let mut scope = RequestScope::new();
        let mut form = SignInForm::new();
        assert!(!form.can_submit());
        assert!(form.submit(&mut scope).is_none());

        form.edit(Field::Username, "foobar");
        assert!(!form.can_submit());

        form.edit(Field::Password, "secret123");
        assert!(form.can_submit());
    }

    #[test]
    fn test_submit_disabled_while_in_flight() {
        let mut scope = RequestScope::new();
        let mut form = filled();
        let ticket = submit(&mut form, &mut scope);

        assert!(form.is_busy());
        assert!(!form.can_submit());
        assert!(form.submit(&mut scope).is_none());

        form.settle(ticket, Err(AuthError::NotAuthorized));
        assert!(!form.is_busy());
        assert!(form.can_submit());
    }

    #[test]
    fn test_user_not_found_marks_username() {
        let mut scope = RequestScope::new();
        let mut form = filled();
        let ticket = submit(&mut form, &mut scope);

        assert_eq!(form.settle(ticket, Err(AuthError::UserNotFound)), None);
        assert_eq!(form.state().error(Field::Username), Some(USER_DOES_NOT_EXIST));
        assert_eq!(form.state().error(Field::Password), None);

        form.edit(Field::Username, "foobaz");
        assert_eq!(form.state().error(Field::Username), None);
    }

    #[test]
    fn test_other_failure_marks_password() {
        let mut scope = RequestScope::new();
        let mut form = filled();
        let ticket = submit(&mut form, &mut scope);

        form.settle(ticket, Err(AuthError::Transport("connection refused".into())));
        assert_eq!(form.state().error(Field::Password), Some(SIGN_IN_FAILED));
        assert_eq!(form.state().error(Field::Username), None);
    }

    #[test]
    fn test_not_confirmed_hands_over_submitted_username() {
        let mut scope = RequestScope::new();
        let mut form = filled();
        let ticket = submit(&mut form, &mut scope);
        // Edits while in flight do not change who was submitted
        form.edit(Field::Username, "someone-else");

        let outcome = form.settle(ticket, Err(AuthError::UserNotConfirmed));
        assert_eq!(outcome, Some(SignInOutcome::NotConfirmed("foobar".into())));
        assert!(!form.state().has_errors());
    }

    #[test]
    fn test_success_and_unknown_ticket() {
        let mut scope = RequestScope::new();
        let mut form = filled();
        let ticket = submit(&mut form, &mut scope);
        let user = User::new("foobar", UserAttributes::new("Foo", "Bar"));

        let stray = scope.issue();
        assert_eq!(form.settle(stray, Ok(user.clone())), None);
        assert!(form.is_busy());

        assert_eq!(form.settle(ticket, Ok(user.clone())), Some(SignInOutcome::SignedIn(user)));
    }
}
