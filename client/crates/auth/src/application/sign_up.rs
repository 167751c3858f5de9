//! Sign Up Form
//!
//! Five required fields. Failures are shown on the form instead of being
//! swallowed.

use platform::scope::{RequestScope, Ticket};

use crate::application::controller::Effect;
use crate::application::form::{FormState, InFlight, PasswordVisibility};
use crate::domain::identity::{SignUpHandle, SignUpRequest};
use crate::domain::value_object::{field::Field, raw_password::RawPassword};
use crate::error::{AuthError, AuthResult};

pub const USER_ALREADY_EXISTS: &str = "User already exists";
pub const PASSWORD_REJECTED: &str = "Password does not meet the requirements";
pub const SIGN_UP_FAILED: &str = "Sign up failed";

/// Sign up form
#[derive(Debug, Clone)]
pub struct SignUpForm {
    state: FormState,
    in_flight: InFlight,
    password: PasswordVisibility,
}

impl Default for SignUpForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SignUpForm {
    pub const NAME: &'static str = "Sign Up Form";
    pub const TITLE: &'static str = "Sign Up";
    pub const PROGRESS: &'static str = "Sign up in progress";
    pub const FIELDS: &'static [Field] = &[
        Field::FirstName,
        Field::LastName,
        Field::Username,
        Field::Email,
        Field::Password,
    ];

    pub fn new() -> Self {
        Self {
            state: FormState::new(Self::FIELDS),
            in_flight: InFlight::default(),
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

    pub fn submit(&mut self, scope: &mut RequestScope) -> Option<Effect> {
        if !self.can_submit() {
            return None;
        }

        let ticket = scope.issue();
        self.in_flight.start(ticket);

        let value = |field| self.state.value(field).to_string();
        let request = SignUpRequest {
            username: value(Field::Username),
            password: RawPassword::new(self.state.value(Field::Password)),
            email: value(Field::Email),
            given_name: value(Field::FirstName),
            family_name: value(Field::LastName),
        };

        Some(Effect::SignUp { ticket, request })
    }

    /// Apply the result of the sign up started with `ticket`; the handle on success
    pub fn settle(
        &mut self,
        ticket: Ticket,
        result: AuthResult<SignUpHandle>,
    ) -> Option<SignUpHandle> {
        if !self.in_flight.finish(ticket) {
            return None;
        }

        match result {
            Ok(handle) => Some(handle),
            Err(AuthError::UsernameExists) => {
                self.state.set_error(Field::Username, USER_ALREADY_EXISTS);
                None
            }
            Err(AuthError::InvalidPassword(reason)) => {
                tracing::debug!(reason = %reason, "Password rejected by policy");
                self.state.set_error(Field::Password, PASSWORD_REJECTED);
                None
            }
            Err(e) => {
                e.log();
                self.state.set_alert(SIGN_UP_FAILED);
                None
            }
        }
    }
}
