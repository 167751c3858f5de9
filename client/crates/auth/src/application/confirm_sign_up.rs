//! Confirm Sign Up Form
//!
//! Code entry for a pending registration. Confirm and resend are independent
//! requests; the form is busy while either is in flight.

use platform::scope::{RequestScope, Ticket};

use crate::application::controller::Effect;
use crate::application::form::{FormState, InFlight};
use crate::domain::identity::CodeDelivery;
use crate::domain::value_object::field::Field;
use crate::error::{AuthError, AuthResult};

pub const INVALID_CODE: &str = "Invalid code";
pub const CONFIRMATION_FAILED: &str = "Confirmation failed";
pub const RESEND_FAILED: &str = "Could not resend code";

/// Confirm sign up form bound to one pending user name
#[derive(Debug, Clone)]
pub struct ConfirmSignUpForm {
    username: String,
    state: FormState,
    confirm: InFlight,
    resend: InFlight,
    /// Where the last resent code went
    delivery: Option<CodeDelivery>,
}

impl ConfirmSignUpForm {
    pub const NAME: &'static str = "Confirm Sign Up Form";
    pub const TITLE: &'static str = "Confirm Sign Up";
    pub const CONFIRM_PROGRESS: &'static str = "Confirm sign up in progress";
    pub const RESEND_PROGRESS: &'static str = "Resend code in progress";
    pub const FIELDS: &'static [Field] = &[Field::Code];

    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            state: FormState::new(Self::FIELDS),
            confirm: InFlight::default(),
            resend: InFlight::default(),
            delivery: None,
        }
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn subheader(&self) -> String {
        format!(
            "Enter the code that was sent to the email address you provided at registration for user {}",
            self.username
        )
    }

    #[inline]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn edit(&mut self, field: Field, value: impl Into<String>) -> bool {
        self.state.edit(field, value)
    }

    #[inline]
    pub fn is_confirming(&self) -> bool {
        self.confirm.is_busy()
    }

    #[inline]
    pub fn is_resending(&self) -> bool {
        self.resend.is_busy()
    }

    /// Either request in flight
    pub fn is_busy(&self) -> bool {
        self.is_confirming() || self.is_resending()
    }

    /// Entered code without surrounding whitespace
    pub fn code(&self) -> &str {
        self.state.value(Field::Code).trim()
    }

    /// A resend in flight does not block confirming
    pub fn can_submit(&self) -> bool {
        !self.code().is_empty() && !self.is_confirming()
    }

    pub fn can_resend(&self) -> bool {
        !self.is_resending()
    }

    pub fn progress_label(&self) -> Option<&'static str> {
        if self.is_confirming() {
            Some(Self::CONFIRM_PROGRESS)
        } else if self.is_resending() {
            Some(Self::RESEND_PROGRESS)
        } else {
            None
        }
    }

    pub fn delivery(&self) -> Option<&CodeDelivery> {
        self.delivery.as_ref()
    }

    pub fn submit(&mut self, scope: &mut RequestScope) -> Option<Effect> {
        if !self.can_submit() {
            return None;
        }

        let ticket = scope.issue();
        self.confirm.start(ticket);

        Some(Effect::ConfirmSignUp {
            ticket,
            username: self.username.clone(),
            code: self.code().to_string(),
        })
    }

    pub fn resend(&mut self, scope: &mut RequestScope) -> Option<Effect> {
        if !self.can_resend() {
            return None;
        }

        let ticket = scope.issue();
        self.resend.start(ticket);

        Some(Effect::ResendCode {
            ticket,
            username: self.username.clone(),
        })
    }

    /// Apply a confirmation result; `true` when the account is confirmed
    pub fn settle_confirm(&mut self, ticket: Ticket, result: AuthResult<()>) -> bool {
        if !self.confirm.finish(ticket) {
            return false;
        }

        match result {
            Ok(()) => true,
            Err(AuthError::CodeMismatch | AuthError::ExpiredCode) => {
                self.state.set_error(Field::Code, INVALID_CODE);
                false
            }
            Err(e) => {
                e.log();
                self.state.set_error(Field::Code, CONFIRMATION_FAILED);
                false
            }
        }
    }

    pub fn settle_resend(&mut self, ticket: Ticket, result: AuthResult<Option<CodeDelivery>>) {
        if !self.resend.finish(ticket) {
            return;
        }

        match result {
            Ok(delivery) => {
                if let Some(delivery) = &delivery {
                    tracing::info!(
                        username = %self.username,
                        destination = %delivery.destination,
                        "Confirmation code resent"
                    );
                }
                self.delivery = delivery;
            }
            Err(e) => {
                e.log();
                self.state.set_alert(RESEND_FAILED);
            }
        }
    }
}
