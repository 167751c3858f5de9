//! Form State
//!
//! Field values, inline errors and in-flight tracking shared by every auth form.

use std::collections::BTreeMap;

use platform::scope::Ticket;

use crate::domain::value_object::field::Field;

/// Values and inline errors of one form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    fields: &'static [Field],
    values: BTreeMap<Field, String>,
    errors: BTreeMap<Field, &'static str>,
    alert: Option<&'static str>,
}

impl FormState {
    /// Empty form over `fields`, all of them required
    pub fn new(fields: &'static [Field]) -> Self {
        Self {
            fields,
            values: fields.iter().map(|f| (*f, String::new())).collect(),
            errors: BTreeMap::new(),
            alert: None,
        }
    }

    /// Fields in display order
    #[inline]
    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    #[inline]
    pub fn has_field(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or_default()
    }

    /// Replace a field value. Returns `false` if the form has no such field.
    ///
    /// Any edit clears every inline error and the alert.
    pub fn edit(&mut self, field: Field, value: impl Into<String>) -> bool {
        let Some(slot) = self.values.get_mut(&field) else {
            return false;
        };
        *slot = value.into();
        self.errors.clear();
        self.alert = None;
        true
    }

    /// Every required field is non-empty
    pub fn is_complete(&self) -> bool {
        self.values.values().all(|v| !v.is_empty())
    }

    #[inline]
    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn set_error(&mut self, field: Field, message: &'static str) {
        debug_assert!(self.has_field(field));
        self.errors.insert(field, message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.alert.is_some()
    }

    #[inline]
    pub fn alert(&self) -> Option<&'static str> {
        self.alert
    }

    pub fn set_alert(&mut self, message: &'static str) {
        self.alert = Some(message);
    }
}

/// At most one outstanding request of one kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InFlight(Option<Ticket>);

impl InFlight {
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.0.is_some()
    }

    pub fn start(&mut self, ticket: Ticket) {
        debug_assert!(self.0.is_none(), "request already in flight");
        self.0 = Some(ticket);
    }

    /// Clear the slot if `ticket` is the outstanding request
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if self.0 == Some(ticket) {
            self.0 = None;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn ticket(&self) -> Option<Ticket> {
        self.0
    }
}

/// Show/hide state of a password input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasswordVisibility {
    shown: bool,
}

impl PasswordVisibility {
    pub fn toggle(&mut self) {
        self.shown = !self.shown;
    }

    #[inline]
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Accessible name of the toggle button
    pub fn toggle_label(&self) -> &'static str {
        if self.shown {
            "Hide Password"
        } else {
            "Show Password"
        }
    }
}
