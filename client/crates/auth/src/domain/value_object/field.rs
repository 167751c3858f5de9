//! Form Field Value Object
//!
//! The closed set of input fields used by the sign-in, sign-up and
//! confirmation forms. Labels double as accessible names and are kept verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Input field of an auth form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Username,
    Email,
    Password,
    Code,
}

/// How a field is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Text,
    Email,
    Password,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::FirstName,
        Field::LastName,
        Field::Username,
        Field::Email,
        Field::Password,
        Field::Code,
    ];

    /// Accessible label
    #[inline]
    pub const fn label(&self) -> &'static str {
        use Field::*;
        match self {
            FirstName => "First Name",
            LastName => "Last Name",
            Username => "Username",
            Email => "Email Address",
            Password => "Password",
            Code => "Code",
        }
    }

    /// Machine name, as accepted by [`Field::from_str`]
    #[inline]
    pub const fn name(&self) -> &'static str {
        use Field::*;
        match self {
            FirstName => "first_name",
            LastName => "last_name",
            Username => "username",
            Email => "email",
            Password => "password",
            Code => "code",
        }
    }

    #[inline]
    pub const fn input_type(&self) -> InputType {
        match self {
            Field::Email => InputType::Email,
            Field::Password => InputType::Password,
            _ => InputType::Text,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unknown field name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field: {}", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for Field {
    type Err = UnknownField;

    /// Accepts the machine name, the label, or a hyphenated/lowercase variant
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        let field = match normalized.as_str() {
            "first_name" | "firstname" | "given_name" => Field::FirstName,
            "last_name" | "lastname" | "family_name" => Field::LastName,
            "username" | "user_name" => Field::Username,
            "email" | "email_address" => Field::Email,
            "password" => Field::Password,
            "code" => Field::Code,
            _ => return Err(UnknownField(s.to_string())),
        };
        Ok(field)
    }
}
