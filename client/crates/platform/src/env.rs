//! Environment Variable Helpers
//!
//! Thin wrappers over `std::env` that report problems as [`AppError`]s with an
//! action telling the operator what to fix.

use std::env::{self, VarError};
use std::str::FromStr;

use kernel::{AppError, AppResult, ErrorKind, ResultExt};

/// Read a required variable. Empty values count as missing.
pub fn required(name: &'static str) -> AppResult<String> {
    optional(name)?.ok_or_else(|| {
        AppError::invalid_input(format!("{name} must be set"))
            .with_action(format!("Set {name} in the environment or in .env"))
    })
}

/// Read an optional variable. Empty values count as missing.
pub fn optional(name: &'static str) -> AppResult<Option<String>> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(AppError::from(e).with_action(format!("Fix the value of {name}"))),
    }
}

/// Parse an optional variable, falling back to `default` when it is absent.
pub fn parse_or<T>(name: &'static str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(name)? {
        Some(raw) => raw
            .parse()
            .map_app_err(ErrorKind::InvalidInput, format!("{name} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
