//! Value Object Module

pub mod field;
pub mod raw_password;

pub use field::{Field, InputType};
pub use raw_password::RawPassword;
