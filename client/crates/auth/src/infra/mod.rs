//! Infrastructure Layer
//!
//! Identity service implementations.

pub mod cognito;
pub mod dto;
pub mod memory;

pub use cognito::CognitoIdentityClient;
pub use memory::{InMemoryIdentityClient, Operation};
