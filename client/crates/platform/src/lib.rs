//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations for the client:
//! - AWS JSON 1.1 RPC transport (used by the Cognito identity client)
//! - Cryptographic utilities (HMAC-SHA256, Base64, Cognito `SECRET_HASH`)
//! - Request scopes for dropping late asynchronous completions
//! - Environment variable helpers for configuration

pub mod aws_json;
pub mod crypto;
pub mod env;
pub mod scope;
