//! Auth (Authentication) Client Module
//!
//! Clean Architecture structure:
//! - `domain/` - Users, session state, the identity-client trait and its events
//! - `application/` - Forms, the session/navigation controller, the effect runtime
//! - `infra/` - Identity client implementations (Amazon Cognito, in-memory)
//! - `presentation/` - Screen view model, avatar, accessible names
//!
//! ## Flow
//! User input is fed to the [`Controller`] as [`Action`]s. The controller is a
//! pure state machine: it updates form/session state and returns [`Effect`]s.
//! The [`AuthRuntime`] executes effects against an injected [`IdentityClient`]
//! and feeds their completions (and identity events such as auto sign-in)
//! back into the controller.
//!
//! ## Identity Model
//! - Token issuance, password checks and code verification live in the remote
//!   identity service; this crate never inspects session tokens
//! - Failures are handled by the form that issued the call and shown inline
//! - Completions arriving after their form was unmounted are dropped

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::controller::{Action, Completion, Controller, Effect, Msg};
pub use application::runtime::AuthRuntime;
pub use domain::identity::{AuthEvent, IdentityClient};
pub use error::{AuthError, AuthResult};
pub use infra::cognito::CognitoIdentityClient;
pub use infra::memory::InMemoryIdentityClient;
pub use presentation::view::Screen;

// Re-export kernel error types for unified error handling
pub use kernel::{AppError, AppResult, ErrorKind};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
}

#[cfg(test)]
mod tests;
