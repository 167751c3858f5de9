//! Domain Layer
//!
//! Contains entities, value objects, and the identity-client trait.

pub mod entity;
pub mod identity;
pub mod value_object;

// Re-exports
pub use entity::{session::Session, user::User};
pub use identity::{AuthEvent, IdentityClient};
