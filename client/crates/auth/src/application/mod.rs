//! Application Layer
//!
//! Forms, the session/navigation controller and the runtime that executes its
//! effects.

pub mod config;
pub mod confirm_sign_up;
pub mod controller;
pub mod form;
pub mod navigation;
pub mod runtime;
pub mod sign_in;
pub mod sign_up;

// Re-exports
pub use config::AuthConfig;
pub use confirm_sign_up::ConfirmSignUpForm;
pub use controller::{Action, Completion, Controller, Effect, Msg, Page};
pub use navigation::{Location, NavState, Route};
pub use runtime::AuthRuntime;
pub use sign_in::{SignInForm, SignInOutcome};
pub use sign_up::SignUpForm;
