//! Presentation Layer
//!
//! Screen view model and avatar rendering.

pub mod avatar;
pub mod view;

pub use avatar::{AvatarView, string_to_color};
pub use view::{Banner, BannerAction, ButtonView, Content, FieldView, FormView, Screen};
