//! User Avatar
//!
//! Initials on a background colour derived from the display name.

use serde::Serialize;

use crate::domain::entity::user::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvatarView {
    pub initials: String,
    /// `#rrggbb`
    pub color: String,
    pub name: String,
}

impl AvatarView {
    pub fn for_user(user: &User) -> Self {
        let name = user.display_name();
        Self {
            initials: user.initials(),
            color: string_to_color(&name),
            name,
        }
    }
}

/// 32-bit string hash over UTF-16 code units, low byte first as `#rrggbb`
pub fn string_to_color(value: &str) -> String {
    let hash = value
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            i32::from(unit).wrapping_add((hash << 5).wrapping_sub(hash))
        });
    let [r, g, b, _] = hash.to_le_bytes();
    format!("#{r:02x}{g:02x}{b:02x}")
}
