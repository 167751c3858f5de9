//! Client-Side Routes
//!
//! Path parsing and the navigation history (push / replace with state).

use derive_more::Display;
use serde::Serialize;

/// Route of the single-page client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(tag = "route", content = "path", rename_all = "snake_case")]
pub enum Route {
    #[display("/")]
    Home,
    #[display("/login")]
    SignIn,
    #[display("/signup")]
    SignUp,
    #[display("/confirm")]
    Confirm,
    #[display("{_0}")]
    NotFound(String),
}

impl Route {
    /// Parse a path. Query string, fragment and trailing slashes are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        match path.trim_end_matches('/') {
            "" => Route::Home,
            "/login" | "/signin" => Route::SignIn,
            "/signup" => Route::SignUp,
            "/confirm" => Route::Confirm,
            _ => Route::NotFound(path.to_string()),
        }
    }

    /// Routes that only make sense without a session
    #[inline]
    pub fn is_anonymous_only(&self) -> bool {
        matches!(self, Route::SignIn | Route::SignUp)
    }
}

/// State carried with a navigation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavState {
    /// User name pending confirmation
    pub username: Option<String>,
}

impl NavState {
    pub fn pending(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }

    /// Non-empty pending user name
    pub fn pending_username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }
}

/// Current location: route plus optional navigation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub route: Route,
    pub state: Option<NavState>,
}

impl Location {
    pub fn new(route: Route, state: Option<NavState>) -> Self {
        Self { route, state }
    }

    pub fn parse(path: &str) -> Self {
        Self::new(Route::parse(path), None)
    }

    pub fn pending_username(&self) -> Option<&str> {
        self.state.as_ref().and_then(NavState::pending_username)
    }

    pub fn path(&self) -> String {
        self.route.to_string()
    }
}

/// Navigation history; the last entry is the current location
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Location>,
}

impl History {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
        }
    }

    pub fn current(&self) -> &Location {
        // Never empty: created with one entry, replace keeps the length.
        &self.entries[self.entries.len() - 1]
    }

    pub fn push(&mut self, location: Location) {
        self.entries.push(location);
    }

    pub fn replace(&mut self, location: Location) {
        if let Some(last) = self.entries.last_mut() {
            *last = location;
        }
    }

    /// Go back one entry; `false` at the first entry
    pub fn back(&mut self) -> bool {
        if self.entries.len() > 1 {
            self.entries.pop();
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/login"), Route::SignIn);
        assert_eq!(Route::parse("/signin/"), Route::SignIn);
        assert_eq!(Route::parse("/signup?ref=nav"), Route::SignUp);
        assert_eq!(Route::parse("/confirm#code"), Route::Confirm);
        assert_eq!(Route::parse("/fixtures"), Route::NotFound("/fixtures".into()));
    }

    #[test]
    fn test_display_is_path() {
        assert_eq!(Route::Home.to_string(), "/");
        assert_eq!(Route::SignIn.to_string(), "/login");
        assert_eq!(Route::NotFound("/x".into()).to_string(), "/x");
        assert_eq!(Route::parse(&Route::Confirm.to_string()), Route::Confirm);
    }

    #[test]
    fn test_pending_username() {
        assert_eq!(Location::parse("/confirm").pending_username(), None);

        let empty = Location::new(Route::Confirm, Some(NavState::pending("")));
        assert_eq!(empty.pending_username(), None);

        let pending = Location::new(Route::Confirm, Some(NavState::pending("foobar")));
        assert_eq!(pending.pending_username(), Some("foobar"));
    }

    #[test]
    fn test_history_replace_and_back() {
        let mut history = History::new(Location::parse("/"));
        history.push(Location::parse("/signup"));
        history.replace(Location::new(Route::Confirm, Some(NavState::pending("foobar"))));
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().route, Route::Confirm);

        assert!(history.back());
        assert_eq!(history.current().route, Route::Home);
        assert!(!history.back());
    }
}
