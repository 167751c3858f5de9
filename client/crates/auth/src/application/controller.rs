//! Session/Navigation Controller
//!
//! Single source of truth for "is a user logged in" and router between the
//! anonymous-only and authenticated views.
//!
//! The controller is a pure state machine: [`Controller::update`] applies one
//! [`Msg`] and returns the [`Effect`]s to run. It never performs I/O; the
//! runtime executes effects and feeds their [`Completion`]s back.
//!
//! ## Session states
//! - `Unknown` until the initial session query settles
//! - `Anonymous` when the query fails or sign out completes
//! - `Authenticated` after the query, a sign in, or an auto sign in event
//!
//! ## Guards
//! Applied after every update, rewriting the location with history replace:
//! - `/login`, `/signin`, `/signup` go home while authenticated
//! - `/confirm` goes home unless a pending user name is in the navigation state

use platform::scope::{RequestScope, Ticket};

use crate::application::confirm_sign_up::ConfirmSignUpForm;
use crate::application::navigation::{History, Location, NavState, Route};
use crate::application::sign_in::{SignInForm, SignInOutcome};
use crate::application::sign_up::SignUpForm;
use crate::domain::entity::{session::Session, user::User};
use crate::domain::identity::{AuthEvent, CodeDelivery, SignUpHandle, SignUpRequest};
use crate::domain::value_object::{field::Field, raw_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// User input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Push a new location
    Navigate(String, Option<NavState>),
    /// Go back one history entry
    Back,
    Edit(Field, String),
    Submit,
    ResendCode,
    TogglePasswordVisibility,
    OpenAccountMenu,
    CloseAccountMenu,
    OpenMyAccount,
    SignOut,
    RefreshSession,
}

impl Action {
    pub fn navigate(path: impl Into<String>) -> Self {
        Action::Navigate(path.into(), None)
    }

    pub fn edit(field: Field, value: impl Into<String>) -> Self {
        Action::Edit(field, value.into())
    }
}

/// Identity call to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    QuerySession {
        ticket: Ticket,
    },
    SignIn {
        ticket: Ticket,
        username: String,
        password: RawPassword,
    },
    SignUp {
        ticket: Ticket,
        request: SignUpRequest,
    },
    ConfirmSignUp {
        ticket: Ticket,
        username: String,
        code: String,
    },
    ResendCode {
        ticket: Ticket,
        username: String,
    },
    SignOut,
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::QuerySession { .. } => "query_session",
            Effect::SignIn { .. } => "sign_in",
            Effect::SignUp { .. } => "sign_up",
            Effect::ConfirmSignUp { .. } => "confirm_sign_up",
            Effect::ResendCode { .. } => "resend_code",
            Effect::SignOut => "sign_out",
        }
    }
}

/// Result of an [`Effect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Session {
        ticket: Ticket,
        result: AuthResult<User>,
    },
    SignIn {
        ticket: Ticket,
        result: AuthResult<User>,
    },
    SignUp {
        ticket: Ticket,
        result: AuthResult<SignUpHandle>,
    },
    ConfirmSignUp {
        ticket: Ticket,
        result: AuthResult<()>,
    },
    ResendCode {
        ticket: Ticket,
        result: AuthResult<Option<CodeDelivery>>,
    },
    SignOut {
        result: AuthResult<()>,
    },
}

/// Input to [`Controller::update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Action(Action),
    Settled(Completion),
    Identity(AuthEvent),
}

impl From<Action> for Msg {
    fn from(action: Action) -> Self {
        Msg::Action(action)
    }
}

impl From<Completion> for Msg {
    fn from(completion: Completion) -> Self {
        Msg::Settled(completion)
    }
}

impl From<AuthEvent> for Msg {
    fn from(event: AuthEvent) -> Self {
        Msg::Identity(event)
    }
}

/// Mounted page and its local state
#[derive(Debug, Clone)]
pub enum Page {
    Home,
    SignIn(SignInForm),
    SignUp(SignUpForm),
    Confirm(ConfirmSignUpForm),
    NotFound,
}

impl Page {
    fn for_location(location: &Location) -> Self {
        match &location.route {
            Route::Home => Page::Home,
            Route::SignIn => Page::SignIn(SignInForm::new()),
            Route::SignUp => Page::SignUp(SignUpForm::new()),
            Route::Confirm => {
                Page::Confirm(ConfirmSignUpForm::new(location.pending_username().unwrap_or_default()))
            }
            Route::NotFound(_) => Page::NotFound,
        }
    }

    /// Whether this page is what `location` renders
    fn shows(&self, location: &Location) -> bool {
        match (self, &location.route) {
            (Page::Home, Route::Home)
            | (Page::SignIn(_), Route::SignIn)
            | (Page::SignUp(_), Route::SignUp)
            | (Page::NotFound, Route::NotFound(_)) => true,
            (Page::Confirm(form), Route::Confirm) => {
                Some(form.username()) == location.pending_username()
            }
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::SignIn(_) => "sign_in",
            Page::SignUp(_) => "sign_up",
            Page::Confirm(_) => "confirm",
            Page::NotFound => "not_found",
        }
    }
}

/// Session/navigation state machine
#[derive(Debug)]
pub struct Controller {
    session: Session,
    history: History,
    page: Page,
    /// Tickets of requests issued by the mounted page
    page_scope: RequestScope,
    /// Tickets of session queries
    session_scope: RequestScope,
    account_menu_open: bool,
    signing_out: bool,
    mounted: bool,
}

impl Controller {
    /// Controller at `path`; nothing is queried until [`Controller::mount`]
    pub fn new(path: &str) -> Self {
        Self::at(Location::parse(path))
    }

    pub fn at(location: Location) -> Self {
        let mut controller = Self {
            session: Session::Unknown,
            page: Page::for_location(&location),
            history: History::new(location),
            page_scope: RequestScope::new(),
            session_scope: RequestScope::new(),
            account_menu_open: false,
            signing_out: false,
            mounted: false,
        };
        controller.resolve();
        controller
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[inline]
    pub fn location(&self) -> &Location {
        self.history.current()
    }

    #[inline]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[inline]
    pub fn account_menu_open(&self) -> bool {
        self.account_menu_open
    }

    #[inline]
    pub fn is_signing_out(&self) -> bool {
        self.signing_out
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Start the controller: exactly one session query, once
    pub fn mount(&mut self) -> Vec<Effect> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;
        tracing::debug!(path = %self.location().route, "Controller mounted");
        vec![self.query_session()]
    }

    /// Forget every request in flight.
    ///
    /// The session stays as it was; the page is mounted afresh and the next
    /// [`Controller::mount`] queries the session again.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.signing_out = false;
        self.account_menu_open = false;
        self.session_scope.cancel();
        self.page_scope.cancel();
        self.page = Page::for_location(self.history.current());
        tracing::debug!(path = %self.location().route, "Controller unmounted");
    }

    /// Apply one message and return the effects to run
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        let effects = match msg {
            Msg::Action(action) => self.on_action(action),
            Msg::Settled(completion) => {
                self.on_completion(completion);
                Vec::new()
            }
            Msg::Identity(event) => {
                self.on_identity_event(event);
                Vec::new()
            }
        };
        self.resolve();
        effects
    }

    fn on_action(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Navigate(path, state) => {
                self.history.push(Location::new(Route::parse(&path), state));
                self.account_menu_open = false;
                Vec::new()
            }
            Action::Back => {
                self.history.back();
                Vec::new()
            }
            Action::Edit(field, value) => {
                let accepted = match &mut self.page {
                    Page::SignIn(form) => form.edit(field, value),
                    Page::SignUp(form) => form.edit(field, value),
                    Page::Confirm(form) => form.edit(field, value),
                    Page::Home | Page::NotFound => false,
                };
                if !accepted {
                    tracing::debug!(field = %field, page = self.page.name(), "Ignoring edit");
                }
                Vec::new()
            }
            Action::Submit => {
                let effect = match &mut self.page {
                    Page::SignIn(form) => form.submit(&mut self.page_scope),
                    Page::SignUp(form) => form.submit(&mut self.page_scope),
                    Page::Confirm(form) => form.submit(&mut self.page_scope),
                    Page::Home | Page::NotFound => None,
                };
                effect.into_iter().collect()
            }
            Action::ResendCode => match &mut self.page {
                Page::Confirm(form) => form.resend(&mut self.page_scope).into_iter().collect(),
                _ => Vec::new(),
            },
            Action::TogglePasswordVisibility => {
                match &mut self.page {
                    Page::SignIn(form) => form.toggle_password(),
                    Page::SignUp(form) => form.toggle_password(),
                    _ => {}
                }
                Vec::new()
            }
            Action::OpenAccountMenu => {
                self.account_menu_open = self.session.is_authenticated();
                Vec::new()
            }
            Action::CloseAccountMenu => {
                self.account_menu_open = false;
                Vec::new()
            }
            Action::OpenMyAccount => {
                self.account_menu_open = false;
                if let Some(user) = self.session.user() {
                    tracing::info!(username = %user.username, "My account requested");
                }
                Vec::new()
            }
            Action::SignOut => {
                self.account_menu_open = false;
                if self.signing_out || !self.session.is_authenticated() {
                    return Vec::new();
                }
                self.signing_out = true;
                self.session_scope.cancel();
                vec![Effect::SignOut]
            }
            Action::RefreshSession => {
                if self.signing_out {
                    return Vec::new();
                }
                vec![self.query_session()]
            }
        }
    }

    fn on_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Session { ticket, result } => {
                if !self.session_scope.accepts(ticket) {
                    tracing::debug!(ticket = %ticket, "Dropping stale session query result");
                    return;
                }
                let session = match result {
                    Ok(user) => Session::Authenticated(user),
                    Err(AuthError::NotAuthenticated) => Session::Anonymous,
                    Err(e) => {
                        e.log();
                        // A failed lookup only decides an unknown session
                        if self.session.is_known() {
                            return;
                        }
                        Session::Anonymous
                    }
                };
                self.set_session(session);
            }
            Completion::SignIn { ticket, result } => {
                if !self.accepts_page(ticket, "sign_in") {
                    return;
                }
                let outcome = match &mut self.page {
                    Page::SignIn(form) => form.settle(ticket, result),
                    _ => None,
                };
                match outcome {
                    Some(SignInOutcome::SignedIn(user)) => {
                        self.session_scope.cancel();
                        self.set_session(Session::Authenticated(user));
                        self.history.replace(Location::new(Route::Home, None));
                    }
                    Some(SignInOutcome::NotConfirmed(username)) => {
                        tracing::info!(username = %username, "User not confirmed");
                        self.history
                            .replace(Location::new(Route::Confirm, Some(NavState::pending(username))));
                    }
                    None => {}
                }
            }
            Completion::SignUp { ticket, result } => {
                if !self.accepts_page(ticket, "sign_up") {
                    return;
                }
                let handle = match &mut self.page {
                    Page::SignUp(form) => form.settle(ticket, result),
                    _ => None,
                };
                if let Some(handle) = handle {
                    tracing::info!(
                        username = %handle.username,
                        confirmed = handle.user_confirmed,
                        "User signed up"
                    );
                    let next = if handle.user_confirmed {
                        Location::new(Route::Home, None)
                    } else {
                        Location::new(Route::Confirm, Some(NavState::pending(handle.username)))
                    };
                    self.history.replace(next);
                }
            }
            Completion::ConfirmSignUp { ticket, result } => {
                if !self.accepts_page(ticket, "confirm_sign_up") {
                    return;
                }
                let confirmed = match &mut self.page {
                    Page::Confirm(form) => {
                        let confirmed = form.settle_confirm(ticket, result);
                        if confirmed {
                            tracing::info!(username = %form.username(), "Sign up confirmed");
                        }
                        confirmed
                    }
                    _ => false,
                };
                if confirmed {
                    self.history.replace(Location::new(Route::Home, None));
                }
            }
            Completion::ResendCode { ticket, result } => {
                if !self.accepts_page(ticket, "resend_code") {
                    return;
                }
                if let Page::Confirm(form) = &mut self.page {
                    form.settle_resend(ticket, result);
                }
            }
            Completion::SignOut { result } => {
                if !self.signing_out {
                    tracing::debug!("Dropping unexpected sign out completion");
                    return;
                }
                self.signing_out = false;
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Sign out failed; clearing local session anyway");
                }
                self.session_scope.cancel();
                self.set_session(Session::Anonymous);
            }
        }
    }

    fn on_identity_event(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::AutoSignIn(user) => {
                self.session_scope.cancel();
                self.set_session(Session::Authenticated(user));
            }
            AuthEvent::AutoSignInFailure { username } => {
                tracing::warn!(username = %username, "Auto sign in failed");
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn query_session(&mut self) -> Effect {
        // Only the latest query may decide the session
        self.session_scope.cancel();
        Effect::QuerySession {
            ticket: self.session_scope.issue(),
        }
    }

    fn accepts_page(&self, ticket: Ticket, operation: &'static str) -> bool {
        let accepted = self.page_scope.accepts(ticket);
        if !accepted {
            tracing::debug!(ticket = %ticket, operation, "Dropping completion for unmounted page");
        }
        accepted
    }

    fn set_session(&mut self, session: Session) {
        if self.session != session {
            match session.user() {
                Some(user) => tracing::info!(
                    from = self.session.label(),
                    username = %user.username,
                    "Session authenticated"
                ),
                None => tracing::info!(
                    from = self.session.label(),
                    to = session.label(),
                    "Session changed"
                ),
            }
        }
        if !session.is_authenticated() {
            self.account_menu_open = false;
        }
        self.session = session;
    }

    /// Apply route guards, then mount the page the location shows
    fn resolve(&mut self) {
        let location = self.history.current();
        let redirect = match &location.route {
            route if route.is_anonymous_only() => self.session.is_authenticated(),
            Route::Confirm => location.pending_username().is_none(),
            _ => false,
        };
        if redirect {
            tracing::debug!(from = %location.route, "Redirecting home");
            self.history.replace(Location::new(Route::Home, None));
        }

        let location = self.history.current();
        if !self.page.shows(location) {
            self.page_scope.cancel();
            self.page = Page::for_location(location);
            tracing::debug!(page = self.page.name(), "Page mounted");
        }
    }
}
