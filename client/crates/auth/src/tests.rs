//! Flow tests for the auth crate
//! The runtime driven against the in-memory identity client, screen by screen.

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use crate::application::controller::{Action, Controller};
    use crate::application::runtime::AuthRuntime;
    use crate::domain::entity::user::UserAttributes;
    use crate::domain::value_object::field::Field;
    use crate::infra::memory::InMemoryIdentityClient;
    use crate::presentation::view::Screen;

    pub type Runtime = AuthRuntime<InMemoryIdentityClient>;

    pub fn pool() -> InMemoryIdentityClient {
        InMemoryIdentityClient::new()
            .with_user("david", "secret123", UserAttributes::new("David", "Johnston"))
            .with_unconfirmed_user("eindhorn", "secret123", UserAttributes::new("Ein", "Horn"))
    }

    pub fn runtime(client: InMemoryIdentityClient, path: &str) -> Runtime {
        AuthRuntime::new(Arc::new(client), Controller::new(path))
    }

    /// Mounted runtime with the initial session query settled
    pub async fn mounted(client: InMemoryIdentityClient, path: &str) -> Runtime {
        let mut rt = runtime(client, path);
        rt.mount();
        rt.settle().await;
        rt
    }

    pub fn screen(rt: &Runtime) -> Screen {
        Screen::build(rt.controller())
    }

    pub fn fill(rt: &mut Runtime, values: &[(Field, &str)]) {
        for (field, value) in values {
            rt.dispatch(Action::edit(*field, *value));
        }
    }

    pub fn submit_enabled(rt: &Runtime) -> bool {
        screen(rt).button("Submit").is_some_and(|b| b.enabled)
    }
}

#[cfg(test)]
mod session_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::support::*;
    use crate::application::controller::{Action, Controller};
    use crate::application::runtime::AuthRuntime;
    use crate::domain::entity::session::Session;
    use crate::error::AuthError;
    use crate::infra::memory::Operation;

    #[tokio::test]
    async fn test_mount_queries_once_and_subscribes_once() {
        let mut rt = runtime(pool(), "/");
        rt.mount();
        rt.mount();
        rt.settle().await;

        assert_eq!(rt.client().calls(Operation::CurrentUser), 1);
        assert_eq!(rt.client().subscriber_count(), 1);
        assert!(rt.is_mounted());
        assert_eq!(rt.controller().session(), &Session::Anonymous);
    }

    #[tokio::test]
    async fn test_unknown_session_hides_banner_actions() {
        let client = pool();
        client.hold();
        let mut rt = runtime(client, "/");
        rt.mount();

        let s = screen(&rt);
        assert!(s.banner.actions.is_empty());
        assert!(s.is_home());

        rt.client().release();
        rt.settle().await;
        let s = screen(&rt);
        assert!(s.action("Sign in").is_some());
        assert!(s.action("Sign up").is_some());
    }

    #[tokio::test]
    async fn test_existing_session_is_restored() {
        let rt = mounted(pool().with_session("david"), "/").await;
        assert!(rt.controller().session().is_authenticated());
        assert_eq!(screen(&rt).avatar().unwrap().initials, "DJ");
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let mut rt = mounted(pool().with_session("david"), "/").await;
        let before = rt.controller().session().clone();

        for _ in 0..2 {
            rt.dispatch(Action::RefreshSession);
            rt.settle().await;
            assert_eq!(rt.controller().session(), &before);
        }
        assert_eq!(rt.client().calls(Operation::CurrentUser), 3);
    }

    #[tokio::test]
    async fn test_unmount_unsubscribes() {
        let mut rt = mounted(pool(), "/").await;
        assert_eq!(rt.client().subscriber_count(), 1);

        rt.unmount();
        assert_eq!(rt.client().subscriber_count(), 0);
        assert!(rt.is_idle());
        assert!(!rt.step().await);
    }

    #[tokio::test]
    async fn test_remount_after_unmount_queries_again() {
        let client = pool();
        client.hold();
        let mut rt = runtime(client, "/");
        rt.mount();
        rt.unmount();

        rt.client().release();
        rt.mount();
        rt.settle().await;

        assert_eq!(rt.controller().session(), &Session::Anonymous);
        assert!(rt.client().calls(Operation::CurrentUser) >= 1);
        assert!(screen(&rt).action("Sign in").is_some());
        assert_eq!(rt.client().subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_transient_refresh_failure_keeps_session() {
        let mut rt = mounted(pool().with_session("david"), "/").await;
        rt.client()
            .fail_next(Operation::CurrentUser, AuthError::Transport("timed out".into()));

        rt.dispatch(Action::RefreshSession);
        rt.settle().await;
        assert!(rt.controller().session().is_authenticated());
        assert!(screen(&rt).action("Account").is_some());

        rt.dispatch(Action::RefreshSession);
        rt.settle().await;
        assert!(rt.controller().session().is_authenticated());
        assert_eq!(rt.client().calls(Operation::CurrentUser), 3);
    }

    #[tokio::test]
    async fn test_failed_first_query_is_anonymous() {
        let client = pool().with_session("david");
        client.fail_next(Operation::CurrentUser, AuthError::Transport("offline".into()));
        let rt = mounted(client, "/").await;
        assert_eq!(rt.controller().session(), &Session::Anonymous);
    }

    #[tokio::test]
    async fn test_dropping_runtime_aborts_in_flight_calls() {
        let client = Arc::new(pool());
        client.hold();
        let mut rt = AuthRuntime::new(Arc::clone(&client), Controller::new("/"));
        rt.mount();
        assert_eq!(client.subscriber_count(), 1);

        drop(rt);
        assert_eq!(client.subscriber_count(), 0);
        tokio::time::timeout(Duration::from_secs(1), async {
            while Arc::strong_count(&client) > 1 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("aborted calls should release the client");
    }

    #[tokio::test]
    async fn test_auth_routes_redirect_home_when_signed_in() {
        let mut rt = mounted(pool().with_session("david"), "/").await;
        for path in ["/login", "/signin", "/signup"] {
            rt.dispatch(Action::navigate(path));
            let s = screen(&rt);
            assert!(s.is_home(), "{path} should redirect home");
            assert_eq!(s.path, "/");
        }
    }

    #[tokio::test]
    async fn test_confirm_without_pending_username_redirects_home() {
        let mut rt = mounted(pool(), "/").await;
        rt.dispatch(Action::navigate("/confirm"));

        let s = screen(&rt);
        assert!(s.is_home());
        assert!(s.form().is_none());
    }
}

#[cfg(test)]
mod sign_in_flow_tests {
    use super::support::*;
    use crate::application::controller::Action;
    use crate::domain::entity::session::Session;
    use crate::domain::value_object::field::Field;
    use crate::error::AuthError;
    use crate::infra::memory::Operation;

    #[tokio::test]
    async fn test_submit_disabled_while_empty_or_in_flight() {
        let mut rt = mounted(pool(), "/login").await;
        assert!(!submit_enabled(&rt));

        fill(&mut rt, &[(Field::Username, "david")]);
        assert!(!submit_enabled(&rt));
        fill(&mut rt, &[(Field::Password, "secret123")]);
        assert!(submit_enabled(&rt));

        rt.client().hold();
        rt.dispatch(Action::Submit);
        let s = screen(&rt);
        assert!(!submit_enabled(&rt));
        assert!(s.form().unwrap().busy);
        assert_eq!(s.form().unwrap().progress, Some("Sign in in progress"));

        // A second click while in flight issues nothing
        rt.dispatch(Action::Submit);
        rt.client().release();
        rt.settle().await;
        assert_eq!(rt.client().calls(Operation::SignIn), 1);
    }

    #[tokio::test]
    async fn test_valid_credentials_sign_in() {
        let mut rt = mounted(pool(), "/login").await;
        fill(&mut rt, &[(Field::Username, "david"), (Field::Password, "secret123")]);
        rt.dispatch(Action::Submit);
        rt.settle().await;

        assert!(rt.controller().session().is_authenticated());
        let s = screen(&rt);
        assert!(s.is_home());
        assert!(s.action("Sign in").is_none());
        let avatar = s.avatar().unwrap();
        assert_eq!(avatar.initials, "DJ");
        assert_eq!(avatar.color, "#f76b23");
    }

    #[tokio::test]
    async fn test_unknown_user_marks_username_until_edited() {
        let mut rt = mounted(pool(), "/login").await;
        fill(&mut rt, &[(Field::Username, "nobody"), (Field::Password, "secret123")]);
        rt.dispatch(Action::Submit);
        rt.settle().await;

        assert_eq!(rt.controller().session(), &Session::Anonymous);
        let s = screen(&rt);
        assert_eq!(s.field("Username").unwrap().error, Some("User does not exist"));
        assert_eq!(s.field("Password").unwrap().error, None);

        rt.dispatch(Action::edit(Field::Username, "nobody2"));
        assert_eq!(screen(&rt).field("Username").unwrap().error, None);
    }

    #[tokio::test]
    async fn test_unconfirmed_user_goes_to_confirmation() {
        let mut rt = mounted(pool(), "/login").await;
        fill(&mut rt, &[(Field::Username, "eindhorn"), (Field::Password, "secret123")]);
        rt.dispatch(Action::Submit);
        rt.settle().await;

        assert_eq!(rt.controller().location().pending_username(), Some("eindhorn"));
        let s = screen(&rt);
        let form = s.form().unwrap();
        assert_eq!(form.name, "Confirm Sign Up Form");
        assert!(form.subheader.as_deref().unwrap().ends_with("for user eindhorn"));
        assert!(form.fields.iter().all(|f| f.error != Some("Sign in failed")));
    }

    #[tokio::test]
    async fn test_wrong_password_marks_password() {
        let mut rt = mounted(pool(), "/login").await;
        fill(&mut rt, &[(Field::Username, "david"), (Field::Password, "wrong-password")]);
        rt.dispatch(Action::Submit);
        rt.settle().await;

        let s = screen(&rt);
        assert_eq!(s.field("Password").unwrap().error, Some("Sign in failed"));
        assert!(submit_enabled(&rt));
    }

    #[tokio::test]
    async fn test_service_failure_marks_password() {
        let mut rt = mounted(pool(), "/login").await;
        rt.client()
            .fail_next(Operation::SignIn, AuthError::Transport("timed out".into()));
        fill(&mut rt, &[(Field::Username, "david"), (Field::Password, "secret123")]);
        rt.dispatch(Action::Submit);
        rt.settle().await;

        assert_eq!(
            screen(&rt).field("Password").unwrap().error,
            Some("Sign in failed")
        );
        assert_eq!(rt.controller().session(), &Session::Anonymous);
    }

    #[tokio::test]
    async fn test_late_completion_is_dropped() {
        let mut rt = mounted(pool(), "/login").await;
        fill(&mut rt, &[(Field::Username, "nobody"), (Field::Password, "secret123")]);

        rt.client().hold();
        rt.dispatch(Action::Submit);
        rt.dispatch(Action::navigate("/signup"));
        rt.dispatch(Action::navigate("/login"));
        rt.client().release();
        rt.settle().await;

        let s = screen(&rt);
        let form = s.form().unwrap();
        assert_eq!(form.name, "Sign In Form");
        assert!(!form.busy);
        assert!(form.fields.iter().all(|f| f.error.is_none() && f.value.is_empty()));
        assert_eq!(rt.client().calls(Operation::SignIn), 1);
    }
}

#[cfg(test)]
mod sign_up_flow_tests {
    use super::support::*;
    use crate::application::controller::Action;
    use crate::domain::entity::session::Session;
    use crate::domain::value_object::field::Field;
    use crate::error::AuthError;
    use crate::infra::memory::Operation;

    fn sign_up_fields<'a>(username: &'a str, password: &'a str) -> [(Field, &'a str); 5] {
        [
            (Field::FirstName, "Foo"),
            (Field::LastName, "Bar"),
            (Field::Username, username),
            (Field::Email, "foo@example.com"),
            (Field::Password, password),
        ]
    }

    #[tokio::test]
    async fn test_sign_up_confirm_and_auto_sign_in() {
        let mut rt = mounted(pool(), "/signup").await;

        for (i, entry) in sign_up_fields("foobar", "Passw0rd!").iter().enumerate() {
            assert!(!submit_enabled(&rt), "enabled after {i} fields");
            fill(&mut rt, &[*entry]);
        }
        assert!(submit_enabled(&rt));

        rt.dispatch(Action::Submit);
        rt.settle().await;
        assert_eq!(rt.controller().location().pending_username(), Some("foobar"));
        let s = screen(&rt);
        assert_eq!(s.form().unwrap().name, "Confirm Sign Up Form");
        assert!(!s.button("Confirm").unwrap().enabled);

        let code = rt.client().confirmation_code("foobar").unwrap();
        rt.dispatch(Action::edit(Field::Code, code));
        rt.dispatch(Action::Submit);
        rt.settle().await;

        assert!(matches!(
            rt.controller().session(),
            Session::Authenticated(user) if user.username == "foobar"
        ));
        let s = screen(&rt);
        assert!(s.is_home());
        assert_eq!(s.avatar().unwrap().initials, "FB");
    }

    #[tokio::test]
    async fn test_invalid_code() {
        let mut rt = mounted(pool(), "/login").await;
        fill(&mut rt, &[(Field::Username, "eindhorn"), (Field::Password, "secret123")]);
        rt.dispatch(Action::Submit);
        rt.settle().await;

        rt.dispatch(Action::edit(Field::Code, "000000"));
        rt.dispatch(Action::Submit);
        rt.settle().await;
        assert_eq!(screen(&rt).field("Code").unwrap().error, Some("Invalid code"));

        rt.dispatch(Action::edit(Field::Code, "00000"));
        assert_eq!(screen(&rt).field("Code").unwrap().error, None);
    }

    #[tokio::test]
    async fn test_existing_username_is_surfaced() {
        let mut rt = mounted(pool(), "/signup").await;
        fill(&mut rt, &sign_up_fields("david", "Passw0rd!"));
        rt.dispatch(Action::Submit);
        rt.settle().await;

        let s = screen(&rt);
        assert_eq!(s.form().unwrap().name, "Sign Up Form");
        assert_eq!(s.field("Username").unwrap().error, Some("User already exists"));
    }

    #[tokio::test]
    async fn test_other_sign_up_failure_shows_alert() {
        let mut rt = mounted(pool(), "/signup").await;
        rt.client().fail_next(Operation::SignUp, AuthError::LimitExceeded);
        fill(&mut rt, &sign_up_fields("foobar", "Passw0rd!"));
        rt.dispatch(Action::Submit);
        rt.settle().await;

        assert_eq!(screen(&rt).form().unwrap().alert, Some("Sign up failed"));
    }

    #[tokio::test]
    async fn test_resend_and_confirm_are_independent() {
        let mut rt = mounted(pool(), "/login").await;
        fill(&mut rt, &[(Field::Username, "eindhorn"), (Field::Password, "secret123")]);
        rt.dispatch(Action::Submit);
        rt.settle().await;
        rt.dispatch(Action::edit(Field::Code, "000000"));

        rt.client().hold();
        rt.dispatch(Action::ResendCode);
        let s = screen(&rt);
        assert!(s.form().unwrap().busy);
        assert!(s.button("Confirm").unwrap().enabled);
        assert!(!s.button("Resend Code").unwrap().enabled);

        rt.dispatch(Action::Submit);
        let s = screen(&rt);
        assert!(!s.button("Confirm").unwrap().enabled);

        rt.client().release();
        rt.settle().await;
        let s = screen(&rt);
        assert!(!s.form().unwrap().busy);
        assert_eq!(rt.client().calls(Operation::ResendCode), 1);
        assert_eq!(rt.client().calls(Operation::ConfirmSignUp), 1);
    }

    #[tokio::test]
    async fn test_resend_failure_shows_alert() {
        let mut rt = mounted(pool(), "/login").await;
        fill(&mut rt, &[(Field::Username, "eindhorn"), (Field::Password, "secret123")]);
        rt.dispatch(Action::Submit);
        rt.settle().await;

        rt.client()
            .fail_next(Operation::ResendCode, AuthError::Transport("offline".into()));
        rt.dispatch(Action::ResendCode);
        rt.settle().await;
        assert_eq!(screen(&rt).form().unwrap().alert, Some("Could not resend code"));
    }
}

#[cfg(test)]
mod sign_out_tests {
    use super::support::*;
    use crate::application::controller::Action;
    use crate::domain::entity::session::Session;
    use crate::domain::entity::user::{User, UserAttributes};
    use crate::domain::identity::AuthEvent;
    use crate::error::AuthError;
    use crate::infra::memory::Operation;

    #[tokio::test]
    async fn test_sign_out_restores_anonymous_banner() {
        let mut rt = mounted(pool().with_session("david"), "/").await;
        rt.dispatch(Action::OpenAccountMenu);
        assert!(screen(&rt).menu_item("Sign out").is_some());

        rt.dispatch(Action::SignOut);
        rt.dispatch(Action::SignOut);
        rt.settle().await;

        assert_eq!(rt.controller().session(), &Session::Anonymous);
        assert_eq!(rt.client().calls(Operation::SignOut), 1);
        let s = screen(&rt);
        assert!(s.action("Sign in").is_some());
        assert!(s.action("Sign up").is_some());
        assert!(s.action("Account").is_none());
        assert!(s.banner.menu.is_empty());
    }

    #[tokio::test]
    async fn test_failed_sign_out_still_clears_session() {
        let mut rt = mounted(pool().with_session("david"), "/").await;
        rt.client()
            .fail_next(Operation::SignOut, AuthError::Transport("offline".into()));

        rt.dispatch(Action::SignOut);
        rt.settle().await;
        assert_eq!(rt.controller().session(), &Session::Anonymous);
    }

    #[tokio::test]
    async fn test_sign_out_interrupted_by_unmount_can_be_retried() {
        let mut rt = mounted(pool().with_session("david"), "/").await;
        rt.client().hold();
        rt.dispatch(Action::SignOut);
        assert!(rt.controller().is_signing_out());

        rt.unmount();
        assert!(!rt.controller().is_signing_out());
        rt.client().release();
        rt.mount();
        rt.settle().await;

        rt.dispatch(Action::SignOut);
        assert!(!rt.is_idle());
        rt.settle().await;
        assert_eq!(rt.controller().session(), &Session::Anonymous);
        assert!(!rt.controller().is_signing_out());
    }

    #[tokio::test]
    async fn test_identity_events_are_applied() {
        let mut rt = mounted(pool(), "/").await;
        rt.client().emit(AuthEvent::AutoSignInFailure {
            username: "foobar".into(),
        });
        rt.settle().await;
        assert_eq!(rt.controller().session(), &Session::Anonymous);

        let user = User::new("foobar", UserAttributes::new("Foo", "Bar"));
        rt.client().emit(AuthEvent::AutoSignIn(user));
        assert!(rt.step().await);
        assert_eq!(screen(&rt).avatar().unwrap().initials, "FB");
    }
}
