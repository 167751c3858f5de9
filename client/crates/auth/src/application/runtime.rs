//! Effect Runtime
//!
//! Runs the [`Controller`]'s effects against an injected [`IdentityClient`] and
//! feeds completions and identity events back into it.
//!
//! Every effect runs as its own task in a [`JoinSet`]. Dropping the runtime
//! aborts whatever is still in flight and drops the event subscription.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinSet;

use crate::application::controller::{Action, Completion, Controller, Effect, Msg};
use crate::domain::identity::{AuthEvent, IdentityClient};

/// Drives a [`Controller`] against an identity client
pub struct AuthRuntime<C> {
    client: Arc<C>,
    controller: Controller,
    tasks: JoinSet<Completion>,
    events: Option<broadcast::Receiver<AuthEvent>>,
}

impl<C> AuthRuntime<C>
where
    C: IdentityClient + Send + Sync + 'static,
{
    pub fn new(client: Arc<C>, controller: Controller) -> Self {
        Self {
            client,
            controller,
            tasks: JoinSet::new(),
            events: None,
        }
    }

    #[inline]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    #[inline]
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// No effect in flight
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.events.is_some()
    }

    /// Subscribe to identity events and query the session. Idempotent.
    pub fn mount(&mut self) {
        if self.events.is_none() {
            self.events = Some(self.client.subscribe());
        }
        let effects = self.controller.mount();
        self.spawn_all(effects);
    }

    /// Feed a user action through the controller
    pub fn dispatch(&mut self, action: Action) {
        self.apply(Msg::Action(action));
    }

    /// Wait for the next completion or identity event and apply it.
    ///
    /// Returns `false` when nothing is in flight and there is no subscription.
    pub async fn step(&mut self) -> bool {
        tokio::select! {
            Some(joined) = self.tasks.join_next() => {
                match joined {
                    Ok(completion) => self.apply(Msg::Settled(completion)),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => tracing::error!(error = %e, "Identity call panicked"),
                }
                true
            }
            event = next_event(&mut self.events), if self.events.is_some() => {
                match event {
                    Some(event) => self.apply(Msg::Identity(event)),
                    None => {
                        tracing::warn!("Identity event channel closed");
                        self.events = None;
                    }
                }
                true
            }
            else => false,
        }
    }

    /// Process until nothing is in flight and no event is buffered
    pub async fn settle(&mut self) {
        loop {
            while let Some(event) = self.try_next_event() {
                self.apply(Msg::Identity(event));
            }
            if self.tasks.is_empty() {
                break;
            }
            self.step().await;
        }
    }

    /// Abort in-flight effects and unsubscribe. A later [`AuthRuntime::mount`]
    /// starts over with a fresh session query.
    pub fn unmount(&mut self) {
        self.tasks.abort_all();
        self.tasks = JoinSet::new();
        self.events = None;
        self.controller.unmount();
    }

    fn apply(&mut self, msg: Msg) {
        let effects = self.controller.update(msg);
        self.spawn_all(effects);
    }

    fn spawn_all(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            tracing::debug!(effect = effect.name(), "Running effect");
            self.tasks.spawn(execute(Arc::clone(&self.client), effect));
        }
    }

    fn try_next_event(&mut self) -> Option<AuthEvent> {
        let events = self.events.as_mut()?;
        loop {
            match events.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Identity events lagged");
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => {
                    self.events = None;
                    return None;
                }
            }
        }
    }
}

impl<C> Drop for AuthRuntime<C> {
    fn drop(&mut self) {
        self.tasks.abort_all();
        self.events = None;
    }
}

async fn next_event(events: &mut Option<broadcast::Receiver<AuthEvent>>) -> Option<AuthEvent> {
    let Some(events) = events.as_mut() else {
        return std::future::pending().await;
    };
    loop {
        match events.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Identity events lagged");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Perform one effect
async fn execute<C>(client: Arc<C>, effect: Effect) -> Completion
where
    C: IdentityClient + Send + Sync + 'static,
{
    match effect {
        Effect::QuerySession { ticket } => Completion::Session {
            ticket,
            result: client.current_user().await,
        },
        Effect::SignIn {
            ticket,
            username,
            password,
        } => Completion::SignIn {
            ticket,
            result: client.sign_in(&username, &password).await,
        },
        Effect::SignUp { ticket, request } => Completion::SignUp {
            ticket,
            result: client.sign_up(&request).await,
        },
        Effect::ConfirmSignUp {
            ticket,
            username,
            code,
        } => Completion::ConfirmSignUp {
            ticket,
            result: client.confirm_sign_up(&username, &code).await,
        },
        Effect::ResendCode { ticket, username } => Completion::ResendCode {
            ticket,
            result: client.resend_confirmation_code(&username).await,
        },
        Effect::SignOut => Completion::SignOut {
            result: client.sign_out().await,
        },
    }
}
