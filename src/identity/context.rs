//! Explicit session context holding the current sign-in and notifying observers of changes.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use super::authorizer::{self, Role, Screen};
use super::claims::RoleSet;
use super::principal::Principal;
use super::session::{token_fingerprint, Session};
use super::store::SessionStore;
use crate::error::{AppError, AppResult};

/// The current session, passed explicitly to whoever needs it.
///
/// Lifecycle: `init()` at launch, `establish()` after a successful sign-in,
/// `clear()` on logout. Observers follow changes through `subscribe()`.
#[derive(Clone, Debug)]
pub struct SessionContext {
    store: SessionStore,
    current: Arc<watch::Sender<Option<Session>>>,
}

impl SessionContext {
    pub fn new(store: SessionStore) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { store, current: Arc::new(tx) }
    }

    pub fn store(&self) -> &SessionStore { &self.store }

    /// Load whatever session survived the last run.
    pub fn init(&self) -> Option<Session> {
        let loaded = self.store.load();
        if let Some(s) = &loaded {
            info!(target: "rolegate::session", "restored session user={} token={}", s.user_id, token_fingerprint(&s.token));
        }
        self.current.send_replace(loaded.clone());
        loaded
    }

    /// Persist and publish a new session. Sessions that are not a successful
    /// sign-in are refused and leave the current state untouched. A session that
    /// cannot be stored is refused too; the store is then empty, so the context
    /// signs out to match it.
    pub fn establish(&self, session: Session) -> AppResult<()> {
        if !session.is_valid() {
            return Err(AppError::auth("invalid_session", "authentication did not succeed"));
        }
        // gateways read the bearer from the store, so an unsaved session is unusable
        if !self.store.save(&session) {
            warn!(target: "rolegate::session", "could not persist session for user={}; signed out", session.user_id);
            self.current.send_replace(None);
            return Err(AppError::storage("session_not_saved", "signed in, but the session could not be stored"));
        }
        info!(target: "rolegate::session", "signed in user={}", session.user_id);
        self.current.send_replace(Some(session));
        Ok(())
    }

    pub fn clear(&self) {
        self.store.clear();
        self.current.send_replace(None);
        info!(target: "rolegate::session", "signed out");
    }

    pub fn current(&self) -> Option<Session> { self.current.borrow().clone() }

    pub fn is_authenticated(&self) -> bool { self.current.borrow().is_some() }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> { self.current.subscribe() }

    pub fn roles(&self) -> RoleSet {
        self.current.borrow().as_ref().map(Session::role_set).unwrap_or_default()
    }

    pub fn has_role(&self, name: &str) -> bool { self.roles().contains(name) }

    pub fn is_admin(&self) -> bool { self.has_role(Role::Admin.as_str()) }

    pub fn is_manager(&self) -> bool { self.has_role(Role::Manager.as_str()) }

    pub fn is_user(&self) -> bool { self.has_role(Role::User.as_str()) }

    pub fn dashboard(&self) -> Screen { authorizer::dashboard_for(&self.roles()) }

    /// Screen to show for `requested` given the current session.
    pub fn route(&self, requested: Screen) -> Screen {
        if self.is_authenticated() {
            authorizer::route(requested, Some(&self.roles()))
        } else {
            authorizer::route(requested, None)
        }
    }

    pub fn principal(&self) -> Option<Principal> {
        self.current.borrow().as_ref().map(Principal::from_session)
    }
}
