//! Process-lifetime authentication state shared by every screen.

use std::sync::Arc;

use shared::domain::{UserId, UserSummary};
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserSummary>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Cloneable handle to the single [`Session`] of a client run.
///
/// Starts empty; [`SessionContext::set_session`] populates it after a login and
/// [`SessionContext::clear_session`] returns it to the empty state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Session>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_session(&self, token: impl Into<String>, user: Option<UserSummary>) {
        let mut guard = self.inner.write().await;
        guard.token = Some(token.into());
        guard.user = user;
        info!(
            user_id = guard.user.as_ref().map(|user| user.id.0),
            "session: authenticated"
        );
    }

    pub async fn clear_session(&self) {
        let mut guard = self.inner.write().await;
        if guard.is_authenticated() {
            info!("session: cleared");
        }
        *guard = Session::default();
    }

    pub async fn get_session(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn bearer(&self) -> Option<String> {
        self.inner.read().await.token.clone()
    }

    pub async fn user_id(&self) -> Option<UserId> {
        self.inner.read().await.user.as_ref().map(|user| user.id)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_authenticated()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
