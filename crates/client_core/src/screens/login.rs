use std::sync::Arc;

use shared::{error::ValidationError, protocol::LoginRequest};
use tracing::{info, warn};

use crate::{
    backend::EventsBackend,
    navigator::{Route, Transition},
    session::SessionContext,
};

use super::{Alert, FailureContext, Outcome};

pub struct LoginScreen {
    backend: Arc<dyn EventsBackend>,
    session: SessionContext,
    pub username: String,
    pub password: String,
}

impl LoginScreen {
    pub fn new(backend: Arc<dyn EventsBackend>, session: SessionContext) -> Self {
        Self {
            backend,
            session,
            username: String::new(),
            password: String::new(),
        }
    }

    /// Showing the login screen always starts from a signed-out state.
    pub async fn on_activate(&mut self) -> Outcome {
        self.session.clear_session().await;
        Outcome::stay()
    }

    pub async fn submit(&mut self) -> Outcome {
        if self.username.trim().is_empty() {
            return Outcome::alert(Alert::validation(&ValidationError::missing("username")));
        }

        let request = LoginRequest {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        };
        let response = match self.backend.login(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(username = %request.username, "login: request failed: {err}");
                return Outcome::alert(Alert::failure(FailureContext::Login, &err));
            }
        };

        let Some(token) = response.token() else {
            warn!(username = %request.username, "login: response carried no token");
            return Outcome::alert(Alert::info("Error", "Invalid username or password."));
        };

        self.session
            .set_session(token.to_string(), response.user.clone())
            .await;
        info!(username = %request.username, "login: signed in");
        self.password.clear();
        Outcome::go(Transition::Reset(Route::Home))
    }

    pub fn open_register(&self) -> Outcome {
        Outcome::go(Transition::Navigate(Route::Register))
    }
}
