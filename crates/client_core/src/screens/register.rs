use std::sync::Arc;

use shared::{error::ValidationError, protocol::RegisterRequest};
use tracing::{info, warn};

use crate::{
    backend::EventsBackend,
    navigator::{Route, Transition},
};

use super::{Alert, FailureContext, Outcome};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, ValidationError> {
        let required = [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.username),
            ("password", &self.password),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ValidationError::missing(*field));
        }
        Ok(RegisterRequest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

pub struct RegisterScreen {
    backend: Arc<dyn EventsBackend>,
    pub form: RegisterForm,
}

impl RegisterScreen {
    pub fn new(backend: Arc<dyn EventsBackend>) -> Self {
        Self {
            backend,
            form: RegisterForm::default(),
        }
    }

    pub async fn submit(&mut self) -> Outcome {
        let request = match self.form.validate() {
            Ok(request) => request,
            Err(err) => return Outcome::alert(Alert::validation(&err)),
        };

        match self.backend.register(&request).await {
            Ok(user) => {
                info!(user_id = user.id.0, "register: account created");
                self.form = RegisterForm::default();
                Outcome::go(Transition::Reset(Route::Login))
                    .with_alert(Alert::info("Success", "Registration successful."))
            }
            Err(err) => {
                warn!(username = %request.username, "register: request failed: {err}");
                Outcome::alert(Alert::failure(FailureContext::Register, &err))
            }
        }
    }

    pub fn open_login(&self) -> Outcome {
        Outcome::go(Transition::Reset(Route::Login))
    }
}
