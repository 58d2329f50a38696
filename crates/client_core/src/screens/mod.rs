//! Screen controllers: local view state, user actions, and the alerts they raise.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::error::ValidationError;

use crate::{error::ApiFailure, navigator::Transition};

pub mod admin_event_detail;
pub mod admin_events;
pub mod event_detail;
pub mod event_form;
pub mod home;
pub mod login;
pub mod participants;
pub mod register;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Auth,
    Transport,
    Validation,
    Conflict,
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureContext {
    Login,
    Register,
    LoadEvents,
    LoadEvent,
    LoadReferenceData,
    LoadParticipants,
    Enroll,
    CancelEnrollment,
    SaveEvent,
    DeleteEvent,
}

impl FailureContext {
    pub fn generic_message(self) -> &'static str {
        match self {
            Self::Login => "There was an error logging in. Please try again.",
            Self::Register => "Registration failed. Please try again.",
            Self::LoadEvents => "Could not load events.",
            Self::LoadEvent => "Could not load the event.",
            Self::LoadReferenceData => "Could not load categories and locations.",
            Self::LoadParticipants => "Could not load participants.",
            Self::Enroll => "Could not enroll in the event.",
            Self::CancelEnrollment => "Could not cancel the enrollment.",
            Self::SaveEvent => "Could not save the event.",
            Self::DeleteEvent => "Could not delete the event.",
        }
    }
}

pub const EVENT_NOT_EMPTY_MESSAGE: &str =
    "This event still has participants. Remove the participants first.";

/// A blocking, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    /// Technical detail for logs; never shown as the primary message.
    pub detail: Option<String>,
}

impl Alert {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Info,
            title: title.into(),
            message: message.into(),
            detail: None,
        }
    }

    pub fn validation(err: &ValidationError) -> Self {
        let kind = if err.requires_reauth() {
            AlertKind::Auth
        } else {
            AlertKind::Validation
        };
        Self {
            kind,
            title: "Error".to_string(),
            message: capitalize(&err.to_string()),
            detail: None,
        }
    }

    pub fn failure(context: FailureContext, failure: &ApiFailure) -> Self {
        let kind = match failure {
            ApiFailure::Transport(_) => AlertKind::Transport,
            failure if failure.is_unauthorized() => AlertKind::Auth,
            ApiFailure::Status { .. } | ApiFailure::MalformedBody(_) => AlertKind::Server,
        };
        Self {
            kind,
            title: "Error".to_string(),
            message: context.generic_message().to_string(),
            detail: Some(failure.to_string()),
        }
    }

    pub fn event_not_empty(failure: &ApiFailure) -> Self {
        Self {
            kind: AlertKind::Conflict,
            title: "Error".to_string(),
            message: EVENT_NOT_EMPTY_MESSAGE.to_string(),
            detail: Some(failure.to_string()),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.kind == AlertKind::Auth
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Result of a screen action: an optional alert and where to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub alert: Option<Alert>,
    pub transition: Transition,
}

impl Outcome {
    pub fn stay() -> Self {
        Self {
            alert: None,
            transition: Transition::Stay,
        }
    }

    pub fn alert(alert: Alert) -> Self {
        Self {
            alert: Some(alert),
            transition: Transition::Stay,
        }
    }

    pub fn go(transition: Transition) -> Self {
        Self {
            alert: None,
            transition,
        }
    }

    pub fn with_alert(mut self, alert: Alert) -> Self {
        self.alert = Some(alert);
        self
    }
}

/// Generation counter tying in-flight loads to the screen activation that issued them.
#[derive(Debug, Clone, Default)]
pub struct ScreenLifetime {
    generation: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl ScreenLifetime {
    /// Starts a new load, superseding any load still in flight.
    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Marks the screen as left; pending responses will be dropped.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "../tests/screens_tests.rs"]
mod tests;
