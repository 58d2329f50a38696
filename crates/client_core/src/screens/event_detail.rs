//! Event detail with the enroll / cancel-enrollment state machine.

use std::sync::Arc;

use shared::{
    domain::{Enrollment, Event, EventId},
    error::ValidationError,
    protocol::EnrollmentRequest,
};
use tracing::{debug, info, warn};

use crate::{backend::EventsBackend, error::ApiResult, session::SessionContext};

use super::{Alert, FailureContext, Outcome, ScreenLifetime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentState {
    Loading,
    NotEnrolled,
    Enrolled,
    Error(String),
}

impl EnrollmentState {
    fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::NotEnrolled => "not enrolled",
            Self::Enrolled => "already enrolled",
            Self::Error(_) => "the event failed to load",
        }
    }
}

pub struct EventDetailScreen {
    backend: Arc<dyn EventsBackend>,
    session: SessionContext,
    lifetime: ScreenLifetime,
    event_id: EventId,
    state: EnrollmentState,
    event: Option<Event>,
    enrollment_count: usize,
}

impl EventDetailScreen {
    pub fn new(
        backend: Arc<dyn EventsBackend>,
        session: SessionContext,
        event_id: EventId,
    ) -> Self {
        Self {
            backend,
            session,
            lifetime: ScreenLifetime::default(),
            event_id,
            state: EnrollmentState::Loading,
            event: None,
            enrollment_count: 0,
        }
    }

    pub fn lifetime(&self) -> ScreenLifetime {
        self.lifetime.clone()
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn state(&self) -> &EnrollmentState {
        &self.state
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn enrollment_count(&self) -> usize {
        self.enrollment_count
    }

    pub fn capacity(&self) -> Option<u32> {
        self.event.as_ref().map(|event| event.max_assistance)
    }

    pub async fn on_activate(&mut self) -> Outcome {
        let ticket = self.lifetime.begin();
        self.state = EnrollmentState::Loading;

        let bearer = self.session.bearer().await;
        let user_id = self.session.user_id().await;
        let backend = Arc::clone(&self.backend);
        let event_id = self.event_id;

        let enrollments = async {
            match bearer.as_deref() {
                Some(token) => backend.list_enrollments(token, event_id).await,
                None => ApiResult::<Vec<Enrollment>>::Ok(Vec::new()),
            }
        };
        let (event, enrollments) = futures::join!(backend.get_event(event_id), enrollments);

        if !self.lifetime.is_current(ticket) {
            debug!(event_id = event_id.0, "event detail: dropping stale load");
            return Outcome::stay();
        }

        match event.and_then(|event| enrollments.map(|enrollments| (event, enrollments))) {
            Ok((event, enrollments)) => {
                let enrolled = user_id
                    .map(|user_id| enrollments.iter().any(|e| e.user_id == user_id))
                    .unwrap_or(false);
                self.enrollment_count = enrollments.len();
                self.event = Some(event);
                self.state = if enrolled {
                    EnrollmentState::Enrolled
                } else {
                    EnrollmentState::NotEnrolled
                };
                info!(
                    event_id = event_id.0,
                    enrolled,
                    enrollments = self.enrollment_count,
                    "event detail: loaded"
                );
                Outcome::stay()
            }
            Err(err) => {
                warn!(event_id = event_id.0, "event detail: load failed: {err}");
                let alert = Alert::failure(FailureContext::LoadEvent, &err);
                self.state = EnrollmentState::Error(alert.message.clone());
                Outcome::alert(alert)
            }
        }
    }

    /// Rejected locally, with no request issued, when the event is already full.
    pub async fn enroll(&mut self) -> Outcome {
        if self.state != EnrollmentState::NotEnrolled {
            return self.reject_transition("enroll");
        }
        let capacity = self.capacity().unwrap_or(0);
        if self.enrollment_count >= capacity as usize {
            info!(
                event_id = self.event_id.0,
                enrolled = self.enrollment_count,
                capacity,
                "event detail: enrollment rejected, event full"
            );
            return Outcome::alert(Alert::validation(&ValidationError::CapacityExceeded {
                enrolled: self.enrollment_count,
                capacity,
            }));
        }
        let (Some(bearer), Some(user_id)) =
            (self.session.bearer().await, self.session.user_id().await)
        else {
            return Outcome::alert(Alert::validation(&ValidationError::NotAuthenticated));
        };

        let request = EnrollmentRequest::new(self.event_id, user_id);
        match self.backend.enroll(&bearer, self.event_id, &request).await {
            Ok(_) => {
                self.state = EnrollmentState::Enrolled;
                self.enrollment_count += 1;
                info!(event_id = self.event_id.0, "event detail: enrolled");
                Outcome::alert(Alert::info("Success", "Enrollment successful!"))
            }
            Err(err) => {
                warn!(event_id = self.event_id.0, "event detail: enroll failed: {err}");
                Outcome::alert(Alert::failure(FailureContext::Enroll, &err))
            }
        }
    }

    pub async fn cancel_enrollment(&mut self) -> Outcome {
        if self.state != EnrollmentState::Enrolled {
            return self.reject_transition("cancel the enrollment");
        }
        let Some(bearer) = self.session.bearer().await else {
            return Outcome::alert(Alert::validation(&ValidationError::NotAuthenticated));
        };

        match self.backend.cancel_enrollment(&bearer, self.event_id).await {
            Ok(_) => {
                self.state = EnrollmentState::NotEnrolled;
                self.enrollment_count = self.enrollment_count.saturating_sub(1);
                info!(event_id = self.event_id.0, "event detail: enrollment cancelled");
                Outcome::alert(Alert::info("Success", "Enrollment cancelled."))
            }
            Err(err) => {
                warn!(event_id = self.event_id.0, "event detail: cancel failed: {err}");
                Outcome::alert(Alert::failure(FailureContext::CancelEnrollment, &err))
            }
        }
    }

    fn reject_transition(&self, action: &'static str) -> Outcome {
        Outcome::alert(Alert::validation(&ValidationError::InvalidTransition {
            action,
            state: self.state.label(),
        }))
    }
}
