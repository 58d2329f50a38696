use std::sync::Arc;

use shared::{
    domain::{Enrollment, EventId},
    error::ValidationError,
};
use tracing::{debug, warn};

use crate::{backend::EventsBackend, session::SessionContext};

use super::{Alert, FailureContext, Outcome, ScreenLifetime};

pub struct ParticipantsScreen {
    backend: Arc<dyn EventsBackend>,
    session: SessionContext,
    lifetime: ScreenLifetime,
    event_id: EventId,
    participants: Vec<Enrollment>,
}

impl ParticipantsScreen {
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
            participants: Vec::new(),
        }
    }

    pub fn lifetime(&self) -> ScreenLifetime {
        self.lifetime.clone()
    }

    pub fn participants(&self) -> &[Enrollment] {
        &self.participants
    }

    pub fn participant_names(&self) -> Vec<String> {
        self.participants
            .iter()
            .map(Enrollment::participant_name)
            .collect()
    }

    pub async fn on_activate(&mut self) -> Outcome {
        let ticket = self.lifetime.begin();
        let Some(bearer) = self.session.bearer().await else {
            return Outcome::alert(Alert::validation(&ValidationError::NotAuthenticated));
        };

        let result = self.backend.list_enrollments(&bearer, self.event_id).await;
        if !self.lifetime.is_current(ticket) {
            debug!(event_id = self.event_id.0, "participants: dropping stale list");
            return Outcome::stay();
        }

        match result {
            Ok(participants) => {
                self.participants = participants;
                Outcome::stay()
            }
            Err(err) => {
                warn!(event_id = self.event_id.0, "participants: failed to load: {err}");
                Outcome::alert(Alert::failure(FailureContext::LoadParticipants, &err))
            }
        }
    }
}
