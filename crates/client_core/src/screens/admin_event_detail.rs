use std::sync::Arc;

use shared::{
    domain::{Enrollment, Event, EventId},
    error::ValidationError,
};
use tracing::{debug, info, warn};

use crate::{
    backend::EventsBackend,
    error::ApiResult,
    navigator::{Route, Transition},
    session::SessionContext,
};

use super::{Alert, FailureContext, Outcome, ScreenLifetime};

pub struct AdminEventDetailScreen {
    backend: Arc<dyn EventsBackend>,
    session: SessionContext,
    lifetime: ScreenLifetime,
    event_id: EventId,
    event: Option<Event>,
    participants: Vec<Enrollment>,
    confirming_delete: bool,
}

impl AdminEventDetailScreen {
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
            event: None,
            participants: Vec::new(),
            confirming_delete: false,
        }
    }

    pub fn lifetime(&self) -> ScreenLifetime {
        self.lifetime.clone()
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn participants(&self) -> &[Enrollment] {
        &self.participants
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirming_delete
    }

    pub async fn on_activate(&mut self) -> Outcome {
        let ticket = self.lifetime.begin();
        self.confirming_delete = false;

        let bearer = self.session.bearer().await;
        let backend = Arc::clone(&self.backend);
        let event_id = self.event_id;
        let participants = async {
            match bearer.as_deref() {
                Some(token) => backend.list_enrollments(token, event_id).await,
                None => ApiResult::<Vec<Enrollment>>::Ok(Vec::new()),
            }
        };
        let (event, participants) = futures::join!(backend.get_event(event_id), participants);

        if !self.lifetime.is_current(ticket) {
            debug!(event_id = event_id.0, "admin detail: dropping stale load");
            return Outcome::stay();
        }

        let event = match event {
            Ok(event) => event,
            Err(err) => {
                warn!(event_id = event_id.0, "admin detail: failed to load event: {err}");
                return Outcome::alert(Alert::failure(FailureContext::LoadEvent, &err));
            }
        };
        self.event = Some(event);

        match participants {
            Ok(participants) => {
                self.participants = participants;
                Outcome::stay()
            }
            Err(err) => {
                warn!(event_id = event_id.0, "admin detail: failed to load participants: {err}");
                Outcome::alert(Alert::failure(FailureContext::LoadParticipants, &err))
            }
        }
    }

    pub fn request_delete(&mut self) -> Outcome {
        if self.event.is_none() {
            return Outcome::stay();
        }
        self.confirming_delete = true;
        Outcome::stay()
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = false;
    }

    /// A 400 from the server means the event still has enrollments.
    pub async fn confirm_delete(&mut self) -> Outcome {
        if !self.confirming_delete {
            return Outcome::stay();
        }
        self.confirming_delete = false;
        let Some(bearer) = self.session.bearer().await else {
            return Outcome::alert(Alert::validation(&ValidationError::NotAuthenticated));
        };

        match self.backend.delete_event(&bearer, self.event_id).await {
            Ok(()) => {
                info!(event_id = self.event_id.0, "admin detail: event deleted");
                self.lifetime.invalidate();
                Outcome::go(Transition::Back)
                    .with_alert(Alert::info("Success", "Event deleted successfully."))
            }
            Err(err) if err.is_bad_request() => {
                warn!(event_id = self.event_id.0, "admin detail: event still has participants");
                Outcome::alert(Alert::event_not_empty(&err))
            }
            Err(err) => {
                warn!(event_id = self.event_id.0, "admin detail: delete failed: {err}");
                Outcome::alert(Alert::failure(FailureContext::DeleteEvent, &err))
            }
        }
    }

    pub fn open_participants(&self) -> Outcome {
        Outcome::go(Transition::Navigate(Route::Participants {
            event_id: self.event_id,
        }))
    }
}
