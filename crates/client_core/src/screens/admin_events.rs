use std::sync::Arc;

use chrono::Utc;
use shared::{domain::EventId, error::ValidationError};
use tracing::{debug, info, warn};

use crate::{
    backend::EventsBackend,
    navigator::{Route, Transition},
    partition::{partition_events, EventPartition},
    session::SessionContext,
};

use super::{Alert, FailureContext, Outcome, ScreenLifetime};

/// Administrator overview of every event, refetched on each activation.
pub struct AdminEventsScreen {
    backend: Arc<dyn EventsBackend>,
    session: SessionContext,
    lifetime: ScreenLifetime,
    events: EventPartition,
}

impl AdminEventsScreen {
    pub fn new(backend: Arc<dyn EventsBackend>, session: SessionContext) -> Self {
        Self {
            backend,
            session,
            lifetime: ScreenLifetime::default(),
            events: EventPartition::default(),
        }
    }

    pub fn lifetime(&self) -> ScreenLifetime {
        self.lifetime.clone()
    }

    pub fn events(&self) -> &EventPartition {
        &self.events
    }

    pub async fn on_activate(&mut self) -> Outcome {
        let ticket = self.lifetime.begin();
        let Some(bearer) = self.session.bearer().await else {
            return Outcome::alert(Alert::validation(&ValidationError::NotAuthenticated));
        };

        let result = self.backend.list_all_events(&bearer).await;
        if !self.lifetime.is_current(ticket) {
            debug!("admin events: dropping stale event list");
            return Outcome::stay();
        }

        match result {
            Ok(events) => {
                self.events = partition_events(events, Utc::now());
                info!(
                    upcoming = self.events.upcoming.len(),
                    past = self.events.past.len(),
                    "admin events: loaded"
                );
                Outcome::stay()
            }
            Err(err) => {
                warn!("admin events: failed to load: {err}");
                Outcome::alert(Alert::failure(FailureContext::LoadEvents, &err))
            }
        }
    }

    pub fn open_details(&self, event_id: EventId) -> Outcome {
        Outcome::go(Transition::Navigate(Route::AdminEventDetail { event_id }))
    }

    pub fn open_edit(&self, event_id: EventId) -> Outcome {
        Outcome::go(Transition::Navigate(Route::EditEvent { event_id }))
    }
}
