use std::sync::Arc;

use chrono::Utc;
use shared::domain::EventId;
use tracing::{debug, info, warn};

use crate::{
    backend::EventsBackend,
    navigator::{Route, Transition},
    partition::{partition_events, EventPartition},
    session::SessionContext,
};

use super::{Alert, FailureContext, Outcome, ScreenLifetime};

pub struct HomeScreen {
    backend: Arc<dyn EventsBackend>,
    session: SessionContext,
    lifetime: ScreenLifetime,
    events: EventPartition,
    loaded: bool,
}

impl HomeScreen {
    pub fn new(backend: Arc<dyn EventsBackend>, session: SessionContext) -> Self {
        Self {
            backend,
            session,
            lifetime: ScreenLifetime::default(),
            events: EventPartition::default(),
            loaded: false,
        }
    }

    pub fn lifetime(&self) -> ScreenLifetime {
        self.lifetime.clone()
    }

    pub fn events(&self) -> &EventPartition {
        &self.events
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub async fn on_activate(&mut self) -> Outcome {
        let ticket = self.lifetime.begin();
        let bearer = self.session.bearer().await;
        let now = Utc::now();

        let result = self.backend.list_events_from(now, bearer.as_deref()).await;
        if !self.lifetime.is_current(ticket) {
            debug!("home: dropping stale event list");
            return Outcome::stay();
        }

        match result {
            Ok(events) => {
                self.events = partition_events(events, Utc::now());
                self.loaded = true;
                info!(
                    upcoming = self.events.upcoming.len(),
                    past = self.events.past.len(),
                    "home: events loaded"
                );
                Outcome::stay()
            }
            Err(err) => {
                warn!("home: failed to load events: {err}");
                Outcome::alert(Alert::failure(FailureContext::LoadEvents, &err))
            }
        }
    }

    pub fn open_event(&self, event_id: EventId) -> Outcome {
        Outcome::go(Transition::Navigate(Route::EventDetail { event_id }))
    }

    pub fn open_create_form(&self) -> Outcome {
        Outcome::go(Transition::Navigate(Route::CreateEvent))
    }

    pub fn open_admin_panel(&self) -> Outcome {
        Outcome::go(Transition::Navigate(Route::AdminEvents))
    }

    pub async fn logout(&mut self) -> Outcome {
        self.lifetime.invalidate();
        self.session.clear_session().await;
        Outcome::go(Transition::Reset(Route::Login))
    }
}
