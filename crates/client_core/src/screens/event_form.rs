//! Create/edit form for events, with client-side checks and a confirmation step.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{
    domain::{CategoryId, Event, EventCategory, EventId, EventLocation, LocationId, UserId},
    error::ValidationError,
    protocol::EventPayload,
};
use tracing::{debug, info, warn};

use crate::{
    backend::EventsBackend,
    navigator::{Route, Transition},
    session::SessionContext,
};

use super::{Alert, FailureContext, Outcome, ScreenLifetime};

pub const DEFAULT_DURATION_MINUTES: u32 = 15;

/// Durations offered by the picker, ascending and without repeats.
pub fn duration_options() -> Vec<u32> {
    let mut options: Vec<u32> = (1..=25)
        .map(|step| step * 15)
        .chain((1..=13).map(|step| step * 30 + 180))
        .chain((1..=6).map(|step| step * 60 + 360))
        .collect();
    options.sort_unstable();
    options.dedup();
    options
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(EventId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStage {
    Loading,
    Editing,
    Confirming,
}

/// Raw user input; numeric fields stay text until validated.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub category: Option<CategoryId>,
    pub location: Option<LocationId>,
    pub start_date: DateTime<Utc>,
    pub duration_in_minutes: u32,
    pub price: String,
    pub max_assistance: String,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: None,
            location: None,
            start_date: Utc::now(),
            duration_in_minutes: DEFAULT_DURATION_MINUTES,
            price: String::new(),
            max_assistance: String::new(),
        }
    }
}

impl EventDraft {
    pub fn from_event(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            category: Some(event.category),
            location: Some(event.location),
            start_date: event.start_date,
            duration_in_minutes: event.duration_in_minutes,
            price: event.price.to_string(),
            max_assistance: event.max_assistance.to_string(),
        }
    }

    /// Checks required fields and positive numerics; the payload has no id or creator yet.
    pub fn validate(&self) -> Result<EventPayload, ValidationError> {
        let name = required_text("name", &self.name)?;
        let description = required_text("description", &self.description)?;
        let category = self.category.ok_or(ValidationError::missing("category"))?;
        let location = self.location.ok_or(ValidationError::missing("location"))?;
        if self.duration_in_minutes == 0 {
            return Err(ValidationError::NotPositive { field: "duration" });
        }
        let price = parse_price(&self.price)?;
        let max_assistance = parse_max_assistance(&self.max_assistance)?;

        Ok(EventPayload {
            id: None,
            name,
            description,
            id_event_category: category,
            id_event_location: location,
            start_date: self.start_date,
            duration_in_minutes: self.duration_in_minutes,
            price,
            enabled_for_enrollment: true,
            max_assistance,
            id_creator_user: None,
        })
    }
}

fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(value.to_string())
}

fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::missing("price"));
    }
    let price: f64 = raw
        .parse()
        .map_err(|_| ValidationError::NotANumber { field: "price" })?;
    if !price.is_finite() {
        return Err(ValidationError::NotANumber { field: "price" });
    }
    if price <= 0.0 {
        return Err(ValidationError::NotPositive { field: "price" });
    }
    Ok(price)
}

fn parse_max_assistance(raw: &str) -> Result<u32, ValidationError> {
    const FIELD: &str = "max attendance";
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::missing(FIELD));
    }
    let value: i64 = raw
        .parse()
        .map_err(|_| ValidationError::NotANumber { field: FIELD })?;
    if value <= 0 {
        return Err(ValidationError::NotPositive { field: FIELD });
    }
    u32::try_from(value).map_err(|_| ValidationError::NotANumber { field: FIELD })
}

pub struct EventFormScreen {
    backend: Arc<dyn EventsBackend>,
    session: SessionContext,
    lifetime: ScreenLifetime,
    mode: FormMode,
    stage: FormStage,
    pub draft: EventDraft,
    categories: Vec<EventCategory>,
    locations: Vec<EventLocation>,
    original_creator: Option<UserId>,
    pending: Option<EventPayload>,
}

impl EventFormScreen {
    pub fn new(backend: Arc<dyn EventsBackend>, session: SessionContext, mode: FormMode) -> Self {
        Self {
            backend,
            session,
            lifetime: ScreenLifetime::default(),
            mode,
            stage: FormStage::Loading,
            draft: EventDraft::default(),
            categories: Vec::new(),
            locations: Vec::new(),
            original_creator: None,
            pending: None,
        }
    }

    pub fn lifetime(&self) -> ScreenLifetime {
        self.lifetime.clone()
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn stage(&self) -> FormStage {
        self.stage
    }

    pub fn categories(&self) -> &[EventCategory] {
        &self.categories
    }

    pub fn locations(&self) -> &[EventLocation] {
        &self.locations
    }

    pub fn pending(&self) -> Option<&EventPayload> {
        self.pending.as_ref()
    }

    pub async fn on_activate(&mut self) -> Outcome {
        let ticket = self.lifetime.begin();
        self.stage = FormStage::Loading;
        self.pending = None;

        let backend = Arc::clone(&self.backend);
        let mode = self.mode;
        let existing = async {
            match mode {
                FormMode::Edit(event_id) => Some(backend.get_event(event_id).await),
                FormMode::Create => None,
            }
        };
        let (categories, locations, existing) = futures::join!(
            backend.list_categories(),
            backend.list_locations(),
            existing
        );

        if !self.lifetime.is_current(ticket) {
            debug!("event form: dropping stale load");
            return Outcome::stay();
        }
        self.stage = FormStage::Editing;

        let mut outcome = Outcome::stay();
        match categories.and_then(|categories| locations.map(|locations| (categories, locations)))
        {
            Ok((categories, locations)) => {
                self.categories = categories;
                self.locations = locations;
            }
            Err(err) => {
                warn!("event form: failed to load reference data: {err}");
                outcome = Outcome::alert(Alert::failure(FailureContext::LoadReferenceData, &err));
            }
        }

        match existing {
            Some(Ok(event)) => {
                self.draft = EventDraft::from_event(&event);
                self.original_creator = event.creator;
            }
            Some(Err(err)) => {
                warn!("event form: failed to load event: {err}");
                outcome = Outcome::alert(Alert::failure(FailureContext::LoadEvent, &err));
            }
            None => {}
        }
        outcome
    }

    /// Validates the draft and, when it passes, moves to the confirmation step.
    pub fn submit(&mut self) -> Outcome {
        if self.stage == FormStage::Loading {
            return Outcome::stay();
        }
        match self.draft.validate() {
            Ok(payload) => {
                self.pending = Some(payload);
                self.stage = FormStage::Confirming;
                Outcome::stay()
            }
            Err(err) => {
                debug!("event form: validation failed: {err}");
                Outcome::alert(Alert::validation(&err))
            }
        }
    }

    pub fn confirmation_summary(&self) -> Vec<(&'static str, String)> {
        let Some(payload) = &self.pending else {
            return Vec::new();
        };
        let category = self
            .categories
            .iter()
            .find(|category| category.id == payload.id_event_category)
            .map(|category| category.name.clone())
            .unwrap_or_else(|| format!("#{}", payload.id_event_category));
        let location = self
            .locations
            .iter()
            .find(|location| location.id == payload.id_event_location)
            .map(|location| location.name.clone())
            .unwrap_or_else(|| format!("#{}", payload.id_event_location));

        vec![
            ("Name", payload.name.clone()),
            ("Description", payload.description.clone()),
            ("Category", category),
            ("Location", location),
            ("Start date", payload.start_date.format("%Y-%m-%d %H:%M UTC").to_string()),
            ("Duration", format!("{} minutes", payload.duration_in_minutes)),
            ("Price", format!("{:.2}", payload.price)),
            ("Max attendance", payload.max_assistance.to_string()),
        ]
    }

    pub fn cancel_confirmation(&mut self) {
        self.pending = None;
        if self.stage == FormStage::Confirming {
            self.stage = FormStage::Editing;
        }
    }

    pub async fn confirm(&mut self) -> Outcome {
        let Some(mut payload) = self.pending.clone() else {
            return Outcome::stay();
        };
        let (Some(bearer), Some(user_id)) =
            (self.session.bearer().await, self.session.user_id().await)
        else {
            return Outcome::alert(Alert::validation(&ValidationError::NotAuthenticated));
        };

        let result = match self.mode {
            FormMode::Create => {
                payload.id_creator_user = Some(user_id);
                self.backend.create_event(&bearer, &payload).await
            }
            FormMode::Edit(event_id) => {
                payload.id = Some(event_id);
                payload.id_creator_user = Some(self.original_creator.unwrap_or(user_id));
                self.backend.update_event(&bearer, &payload).await
            }
        };

        self.pending = None;
        self.stage = FormStage::Editing;
        match (result, self.mode) {
            (Ok(event), FormMode::Create) => {
                info!(event_id = event.id.0, "event form: event created");
                self.draft = EventDraft::default();
                Outcome::go(Transition::Reset(Route::Home))
                    .with_alert(Alert::info("Success", "Event created successfully."))
            }
            (Ok(event), FormMode::Edit(_)) => {
                info!(event_id = event.id.0, "event form: event updated");
                Outcome::go(Transition::Back)
                    .with_alert(Alert::info("Success", "Event updated successfully."))
            }
            (Err(err), _) => {
                warn!("event form: save failed: {err}");
                Outcome::alert(Alert::failure(FailureContext::SaveEvent, &err))
            }
        }
    }

    pub fn cancel(&mut self) -> Outcome {
        self.lifetime.invalidate();
        Outcome::go(Transition::Back)
    }
}
