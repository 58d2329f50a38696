//! In-memory [`EventsBackend`] that records every call.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shared::{
    domain::{
        CategoryId, Enrollment, Event, EventCategory, EventId, EventLocation, LocationId, UserId,
        UserSummary,
    },
    protocol::{EnrollmentRequest, EventPayload, LoginRequest, LoginResponse, RegisterRequest},
};

use crate::{
    backend::EventsBackend,
    error::{ApiFailure, ApiResult},
};

type CallHook = Box<dyn Fn(&'static str) + Send + Sync>;

#[derive(Default)]
pub struct FakeBackend {
    pub events: Mutex<Vec<Event>>,
    pub enrollments: Mutex<HashMap<EventId, Vec<Enrollment>>>,
    pub login_response: Mutex<Option<LoginResponse>>,
    pub failures: Mutex<HashMap<&'static str, ApiFailure>>,
    pub calls: Mutex<Vec<&'static str>>,
    pub bearers: Mutex<Vec<Option<String>>>,
    pub saved_payloads: Mutex<Vec<EventPayload>>,
    pub registrations: Mutex<Vec<RegisterRequest>>,
    pub on_call: Mutex<Option<CallHook>>,
}

pub fn ana() -> UserSummary {
    UserSummary {
        id: UserId(3),
        first_name: Some("Ana".into()),
        last_name: Some("Paz".into()),
        username: "ana@x.io".into(),
    }
}

pub fn sample_event(id: i64, start_date: DateTime<Utc>, max_assistance: u32) -> Event {
    Event {
        id: EventId(id),
        name: format!("event {id}"),
        description: "an event".into(),
        category: CategoryId(1),
        location: LocationId(2),
        start_date,
        duration_in_minutes: 60,
        price: 250.0,
        enabled_for_enrollment: Some(true),
        max_assistance,
        creator: Some(UserId(1)),
        location_details: None,
    }
}

pub fn enrollment(event_id: i64, user_id: i64) -> Enrollment {
    Enrollment {
        id: None,
        event_id: EventId(event_id),
        user_id: UserId(user_id),
        description: None,
        attended: false,
        observations: None,
        rating: None,
        user: None,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        let backend = Self::new();
        *backend.events.lock().expect("events") = events;
        backend
    }

    pub fn upcoming_event(id: i64, max_assistance: u32) -> Event {
        sample_event(id, Utc::now() + Duration::days(7), max_assistance)
    }

    pub fn set_enrollments(&self, event_id: i64, enrollments: Vec<Enrollment>) {
        self.enrollments
            .lock()
            .expect("enrollments")
            .insert(EventId(event_id), enrollments);
    }

    pub fn fail(&self, call: &'static str, failure: ApiFailure) {
        self.failures
            .lock()
            .expect("failures")
            .insert(call, failure);
    }

    pub fn set_hook(&self, hook: impl Fn(&'static str) + Send + Sync + 'static) {
        *self.on_call.lock().expect("hook") = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn count(&self, call: &'static str) -> usize {
        self.calls().iter().filter(|name| **name == call).count()
    }

    pub fn bearers(&self) -> Vec<Option<String>> {
        self.bearers.lock().expect("bearers").clone()
    }

    fn record(&self, call: &'static str, bearer: Option<&str>) -> ApiResult<()> {
        self.calls.lock().expect("calls").push(call);
        self.bearers
            .lock()
            .expect("bearers")
            .push(bearer.map(str::to_string));
        if let Some(hook) = self.on_call.lock().expect("hook").as_ref() {
            hook(call);
        }
        match self.failures.lock().expect("failures").get(call) {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn find_event(&self, event_id: EventId) -> ApiResult<Event> {
        self.events
            .lock()
            .expect("events")
            .iter()
            .find(|event| event.id == event_id)
            .cloned()
            .ok_or(ApiFailure::Status {
                status: 404,
                message: Some("event not found".into()),
            })
    }
}

#[async_trait]
impl EventsBackend for FakeBackend {
    async fn login(&self, _request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.record("login", None)?;
        Ok(self
            .login_response
            .lock()
            .expect("login")
            .clone()
            .unwrap_or_default())
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<UserSummary> {
        self.record("register", None)?;
        self.registrations
            .lock()
            .expect("registrations")
            .push(request.clone());
        Ok(UserSummary {
            id: UserId(10),
            first_name: Some(request.first_name.clone()),
            last_name: Some(request.last_name.clone()),
            username: request.username.clone(),
        })
    }

    async fn list_events_from(
        &self,
        _start_date: DateTime<Utc>,
        bearer: Option<&str>,
    ) -> ApiResult<Vec<Event>> {
        self.record("list_events_from", bearer)?;
        Ok(self.events.lock().expect("events").clone())
    }

    async fn list_all_events(&self, bearer: &str) -> ApiResult<Vec<Event>> {
        self.record("list_all_events", Some(bearer))?;
        Ok(self.events.lock().expect("events").clone())
    }

    async fn get_event(&self, event_id: EventId) -> ApiResult<Event> {
        self.record("get_event", None)?;
        self.find_event(event_id)
    }

    async fn create_event(&self, bearer: &str, payload: &EventPayload) -> ApiResult<Event> {
        self.record("create_event", Some(bearer))?;
        self.saved_payloads
            .lock()
            .expect("payloads")
            .push(payload.clone());
        let mut event = sample_event(100, payload.start_date, payload.max_assistance);
        event.name = payload.name.clone();
        Ok(event)
    }

    async fn update_event(&self, bearer: &str, payload: &EventPayload) -> ApiResult<Event> {
        self.record("update_event", Some(bearer))?;
        self.saved_payloads
            .lock()
            .expect("payloads")
            .push(payload.clone());
        let id = payload.id.map(|id| id.0).unwrap_or_default();
        let mut event = sample_event(id, payload.start_date, payload.max_assistance);
        event.name = payload.name.clone();
        Ok(event)
    }

    async fn delete_event(&self, bearer: &str, event_id: EventId) -> ApiResult<()> {
        self.record("delete_event", Some(bearer))?;
        self.events
            .lock()
            .expect("events")
            .retain(|event| event.id != event_id);
        Ok(())
    }

    async fn list_enrollments(
        &self,
        bearer: &str,
        event_id: EventId,
    ) -> ApiResult<Vec<Enrollment>> {
        self.record("list_enrollments", Some(bearer))?;
        Ok(self
            .enrollments
            .lock()
            .expect("enrollments")
            .get(&event_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn enroll(
        &self,
        bearer: &str,
        event_id: EventId,
        request: &EnrollmentRequest,
    ) -> ApiResult<Enrollment> {
        self.record("enroll", Some(bearer))?;
        let created = enrollment(event_id.0, request.id_user.0);
        self.enrollments
            .lock()
            .expect("enrollments")
            .entry(event_id)
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn cancel_enrollment(
        &self,
        bearer: &str,
        event_id: EventId,
    ) -> ApiResult<Option<Enrollment>> {
        self.record("cancel_enrollment", Some(bearer))?;
        Ok(self
            .enrollments
            .lock()
            .expect("enrollments")
            .get_mut(&event_id)
            .and_then(|list| list.pop()))
    }

    async fn list_categories(&self) -> ApiResult<Vec<EventCategory>> {
        self.record("list_categories", None)?;
        Ok(vec![
            EventCategory {
                id: CategoryId(1),
                name: "Music".into(),
            },
            EventCategory {
                id: CategoryId(2),
                name: "Sports".into(),
            },
        ])
    }

    async fn list_locations(&self) -> ApiResult<Vec<EventLocation>> {
        self.record("list_locations", None)?;
        Ok(vec![EventLocation {
            id: LocationId(2),
            name: "Club".into(),
            full_address: Some("Av. Siempreviva 742".into()),
            max_capacity: Some(200),
        }])
    }
}
