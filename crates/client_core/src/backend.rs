use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    domain::{Enrollment, Event, EventCategory, EventId, EventLocation, UserSummary},
    protocol::{EnrollmentRequest, EventPayload, LoginRequest, LoginResponse, RegisterRequest},
};

use crate::error::{ApiFailure, ApiResult};

/// The remote endpoints the screens depend on.
///
/// `bearer` is attached as `Authorization: Bearer <token>` when present.
#[async_trait]
pub trait EventsBackend: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse>;
    async fn register(&self, request: &RegisterRequest) -> ApiResult<UserSummary>;
    async fn list_events_from(
        &self,
        start_date: DateTime<Utc>,
        bearer: Option<&str>,
    ) -> ApiResult<Vec<Event>>;
    async fn list_all_events(&self, bearer: &str) -> ApiResult<Vec<Event>>;
    async fn get_event(&self, event_id: EventId) -> ApiResult<Event>;
    async fn create_event(&self, bearer: &str, payload: &EventPayload) -> ApiResult<Event>;
    async fn update_event(&self, bearer: &str, payload: &EventPayload) -> ApiResult<Event>;
    async fn delete_event(&self, bearer: &str, event_id: EventId) -> ApiResult<()>;
    async fn list_enrollments(&self, bearer: &str, event_id: EventId)
        -> ApiResult<Vec<Enrollment>>;
    async fn enroll(
        &self,
        bearer: &str,
        event_id: EventId,
        request: &EnrollmentRequest,
    ) -> ApiResult<Enrollment>;
    async fn cancel_enrollment(
        &self,
        bearer: &str,
        event_id: EventId,
    ) -> ApiResult<Option<Enrollment>>;
    async fn list_categories(&self) -> ApiResult<Vec<EventCategory>>;
    async fn list_locations(&self) -> ApiResult<Vec<EventLocation>>;
}

/// Backend used before an API URL is configured; every call fails.
pub struct MissingBackend;

fn unavailable<T>() -> ApiResult<T> {
    Err(ApiFailure::Transport(
        "events backend is not configured".to_string(),
    ))
}

#[async_trait]
impl EventsBackend for MissingBackend {
    async fn login(&self, _request: &LoginRequest) -> ApiResult<LoginResponse> {
        unavailable()
    }

    async fn register(&self, _request: &RegisterRequest) -> ApiResult<UserSummary> {
        unavailable()
    }

    async fn list_events_from(
        &self,
        _start_date: DateTime<Utc>,
        _bearer: Option<&str>,
    ) -> ApiResult<Vec<Event>> {
        unavailable()
    }

    async fn list_all_events(&self, _bearer: &str) -> ApiResult<Vec<Event>> {
        unavailable()
    }

    async fn get_event(&self, _event_id: EventId) -> ApiResult<Event> {
        unavailable()
    }

    async fn create_event(&self, _bearer: &str, _payload: &EventPayload) -> ApiResult<Event> {
        unavailable()
    }

    async fn update_event(&self, _bearer: &str, _payload: &EventPayload) -> ApiResult<Event> {
        unavailable()
    }

    async fn delete_event(&self, _bearer: &str, _event_id: EventId) -> ApiResult<()> {
        unavailable()
    }

    async fn list_enrollments(
        &self,
        _bearer: &str,
        _event_id: EventId,
    ) -> ApiResult<Vec<Enrollment>> {
        unavailable()
    }

    async fn enroll(
        &self,
        _bearer: &str,
        _event_id: EventId,
        _request: &EnrollmentRequest,
    ) -> ApiResult<Enrollment> {
        unavailable()
    }

    async fn cancel_enrollment(
        &self,
        _bearer: &str,
        _event_id: EventId,
    ) -> ApiResult<Option<Enrollment>> {
        unavailable()
    }

    async fn list_categories(&self) -> ApiResult<Vec<EventCategory>> {
        unavailable()
    }

    async fn list_locations(&self) -> ApiResult<Vec<EventLocation>> {
        unavailable()
    }
}
