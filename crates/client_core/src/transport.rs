//! HTTP implementation of [`EventsBackend`] on top of `reqwest`.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Enrollment, Event, EventCategory, EventId, EventLocation, UserSummary},
    protocol::{
        EnrollmentRequest, ErrorBody, EventPayload, LoginRequest, LoginResponse, RegisterRequest,
    },
};
use tracing::{debug, warn};

use crate::{
    backend::EventsBackend,
    error::{ApiFailure, ApiResult},
};

const API_PREFIX: &str = "/api";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server root; every path is resolved under `/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    fn build(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(path));
        match bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, method: Method, path: &str, builder: RequestBuilder) -> ApiResult<Response> {
        debug!(method = %method, path, "api: request");
        let response = builder.send().await.map_err(|err| {
            warn!(method = %method, path, "api: transport failure: {err}");
            ApiFailure::from(err)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = ErrorBody::extract_message(&raw);
        warn!(
            method = %method,
            path,
            status = status.as_u16(),
            message = message.as_deref().unwrap_or(""),
            "api: request rejected"
        );
        Err(ApiFailure::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Issues a request and parses the JSON payload; an empty body is malformed.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        match self.request_optional(method, path, body, bearer).await? {
            Some(value) => Ok(value),
            None => Err(ApiFailure::MalformedBody(format!(
                "empty response body from {path}"
            ))),
        }
    }

    /// Like [`ApiClient::request`] but an empty success body yields `None`.
    pub async fn request_optional<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> ApiResult<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let mut builder = self.build(method.clone(), path, bearer);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.send(method, path, builder).await?;
        parse_optional_body(path, response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, bearer: Option<&str>) -> ApiResult<T> {
        self.request::<T, ()>(Method::GET, path, None, bearer).await
    }
}

async fn parse_optional_body<T: DeserializeOwned>(
    path: &str,
    response: Response,
) -> ApiResult<Option<T>> {
    let raw = response.text().await?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw).map(Some).map_err(|err| {
        warn!(path, "api: malformed response body: {err}");
        ApiFailure::from(err)
    })
}

#[async_trait]
impl EventsBackend for ApiClient {
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.request(Method::POST, "/user/login", Some(request), None)
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<UserSummary> {
        self.request(Method::POST, "/user/register", Some(request), None)
            .await
    }

    async fn list_events_from(
        &self,
        start_date: DateTime<Utc>,
        bearer: Option<&str>,
    ) -> ApiResult<Vec<Event>> {
        let start_date = start_date.to_rfc3339_opts(SecondsFormat::Millis, true);
        let builder = self
            .build(Method::GET, "/event", bearer)
            .query(&[("start_date", start_date.as_str())]);
        let response = self.send(Method::GET, "/event", builder).await?;
        Ok(parse_optional_body("/event", response)
            .await?
            .unwrap_or_default())
    }

    async fn list_all_events(&self, bearer: &str) -> ApiResult<Vec<Event>> {
        self.get("/event/all/all", Some(bearer)).await
    }

    async fn get_event(&self, event_id: EventId) -> ApiResult<Event> {
        self.get(&format!("/event/{event_id}"), None).await
    }

    async fn create_event(&self, bearer: &str, payload: &EventPayload) -> ApiResult<Event> {
        self.request(Method::POST, "/event", Some(payload), Some(bearer))
            .await
    }

    async fn update_event(&self, bearer: &str, payload: &EventPayload) -> ApiResult<Event> {
        self.request(Method::PUT, "/event", Some(payload), Some(bearer))
            .await
    }

    async fn delete_event(&self, bearer: &str, event_id: EventId) -> ApiResult<()> {
        self.request_optional::<serde_json::Value, ()>(
            Method::DELETE,
            &format!("/event/{event_id}"),
            None,
            Some(bearer),
        )
        .await
        .map(|_| ())
    }

    async fn list_enrollments(
        &self,
        bearer: &str,
        event_id: EventId,
    ) -> ApiResult<Vec<Enrollment>> {
        self.get(&format!("/event/{event_id}/enrollment"), Some(bearer))
            .await
    }

    async fn enroll(
        &self,
        bearer: &str,
        event_id: EventId,
        request: &EnrollmentRequest,
    ) -> ApiResult<Enrollment> {
        self.request(
            Method::POST,
            &format!("/event/{event_id}/enrollment"),
            Some(request),
            Some(bearer),
        )
        .await
    }

    async fn cancel_enrollment(
        &self,
        bearer: &str,
        event_id: EventId,
    ) -> ApiResult<Option<Enrollment>> {
        self.request_optional::<Enrollment, ()>(
            Method::DELETE,
            &format!("/event/{event_id}/enrollment"),
            None,
            Some(bearer),
        )
        .await
    }

    async fn list_categories(&self) -> ApiResult<Vec<EventCategory>> {
        self.get("/event_categories", None).await
    }

    async fn list_locations(&self) -> ApiResult<Vec<EventLocation>> {
        self.get("/event_locations", None).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
