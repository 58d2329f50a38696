use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CategoryId, EventId, LocationId, UserId, UserSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, alias = "usuario", skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl LoginResponse {
    /// The bearer token, if the server issued a non-blank one.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

/// Body for `POST /event` and `PUT /event`; `id` is only sent on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    pub name: String,
    pub description: String,
    pub id_event_category: CategoryId,
    pub id_event_location: LocationId,
    pub start_date: DateTime<Utc>,
    pub duration_in_minutes: u32,
    pub price: f64,
    pub enabled_for_enrollment: bool,
    pub max_assistance: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_creator_user: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    pub id_event: EventId,
    pub id_user: UserId,
    pub description: String,
    pub attended: bool,
    pub observations: String,
    pub rating: Option<i32>,
}

impl EnrollmentRequest {
    pub fn new(event_id: EventId, user_id: UserId) -> Self {
        Self {
            id_event: event_id,
            id_user: user_id,
            description: String::new(),
            attended: false,
            observations: String::new(),
            rating: None,
        }
    }
}

/// Error bodies seen from the backend carry either `message` or `error`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Best-effort extraction of a human readable message from a raw error body.
    pub fn extract_message(raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str::<ErrorBody>(raw) {
            Ok(body) => body
                .message
                .or(body.error)
                .filter(|message| !message.trim().is_empty()),
            Err(_) if !raw.starts_with('{') && !raw.starts_with('[') => Some(raw.to_string()),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn login_response_reads_legacy_usuario_field() {
        let response: LoginResponse = serde_json::from_value(json!({
            "success": true,
            "token": "abc",
            "usuario": { "id": 3, "username": "ana@x.io" }
        }))
        .expect("login response");
        assert_eq!(response.token(), Some("abc"));
        assert_eq!(response.user.map(|user| user.id), Some(UserId(3)));
    }

    #[test]
    fn blank_token_is_treated_as_absent() {
        let response: LoginResponse =
            serde_json::from_value(json!({ "success": false, "token": "  " })).expect("response");
        assert_eq!(response.token(), None);
    }

    #[test]
    fn update_payload_carries_id_and_create_payload_omits_it() {
        let mut payload = EventPayload {
            id: None,
            name: "n".into(),
            description: "d".into(),
            id_event_category: CategoryId(1),
            id_event_location: LocationId(2),
            start_date: Utc::now(),
            duration_in_minutes: 15,
            price: 10.0,
            enabled_for_enrollment: true,
            max_assistance: 5,
            id_creator_user: Some(UserId(4)),
        };
        let created = serde_json::to_value(&payload).expect("json");
        assert!(created.get("id").is_none());

        payload.id = Some(EventId(8));
        let updated = serde_json::to_value(&payload).expect("json");
        assert_eq!(updated["id"], json!(8));
    }

    #[test]
    fn error_message_prefers_json_fields_then_plain_text() {
        assert_eq!(
            ErrorBody::extract_message(r#"{"message":"event has enrollments"}"#),
            Some("event has enrollments".to_string())
        );
        assert_eq!(
            ErrorBody::extract_message("Bad Request"),
            Some("Bad Request".to_string())
        );
        assert_eq!(ErrorBody::extract_message(r#"{"other":1}"#), None);
        assert_eq!(ErrorBody::extract_message(""), None);
    }
}
