use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(EventId);
id_newtype!(EnrollmentId);
id_newtype!(CategoryId);
id_newtype!(LocationId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: String,
}

impl UserSummary {
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.trim().is_empty() && !last.trim().is_empty() => {
                format!("{} {}", first.trim(), last.trim())
            }
            _ => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCategory {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLocation {
    pub id: LocationId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_address: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_lenient_opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_capacity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    #[serde(default, deserialize_with = "de_nullable_text")]
    pub description: String,
    #[serde(rename = "id_event_category", alias = "category")]
    pub category: CategoryId,
    #[serde(rename = "id_event_location", alias = "location")]
    pub location: LocationId,
    #[serde(deserialize_with = "de_start_date")]
    pub start_date: DateTime<Utc>,
    pub duration_in_minutes: u32,
    #[serde(deserialize_with = "de_lenient_f64")]
    pub price: f64,
    #[serde(
        default,
        deserialize_with = "de_lenient_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled_for_enrollment: Option<bool>,
    #[serde(deserialize_with = "de_lenient_u32")]
    pub max_assistance: u32,
    #[serde(
        rename = "id_creator_user",
        alias = "creator",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub creator: Option<UserId>,
    #[serde(
        rename = "Location",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub location_details: Option<EventLocation>,
}

impl Event {
    /// Events starting exactly at `now` count as upcoming.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_date >= now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EnrollmentId>,
    #[serde(rename = "id_event", alias = "event_id")]
    pub event_id: EventId,
    #[serde(rename = "id_user", alias = "user_id")]
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_bool")]
    pub attended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_lenient_opt_i32",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<i32>,
    #[serde(default, alias = "User", skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl Enrollment {
    pub fn participant_name(&self) -> String {
        match &self.user {
            Some(user) => user.display_name(),
            None => format!("user #{}", self.user_id),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

fn de_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::<f64>::deserialize(deserializer)? {
        NumberOrText::Number(value) => Ok(value),
        NumberOrText::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid decimal value '{text}'"))),
    }
}

fn de_lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::<u32>::deserialize(deserializer)? {
        NumberOrText::Number(value) => Ok(value),
        NumberOrText::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid integer value '{text}'"))),
    }
}

fn de_lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText<u32>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid integer value '{text}'"))),
    }
}

fn de_lenient_opt_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText<i32>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid integer value '{text}'"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Number(i64),
    Text(String),
}

/// Flags arrive as booleans, 0/1 integers or their string forms.
fn de_lenient_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FlagValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FlagValue::Bool(value)) => Ok(Some(value)),
        Some(FlagValue::Number(value)) => Ok(Some(value != 0)),
        Some(FlagValue::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" => Ok(Some(true)),
            "0" | "false" => Ok(Some(false)),
            _ => Err(de::Error::custom(format!("invalid flag value '{text}'"))),
        },
    }
}

fn de_lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    de_lenient_opt_bool(deserializer).map(Option::unwrap_or_default)
}

fn de_nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Accepts RFC 3339 timestamps and zone-less timestamps, the latter read as UTC.
fn de_start_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid start_date '{raw}'")))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn event_accepts_decimal_strings_and_server_field_names() {
        let event: Event = serde_json::from_value(json!({
            "id": 7,
            "name": "Tango night",
            "description": "milonga",
            "id_event_category": 2,
            "id_event_location": 3,
            "start_date": "2030-05-01T21:00:00.000Z",
            "duration_in_minutes": 120,
            "price": "1500.50",
            "enabled_for_enrollment": true,
            "max_assistance": "40",
            "id_creator_user": 9
        }))
        .expect("event");

        assert_eq!(event.id, EventId(7));
        assert_eq!(event.category, CategoryId(2));
        assert_eq!(event.location, LocationId(3));
        assert_eq!(event.price, 1500.5);
        assert_eq!(event.max_assistance, 40);
        assert_eq!(event.creator, Some(UserId(9)));
        assert_eq!(
            event.start_date,
            Utc.with_ymd_and_hms(2030, 5, 1, 21, 0, 0).unwrap()
        );
    }

    #[test]
    fn enrollment_flag_accepts_numeric_forms() {
        let base = json!({
            "id": 1,
            "name": "n",
            "id_event_category": 1,
            "id_event_location": 1,
            "start_date": "2030-05-01T21:00:00Z",
            "duration_in_minutes": 30,
            "price": 10,
            "max_assistance": 5
        });
        for (raw, expected) in [(json!("1"), Some(true)), (json!(0), Some(false)), (json!(null), None)] {
            let mut value = base.clone();
            value["enabled_for_enrollment"] = raw;
            let event: Event = serde_json::from_value(value).expect("event");
            assert_eq!(event.enabled_for_enrollment, expected);
        }
    }

    #[test]
    fn zone_less_start_date_is_read_as_utc() {
        assert_eq!(
            parse_timestamp("2024-01-02 03:04:05"),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
        );
        assert_eq!(parse_timestamp("next tuesday"), None);
    }

    #[test]
    fn enrollment_tolerates_blank_rating_and_embedded_user() {
        let enrollment: Enrollment = serde_json::from_value(json!({
            "id_event": 1,
            "id_user": 5,
            "attended": false,
            "observations": "",
            "rating": "",
            "User": { "id": 5, "first_name": "Ana", "last_name": "Paz", "username": "ana@x.io" }
        }))
        .expect("enrollment");

        assert_eq!(enrollment.rating, None);
        assert_eq!(enrollment.participant_name(), "Ana Paz");
    }

    #[test]
    fn null_description_and_numeric_attendance_decode() {
        let event: Event = serde_json::from_value(json!({
            "id": 3,
            "name": "Feria",
            "description": null,
            "id_event_category": 1,
            "id_event_location": 1,
            "start_date": "2030-05-01T21:00:00Z",
            "duration_in_minutes": 30,
            "price": 10,
            "max_assistance": 5
        }))
        .expect("event");
        assert_eq!(event.description, "");

        for (raw, expected) in [(json!(0), false), (json!(1), true), (json!("1"), true), (json!(null), false)] {
            let enrollment: Enrollment = serde_json::from_value(json!({
                "id_event": 3,
                "id_user": 5,
                "attended": raw
            }))
            .expect("enrollment");
            assert_eq!(enrollment.attended, expected);
        }
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let user = UserSummary {
            id: UserId(1),
            first_name: Some("Ana".into()),
            last_name: None,
            username: "ana@x.io".into(),
        };
        assert_eq!(user.display_name(), "ana@x.io");
    }
}
