//! Domain DTOs for the event-listing backend.
//!
//! Wire names are camelCase. `Event` is decoded through `RawEvent` so the
//! three ways the backend spells an event's city collapse into one `CityRef`.

use serde::{Deserialize, Serialize};

use crate::normalize::{CityRef, RawCity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub country_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub city_id: i64,
    pub name: String,
    pub country_id: i64,
    #[serde(default)]
    pub flags: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventType {
    pub event_type_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Dresscode {
    pub dresscode_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon_url: String,
    #[serde(default)]
    pub date_created: String,
}

/// An event with its city reference already normalized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "RawEvent")]
pub struct Event {
    pub event_id: i64,
    pub name: String,
    pub description: String,
    pub date_of_event: String,
    pub date_created: String,
    pub event_type_id: Option<i64>,
    pub dresscode_id: Option<i64>,
    pub city: CityRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dresscode: Option<Dresscode>,
}

impl Event {
    /// Whether this event belongs to `city`, by id or by display name.
    pub fn is_in(&self, city: &City) -> bool {
        self.city.matches(city)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(alias = "id")]
    event_id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    date_of_event: String,
    #[serde(default)]
    date_created: String,
    #[serde(default)]
    event_type_id: Option<i64>,
    #[serde(default)]
    dresscode_id: Option<i64>,
    #[serde(default)]
    city_id: Option<i64>,
    #[serde(default)]
    city: Option<RawCity>,
    #[serde(default)]
    city_name: Option<String>,
    #[serde(default)]
    event_type: Option<EventType>,
    #[serde(default)]
    dresscode: Option<Dresscode>,
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        Event {
            event_id: raw.event_id,
            name: raw.name,
            description: raw.description,
            date_of_event: raw.date_of_event,
            date_created: raw.date_created,
            event_type_id: raw.event_type_id,
            dresscode_id: raw.dresscode_id,
            city: CityRef::decode(raw.city_id, raw.city, raw.city_name),
            event_type: raw.event_type,
            dresscode: raw.dresscode,
        }
    }
}

/// A comment as exchanged with `CommentApi`, both directions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    #[serde(default)]
    pub comment_id: i64,
    pub text: String,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    pub event_id: i64,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub event_description: String,
}

/// Body of `Auth/login` and `Auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// What the auth endpoints actually return. `user_id` is left as raw JSON
/// because its shape varies; see `normalize::UserIdShape`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAuthResponse {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub expiration: Option<String>,
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
}

/// Outcome of a login or register call, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub username: String,
    pub token: String,
    pub user_id: String,
    pub success: bool,
    pub message: String,
}

/// The persisted identity: `{username, token, userId}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub username: String,
    pub token: String,
    #[serde(default)]
    pub user_id: String,
}
