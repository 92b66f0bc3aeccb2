//! Decoding of backend fields whose JSON shape is not stable.
//!
//! Both decoders run once at the service boundary and produce a single
//! canonical value; nothing downstream looks at raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::City;

/// The shapes `userId` arrives in from the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIdShape {
    /// `"userId": "abc"` or `"userId": 42`.
    Scalar(String),
    /// `"userId": { "id": "abc", ... }`.
    NestedWithId(String),
    /// `"userId": { "someKey": "abc" }`: the first property is taken.
    NestedGeneric(String),
    /// Missing, null, empty, zero, or a shape with no usable scalar.
    Absent,
}

impl UserIdShape {
    pub fn classify(raw: Option<&Value>) -> Self {
        match raw {
            None | Some(Value::Null) => UserIdShape::Absent,
            Some(Value::Object(map)) => {
                if let Some(id) = map.get("id").and_then(truthy_scalar) {
                    UserIdShape::NestedWithId(id)
                } else if let Some(first) = map.values().next().and_then(truthy_scalar) {
                    UserIdShape::NestedGeneric(first)
                } else {
                    UserIdShape::Absent
                }
            }
            Some(other) => truthy_scalar(other).map_or(UserIdShape::Absent, UserIdShape::Scalar),
        }
    }

    /// Reduce to a scalar identifier, `fallback` when nothing was found.
    pub fn resolve(self, fallback: &str) -> String {
        match self {
            UserIdShape::Scalar(id)
            | UserIdShape::NestedWithId(id)
            | UserIdShape::NestedGeneric(id) => id,
            UserIdShape::Absent => fallback.to_string(),
        }
    }
}

/// Classify and resolve in one step.
pub fn normalize_user_id(raw: Option<&Value>, username: &str) -> String {
    UserIdShape::classify(raw).resolve(username)
}

fn truthy_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// How an event's `city` field can look on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawCity {
    Name(String),
    Nested {
        #[serde(default, rename = "cityId", alias = "id")]
        city_id: Option<i64>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default, rename = "cityName")]
        city_name: Option<String>,
    },
    Other(Value),
}

/// Canonical city reference of an event.
///
/// `name` comes from the `city` field (string or nested object); `city_name`
/// from the flat `cityName` field, or from `city.cityName` as this type
/// serializes itself. Either may match the selected city.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
}

impl CityRef {
    pub(crate) fn decode(
        city_id: Option<i64>,
        city: Option<RawCity>,
        city_name: Option<String>,
    ) -> Self {
        let (nested_id, name, nested_city_name) = match city {
            Some(RawCity::Name(name)) => (None, Some(name), None),
            Some(RawCity::Nested {
                city_id,
                name,
                city_name,
            }) => (city_id, name, city_name),
            Some(RawCity::Other(_)) | None => (None, None, None),
        };
        CityRef {
            id: city_id.filter(|id| *id != 0).or(nested_id.filter(|id| *id != 0)),
            name: name.filter(|n| !n.is_empty()),
            city_name: city_name
                .filter(|n| !n.is_empty())
                .or(nested_city_name.filter(|n| !n.is_empty())),
        }
    }

    pub fn matches(&self, city: &City) -> bool {
        let by_name = |n: &Option<String>| {
            n.as_deref()
                .is_some_and(|n| !city.name.is_empty() && n == city.name)
        };
        self.id == Some(city.city_id) || by_name(&self.name) || by_name(&self.city_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::types::Event;

    fn paris() -> City {
        City {
            city_id: 7,
            name: "Paris".to_string(),
            country_id: 1,
            flags: 0,
        }
    }

    #[test]
    fn scalar_string_user_id() {
        let raw = json!("abc-123");
        assert_eq!(UserIdShape::classify(Some(&raw)), UserIdShape::Scalar("abc-123".into()));
    }

    #[test]
    fn scalar_number_user_id() {
        let raw = json!(42);
        assert_eq!(normalize_user_id(Some(&raw), "ana"), "42");
    }

    #[test]
    fn nested_id_wins_over_other_keys() {
        let raw = json!({ "name": "x", "id": "uuid-1" });
        assert_eq!(
            UserIdShape::classify(Some(&raw)),
            UserIdShape::NestedWithId("uuid-1".into())
        );
    }

    #[test]
    fn nested_generic_takes_first_property() {
        let raw = json!({ "value": "uuid-2", "other": "ignored" });
        assert_eq!(
            UserIdShape::classify(Some(&raw)),
            UserIdShape::NestedGeneric("uuid-2".into())
        );
    }

    #[test]
    fn falsy_shapes_fall_back_to_username() {
        for raw in [json!(null), json!(""), json!(0), json!({}), json!({ "id": "" }), json!(true)] {
            assert_eq!(normalize_user_id(Some(&raw), "ana"), "ana", "{raw}");
        }
        assert_eq!(normalize_user_id(None, "ana"), "ana");
    }

    #[test]
    fn event_city_as_nested_name_only() {
        let event: Event =
            serde_json::from_value(json!({ "eventId": 1, "city": { "name": "Paris" } })).unwrap();
        assert_eq!(event.city.id, None);
        assert!(event.is_in(&paris()));
    }

    #[test]
    fn event_city_as_plain_string() {
        let event: Event =
            serde_json::from_value(json!({ "eventId": 1, "city": "Paris" })).unwrap();
        assert!(event.is_in(&paris()));
    }

    #[test]
    fn event_city_name_field() {
        let event: Event =
            serde_json::from_value(json!({ "eventId": 1, "cityName": "Paris" })).unwrap();
        assert!(event.is_in(&paris()));
    }

    #[test]
    fn event_city_id_top_level_and_nested() {
        let top: Event = serde_json::from_value(json!({ "eventId": 1, "cityId": 7 })).unwrap();
        let nested: Event =
            serde_json::from_value(json!({ "eventId": 2, "city": { "cityId": 7, "name": "X" } }))
                .unwrap();
        assert!(top.is_in(&paris()));
        assert!(nested.is_in(&paris()));
    }

    #[test]
    fn event_in_other_city_does_not_match() {
        let event: Event = serde_json::from_value(
            json!({ "eventId": 1, "cityId": 8, "city": null, "cityName": "Lyon" }),
        )
        .unwrap();
        assert!(!event.is_in(&paris()));
    }

    #[test]
    fn unexpected_city_shape_is_tolerated() {
        let event: Event = serde_json::from_value(json!({ "eventId": 1, "city": 12 })).unwrap();
        assert_eq!(event.city, CityRef::default());
    }

    #[test]
    fn normalized_event_reserializes_and_decodes_again() {
        let event: Event = serde_json::from_value(
            json!({ "eventId": 3, "name": "Gala", "cityId": 7, "cityName": "Paris" }),
        )
        .unwrap();
        let again: Event = serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(again, event);
        assert!(again.is_in(&paris()));
    }

    #[test]
    fn city_name_only_event_keeps_its_city_after_reencoding() {
        let event: Event =
            serde_json::from_value(json!({ "eventId": 1, "cityName": "Paris" })).unwrap();
        assert_eq!(event.city.city_name.as_deref(), Some("Paris"));

        let again: Event = serde_json::from_value(serde_json::to_value(&event).unwrap()).unwrap();
        assert_eq!(again, event);
        assert!(again.is_in(&paris()));
    }
}
