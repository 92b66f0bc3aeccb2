use tracing::warn;

use crate::client::ApiClient;
use crate::types::{City, Country, Dresscode, Event, EventType};

const EVENTS: &str = "EventApi";
const COUNTRIES: &str = "CountryApi";
const CITIES: &str = "CityApi";
const EVENT_TYPES: &str = "EventTypeApi";
const DRESSCODES: &str = "DresscodeApi";

/// Catalogue lookups: events, countries, cities, event types, dresscodes.
#[derive(Clone)]
pub struct EventService {
    client: ApiClient,
}

impl EventService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The full, unfiltered event collection.
    pub async fn get_all_events(&self) -> Vec<Event> {
        self.client.get(EVENTS, &[]).await.unwrap_or_else(|error| {
            warn!(%error, "failed to fetch events");
            Vec::new()
        })
    }

    pub async fn get_event_by_id(&self, id: i64) -> Option<Event> {
        match self.client.get(&format!("{EVENTS}/{id}"), &[]).await {
            Ok(event) => Some(event),
            Err(error) => {
                warn!(event_id = id, %error, "failed to fetch event");
                None
            }
        }
    }

    pub async fn get_countries(&self) -> Vec<Country> {
        self.client.get(COUNTRIES, &[]).await.unwrap_or_else(|error| {
            warn!(%error, "failed to fetch countries");
            Vec::new()
        })
    }

    pub async fn get_cities(&self, country_id: i64) -> Vec<City> {
        self.client
            .get(CITIES, &[("countryId", country_id.to_string())])
            .await
            .unwrap_or_else(|error| {
                warn!(country_id, %error, "failed to fetch cities");
                Vec::new()
            })
    }

    pub async fn get_event_types(&self) -> Vec<EventType> {
        self.client.get(EVENT_TYPES, &[]).await.unwrap_or_else(|error| {
            warn!(%error, "failed to fetch event types");
            Vec::new()
        })
    }

    pub async fn get_dresscodes(&self) -> Vec<Dresscode> {
        self.client.get(DRESSCODES, &[]).await.unwrap_or_else(|error| {
            warn!(%error, "failed to fetch dresscodes");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::testing::{self, ok, Reply, ScriptedTransport};

    fn service(transport: &std::sync::Arc<ScriptedTransport>) -> EventService {
        EventService::new(testing::client(transport).0)
    }

    #[tokio::test]
    async fn cities_are_requested_by_country() {
        let transport = ScriptedTransport::new();
        transport.on(
            "GET CityApi?countryId=4",
            ok(json!([{ "cityId": 40, "name": "Bergen", "countryId": 4 }])),
        );

        let cities = service(&transport).get_cities(4).await;
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].name, "Bergen");
        assert_eq!(cities[0].flags, 0);
    }

    #[tokio::test]
    async fn failures_become_empty_collections() {
        let transport = ScriptedTransport::new();
        transport.on("GET EventApi", Reply::Fail("unreachable".into()));
        transport.on("GET CountryApi", Reply::Json(500, r#"{"message":"down"}"#.into()));
        transport.on("GET EventTypeApi", ok(json!({ "not": "a list" })));

        let service = service(&transport);
        assert!(service.get_all_events().await.is_empty());
        assert!(service.get_countries().await.is_empty());
        assert!(service.get_event_types().await.is_empty());
        assert!(service.get_dresscodes().await.is_empty());
    }

    #[tokio::test]
    async fn missing_event_is_none() {
        let transport = ScriptedTransport::new();
        transport.on(
            "GET EventApi/5",
            ok(json!({ "eventId": 5, "name": "Gala", "cityId": 1 })),
        );

        let service = service(&transport);
        assert_eq!(service.get_event_by_id(5).await.unwrap().name, "Gala");
        assert!(service.get_event_by_id(6).await.is_none());
    }

    #[tokio::test]
    async fn catalogue_lookups_decode() {
        let transport = ScriptedTransport::new();
        transport.on(
            "GET DresscodeApi",
            ok(json!([{ "dresscodeId": 1, "name": "Casual", "iconUrl": "/c.svg" }])),
        );

        let dresscodes = service(&transport).get_dresscodes().await;
        assert_eq!(dresscodes[0].icon_url, "/c.svg");
    }
}
