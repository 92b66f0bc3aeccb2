//! Country → city → events selection cascade.
//!
//! # Invariants
//! - Once a country is selected, a city is selected iff that country has at
//!   least one city.
//! - `loading` never stays `true` longer than the guard's timeout.
//!
//! # Stale responses
//! Every selection change bumps a generation counter. A load captures the
//! generation it started under and drops its result if a newer selection was
//! made before it resolved, so the last request wins rather than the last
//! response. `loading` belongs to the generation that last set it: a dropped
//! result clears it only if no newer action has started loading since.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::loading::LoadingGuard;
use crate::services::EventService;
use crate::types::{City, Country, Event};

pub const NO_COUNTRIES: &str = "No countries available";
pub const NO_CITIES: &str = "No cities available for the selected country";
pub const NO_EVENTS: &str = "No events found";
pub const SELECT_CITY: &str = "Please select a city to view events";
pub const TIMED_OUT: &str = "Request timed out. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventState {
    pub events: Vec<Event>,
    pub countries: Vec<Country>,
    pub cities: Vec<City>,
    pub selected_country_id: Option<i64>,
    pub selected_city_id: Option<i64>,
    pub loading: bool,
    pub error: Option<String>,
    pub initialized: bool,
    pub phase: Phase,
}

impl EventState {
    /// Events in the selected city. Empty when no city is selected or the
    /// selected id is not among the loaded cities.
    pub fn filtered_events(&self) -> Vec<Event> {
        match self.selected_city() {
            Some(city) => self.events.iter().filter(|e| e.is_in(city)).cloned().collect(),
            None => Vec::new(),
        }
    }

    pub fn has_active_filters(&self) -> bool {
        self.selected_country_id.is_some() && self.selected_city_id.is_some()
    }

    pub fn selected_country(&self) -> Option<&Country> {
        let id = self.selected_country_id?;
        self.countries.iter().find(|c| c.country_id == id)
    }

    pub fn selected_city(&self) -> Option<&City> {
        let id = self.selected_city_id?;
        self.cities.iter().find(|c| c.city_id == id)
    }
}

#[derive(Clone)]
pub struct EventStore {
    service: EventService,
    state: Arc<Mutex<EventState>>,
    guard: LoadingGuard,
    generation: Arc<AtomicU64>,
    loading_owner: Arc<AtomicU64>,
}

impl EventStore {
    pub fn new(service: EventService, loading_timeout: Duration) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(EventState::default())),
            guard: LoadingGuard::new(loading_timeout),
            generation: Arc::new(AtomicU64::new(0)),
            loading_owner: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn snapshot(&self) -> EventState {
        self.state.lock().clone()
    }

    pub fn filtered_events(&self) -> Vec<Event> {
        self.state.lock().filtered_events()
    }

    pub fn loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Load countries, select the first country and its first city, then load
    /// events. Halts with an error when either list is empty. A no-op once
    /// initialized or while another initialization is running.
    pub async fn initialize(&self) {
        {
            let mut state = self.state.lock();
            if state.initialized || state.phase == Phase::Initializing {
                return;
            }
            state.phase = Phase::Initializing;
        }
        let generation = self.current_generation();
        self.start_loading(generation, "initializing app data");

        let countries = self.service.get_countries().await;
        if self.is_stale(generation) {
            self.abandon_initialize(generation);
            return;
        }
        let first_country = {
            let mut state = self.state.lock();
            state.countries = countries;
            let first = state.countries.first().map(|c| c.country_id);
            match first {
                Some(id) => state.selected_country_id = Some(id),
                None => {
                    state.error = Some(NO_COUNTRIES.to_string());
                    state.phase = Phase::Uninitialized;
                }
            }
            first
        };
        let Some(country_id) = first_country else {
            self.stop_loading(generation);
            return;
        };

        let cities = self.service.get_cities(country_id).await;
        if self.is_stale(generation) {
            self.abandon_initialize(generation);
            return;
        }
        let ready = {
            let mut state = self.state.lock();
            state.cities = cities;
            state.selected_city_id = state.cities.first().map(|c| c.city_id);
            if state.selected_city_id.is_some() {
                state.initialized = true;
                state.phase = Phase::Ready;
            } else {
                state.error = Some(NO_CITIES.to_string());
                state.phase = Phase::Uninitialized;
            }
            state.initialized
        };

        if ready {
            info!(country_id, "event store initialized");
            self.load_events_at(generation).await;
        }
        self.stop_loading(generation);
    }

    /// Fetch the full event collection; filtering by city happens in
    /// `filtered_events`. Requires a selected city.
    pub async fn load_events(&self) {
        self.load_events_at(self.current_generation()).await;
    }

    pub async fn load_countries(&self) {
        let generation = self.current_generation();
        self.start_loading(generation, "loading countries");
        let countries = self.service.get_countries().await;
        if self.is_stale(generation) {
            debug!("discarding superseded countries response");
            self.stop_loading(generation);
            return;
        }
        {
            let mut state = self.state.lock();
            if countries.is_empty() {
                state.error = Some(NO_COUNTRIES.to_string());
            }
            state.countries = countries;
        }
        self.stop_loading(generation);
    }

    pub async fn load_cities(&self, country_id: i64) {
        self.load_cities_at(country_id, self.current_generation()).await;
    }

    /// Select `country_id`, reload its cities, select its first city and load
    /// events. `None` is ignored.
    pub async fn set_country_filter(&self, country_id: Option<i64>) {
        let Some(country_id) = country_id else {
            return;
        };
        let generation = self.next_generation();
        {
            let mut state = self.state.lock();
            state.selected_country_id = Some(country_id);
            // Drop the previous country's events before the cities arrive.
            state.events.clear();
        }

        if !self.load_cities_at(country_id, generation).await {
            return;
        }

        let selected = {
            let mut state = self.state.lock();
            let in_country = state.cities.iter().find(|c| c.country_id == country_id);
            let city = match in_country {
                Some(city) => Some(city.city_id),
                None => {
                    let fallback = state.cities.first().map(|c| c.city_id);
                    if fallback.is_some() {
                        warn!(country_id, "no loaded city references the country, using the first city");
                    }
                    fallback
                }
            };
            state.selected_city_id = city;
            city
        };

        if let Some(city_id) = selected {
            debug!(country_id, city_id, "country filter applied");
            self.load_events_at(generation).await;
        }
    }

    /// Select `city_id` and reload events. `None` falls back to the first
    /// loaded city; the filter is never left empty while cities exist. With
    /// nothing to select, the selection is left alone and any running load
    /// keeps going.
    pub async fn set_city_filter(&self, city_id: Option<i64>) {
        let generation = {
            let mut state = self.state.lock();
            let Some(id) = city_id.or_else(|| state.cities.first().map(|c| c.city_id)) else {
                state.events.clear();
                state.error = Some(SELECT_CITY.to_string());
                return;
            };
            state.selected_city_id = Some(id);
            if state.selected_country_id.is_none() {
                state.selected_country_id = state
                    .cities
                    .iter()
                    .find(|c| c.city_id == id)
                    .map(|c| c.country_id);
            }
            self.next_generation()
        };
        self.load_events_at(generation).await;
    }

    /// Back to the first country (and through it, its first city). Loads
    /// countries first if none are known.
    pub async fn reset_filters(&self) {
        let mut first = self.first_country_id();
        if first.is_none() {
            self.load_countries().await;
            first = self.first_country_id();
        }
        if first.is_some() {
            self.set_country_filter(first).await;
        }
    }

    fn first_country_id(&self) -> Option<i64> {
        self.state.lock().countries.first().map(|c| c.country_id)
    }

    /// Returns `false` when the result was dropped as stale.
    async fn load_cities_at(&self, country_id: i64, generation: u64) -> bool {
        self.start_loading(generation, "loading cities");
        let cities = self.service.get_cities(country_id).await;
        if self.is_stale(generation) {
            debug!(country_id, "discarding superseded cities response");
            self.stop_loading(generation);
            return false;
        }
        {
            let mut state = self.state.lock();
            if cities.is_empty() {
                state.error = Some(NO_CITIES.to_string());
            }
            state.cities = cities;
        }
        self.stop_loading(generation);
        true
    }

    async fn load_events_at(&self, generation: u64) {
        {
            let mut state = self.state.lock();
            if state.selected_city_id.is_none() {
                state.events.clear();
                state.error = Some(SELECT_CITY.to_string());
                return;
            }
        }

        self.start_loading(generation, "loading events");
        let events = self.service.get_all_events().await;
        if self.is_stale(generation) {
            debug!("discarding superseded events response");
            self.stop_loading(generation);
            return;
        }
        {
            let mut state = self.state.lock();
            state.error = events.is_empty().then(|| NO_EVENTS.to_string());
            state.events = events;
        }
        self.stop_loading(generation);
    }

    fn abandon_initialize(&self, generation: u64) {
        {
            let mut state = self.state.lock();
            if state.phase == Phase::Initializing {
                state.phase = Phase::Uninitialized;
            }
        }
        debug!("initialization superseded by a newer selection");
        self.stop_loading(generation);
    }

    /// Set `loading` on behalf of `generation` and arm the timeout. The guard
    /// is armed under the state lock so ownership and timer change together.
    fn start_loading(&self, generation: u64, what: &'static str) {
        let mut state = self.state.lock();
        state.loading = true;
        state.error = None;
        self.loading_owner.store(generation, Ordering::SeqCst);
        debug!(what, generation, "loading");

        let shared = Arc::clone(&self.state);
        self.guard.arm(move || {
            let mut state = shared.lock();
            if state.loading {
                warn!(what, "load timed out");
                state.loading = false;
                state.error = Some(TIMED_OUT.to_string());
            }
        });
    }

    /// Clear `loading` if `generation` still owns it. A newer action that
    /// started loading keeps both the flag and its timer.
    fn stop_loading(&self, generation: u64) {
        let mut state = self.state.lock();
        if self.loading_owner.load(Ordering::SeqCst) != generation {
            return;
        }
        state.loading = false;
        self.guard.disarm();
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.current_generation() != generation
    }
}
