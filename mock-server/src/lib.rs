//! In-memory stand-in for the event-listing backend.
//!
//! Serves the same REST surface the client consumes (`CountryApi`, `CityApi`,
//! `EventApi`, `EventTypeApi`, `DresscodeApi`, `CommentApi`, `Auth/*`) under
//! an `/api` prefix. Wire types are declared here independently of the client
//! crate so integration tests catch schema drift.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub country_id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub city_id: i64,
    pub name: String,
    pub country_id: i64,
    #[serde(default)]
    pub flags: i64,
}

/// Events are served with `cityId` and a flat `cityName`, the way the real
/// list endpoint does.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: i64,
    pub name: String,
    pub description: String,
    pub date_of_event: String,
    pub date_created: String,
    pub event_type_id: i64,
    pub city_id: i64,
    pub city_name: String,
    pub dresscode_id: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventType {
    pub event_type_id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dresscode {
    pub dresscode_id: i64,
    pub name: String,
    pub description: String,
    pub icon_url: String,
    pub date_created: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_id: i64,
    pub text: String,
    pub date_created: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    pub event_id: i64,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub event_description: String,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityQuery {
    pub country_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    pub event_id: Option<i64>,
}

#[derive(Clone, Debug)]
struct Account {
    id: Uuid,
    password: String,
}

/// Complete backend state. `Backend::seeded()` gives a small catalogue with
/// one country that has no cities.
#[derive(Debug, Default)]
pub struct Backend {
    pub countries: Vec<Country>,
    pub cities: Vec<City>,
    pub events: Vec<Event>,
    pub event_types: Vec<EventType>,
    pub dresscodes: Vec<Dresscode>,
    pub comments: Vec<Comment>,
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
}

impl Backend {
    pub fn seeded() -> Self {
        let country = |country_id, name: &str| Country {
            country_id,
            name: name.to_string(),
        };
        let city = |city_id, name: &str, country_id| City {
            city_id,
            name: name.to_string(),
            country_id,
            flags: 0,
        };
        let event = |event_id, name: &str, city_id, city_name: &str| Event {
            event_id,
            name: name.to_string(),
            description: format!("{name} in {city_name}"),
            date_of_event: "2025-06-01T19:00:00Z".to_string(),
            date_created: "2025-01-15T09:30:00Z".to_string(),
            event_type_id: 1,
            city_id,
            city_name: city_name.to_string(),
            dresscode_id: 1,
        };

        Self {
            countries: vec![country(1, "Sweden"), country(2, "Norway"), country(3, "Iceland")],
            cities: vec![
                city(10, "Stockholm", 1),
                city(11, "Gothenburg", 1),
                city(20, "Oslo", 2),
            ],
            events: vec![
                event(100, "Midsummer Gala", 10, "Stockholm"),
                event(101, "Harbour Jazz", 11, "Gothenburg"),
                event(102, "Fjord Ball", 20, "Oslo"),
                event(103, "Old Town Masquerade", 10, "Stockholm"),
            ],
            event_types: vec![EventType {
                event_type_id: 1,
                name: "Party".to_string(),
                description: "Evening party".to_string(),
            }],
            dresscodes: vec![Dresscode {
                dresscode_id: 1,
                name: "Black tie".to_string(),
                description: "Formal evening wear".to_string(),
                icon_url: "/icons/black-tie.svg".to_string(),
                date_created: "2024-11-02T12:00:00Z".to_string(),
            }],
            ..Self::default()
        }
    }
}

pub type Db = Arc<RwLock<Backend>>;

pub fn app() -> Router {
    app_with(Backend::seeded())
}

pub fn app_with(backend: Backend) -> Router {
    let db: Db = Arc::new(RwLock::new(backend));
    let api = Router::new()
        .route("/CountryApi", get(list_countries))
        .route("/CityApi", get(list_cities))
        .route("/EventApi", get(list_events))
        .route("/EventApi/{id}", get(get_event))
        .route("/EventTypeApi", get(list_event_types))
        .route("/DresscodeApi", get(list_dresscodes))
        .route("/CommentApi", get(list_comments).post(create_comment))
        .route("/Auth/login", post(login))
        .route("/Auth/register", post(register));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, backend: Backend) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(backend)).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn list_countries(State(db): State<Db>) -> Json<Vec<Country>> {
    Json(db.read().await.countries.clone())
}

async fn list_cities(State(db): State<Db>, Query(query): Query<CityQuery>) -> Json<Vec<City>> {
    let backend = db.read().await;
    let cities = backend
        .cities
        .iter()
        .filter(|c| query.country_id.is_none_or(|id| c.country_id == id))
        .cloned()
        .collect();
    Json(cities)
}

async fn list_events(State(db): State<Db>) -> Json<Vec<Event>> {
    Json(db.read().await.events.clone())
}

async fn get_event(State(db): State<Db>, Path(id): Path<i64>) -> Response {
    let backend = db.read().await;
    match backend.events.iter().find(|e| e.event_id == id) {
        Some(event) => Json(event.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Event not found"),
    }
}

async fn list_event_types(State(db): State<Db>) -> Json<Vec<EventType>> {
    Json(db.read().await.event_types.clone())
}

async fn list_dresscodes(State(db): State<Db>) -> Json<Vec<Dresscode>> {
    Json(db.read().await.dresscodes.clone())
}

async fn list_comments(
    State(db): State<Db>,
    Query(query): Query<CommentQuery>,
) -> Json<Vec<Comment>> {
    let backend = db.read().await;
    let comments = backend
        .comments
        .iter()
        .filter(|c| query.event_id.is_none_or(|id| c.event_id == id))
        .cloned()
        .collect();
    Json(comments)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn create_comment(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Comment>,
) -> Response {
    let mut backend = db.write().await;
    let Some(user_id) = bearer(&headers).and_then(|t| backend.tokens.get(t)).cloned() else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    if user_id != input.user_id {
        return error(StatusCode::FORBIDDEN, "Comment author does not match token");
    }
    if !backend.events.iter().any(|e| e.event_id == input.event_id) {
        return error(StatusCode::BAD_REQUEST, "Unknown event");
    }
    if input.text.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "Comment text is required");
    }

    let comment = Comment {
        comment_id: backend.comments.len() as i64 + 1,
        date_created: "2025-02-01T10:00:00Z".to_string(),
        ..input
    };
    backend.comments.push(comment.clone());
    (StatusCode::CREATED, Json(comment)).into_response()
}

fn issue_token(backend: &mut Backend, user_id: Uuid) -> String {
    let token = Uuid::new_v4().simple().to_string();
    backend.tokens.insert(token.clone(), user_id.to_string());
    token
}

/// Login answers with a scalar `userId`.
async fn login(State(db): State<Db>, Json(input): Json<Credentials>) -> Response {
    let mut backend = db.write().await;
    let account = match backend.accounts.get(&input.username) {
        Some(account) if account.password == input.password => account.clone(),
        _ => return error(StatusCode::UNAUTHORIZED, "Invalid username or password"),
    };
    let token = issue_token(&mut backend, account.id);
    Json(json!({
        "token": token,
        "expiration": "2099-01-01T00:00:00Z",
        "userId": account.id.to_string(),
    }))
    .into_response()
}

/// Register answers with `userId` nested as `{ "id": ... }`.
async fn register(State(db): State<Db>, Json(input): Json<Credentials>) -> Response {
    let mut backend = db.write().await;
    if input.username.is_empty() || input.password.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Username and password are required");
    }
    if backend.accounts.contains_key(&input.username) {
        return error(StatusCode::CONFLICT, "Username already taken");
    }
    let account = Account {
        id: Uuid::new_v4(),
        password: input.password,
    };
    backend.accounts.insert(input.username, account.clone());
    let token = issue_token(&mut backend, account.id);
    Json(json!({
        "token": token,
        "expiration": "2099-01-01T00:00:00Z",
        "userId": { "id": account.id.to_string() },
    }))
    .into_response()
}
