//! Client core for the event-listing backend.
//!
//! # Overview
//! Fetches countries, cities, events, comments and auth tokens over REST and
//! keeps them in stores a UI can render from: loading flag, error message,
//! content.
//!
//! # Design
//! - `ApiClient` builds `HttpRequest`s and parses `HttpResponse`s; a
//!   `Transport` does the I/O in between, so tests script the backend.
//! - Services are stateless and never fail: transport errors become empty
//!   lists, `None`, `false`, or a failed `AuthResponse`.
//! - Stores own all mutable state. `EventStore` runs the country → city →
//!   events cascade with a loading timeout and drops superseded responses.
//! - `App` wires everything from a `ClientConfig`; there are no globals.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod services;
pub mod storage;
pub mod stores;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use app::App;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, CommentError, ConfigError, StorageError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use stores::{AuthStatus, AuthStore, CommentStore, EventStore};
pub use transport::{ReqwestTransport, Transport};
pub use types::{City, CommentDto, Country, Dresscode, Event, EventType, Session};
