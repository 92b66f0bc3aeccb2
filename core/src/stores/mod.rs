//! UI-facing state stores.
//!
//! Stores are cheap-to-clone handles over shared state. The UI reads
//! snapshots and invokes actions; nothing outside an action mutates state.
//! Locks are never held across an `.await`.

mod auth;
mod comments;
mod events;
mod loading;

pub use auth::{AuthState, AuthStatus, AuthStore};
pub use comments::{CommentState, CommentStore};
pub use events::{
    EventState, EventStore, Phase, NO_CITIES, NO_COUNTRIES, NO_EVENTS, SELECT_CITY, TIMED_OUT,
};
pub use loading::{LoadingGuard, DEFAULT_LOADING_TIMEOUT};
