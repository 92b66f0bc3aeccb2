//! Domain services: stateless mappings from domain operations to REST calls.
//!
//! Services never return `ApiError`. A failed call is logged and replaced by a
//! safe default (empty list, `None`, `false`, or a failed `AuthResponse`), so
//! stores only ever deal with values.

mod auth;
mod comments;
mod events;

pub use auth::AuthService;
pub use comments::CommentService;
pub use events::EventService;
