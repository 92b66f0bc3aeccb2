//! Session state machine: `Anonymous → Authenticating → {Anonymous,
//! Authenticated}`, and `Authenticated → Anonymous` on logout.
//!
//! Entering `Authenticated` persists the session; entering `Anonymous`
//! through `set_user(None)` erases it. Concurrent logins are not coordinated:
//! whichever finishes last wins.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::services::AuthService;
use crate::storage::{self, SessionStorage};
use crate::types::{AuthResponse, Session};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStatus {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<Session>,
    pub status: AuthStatus,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct AuthStore {
    service: AuthService,
    storage: Arc<dyn SessionStorage>,
    state: Arc<Mutex<AuthState>>,
}

impl AuthStore {
    pub fn new(service: AuthService, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            service,
            storage,
            state: Arc::new(Mutex::new(AuthState::default())),
        }
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.lock().clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.state.lock().status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == AuthStatus::Authenticated
    }

    pub fn user(&self) -> Option<Session> {
        self.state.lock().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.field(|s| &s.token)
    }

    pub fn username(&self) -> Option<String> {
        self.field(|s| &s.username)
    }

    pub fn user_id(&self) -> Option<String> {
        self.field(|s| &s.user_id)
    }

    fn field(&self, pick: impl Fn(&Session) -> &String) -> Option<String> {
        self.state
            .lock()
            .user
            .as_ref()
            .map(pick)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    /// Restore a persisted session. Anything unreadable is erased and the
    /// store stays anonymous.
    pub fn initialize_auth(&self) {
        match storage::load_session(self.storage.as_ref()) {
            Ok(Some(session)) => {
                info!(username = %session.username, "restored stored session");
                self.set_user(Some(session));
            }
            Ok(None) => {}
            Err(error) => {
                warn!(%error, "discarding unreadable stored session");
                if let Err(error) = storage::clear_session(self.storage.as_ref()) {
                    warn!(%error, "failed to erase stored session");
                }
                let mut state = self.state.lock();
                state.user = None;
                state.status = AuthStatus::Anonymous;
            }
        }
    }

    /// Replace the current user and persist (or erase) it. A session without
    /// a user id gets the username in its place.
    pub fn set_user(&self, user: Option<Session>) {
        let user = user.map(|mut session| {
            if session.user_id.is_empty() && !session.username.is_empty() {
                warn!(username = %session.username, "session has no user id, using username");
                session.user_id = session.username.clone();
            }
            session
        });

        let persisted = match &user {
            Some(session) => storage::save_session(self.storage.as_ref(), session),
            None => storage::clear_session(self.storage.as_ref()),
        };
        if let Err(error) = persisted {
            warn!(%error, "failed to update stored session");
        }

        let mut state = self.state.lock();
        state.status = if user.is_some() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Anonymous
        };
        state.user = user;
    }

    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.begin();
        let response = self.service.login(username, password).await;
        self.finish(response)
    }

    pub async fn register(&self, username: &str, password: &str) -> bool {
        self.begin();
        let response = self.service.register(username, password).await;
        self.finish(response)
    }

    pub fn logout(&self) {
        info!("logging out");
        self.set_user(None);
    }

    fn begin(&self) {
        let mut state = self.state.lock();
        state.loading = true;
        state.error = None;
        state.status = AuthStatus::Authenticating;
    }

    fn finish(&self, response: AuthResponse) -> bool {
        let accepted = response.success && !response.token.is_empty();
        if accepted {
            self.set_user(Some(Session {
                username: response.username,
                token: response.token,
                user_id: response.user_id,
            }));
        }

        let mut state = self.state.lock();
        state.loading = false;
        if !accepted {
            state.error = Some(response.message);
            // A failed attempt does not end an existing session.
            state.status = if state.user.is_some() {
                AuthStatus::Authenticated
            } else {
                AuthStatus::Anonymous
            };
        }
        accepted
    }
}
