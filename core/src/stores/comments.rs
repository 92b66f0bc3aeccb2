use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::auth::AuthStore;
use crate::error::CommentError;
use crate::services::CommentService;
use crate::types::CommentDto;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentState {
    pub comments: Vec<CommentDto>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Comments of the event currently on screen. Creating a comment always
/// reloads the list from the backend instead of appending locally, so ids and
/// timestamps are the server's.
#[derive(Clone)]
pub struct CommentStore {
    service: CommentService,
    auth: AuthStore,
    state: Arc<Mutex<CommentState>>,
}

impl CommentStore {
    pub fn new(service: CommentService, auth: AuthStore) -> Self {
        Self {
            service,
            auth,
            state: Arc::new(Mutex::new(CommentState::default())),
        }
    }

    pub fn snapshot(&self) -> CommentState {
        self.state.lock().clone()
    }

    pub fn comments(&self) -> Vec<CommentDto> {
        self.state.lock().comments.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// The logged-in user's id, or `NotAuthenticated`.
    pub fn resolve_user_id(&self) -> Result<String, CommentError> {
        self.auth.user_id().ok_or(CommentError::NotAuthenticated)
    }

    /// Post a comment as the current user, then reload the event's comments.
    /// Without a session this fails before anything is sent.
    pub async fn add_comment(
        &self,
        event_id: i64,
        text: &str,
        event_name: &str,
        event_description: &str,
    ) -> Result<(), CommentError> {
        self.begin();
        let result = self
            .submit(event_id, text, event_name, event_description)
            .await;

        let mut state = self.state.lock();
        state.loading = false;
        if let Err(error) = &result {
            state.error = Some(error.to_string());
        }
        result
    }

    async fn submit(
        &self,
        event_id: i64,
        text: &str,
        event_name: &str,
        event_description: &str,
    ) -> Result<(), CommentError> {
        let user_id = self.resolve_user_id().inspect_err(|_| {
            warn!(event_id, "comment attempted without a session");
        })?;

        let comment = CommentDto {
            comment_id: 0,
            text: text.to_string(),
            date_created: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            user_name: self.auth.username().unwrap_or_else(|| user_id.clone()),
            user_id,
            user_email: String::new(),
            event_id,
            event_name: event_name.to_string(),
            event_description: event_description.to_string(),
        };
        debug!(event_id, user_id = %comment.user_id, "submitting comment");

        if !self.service.create_comment(&comment).await {
            return Err(CommentError::Rejected);
        }
        self.get_comments_by_event_id(event_id).await;
        Ok(())
    }

    pub async fn get_comments_by_event_id(&self, event_id: i64) -> Vec<CommentDto> {
        self.begin();
        let comments = self.service.get_comments_by_event_id(event_id).await;

        let mut state = self.state.lock();
        state.comments = comments.clone();
        state.loading = false;
        comments
    }

    pub fn clear_comments(&self) {
        let mut state = self.state.lock();
        state.comments.clear();
        state.error = None;
    }

    fn begin(&self) {
        let mut state = self.state.lock();
        state.loading = true;
        state.error = None;
    }
}
