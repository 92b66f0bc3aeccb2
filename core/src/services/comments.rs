use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::types::CommentDto;

const COMMENTS: &str = "CommentApi";

#[derive(Clone)]
pub struct CommentService {
    client: ApiClient,
}

impl CommentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `true` when the backend accepted the comment. The response body is
    /// ignored; callers reload to see server-assigned fields.
    pub async fn create_comment(&self, comment: &CommentDto) -> bool {
        debug!(event_id = comment.event_id, "creating comment");
        match self.client.post::<serde_json::Value, _>(COMMENTS, comment).await {
            Ok(_) => true,
            Err(error) => {
                warn!(event_id = comment.event_id, %error, "failed to create comment");
                false
            }
        }
    }

    pub async fn get_comments_by_event_id(&self, event_id: i64) -> Vec<CommentDto> {
        self.client
            .get(COMMENTS, &[("eventId", event_id.to_string())])
            .await
            .unwrap_or_else(|error| {
                warn!(event_id, %error, "failed to fetch comments");
                Vec::new()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::testing::{self, ok, Reply, ScriptedTransport};

    fn comment() -> CommentDto {
        CommentDto {
            comment_id: 0,
            text: "hello".into(),
            date_created: "2025-01-01T00:00:00.000Z".into(),
            user_id: "u1".into(),
            user_name: "ana".into(),
            user_email: String::new(),
            event_id: 9,
            event_name: String::new(),
            event_description: String::new(),
        }
    }

    #[tokio::test]
    async fn create_posts_camel_case_body() {
        let transport = ScriptedTransport::new();
        transport.on("POST CommentApi", Reply::Json(201, String::new()));
        let service = CommentService::new(testing::client(&transport).0);

        assert!(service.create_comment(&comment()).await);
        let sent: serde_json::Value =
            serde_json::from_str(transport.requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["eventId"], 9);
        assert_eq!(sent["userId"], "u1");
        assert_eq!(sent["commentId"], 0);
    }

    #[tokio::test]
    async fn rejected_create_is_false() {
        let transport = ScriptedTransport::new();
        transport.on("POST CommentApi", Reply::Json(401, r#"{"message":"Unauthorized"}"#.into()));
        let service = CommentService::new(testing::client(&transport).0);

        assert!(!service.create_comment(&comment()).await);
    }

    #[tokio::test]
    async fn comments_are_fetched_by_event() {
        let transport = ScriptedTransport::new();
        transport.on(
            "GET CommentApi?eventId=9",
            ok(json!([{ "commentId": 3, "text": "hi", "eventId": 9, "userName": "bo" }])),
        );
        let service = CommentService::new(testing::client(&transport).0);

        let comments = service.get_comments_by_event_id(9).await;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].user_name, "bo");
        assert!(service.get_comments_by_event_id(10).await.is_empty());
    }
}
