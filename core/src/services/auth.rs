use tracing::{info, warn};

use crate::client::ApiClient;
use crate::normalize::normalize_user_id;
use crate::types::{ApiAuthResponse, AuthRequest, AuthResponse};

const LOGIN: &str = "Auth/login?api-version=1";
const REGISTER: &str = "Auth/register?api-version=1";

#[derive(Debug, Clone, Copy)]
enum AuthAction {
    Login,
    Register,
}

impl AuthAction {
    fn path(self) -> &'static str {
        match self {
            AuthAction::Login => LOGIN,
            AuthAction::Register => REGISTER,
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            AuthAction::Login => "Login successful",
            AuthAction::Register => "Registration successful",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            AuthAction::Login => "Login failed. Please try again.",
            AuthAction::Register => "Registration failed. Please try again.",
        }
    }
}

/// Login and registration. Always answers with an `AuthResponse`; transport
/// failures come back as `success: false` with an empty token.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, username: &str, password: &str) -> AuthResponse {
        self.authenticate(AuthAction::Login, username, password).await
    }

    pub async fn register(&self, username: &str, password: &str) -> AuthResponse {
        self.authenticate(AuthAction::Register, username, password).await
    }

    async fn authenticate(&self, action: AuthAction, username: &str, password: &str) -> AuthResponse {
        let request = AuthRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        match self.client.post::<ApiAuthResponse, _>(action.path(), &request).await {
            Ok(reply) => {
                let user_id = normalize_user_id(reply.user_id.as_ref(), username);
                info!(?action, username, %user_id, "authenticated");
                AuthResponse {
                    username: username.to_string(),
                    token: reply.token,
                    user_id,
                    success: true,
                    message: action.success_message().to_string(),
                }
            }
            Err(error) => {
                warn!(?action, username, %error, "authentication failed");
                AuthResponse {
                    username: String::new(),
                    token: String::new(),
                    user_id: String::new(),
                    success: false,
                    message: action.failure_message().to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::testing::{self, ok, Reply, ScriptedTransport};

    #[tokio::test]
    async fn login_posts_credentials_with_api_version() {
        let transport = ScriptedTransport::new();
        transport.on(
            "POST Auth/login?api-version=1",
            ok(json!({ "token": "jwt", "expiration": "2099-01-01", "userId": "u-9" })),
        );
        let service = AuthService::new(testing::client(&transport).0);

        let reply = service.login("ana", "pw").await;
        assert!(reply.success);
        assert_eq!(reply.token, "jwt");
        assert_eq!(reply.user_id, "u-9");
        assert_eq!(reply.username, "ana");
        assert_eq!(reply.message, "Login successful");

        let sent: serde_json::Value =
            serde_json::from_str(transport.requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({ "username": "ana", "password": "pw" }));
    }

    #[tokio::test]
    async fn register_normalizes_nested_user_id() {
        let transport = ScriptedTransport::new();
        transport.on(
            "POST Auth/register?api-version=1",
            ok(json!({ "token": "jwt", "userId": { "id": "uuid-7" } })),
        );
        let service = AuthService::new(testing::client(&transport).0);

        let reply = service.register("bo", "pw").await;
        assert_eq!(reply.user_id, "uuid-7");
        assert_eq!(reply.message, "Registration successful");
    }

    #[tokio::test]
    async fn missing_user_id_defaults_to_username() {
        let transport = ScriptedTransport::new();
        transport.on("POST Auth/login?api-version=1", ok(json!({ "token": "jwt" })));
        let service = AuthService::new(testing::client(&transport).0);

        assert_eq!(service.login("ana", "pw").await.user_id, "ana");
    }

    #[tokio::test]
    async fn failure_is_a_structured_response() {
        let transport = ScriptedTransport::new();
        transport.on(
            "POST Auth/login?api-version=1",
            Reply::Json(401, r#"{"message":"Invalid"}"#.into()),
        );
        transport.on("POST Auth/register?api-version=1", Reply::Fail("refused".into()));
        let service = AuthService::new(testing::client(&transport).0);

        let login = service.login("ana", "bad").await;
        assert!(!login.success);
        assert!(login.token.is_empty());
        assert!(login.user_id.is_empty());
        assert_eq!(login.message, "Login failed. Please try again.");

        let register = service.register("ana", "pw").await;
        assert!(!register.success);
        assert_eq!(register.message, "Registration failed. Please try again.");
    }
}
