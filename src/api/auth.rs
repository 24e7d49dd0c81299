use crate::core::user::{Token, UserCreate, UserPublic};

use super::{ApiError, ApiRequest, Transport, call};

/// Exchange username (or email) and password for a bearer token. The
/// endpoint takes an OAuth2 password form, not JSON.
pub async fn login(transport: &dyn Transport, username: &str, password: &str) -> Result<Token, ApiError> {
    let req = ApiRequest::post("/auth/token").form(vec![
        ("username".to_string(), username.to_string()),
        ("password".to_string(), password.to_string()),
    ]);
    call(transport, req).await
}

pub async fn register(transport: &dyn Transport, data: &UserCreate) -> Result<UserPublic, ApiError> {
    call(transport, ApiRequest::post("/auth/register").json(data)?).await
}

pub async fn me(transport: &dyn Transport) -> Result<UserPublic, ApiError> {
    call(transport, ApiRequest::get("/user/me")).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Body;
    use crate::api::mock::MockTransport;

    #[tokio::test]
    async fn login_posts_form() {
        let mock = MockTransport::new();
        mock.respond_ok(serde_json::json!({"access_token": "abc", "token_type": "bearer"}));

        let token = login(&mock, "ana", "secret").await.unwrap();
        assert_eq!(token.access_token, "abc");

        let calls = mock.calls();
        assert_eq!(calls[0].path, "/auth/token");
        assert_eq!(
            calls[0].body,
            Some(Body::Form(vec![
                ("username".into(), "ana".into()),
                ("password".into(), "secret".into()),
            ]))
        );
    }

    #[tokio::test]
    async fn bad_credentials_surface_server_message() {
        let mock = MockTransport::new();
        mock.respond_err(ApiError::server(401, "username/email or password are incorrect"));

        let err = login(&mock, "ana", "wrong").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "username/email or password are incorrect");
    }

    #[tokio::test]
    async fn register_then_me() {
        let mock = MockTransport::new();
        mock.respond_ok(serde_json::json!({"username": "ana"}));
        mock.respond_ok(serde_json::json!({"username": "ana"}));

        let data = UserCreate {
            email: "ana@example.com".into(),
            username: "ana".into(),
            password: "secret".into(),
        };
        assert_eq!(register(&mock, &data).await.unwrap().username, "ana");
        assert_eq!(me(&mock).await.unwrap().username, "ana");

        let calls = mock.calls();
        assert_eq!(calls[0].method, reqwest::Method::POST);
        assert_eq!(calls[0].path, "/auth/register");
        assert_eq!(
            calls[0].body,
            Some(Body::Json(serde_json::json!({
                "email": "ana@example.com",
                "username": "ana",
                "password": "secret",
            })))
        );
        assert_eq!(calls[1].method, reqwest::Method::GET);
        assert_eq!(calls[1].path, "/user/me");
    }
}
