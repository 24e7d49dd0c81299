use serde::{Deserialize, Serialize};

/// Bearer token returned by `POST /auth/token`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserPublic {
    pub username: String,
}
