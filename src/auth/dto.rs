use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::models::{Identity, Permissions, User};
use crate::auth::token::Token;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for account activation.
#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub token: String,
}

/// Request body for credential authentication.
#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    pub email: String,
    pub password: String,
}

/// Request body for bearer-token verification. An absent token means an
/// anonymous caller.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub token: String,
}

/// Public projection of a user. The password hash and version never cross
/// the interface boundary.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub activated: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            activated: user.activated,
            created_at: user.created_at,
        }
    }
}

/// Response returned after authentication: the token plaintext, disclosed
/// exactly once, and its expiry.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expiry: OffsetDateTime,
}

impl From<Token> for TokenResponse {
    fn from(token: Token) -> Self {
        Self {
            token: token.plaintext,
            expiry: token.expiry,
        }
    }
}

/// Response for token verification. `user` is null for anonymous callers.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub user: Option<UserResponse>,
    pub permissions: Permissions,
}

impl From<Identity> for VerifyResponse {
    fn from(identity: Identity) -> Self {
        match identity {
            Identity::Anonymous => Self {
                user: None,
                permissions: Permissions::new(),
            },
            Identity::Authenticated { user, permissions } => Self {
                user: Some(user.into()),
                permissions,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_response_hides_password_hash() {
        let user = User {
            id: 1,
            created_at: OffsetDateTime::now_utc(),
            name: "A".into(),
            email: "a@x.com".into(),
            password_hash: b"secret".to_vec(),
            activated: false,
            version: 1,
        };
        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(json.contains("a@x.com"));
        assert!(!json.contains("secret"));
        assert!(!json.contains("version"));
    }

    #[test]
    fn anonymous_identity_serializes_with_null_user() {
        let json = serde_json::to_value(VerifyResponse::from(Identity::Anonymous)).unwrap();
        assert!(json["user"].is_null());
        assert_eq!(json["permissions"], serde_json::json!([]));
    }

    #[test]
    fn verify_request_defaults_to_empty_token() {
        let req: VerifyRequest = serde_json::from_str("{}").unwrap();
        assert!(req.token.is_empty());
    }
}
