use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub created_at: OffsetDateTime,
    pub name: String,
    pub email: String,
    pub password_hash: Vec<u8>, // argon2 PHC bytes, never exposed
    pub activated: bool,
    pub version: i32, // optimistic-concurrency counter
}

/// Set of permission codes granted to a user. Empty is a valid answer.
pub type Permissions = Vec<String>;

/// Result of verifying a bearer token. An empty token is not an error,
/// it resolves to `Anonymous`.
#[derive(Debug, Clone)]
pub enum Identity {
    Anonymous,
    Authenticated { user: User, permissions: Permissions },
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }
}
