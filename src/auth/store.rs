use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::auth::models::{Permissions, User};
use crate::auth::token::{Scope, Token};

/// Failure modes of the persistence layer. Anything transient or
/// unclassified (including per-query timeouts) is `Internal`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate email")]
    DuplicateEmail,
    #[error("not found")]
    NotFound,
    #[error("edit conflict")]
    EditConflict,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Persistence contract for users, tokens and permissions. The service layer
/// depends only on this trait; `PgStore` backs production and `MemoryStore`
/// backs the tests.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new user. The store assigns id, created_at and version.
    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &[u8],
    ) -> Result<User, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Conditional update keyed on `user.version`; on success the stored and
    /// in-memory version are bumped by one, on a stale version it fails with
    /// `EditConflict` and changes nothing.
    async fn update_user(&self, user: &mut User) -> Result<(), StoreError>;

    /// Generate a token and persist its digest. The returned token carries
    /// the plaintext, which is never stored.
    async fn new_token(
        &self,
        user_id: i64,
        ttl: Duration,
        scope: Scope,
    ) -> Result<Token, StoreError>;

    /// Delete every token with the given scope for the user. Deleting zero
    /// rows is success.
    async fn delete_tokens_for_user(&self, scope: Scope, user_id: i64) -> Result<(), StoreError>;

    /// Resolve the user owning an unexpired token with the given scope.
    async fn get_user_for_token(&self, scope: Scope, plaintext: &str) -> Result<User, StoreError>;

    /// Permission codes granted to the user; an empty set is not an error.
    async fn get_all_user_permissions(&self, user_id: i64) -> Result<Permissions, StoreError>;
}
