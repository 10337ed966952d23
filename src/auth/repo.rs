use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::timeout;

use crate::auth::models::{Permissions, User};
use crate::auth::store::{Store, StoreError};
use crate::auth::token::{Scope, Token};

/// Every query gets its own short deadline, independent of the caller's.
const QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Postgres-backed implementation of [`Store`].
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn internal(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| StoreError::Internal(anyhow::Error::new(e).context(context))
}

fn timed_out(_: tokio::time::error::Elapsed) -> StoreError {
    StoreError::Internal(anyhow!("query timed out"))
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &[u8],
    ) -> Result<User, StoreError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, activated)
            VALUES ($1, $2, $3, false)
            RETURNING id, created_at, name, email, password_hash, activated, version
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash);

        timeout(QUERY_TIMEOUT, query.fetch_one(&self.db))
            .await
            .map_err(timed_out)?
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateEmail
                } else {
                    internal("insert user")(e)
                }
            })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, created_at, name, email, password_hash, activated, version
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email);

        timeout(QUERY_TIMEOUT, query.fetch_optional(&self.db))
            .await
            .map_err(timed_out)?
            .map_err(internal("query user by email"))?
            .ok_or(StoreError::NotFound)
    }

    async fn update_user(&self, user: &mut User) -> Result<(), StoreError> {
        // Atomic compare-and-set on the version column; a stale snapshot
        // matches no row instead of clobbering a concurrent write.
        let query = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE users
            SET name = $1, email = $2, password_hash = $3, activated = $4, version = version + 1
            WHERE id = $5 AND version = $6
            RETURNING version
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.activated)
        .bind(user.id)
        .bind(user.version);

        let version = timeout(QUERY_TIMEOUT, query.fetch_optional(&self.db))
            .await
            .map_err(timed_out)?
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateEmail
                } else {
                    internal("update user")(e)
                }
            })?
            .ok_or(StoreError::EditConflict)?;

        user.version = version;
        Ok(())
    }

    async fn new_token(
        &self,
        user_id: i64,
        ttl: Duration,
        scope: Scope,
    ) -> Result<Token, StoreError> {
        let token = Token::generate(user_id, ttl, scope);

        let query = sqlx::query(
            r#"
            INSERT INTO tokens (hash, user_id, expiry, scope)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&token.hash)
        .bind(token.user_id)
        .bind(token.expiry)
        .bind(token.scope.as_str());

        timeout(QUERY_TIMEOUT, query.execute(&self.db))
            .await
            .map_err(timed_out)?
            .map_err(internal("insert token"))?;

        Ok(token)
    }

    async fn delete_tokens_for_user(&self, scope: Scope, user_id: i64) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            DELETE FROM tokens
            WHERE scope = $1 AND user_id = $2
            "#,
        )
        .bind(scope.as_str())
        .bind(user_id);

        timeout(QUERY_TIMEOUT, query.execute(&self.db))
            .await
            .map_err(timed_out)?
            .map_err(internal("delete tokens for user"))?;

        Ok(())
    }

    async fn get_user_for_token(&self, scope: Scope, plaintext: &str) -> Result<User, StoreError> {
        let hash = Token::hash_plaintext(plaintext);

        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT users.id, users.created_at, users.name, users.email,
                   users.password_hash, users.activated, users.version
            FROM users
            INNER JOIN tokens ON users.id = tokens.user_id
            WHERE tokens.hash = $1
              AND tokens.scope = $2
              AND tokens.expiry > $3
            "#,
        )
        .bind(&hash)
        .bind(scope.as_str())
        .bind(OffsetDateTime::now_utc());

        timeout(QUERY_TIMEOUT, query.fetch_optional(&self.db))
            .await
            .map_err(timed_out)?
            .map_err(internal("query user for token"))?
            .ok_or(StoreError::NotFound)
    }

    async fn get_all_user_permissions(&self, user_id: i64) -> Result<Permissions, StoreError> {
        let query = sqlx::query_scalar::<_, String>(
            r#"
            SELECT permissions.code
            FROM permissions
            INNER JOIN users_permissions ON users_permissions.permission_id = permissions.id
            WHERE users_permissions.user_id = $1
            "#,
        )
        .bind(user_id);

        timeout(QUERY_TIMEOUT, query.fetch_all(&self.db))
            .await
            .map_err(timed_out)?
            .map_err(internal("query user permissions"))
    }
}
