use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use time::OffsetDateTime;

use crate::auth::models::{Permissions, User};
use crate::auth::store::{Store, StoreError};
use crate::auth::token::{Scope, Token};

/// In-memory [`Store`] with the same contract as `PgStore`, used by the
/// service tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    tokens: Vec<Token>,
    permissions: HashMap<i64, Vec<String>>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_permission(&self, user_id: i64, code: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .permissions
            .entry(user_id)
            .or_default()
            .push(code.to_string());
    }

    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }

    pub fn token_count(&self, scope: Scope) -> usize {
        self.inner
            .lock()
            .unwrap()
            .tokens
            .iter()
            .filter(|t| t.scope == scope)
            .count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &[u8],
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            created_at: OffsetDateTime::now_utc(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_vec(),
            activated: false,
            version: 1,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_user(&self, user: &mut User) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::DuplicateEmail);
        }
        let stored = inner
            .users
            .iter_mut()
            .find(|u| u.id == user.id && u.version == user.version)
            .ok_or(StoreError::EditConflict)?;
        user.version += 1;
        *stored = user.clone();
        Ok(())
    }

    async fn new_token(
        &self,
        user_id: i64,
        ttl: Duration,
        scope: Scope,
    ) -> Result<Token, StoreError> {
        let token = Token::generate(user_id, ttl, scope);
        self.inner.lock().unwrap().tokens.push(token.clone());
        Ok(token)
    }

    async fn delete_tokens_for_user(&self, scope: Scope, user_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .tokens
            .retain(|t| !(t.scope == scope && t.user_id == user_id));
        Ok(())
    }

    async fn get_user_for_token(&self, scope: Scope, plaintext: &str) -> Result<User, StoreError> {
        let hash = Token::hash_plaintext(plaintext);
        let now = OffsetDateTime::now_utc();
        let inner = self.inner.lock().unwrap();
        let token = inner
            .tokens
            .iter()
            .find(|t| t.hash == hash && t.scope == scope && t.expiry > now)
            .ok_or(StoreError::NotFound)?;
        inner
            .users
            .iter()
            .find(|u| u.id == token.user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_all_user_permissions(&self, user_id: i64) -> Result<Permissions, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.permissions.get(&user_id).cloned().unwrap_or_default())
    }
}
