use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::auth::errors::AuthError;
use crate::auth::models::{Identity, User};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::store::{Store, StoreError};
use crate::auth::token::{Scope, Token, TOKEN_LENGTH};
use crate::auth::validate::{validate_credentials, validate_register};
use crate::background::TaskGroup;
use crate::mailer::Mailer;

const ACTIVATION_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);
const AUTHENTICATION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const WELCOME_TEMPLATE: &str = "user_welcome";

/// Orchestrates the credential lifecycle over the [`Store`] port. All domain
/// error classification happens here, exactly once per failure.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
    background: TaskGroup,
}

fn store_internal(err: StoreError) -> AuthError {
    match err {
        StoreError::Internal(e) => AuthError::Internal(e),
        other => AuthError::Internal(anyhow::Error::new(other)),
    }
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, background: TaskGroup) -> Self {
        Self {
            store,
            mailer,
            background,
        }
    }

    /// Create an unactivated account and dispatch its activation token by
    /// mail. The dispatch is detached and best-effort: once the user row is
    /// committed, a mail failure is only logged.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = email.trim().to_lowercase();

        let violations = validate_register(name, &email, password);
        if !violations.is_empty() {
            return Err(AuthError::Validation(violations));
        }

        let password_hash = hash_password(password)?;

        let user = match self.store.insert_user(name, &email, &password_hash).await {
            Ok(user) => user,
            Err(StoreError::DuplicateEmail) => return Err(AuthError::EmailTaken),
            Err(err) => return Err(store_internal(err)),
        };

        let token = self
            .store
            .new_token(user.id, ACTIVATION_TTL, Scope::Activation)
            .await
            .map_err(store_internal)?;

        let mailer = self.mailer.clone();
        let recipient = user.email.clone();
        let data = json!({
            "activationToken": token.plaintext,
            "userID": user.id,
        });
        self.background.spawn(async move {
            if let Err(err) = mailer.send(&recipient, WELCOME_TEMPLATE, data).await {
                error!(error = %err, "failed to send welcome email");
            }
        });

        info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Flip a user to activated via their activation token. Single use at
    /// the effect level: success deletes every activation token for the
    /// user, so a replay fails token resolution.
    pub async fn activate(&self, token: &str) -> Result<User, AuthError> {
        if token.len() != TOKEN_LENGTH {
            return Err(AuthError::InvalidToken);
        }

        let mut user = match self.store.get_user_for_token(Scope::Activation, token).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(AuthError::InvalidToken),
            Err(err) => return Err(store_internal(err)),
        };

        user.activated = true;
        match self.store.update_user(&mut user).await {
            Ok(()) => {}
            Err(StoreError::EditConflict) => return Err(AuthError::EditConflict),
            Err(err) => return Err(store_internal(err)),
        }

        self.store
            .delete_tokens_for_user(Scope::Activation, user.id)
            .await
            .map_err(store_internal)?;

        info!(user_id = user.id, "user activated");
        Ok(user)
    }

    /// Exchange credentials for a 24h bearer token. Unknown email and wrong
    /// password are indistinguishable to the caller, so the response can't
    /// be used to enumerate accounts.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Token, AuthError> {
        let email = email.trim().to_lowercase();

        let violations = validate_credentials(&email, password);
        if !violations.is_empty() {
            return Err(AuthError::Validation(violations));
        }

        let user = match self.store.get_user_by_email(&email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(AuthError::Unauthenticated),
            Err(err) => return Err(store_internal(err)),
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::Unauthenticated);
        }

        let token = self
            .store
            .new_token(user.id, AUTHENTICATION_TTL, Scope::Authentication)
            .await
            .map_err(store_internal)?;

        info!(user_id = user.id, "authentication token issued");
        Ok(token)
    }

    /// Resolve a presented bearer token to an identity. An empty token is a
    /// valid anonymous caller; a malformed one is rejected before any store
    /// round-trip.
    pub async fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Ok(Identity::Anonymous);
        }
        if token.len() != TOKEN_LENGTH {
            return Err(AuthError::InvalidToken);
        }

        let user = match self
            .store
            .get_user_for_token(Scope::Authentication, token)
            .await
        {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(AuthError::Unauthenticated),
            Err(err) => return Err(store_internal(err)),
        };

        let permissions = self
            .store
            .get_all_user_permissions(user.id)
            .await
            .map_err(store_internal)?;

        Ok(Identity::Authenticated { user, permissions })
    }
}
