//! Registration, login, refresh and current-user resolution.

use crate::error::{AuthError, StoreError};
use crate::role::Role;
use crate::store::{NewUser, UserRecord, UserStore};
use campus_password::PasswordHasher;
use campus_token::{TokenEngine, TokenPair, TokenType};
use std::sync::Arc;
use uuid::Uuid;

const EMAIL_LEN: (usize, usize) = (5, 255);
const PASSWORD_LEN: (usize, usize) = (8, 128);
const FULL_NAME_MAX: usize = 255;

/// Input for [`AuthService::register`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

impl Registration {
    fn validate(&self) -> Result<(), AuthError> {
        let email = self.email.chars().count();
        if email < EMAIL_LEN.0 || email > EMAIL_LEN.1 {
            return Err(AuthError::Validation(format!(
                "email must be between {} and {} characters",
                EMAIL_LEN.0, EMAIL_LEN.1
            )));
        }
        let password = self.password.chars().count();
        if password < PASSWORD_LEN.0 || password > PASSWORD_LEN.1 {
            return Err(AuthError::Validation(format!(
                "password must be between {} and {} characters",
                PASSWORD_LEN.0, PASSWORD_LEN.1
            )));
        }
        if let Some(name) = &self.full_name
            && name.chars().count() > FULL_NAME_MAX
        {
            return Err(AuthError::Validation(format!(
                "full_name must be at most {FULL_NAME_MAX} characters"
            )));
        }
        Ok(())
    }
}

/// Auth flows built on the token engine, the credential hasher and a user
/// store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenEngine>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<TokenEngine>, hasher: PasswordHasher) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }

    pub fn tokens(&self) -> &TokenEngine {
        &self.tokens
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    /// Create an account with the given role.
    pub async fn register(
        &self,
        registration: Registration,
        role: Role,
    ) -> Result<UserRecord, AuthError> {
        registration.validate()?;

        if self.store.get_by_email(&registration.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let hashed_password = self.hash(registration.password).await?;
        let user = self
            .store
            .create(NewUser {
                email: registration.email,
                full_name: registration.full_name,
                hashed_password,
                role,
            })
            .await
            .map_err(|e| match e {
                StoreError::DuplicateEmail(_) => AuthError::EmailTaken,
                other => AuthError::Store(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "registered user");
        Ok(user)
    }

    /// Check credentials and issue a token pair.
    ///
    /// Hashes made under an older iteration policy are upgraded in place.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some(user) = self.store.get_by_email(email).await? else {
            tracing::info!("login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .verify(password.to_string(), user.hashed_password.clone())
            .await?
        {
            tracing::info!(user_id = %user.id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::Inactive);
        }

        if self.hasher.needs_rehash(&user.hashed_password) {
            let upgraded = self.hash(password.to_string()).await?;
            self.store.update_password_hash(user.id, upgraded).await?;
            tracing::debug!(user_id = %user.id, "upgraded password hash");
        }

        let pair = self.tokens.issue_pair(&user.id.to_string(), user.role.as_str())?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(pair)
    }

    /// Exchange a refresh token for a new pair carrying the same identity.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .tokens
            .verify_token(refresh_token, Some(TokenType::Refresh))?;
        Ok(self.tokens.issue_pair(&claims.subject, &claims.role)?)
    }

    /// Resolve the active user behind an access token.
    pub async fn current_user(&self, access_token: &str) -> Result<UserRecord, AuthError> {
        let claims = self
            .tokens
            .verify_token(access_token, Some(TokenType::Access))?;
        let id = Uuid::parse_str(&claims.subject).map_err(|_| AuthError::InvalidSubject)?;

        match self.store.get_by_id(id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AuthError::UserNotFound),
        }
    }

    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn verify(&self, password: String, stored: String) -> Result<bool, AuthError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

/// Fail with [`AuthError::Forbidden`] unless `user` holds one of `allowed`.
pub fn require_roles(user: &UserRecord, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        tracing::debug!(user_id = %user.id, role = %user.role, "role check failed");
        Err(AuthError::Forbidden)
    }
}
