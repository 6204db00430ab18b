//! Auth service: registration, sign-in and session verification.
//!
//! Every failure leaving this module is classified as an [`AuthError`]; no
//! hasher, token or storage error type crosses the boundary.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use notekeeper_core::{DomainError, UserId, require_non_blank};

use crate::password::{CredentialHasher, PasswordError};
use crate::store::{NewUser, UserStore, UserStoreError};
use crate::token::TokenIssuer;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("user already exists")]
    DuplicateUser,

    /// Unknown username and wrong password are deliberately the same variant.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AuthError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AuthError::Validation(msg),
            other => AuthError::Validation(other.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

/// Token-verification contract consumed by the request pipeline.
pub trait SessionVerifier: Send + Sync {
    fn verify_session(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Orchestrates the credential hasher, token issuer and user store.
///
/// Stateless between calls; share one instance (behind `Arc`) across requests.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
    token_ttl: Duration,
    // Verified against on unknown usernames so both sign-in failures cost
    // one hash verification.
    decoy_hash: Arc<Vec<u8>>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: CredentialHasher,
        tokens: TokenIssuer,
        token_ttl: Duration,
    ) -> Result<Self, AuthError> {
        if token_ttl < Duration::seconds(1) {
            return Err(AuthError::Internal("token ttl must be at least one second".into()));
        }
        let decoy_hash = Arc::new(hasher.hash("decoy-password")?);

        Ok(Self {
            users,
            hasher,
            tokens,
            token_ttl,
            decoy_hash,
        })
    }

    /// Hash the password and persist a new user.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserId, AuthError> {
        require_non_blank("username", username)?;
        require_non_blank("password", password)?;

        let password_hash = self.hash_password(password.to_owned()).await?;

        let new_user = NewUser {
            username: username.to_owned(),
            password_hash,
        };

        match self.users.create_user(new_user).await {
            Ok(id) => {
                tracing::info!(user_id = %id, "user registered");
                Ok(id)
            }
            Err(UserStoreError::Duplicate) => Err(AuthError::DuplicateUser),
            Err(e) => Err(AuthError::Internal(e.to_string())),
        }
    }

    /// Verify credentials and mint a session token.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let user = match self.users.find_by_username(username).await {
            Ok(user) => Some(user),
            Err(UserStoreError::NotFound) => None,
            Err(e) => return Err(AuthError::Internal(e.to_string())),
        };

        let (stored_hash, user_id) = match &user {
            Some(user) => (user.password_hash.clone(), Some(user.id)),
            None => (self.decoy_hash.as_ref().clone(), None),
        };

        let matched = self.verify_password(stored_hash, password.to_owned()).await?;

        let user_id = match (matched, user_id) {
            (true, Some(id)) => id,
            _ => return Err(AuthError::InvalidCredentials),
        };

        let token = self
            .tokens
            .issue(user_id, Utc::now(), self.token_ttl)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::debug!(user_id = %user_id, "session issued");
        Ok(token)
    }

    /// Verify a session token against an explicit clock reading.
    pub fn verify_session_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, AuthError> {
        self.tokens.verify(token, now).map_err(|e| {
            tracing::debug!(error = %e, "session token rejected");
            AuthError::Unauthenticated
        })
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    // Hashing runs on the blocking pool: it is CPU-bound, and a dropped
    // request future leaves it to finish instead of interrupting it midway.
    async fn hash_password(&self, password: String) -> Result<Vec<u8>, AuthError> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))??;
        Ok(hash)
    }

    async fn verify_password(&self, hash: Vec<u8>, password: String) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let matched = tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))??;
        Ok(matched)
    }
}

impl SessionVerifier for AuthService {
    fn verify_session(&self, token: &str) -> Result<UserId, AuthError> {
        self.verify_session_at(token, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use notekeeper_core::User;

    use crate::password::HasherParams;

    #[derive(Default)]
    struct FakeUsers {
        rows: Mutex<HashMap<String, User>>,
        fail: bool,
    }

    #[async_trait]
    impl UserStore for FakeUsers {
        async fn create_user(&self, user: NewUser) -> Result<UserId, UserStoreError> {
            if self.fail {
                return Err(UserStoreError::Backend("connection refused".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(&user.username) {
                return Err(UserStoreError::Duplicate);
            }
            let id = UserId::from_i64(rows.len() as i64 + 1);
            rows.insert(
                user.username.clone(),
                User {
                    id,
                    username: user.username,
                    password_hash: user.password_hash,
                    created_at: Utc::now(),
                },
            );
            Ok(id)
        }

        async fn find_by_username(&self, username: &str) -> Result<User, UserStoreError> {
            if self.fail {
                return Err(UserStoreError::Backend("connection refused".into()));
            }
            self.rows
                .lock()
                .unwrap()
                .get(username)
                .cloned()
                .ok_or(UserStoreError::NotFound)
        }

        async fn find_by_id(&self, id: UserId) -> Result<User, UserStoreError> {
            self.rows
                .lock()
                .unwrap()
                .values()
                .find(|u| u.id == id)
                .cloned()
                .ok_or(UserStoreError::NotFound)
        }
    }

    fn service_with(users: FakeUsers) -> AuthService {
        let hasher = CredentialHasher::new(HasherParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        AuthService::new(
            Arc::new(users),
            hasher,
            TokenIssuer::new(b"test-secret"),
            Duration::minutes(15),
        )
        .unwrap()
    }

    fn service() -> AuthService {
        service_with(FakeUsers::default())
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let auth = service();
        let id = auth.register("alice", "hunter2").await.unwrap();

        let token = auth.authenticate("alice", "hunter2").await.unwrap();
        assert!(!token.is_empty());
        assert_eq!(auth.verify_session(&token), Ok(id));
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let auth = service();
        let first = auth.register("alice", "one").await.unwrap();

        assert_eq!(auth.register("alice", "two").await, Err(AuthError::DuplicateUser));
        // The original account is untouched.
        let token = auth.authenticate("alice", "one").await.unwrap();
        assert_eq!(auth.verify_session(&token), Ok(first));
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let auth = service();
        let lower = auth.register("alice", "pw").await.unwrap();
        let upper = auth.register("Alice", "pw").await.unwrap();
        assert_ne!(lower, upper);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let auth = service();
        auth.register("real-user", "right-password").await.unwrap();

        let unknown = auth.authenticate("nobody", "anything").await.unwrap_err();
        let wrong = auth.authenticate("real-user", "wrong-password").await.unwrap_err();

        assert_eq!(unknown, AuthError::InvalidCredentials);
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn blank_credentials_are_validation_errors() {
        let auth = service();
        assert!(matches!(auth.register("", "pw").await, Err(AuthError::Validation(_))));
        assert!(matches!(auth.register("bob", "  ").await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn storage_faults_are_internal() {
        let auth = service_with(FakeUsers {
            fail: true,
            ..Default::default()
        });

        assert!(matches!(auth.register("bob", "pw").await, Err(AuthError::Internal(_))));
        assert!(matches!(auth.authenticate("bob", "pw").await, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn expired_session_is_unauthenticated() {
        let auth = service();
        auth.register("alice", "pw").await.unwrap();
        let token = auth.authenticate("alice", "pw").await.unwrap();

        let later = Utc::now() + auth.token_ttl() + Duration::seconds(1);
        assert_eq!(auth.verify_session_at(&token, later), Err(AuthError::Unauthenticated));
    }

    #[test]
    fn garbage_session_is_unauthenticated() {
        let auth = service();
        assert_eq!(auth.verify_session("garbage"), Err(AuthError::Unauthenticated));
        assert_eq!(auth.verify_session(""), Err(AuthError::Unauthenticated));
    }

    #[test]
    fn zero_ttl_rejected_at_construction() {
        let hasher = CredentialHasher::new(HasherParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let result = AuthService::new(
            Arc::new(FakeUsers::default()),
            hasher,
            TokenIssuer::new(b"s"),
            Duration::zero(),
        );
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }
}
