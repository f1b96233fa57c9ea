// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account registration and session login/logout.

use crate::db::{Database, InsertOutcome};
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::credentials::{self, CredentialError, CredentialHasher};
use crate::services::sessions::{SessionError, SessionStore};
use std::sync::Arc;

/// Registration and session gate over the user table.
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    hasher: Arc<dyn CredentialHasher>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthService {
    pub fn new(
        db: Database,
        hasher: Arc<dyn CredentialHasher>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            db,
            hasher,
            sessions,
        }
    }

    /// Validate and store a new account. Returns the stored user.
    ///
    /// The pre-insert lookup only produces a friendlier error; a concurrent
    /// registration that wins the race is caught by the primary key.
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        let taken = self.db.get_user(username).await?.is_some();
        credentials::validate(username, password, taken)?;

        let hasher = self.hasher.clone();
        let plaintext = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))??;

        let user = User {
            username: username.to_string(),
            password_hash,
        };

        match self.db.insert_user(&user).await {
            Ok(InsertOutcome::Inserted) => {
                tracing::info!(username = %user.username, "User registered");
                Ok(user)
            }
            Ok(InsertOutcome::Duplicate) => {
                tracing::warn!(username = %user.username, "Lost registration race");
                Err(CredentialError::UsernameTaken.into())
            }
            Err(e) => {
                tracing::error!(error = %e, username = %user.username, "Failed to insert user");
                Err(AppError::BadRequest(
                    "Error adding new user to database".to_string(),
                ))
            }
        }
    }

    /// Check credentials and bind `username` to a freshly minted session.
    ///
    /// `current` is the token the client presented, if any. A token that
    /// already holds a username is refused before the credentials are looked
    /// at. On success the new token is returned; a client-supplied token is
    /// never adopted.
    pub async fn login(
        &self,
        current: Option<&str>,
        username: &str,
        password: &str,
    ) -> Result<String> {
        if let Some(active) = current.and_then(|id| self.sessions.get(id)) {
            return Err(SessionError::AlreadyLoggedIn(active).into());
        }

        let Some(user) = self.db.get_user(username).await? else {
            tracing::debug!(username, "Login for unknown user");
            return Err(SessionError::InvalidCredentials.into());
        };

        let hasher = self.hasher.clone();
        let plaintext = password.to_string();
        let stored = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &stored))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))?;

        if !verified {
            tracing::debug!(username, "Login with wrong password");
            return Err(SessionError::InvalidCredentials.into());
        }

        let session_id = uuid::Uuid::new_v4().to_string();
        self.sessions
            .bind(&session_id, &user.username)
            .map_err(SessionError::AlreadyLoggedIn)?;

        tracing::info!(username = %user.username, "User logged in");
        Ok(session_id)
    }

    /// Clear the session. Returns the username that was logged out.
    pub fn logout(&self, session_id: &str) -> Result<String> {
        let username = self
            .sessions
            .unbind(session_id)
            .ok_or(SessionError::NotLoggedIn)?;
        tracing::info!(username = %username, "User logged out");
        Ok(username)
    }

    /// Username bound to the session, if any.
    pub fn current_user(&self, session_id: &str) -> Option<String> {
        self.sessions.get(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::credentials::Argon2Hasher;
    use crate::services::sessions::MemorySessionStore;
    use std::time::Duration;

    async fn service() -> AuthService {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        AuthService::new(
            db,
            Arc::new(Argon2Hasher),
            Arc::new(MemorySessionStore::new(Duration::from_secs(60))),
        )
    }

    fn message(err: AppError) -> String {
        err.to_string()
    }

    #[tokio::test]
    async fn test_register_twice() {
        let auth = service().await;

        let user = auth.register("Testing123", "testing123").await.unwrap();
        assert_ne!(user.password_hash, "testing123");

        let err = auth.register("Testing123", "testing123").await.unwrap_err();
        assert_eq!(message(err), "Username already exists");
    }

    /// What [`InterferingHasher`] does to the database while hashing.
    enum Interference {
        InsertSameUser,
        DropUsersTable,
    }

    /// Hasher that changes the database between the pre-check and the insert.
    struct InterferingHasher {
        db: Database,
        username: String,
        action: Interference,
    }

    impl CredentialHasher for InterferingHasher {
        fn hash(&self, password: &str) -> anyhow::Result<String> {
            tokio::runtime::Handle::current().block_on(async {
                match self.action {
                    Interference::InsertSameUser => {
                        let user = User {
                            username: self.username.clone(),
                            password_hash: "other".to_string(),
                        };
                        self.db.insert_user(&user).await?;
                    }
                    Interference::DropUsersTable => {
                        sqlx::query("DROP TABLE users")
                            .execute(self.db.pool())
                            .await?;
                    }
                }
                anyhow::Ok(())
            })?;
            Argon2Hasher.hash(password)
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            Argon2Hasher.verify(password, hash)
        }
    }

    async fn interfering_service(action: Interference) -> AuthService {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let hasher = InterferingHasher {
            db: db.clone(),
            username: "Testing123".to_string(),
            action,
        };
        AuthService::new(
            db,
            Arc::new(hasher),
            Arc::new(MemorySessionStore::new(Duration::from_secs(60))),
        )
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_register_race_reports_username_taken() {
        let auth = interfering_service(Interference::InsertSameUser).await;

        let err = auth.register("Testing123", "testing123").await.unwrap_err();
        assert_eq!(message(err), "Username already exists");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_register_storage_failure_is_generic() {
        let auth = interfering_service(Interference::DropUsersTable).await;

        let err = auth.register("Testing123", "testing123").await.unwrap_err();
        assert_eq!(
            message(err),
            "Invalid request: Error adding new user to database"
        );
    }

    #[tokio::test]
    async fn test_login_logout_cycle() {
        let auth = service().await;
        auth.register("Testing123", "testing123").await.unwrap();

        let session = auth.login(None, "Testing123", "testing123").await.unwrap();
        assert_eq!(auth.current_user(&session).as_deref(), Some("Testing123"));

        let err = auth
            .login(Some(&session), "Testing123", "testing123")
            .await
            .unwrap_err();
        assert_eq!(message(err), "Testing123 is already logged in");

        assert_eq!(auth.logout(&session).unwrap(), "Testing123");
        let err = auth.logout(&session).unwrap_err();
        assert_eq!(message(err), "No user is logged in");
    }

    #[tokio::test]
    async fn test_active_session_rejects_bad_credentials_as_already_logged_in() {
        let auth = service().await;
        auth.register("Testing123", "testing123").await.unwrap();
        let session = auth.login(None, "Testing123", "testing123").await.unwrap();

        let err = auth
            .login(Some(&session), "nobody123", "wrong")
            .await
            .unwrap_err();
        assert_eq!(message(err), "Testing123 is already logged in");
    }

    #[tokio::test]
    async fn test_login_never_adopts_client_token() {
        let auth = service().await;
        auth.register("Testing123", "testing123").await.unwrap();

        let session = auth
            .login(Some("chosen-by-client"), "Testing123", "testing123")
            .await
            .unwrap();
        assert_ne!(session, "chosen-by-client");
        assert!(uuid::Uuid::parse_str(&session).is_ok());
        assert_eq!(auth.current_user("chosen-by-client"), None);
        assert_eq!(auth.current_user(&session).as_deref(), Some("Testing123"));
    }

    #[tokio::test]
    async fn test_invalid_credentials() {
        let auth = service().await;
        auth.register("Testing123", "testing123").await.unwrap();

        let err = auth.login(None, "Testing123", "wrong1234").await.unwrap_err();
        assert_eq!(message(err), "Invalid username or password");

        let err = auth.login(None, "Nobody1234", "testing123").await.unwrap_err();
        assert_eq!(message(err), "Invalid username or password");
    }
}
