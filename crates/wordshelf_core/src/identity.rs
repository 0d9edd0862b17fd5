//! crates/wordshelf_core/src/identity.rs
//!
//! Account creation and session resolution. Password hashing lives in the
//! adapter layer; this service only ever sees the finished hash.

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{AuthSession, Credentials, NewUser, User, UserSettings, UserStats};
use crate::ports::{PortError, PortResult, Store};

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Resolves callers to stable user identifiers and manages the account
/// records behind them.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn Store>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Validate a raw password against the signup requirements. Called by
    /// the adapter before it hashes.
    pub fn validate_password(password: &str) -> PortResult<()> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(PortError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        Ok(())
    }

    /// Create a new account: the profile defaults plus credentials, in one
    /// transaction. The username falls back to the email's local part.
    pub async fn signup(
        &self,
        email: &str,
        username: Option<&str>,
        password_hash: &str,
    ) -> PortResult<User> {
        let mut tx = self.store.begin().await?;

        if tx.find_credentials_by_email(email).await?.is_some() {
            return Err(PortError::Validation(
                "An account with this email already exists".to_string(),
            ));
        }

        let username = username
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .or_else(|| {
                email
                    .split('@')
                    .next()
                    .map(str::to_string)
                    .filter(|name| !name.is_empty())
            })
            .unwrap_or_else(|| "user".to_string());

        let user_id = tx
            .insert_user(NewUser {
                username,
                email: email.to_string(),
                avatar_url: None,
                bio: None,
                settings: UserSettings::default(),
                stats: UserStats::default(),
                badges: Vec::new(),
            })
            .await?;
        tx.insert_credentials(Credentials {
            user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        })
        .await?;

        let user = tx
            .get_user(user_id)
            .await?
            .ok_or_else(|| PortError::Unexpected("user vanished after insert".to_string()))?;
        tx.commit().await?;
        Ok(user)
    }

    /// Look up the stored credentials for an email. The adapter verifies
    /// the password hash; a `None` here and a failed verification must be
    /// reported identically to the caller.
    pub async fn credentials_for_email(&self, email: &str) -> PortResult<Option<Credentials>> {
        let mut tx = self.store.begin().await?;
        tx.find_credentials_by_email(email).await
    }

    /// Open a session for a user, valid for `ttl_days` days.
    pub async fn create_session(&self, user_id: Uuid, ttl_days: i64) -> PortResult<AuthSession> {
        let session = AuthSession {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: Utc::now() + Duration::days(ttl_days),
        };
        let mut tx = self.store.begin().await?;
        tx.insert_auth_session(session.clone()).await?;
        tx.commit().await?;
        Ok(session)
    }

    /// Resolve a session id to its user. Expired or unknown sessions
    /// resolve to `None`.
    pub async fn resolve_session(&self, session_id: &str) -> PortResult<Option<Uuid>> {
        let mut tx = self.store.begin().await?;
        let session = tx.get_auth_session(session_id).await?;
        Ok(session
            .filter(|session| session.expires_at > Utc::now())
            .map(|session| session.user_id))
    }

    /// Invalidate a session. Unknown ids are a no-op.
    pub async fn logout(&self, session_id: &str) -> PortResult<()> {
        let mut tx = self.store.begin().await?;
        tx.delete_auth_session(session_id).await?;
        tx.commit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn service() -> IdentityService {
        IdentityService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn signup_applies_profile_defaults() {
        let identity = service();
        let user = identity
            .signup("reader@example.com", None, "hash")
            .await
            .unwrap();

        assert_eq!(user.username, "reader");
        assert_eq!(user.stats, UserStats::default());
        assert!(user.settings.public_profile);
        assert!(!user.settings.dark_mode);
        assert!(user.badges.is_empty());
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email() {
        let identity = service();
        identity
            .signup("reader@example.com", None, "hash")
            .await
            .unwrap();
        let err = identity
            .signup("reader@example.com", Some("other"), "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
    }

    #[tokio::test]
    async fn explicit_username_wins_over_email_local_part() {
        let identity = service();
        let user = identity
            .signup("reader@example.com", Some("bookworm"), "hash")
            .await
            .unwrap();
        assert_eq!(user.username, "bookworm");
    }

    #[tokio::test]
    async fn sessions_resolve_until_logged_out() {
        let identity = service();
        let user = identity
            .signup("reader@example.com", None, "hash")
            .await
            .unwrap();

        let session = identity.create_session(user.id, 30).await.unwrap();
        assert_eq!(
            identity.resolve_session(&session.id).await.unwrap(),
            Some(user.id)
        );

        identity.logout(&session.id).await.unwrap();
        assert_eq!(identity.resolve_session(&session.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_sessions_do_not_resolve() {
        let identity = service();
        let user = identity
            .signup("reader@example.com", None, "hash")
            .await
            .unwrap();

        let session = identity.create_session(user.id, -1).await.unwrap();
        assert_eq!(identity.resolve_session(&session.id).await.unwrap(), None);
    }

    #[test]
    fn short_passwords_fail_validation() {
        assert!(matches!(
            IdentityService::validate_password("short"),
            Err(PortError::Validation(_))
        ));
        assert!(IdentityService::validate_password("long enough").is_ok());
    }
}
