/// Refresh Session Management
///
/// Server-tracked rotating sessions. Each session row is append-only: it is
/// created ACTIVE and later becomes EXPIRED (clock passes `expires_at`) or
/// REVOKED (`revoked_at` set); both states are terminal. Rotation revokes
/// the presented row and inserts a successor in one atomic store operation,
/// so a previously rotated value resurfacing is distinguishable replay.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::refresh_token::{digest_refresh_token, generate_refresh_token};
use crate::error::{AppError, AuthError};

/// A stored refresh session. Holds the token digest, never the opaque value.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Persistence contract for refresh sessions.
///
/// `revoke_and_insert` is the rotation pair and must apply atomically:
/// neither a revoke without its successor nor a successor without the
/// revoke may be observed after a crash.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: &SessionRow) -> Result<(), AppError>;
    async fn find_by_digest(&self, digest: &str) -> Result<Option<SessionRow>, AppError>;
    async fn mark_revoked(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError>;
    async fn revoke_and_insert(
        &self,
        revoke_id: Uuid,
        at: DateTime<Utc>,
        new_session: &SessionRow,
    ) -> Result<(), AppError>;
}

/// A freshly created session: the opaque value for the client plus its
/// expiry.
#[derive(Debug)]
pub struct NewSession {
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a successful rotation.
#[derive(Debug)]
pub struct RotatedSession {
    pub user_id: Uuid,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Orchestrates session creation, rotation, and revocation against an
/// injected store. No in-process locks; concurrent rotations of the same
/// stale value are decided by the store's transaction and the unique
/// constraint on the digest.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    refresh_token_expiry_days: i64,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, refresh_token_expiry_days: i64) -> Self {
        Self {
            store,
            refresh_token_expiry_days,
        }
    }

    fn expiry_from_now(&self) -> DateTime<Utc> {
        Utc::now() + Duration::days(self.refresh_token_expiry_days)
    }

    /// Create a new session for a user and return the opaque value.
    pub async fn create_session(&self, user_id: Uuid) -> Result<NewSession, AppError> {
        let refresh_token = generate_refresh_token();
        let expires_at = self.expiry_from_now();

        let row = SessionRow {
            id: Uuid::new_v4(),
            user_id,
            token_hash: digest_refresh_token(&refresh_token),
            expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        };
        self.store.insert(&row).await?;

        Ok(NewSession {
            refresh_token,
            expires_at,
        })
    }

    /// Rotate a presented refresh value: revoke its row and issue a
    /// successor for the same user. The presented value is unusable
    /// afterwards.
    ///
    /// # Errors
    /// - `INVALID_REFRESH_TOKEN`: no row for this digest.
    /// - `REFRESH_TOKEN_REVOKED`: row already revoked; a rotated value is
    ///   being replayed, the client must re-authenticate.
    /// - `REFRESH_TOKEN_EXPIRED`: row past its expiry.
    pub async fn rotate_session(&self, presented: &str) -> Result<RotatedSession, AppError> {
        let digest = digest_refresh_token(presented);

        let existing = self
            .store
            .find_by_digest(&digest)
            .await?
            .ok_or(AppError::Auth(AuthError::InvalidRefreshToken))?;

        if existing.revoked_at.is_some() {
            tracing::warn!(
                user_id = %existing.user_id,
                "Attempt to use revoked refresh token"
            );
            return Err(AppError::Auth(AuthError::RefreshTokenRevoked));
        }
        if existing.expires_at < Utc::now() {
            tracing::info!(user_id = %existing.user_id, "Refresh token expired");
            return Err(AppError::Auth(AuthError::RefreshTokenExpired));
        }

        let refresh_token = generate_refresh_token();
        let expires_at = self.expiry_from_now();
        let successor = SessionRow {
            id: Uuid::new_v4(),
            user_id: existing.user_id,
            token_hash: digest_refresh_token(&refresh_token),
            expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        };

        self.store
            .revoke_and_insert(existing.id, Utc::now(), &successor)
            .await?;

        Ok(RotatedSession {
            user_id: existing.user_id,
            refresh_token,
            expires_at,
        })
    }

    /// Revoke a presented refresh value. Idempotent: unknown and
    /// already-revoked values succeed silently, store failures still
    /// propagate.
    pub async fn revoke_session(&self, presented: &str) -> Result<(), AppError> {
        let digest = digest_refresh_token(presented);

        let existing = match self.store.find_by_digest(&digest).await? {
            Some(row) => row,
            None => return Ok(()),
        };
        if existing.revoked_at.is_some() {
            return Ok(());
        }

        self.store.mark_revoked(existing.id, Utc::now()).await
    }
}
