use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::Mutex;

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::models::Submission;

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn save(&self, submission: &Submission) -> Result<(), StoreError>;
}

/// Postgres-backed store. The pool is created on the first save and reused
/// until a connection-level failure drops it.
pub struct PgSubmissionStore {
    config: DatabaseConfig,
    pool: Mutex<Option<PgPool>>,
}

impl PgSubmissionStore {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: Mutex::new(None),
        }
    }

    /// Connect and migrate run under one `connect_timeout`, outside the cache lock.
    async fn pool(&self) -> Result<PgPool, StoreError> {
        if let Some(pool) = self.cached().await {
            return Ok(pool);
        }

        let timeout = self.config.connect_timeout;
        let pool = tokio::time::timeout(timeout, self.connect())
            .await
            .map_err(|_| StoreError::Connect(format!("timed out after {}s", timeout.as_secs())))??;

        let mut cached = self.pool.lock().await;
        match cached.as_ref().filter(|p| !p.is_closed()) {
            // Another save connected first; keep its pool.
            Some(existing) => {
                let existing = existing.clone();
                drop(cached);
                pool.close().await;
                Ok(existing)
            }
            None => {
                tracing::info!("Database connected");
                *cached = Some(pool.clone());
                Ok(pool)
            }
        }
    }

    async fn cached(&self) -> Option<PgPool> {
        self.pool
            .lock()
            .await
            .as_ref()
            .filter(|p| !p.is_closed())
            .cloned()
    }

    async fn connect(&self) -> Result<PgPool, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(self.config.connect_timeout)
            .connect(&self.config.url)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(pool)
    }

    async fn discard_pool(&self) {
        if let Some(pool) = self.pool.lock().await.take() {
            pool.close().await;
            tracing::warn!("Dropped cached database pool, will reconnect on next save");
        }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn save(&self, submission: &Submission) -> Result<(), StoreError> {
        let pool = self.pool().await?;

        let limit = self.config.connect_timeout;
        let result = tokio::time::timeout(limit, insert(&pool, submission))
            .await
            .map_err(|_| StoreError::Timeout(limit.as_secs()))?;

        if let Err(e) = &result {
            if is_disconnect(e) {
                self.discard_pool().await;
            }
        }
        result.map_err(StoreError::from)
    }
}

pub async fn insert(pool: &PgPool, submission: &Submission) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO contact_submissions (id, name, email, phone, subject, message, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(submission.id())
    .bind(submission.name())
    .bind(submission.email())
    .bind(submission.phone())
    .bind(submission.subject())
    .bind(submission.message())
    .bind(submission.created_at())
    .execute(pool)
    .await?;
    Ok(())
}

fn is_disconnect(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Tls(_)
    )
}

/// Used when no database is configured: every save fails, leaving the
/// notification as the only delivery path.
pub struct DisabledStore;

#[async_trait]
impl SubmissionStore for DisabledStore {
    async fn save(&self, _submission: &Submission) -> Result<(), StoreError> {
        Err(StoreError::NotConfigured)
    }
}
