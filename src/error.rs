use thiserror::Error;

/// The submitted body could not be turned into a complete contact form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unreadable body: {0}")]
    Unreadable(String),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Persistence is not configured")]
    NotConfigured,
    #[error("Database connection failed: {0}")]
    Connect(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Insert timed out after {0}s")]
    Timeout(u64),
    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Store panicked")]
    Panicked,
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("Invalid address: {0}")]
    Address(String),
    #[error("Failed to build email: {0}")]
    Build(String),
    #[error("Failed to render email: {0}")]
    Render(#[from] askama::Error),
    #[error("Failed to send email: {0}")]
    Transport(String),
    #[error("Timed out after {0}s")]
    Timeout(u64),
    #[error("Sender panicked")]
    Panicked,
}
