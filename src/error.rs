use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Failed to connect to Flowganise: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("This domain is not registered with Flowganise. Please sign up first at flowganise.com")]
    NotRegistered,

    #[error("Unexpected response from Flowganise (status {0})")]
    UnexpectedStatus(u16),

    #[error("Invalid response from Flowganise: {0}")]
    MalformedResponse(String),

    #[error("Invalid connect endpoint: {0}")]
    InvalidEndpoint(String),
}

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Purge endpoint returned status {0}")]
    UnexpectedStatus(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Other(String),
}
