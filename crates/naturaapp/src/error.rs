use thiserror::Error;

/// Reasons a creation is refused at save time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("an image reference is required to save a creation")]
    MissingImage,

    #[error("invalid image reference: an HTML payload is not an image")]
    HtmlImage,

    #[error("invalid image reference: expected an http(s) URL or an inline base64 image, got '{0}'")]
    UnrecognizedImage(String),

    #[error("a common name is required to save a creation")]
    MissingCommonName,
}

#[derive(Error, Debug)]
pub enum NaturaError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Creation not found: {0}")]
    NotFound(String),

    #[error("A creation with id {0} already exists")]
    DuplicateId(String),

    #[error("Storage backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Backup error: {0}")]
    Backup(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, NaturaError>;
