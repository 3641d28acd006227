use crate::sql::SqlParseError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("SQL error: {0}")]
    Sql(#[from] SqlParseError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Duplicate entity: {name}")]
    DuplicateEntity { name: String },
    #[error("Entity keyed as {key:?} is named {name:?}")]
    EntityKeyMismatch { key: String, name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
