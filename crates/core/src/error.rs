#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    Config(String),
    #[error("MongoDB connection error: {0}")]
    Connectivity(String),
    #[error("database operation failed: {0}")]
    Driver(#[from] mongodb::error::Error),
    #[error("invalid identifier: {0}")]
    InvalidId(String),
    #[error("failed to convert record to a document: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
