use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("object store request failed: {0}")]
    Store(#[from] object_store::Error),

    #[error("join query failed: {0}")]
    Query(#[from] datafusion::error::DataFusionError),

    #[error("Parquet serialization failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Discovery failed: {0}")]
    Discovery(String),
}

pub type Result<T> = std::result::Result<T, SnapshotError>;
