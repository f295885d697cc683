use crate::error::{Result, SnapshotError};
use std::env;

/// Connection settings for one S3-compatible endpoint.
///
/// `endpoint` is a full URL including the scheme, e.g.
/// `https://minio.internal:9000`.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
}

/// Run configuration, populated once at startup from the environment and
/// passed into the pipeline. Every variable is required — there are no
/// defaults, and a missing one fails the run before any network call.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: StoreConfig,
    pub destination: StoreConfig,
    pub timetable_bucket: String,
    pub stoptime_bucket: String,
    pub public_bucket: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            source: StoreConfig {
                endpoint: required("S3_ENDPOINT")?,
                access_key: required("S3_ACCESS_KEY")?,
                secret_key: required("S3_SECRET_KEY")?,
            },
            destination: StoreConfig {
                endpoint: required("REMOTE_S3_ENDPOINT")?,
                access_key: required("REMOTE_S3_ACCESS_KEY")?,
                secret_key: required("REMOTE_S3_SECRET_KEY")?,
            },
            timetable_bucket: required("S3_BUCKET_TIMETABLE")?,
            stoptime_bucket: required("S3_BUCKET_STOPTIME")?,
            public_bucket: required("REMOTE_S3_BUCKET_PUBLIC")?,
        })
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SnapshotError::Config(format!(
            "missing required environment variable '{name}'"
        ))),
    }
}
