use crate::config::StoreConfig;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions};
use std::sync::Arc;
use tracing::debug;

/// The seam between the pipeline and an object store bucket.
///
/// The pipeline only ever lists top-level directories, downloads whole
/// objects and uploads whole buffers, so the trait stays that narrow.
#[async_trait]
pub trait Bucket: Send + Sync {
    fn name(&self) -> &str;

    /// Top-level directory-like entries (common prefixes). Names keep their
    /// trailing `/` so callers can concatenate keys directly.
    async fn list_dirs(&self) -> Result<Vec<String>>;

    async fn get(&self, key: &str) -> Result<Bytes>;

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;
}

/// `Bucket` over any `object_store` backend. Production runs wrap an
/// `AmazonS3` client; tests wrap `InMemory` or `LocalFileSystem` instead.
pub struct ObjectBucket {
    name: String,
    store: Arc<dyn ObjectStore>,
}

impl ObjectBucket {
    pub fn new(name: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    /// Client for one bucket on an S3-compatible endpoint. Path-style
    /// addressing, as MinIO deployments expect.
    pub fn s3(config: &StoreConfig, bucket: &str) -> Result<Self> {
        let store = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_access_key_id(&config.access_key)
            .with_secret_access_key(&config.secret_key)
            .with_bucket_name(bucket)
            .with_region("us-east-1")
            .with_virtual_hosted_style_request(false)
            .with_allow_http(config.endpoint.starts_with("http://"))
            .build()?;
        Ok(Self::new(bucket, Arc::new(store)))
    }

    /// In-memory bucket for tests and local development.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self::new(name, Arc::new(InMemory::new()))
    }
}

#[async_trait]
impl Bucket for ObjectBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_dirs(&self) -> Result<Vec<String>> {
        let listing = self.store.list_with_delimiter(None).await?;
        let dirs = listing
            .common_prefixes
            .iter()
            .map(|prefix| format!("{prefix}/"))
            .collect();
        Ok(dirs)
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = StorePath::from(key);
        let data = self.store.get(&path).await?.bytes().await?;
        debug!("Fetched {} bytes from {}/{}", data.len(), self.name, key);
        Ok(data)
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let path = StorePath::from(key);
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions::from(attributes);
        self.store.put_opts(&path, data.into(), options).await?;
        debug!("Uploaded {}/{}", self.name, key);
        Ok(())
    }
}
