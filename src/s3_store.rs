use s3::{bucket::Bucket, creds::Credentials, region::Region};
use tracing::debug;

use crate::{config::Config, error::StoreError};

pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Somewhere to put a finished chart.
pub trait ObjectStore {
    fn bucket_name(&self) -> &str;

    fn put_object(&self, name: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError>;
}

pub struct S3Store {
    bucket: Bucket,
}

impl S3Store {
    /// Builds the client once per run. No request is made here.
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let credentials = Credentials::new(
            Some(&config.aws_access_key_id),
            Some(&config.aws_secret_access_key),
            None,
            None,
            None,
        )
        .map_err(|e| StoreError::Init(e.to_string()))?;

        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse::<Region>()
                .map_err(|e| StoreError::Init(e.to_string()))?,
        };

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StoreError::Init(e.to_string()))?;
        // MinIO and friends expect path-style addressing.
        let bucket = if config.endpoint.is_some() {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(S3Store { bucket })
    }
}

impl ObjectStore for S3Store {
    fn bucket_name(&self) -> &str {
        &self.bucket.name
    }

    fn put_object(&self, name: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        debug!("PUT {} ({} bytes) into {}", name, bytes.len(), self.bucket.name);
        let response = self
            .bucket
            .put_object_with_content_type(name, bytes, content_type)
            .map_err(|e| StoreError::Upload {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StoreError::Status {
                name: name.to_string(),
                status,
            });
        }
        Ok(())
    }
}

/// Writes `png` to the store under `filename`.
pub fn upload_chart(store: &dyn ObjectStore, png: &[u8], filename: &str) -> Result<(), StoreError> {
    store.put_object(filename, png, PNG_CONTENT_TYPE)
}
