//! Uploaded photos live in an S3 bucket (or any S3-compatible store).
//! Objects are world-readable through the bucket policy.

use std::sync::Arc;

use object_store::{
    Attribute, Attributes, ObjectStore, PutOptions, PutPayload, aws::AmazonS3Builder,
    memory::InMemory, path::Path as ObjectPath,
};

use crate::{config::Config, errors::AppError};

#[derive(Clone)]
pub struct ObjectStorageService {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    public_base: String,
}

impl ObjectStorageService {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.s3_bucket)
            .with_region(&config.s3_region)
            .with_access_key_id(&config.s3_access_key_id)
            .with_secret_access_key(&config.s3_secret_access_key);

        // MinIO and friends
        if let Some(endpoint) = &config.s3_endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(false)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| AppError::Storage(format!("failed to create S3 store: {}", e)))?;

        Ok(Self {
            store: Arc::new(store),
            bucket: config.s3_bucket.clone(),
            public_base: config.bucket_public_url(),
        })
    }

    /// Process-local store with the same public URLs.
    pub fn in_memory(config: &Config) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            bucket: config.s3_bucket.clone(),
            public_base: config.bucket_public_url(),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }

    /// Uploads `body` under `key` and returns its public URL.
    pub async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<String, AppError> {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(&ObjectPath::from(key), PutPayload::from(body), options)
            .await
            .map_err(|e| {
                log::error!("Upload of {} to bucket {} failed: {}", key, self.bucket, e);
                AppError::Storage(format!("failed to upload {}: {}", key, e))
            })?;

        log::info!("Stored object {} in bucket {}", key, self.bucket);
        Ok(self.public_url(key))
    }

    /// Size of the stored object, `None` when nothing is stored under `key`.
    pub async fn object_size(&self, key: &str) -> Result<Option<u64>, AppError> {
        match self.store.head(&ObjectPath::from(key)).await {
            Ok(meta) => Ok(Some(meta.size as u64)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(AppError::Storage(format!("failed to inspect {}: {}", key, e))),
        }
    }
}

/// Turns a client-supplied file name into a safe object key:
/// lowercase, runs of anything but letters/digits/underscore become `-`,
/// the extension is kept.
pub fn sanitize_key(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let (stem, extension) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            (stem, Some(ext.to_ascii_lowercase()))
        }
        _ => (base, None),
    };

    let mut cleaned = String::with_capacity(stem.len());
    for c in stem.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' {
            cleaned.push(c);
        } else if !cleaned.ends_with('-') {
            cleaned.push('-');
        }
    }
    let cleaned = cleaned.trim_matches('-');
    let stem = if cleaned.is_empty() { "upload" } else { cleaned };

    match extension {
        Some(ext) if !ext.is_empty() => format!("{}.{}", stem, ext),
        _ => stem.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_s3_store_for_custom_endpoint() {
        let mut config = Config::sample();
        config.s3_endpoint = Some("http://localhost:9000".to_string());
        let storage = ObjectStorageService::from_config(&config).unwrap();
        assert_eq!(
            storage.public_url("me.jpg"),
            "http://localhost:9000/online-dating-app-bucket/me.jpg"
        );
    }

    #[actix_web::test]
    async fn put_object_stores_bytes_and_returns_public_url() {
        let storage = ObjectStorageService::in_memory(&Config::sample());
        let url = storage
            .put_object("beach.png", "image/png", b"png bytes".to_vec())
            .await
            .unwrap();

        assert_eq!(url, "https://online-dating-app-bucket.s3.amazonaws.com/beach.png");
        assert_eq!(storage.object_size("beach.png").await.unwrap(), Some(9));
        assert_eq!(storage.object_size("missing.png").await.unwrap(), None);
    }

    #[test]
    fn sanitizes_file_names() {
        assert_eq!(sanitize_key("My Photo (1).JPG"), "my-photo-1.jpg");
        assert_eq!(sanitize_key("C:\\Users\\me\\avatar.png"), "avatar.png");
        assert_eq!(sanitize_key("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_key("???.gif"), "upload.gif");
        assert_eq!(sanitize_key(""), "upload");
        assert_eq!(sanitize_key("selfie_2024"), "selfie_2024");
    }
}
