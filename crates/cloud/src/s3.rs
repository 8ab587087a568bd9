use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use photobooth_store::{BlobStore, StoreError, StoreResult};

/// Where and how to reach the bucket.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    /// Key prefix every object is stored under, without slashes at the ends.
    pub prefix: String,
    /// Custom endpoint for S3-compatible services (MinIO, R2, ...).
    pub endpoint: Option<String>,
    /// Base for public object URLs. Defaults to the virtual-hosted AWS URL.
    pub public_url: Option<String>,
}

impl S3Config {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: String::new(),
            endpoint: None,
            public_url: None,
        }
    }

    fn object_key(&self, key: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}/{key}")
        }
    }

    fn strip_prefix<'a>(&self, object_key: &'a str) -> &'a str {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            return object_key;
        }
        object_key
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(object_key)
    }

    fn public_base(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.s3.amazonaws.com", self.bucket),
        }
    }
}

/// [`BlobStore`] backed by an S3 bucket.
pub struct S3BlobStore {
    client: Client,
    config: S3Config,
}

impl S3BlobStore {
    /// Build a client from the ambient AWS configuration (environment,
    /// profile or instance metadata).
    pub async fn connect(config: S3Config) -> Self {
        let shared = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        tracing::info!(
            bucket = %config.bucket,
            prefix = %config.prefix,
            endpoint = ?config.endpoint,
            "S3 asset store configured",
        );
        Self { client, config }
    }

    pub fn with_client(client: Client, config: S3Config) -> Self {
        Self { client, config }
    }
}

fn backend<E: std::fmt::Display>(op: &str, key: &str, e: E) -> StoreError {
    StoreError::Backend(format!("S3 {op} '{key}' failed: {e}"))
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn name(&self) -> &'static str {
        "s3"
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.config.public_base(), self.config.object_key(key))
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let object_key = self.config.object_key(key);
        let result = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(&object_key)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                let service = e.into_service_error();
                if service.is_no_such_key() {
                    return Ok(None);
                }
                return Err(backend("get", &object_key, service));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| backend("read body of", &object_key, e))?;
        Ok(Some(bytes.into_bytes().to_vec()))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()> {
        let object_key = self.config.object_key(key);
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&object_key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| backend("put", &object_key, e.into_service_error()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        // S3 deletes are idempotent and do not report existence.
        let existed = self.get(key).await?.is_some();
        let object_key = self.config.object_key(key);
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| backend("delete", &object_key, e.into_service_error()))?;
        Ok(existed)
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let object_prefix = self.config.object_key(prefix);
        let mut keys = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.config.bucket)
                .prefix(&object_prefix)
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(|e| backend("list", &object_prefix, e.into_service_error()))?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|o| o.key())
                    .map(|k| self.config.strip_prefix(k).to_string()),
            );

            match output.next_continuation_token() {
                Some(next) if output.is_truncated() == Some(true) => {
                    token = Some(next.to_string())
                }
                _ => break,
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| backend("head bucket", &self.config.bucket, e.into_service_error()))?;
        Ok(())
    }
}
