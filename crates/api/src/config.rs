use photobooth_cloud::S3Config;
use photobooth_pipeline::FitPolicy;

/// Where frames, photos and metadata documents live.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Files under `data_dir`, served back through `/assets`.
    Local { data_dir: String },
    S3(S3Config),
}

impl StorageConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::S3(_) => "s3",
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for a single kiosk on the
/// local network. Runtime settings (countdown, email template, ...) are not
/// here; they live in the store and are edited through the admin API.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Body limit for uploads in bytes (default: 20 MiB).
    pub max_upload_bytes: usize,
    /// Prefix for public asset URLs and QR download links.
    pub public_base_url: String,
    /// Directory of static kiosk and admin pages.
    pub static_dir: String,
    pub storage: StorageConfig,
    /// Fit policy when a capture request does not name one.
    pub composite_policy: FitPolicy,
    /// Model service for background removal; built-in segmenter when unset.
    pub segmentation_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                     |
    /// |------------------------|-----------------------------|
    /// | `HOST`                 | `0.0.0.0`                   |
    /// | `PORT`                 | `3000`                      |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`     |
    /// | `REQUEST_TIMEOUT_SECS` | `60`                        |
    /// | `MAX_UPLOAD_BYTES`     | `20971520`                  |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:{PORT}`   |
    /// | `STATIC_DIR`           | `public`                    |
    /// | `STORAGE_BACKEND`      | `local` (`local` or `s3`)   |
    /// | `DATA_DIR`             | `data`                      |
    /// | `S3_BUCKET`            | required for `s3`           |
    /// | `S3_PREFIX`            | `photobooth`                |
    /// | `S3_ENDPOINT`          | AWS                         |
    /// | `S3_PUBLIC_URL`        | virtual-hosted bucket URL   |
    /// | `COMPOSITE_POLICY`     | `cover`                     |
    /// | `SEGMENTATION_URL`     | unset                       |
    ///
    /// Panics on malformed values, which is the desired behaviour at
    /// startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (20 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "public".into());

        let storage = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .as_str()
        {
            "local" => StorageConfig::Local {
                data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "data".into()),
            },
            "s3" => {
                let bucket =
                    std::env::var("S3_BUCKET").expect("S3_BUCKET must be set for the s3 backend");
                let mut s3 = S3Config::new(bucket);
                s3.prefix = std::env::var("S3_PREFIX").unwrap_or_else(|_| "photobooth".into());
                s3.endpoint = std::env::var("S3_ENDPOINT").ok();
                s3.public_url = std::env::var("S3_PUBLIC_URL").ok();
                StorageConfig::S3(s3)
            }
            other => panic!("STORAGE_BACKEND must be 'local' or 's3' (got '{other}')"),
        };

        let composite_policy: FitPolicy = std::env::var("COMPOSITE_POLICY")
            .unwrap_or_else(|_| "cover".into())
            .parse()
            .unwrap_or_else(|e| panic!("COMPOSITE_POLICY: {e}"));

        let segmentation_url = std::env::var("SEGMENTATION_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            public_base_url,
            static_dir,
            storage,
            composite_policy,
            segmentation_url,
        }
    }
}
