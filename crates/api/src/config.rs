/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In
/// production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Shared secret for the admin export endpoints. The default exists
    /// only so local development works out of the box.
    pub admin_token: String,
    /// Path to the question schema JSON file.
    pub schema_path: String,
    /// Directory scanned for image files to build the inventory.
    pub images_dir: String,
    /// Optional JSON manifest listing image ids; overrides the directory
    /// scan when set.
    pub images_manifest: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `ADMIN_TOKEN`          | `changeme`                 |
    /// | `SCHEMA_PATH`          | `config/schema.json`       |
    /// | `IMAGES_DIR`           | `images`                   |
    /// | `IMAGES_MANIFEST`      | unset                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let admin_token = std::env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".into());

        let schema_path =
            std::env::var("SCHEMA_PATH").unwrap_or_else(|_| "config/schema.json".into());

        let images_dir = std::env::var("IMAGES_DIR").unwrap_or_else(|_| "images".into());

        let images_manifest = std::env::var("IMAGES_MANIFEST").ok();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            admin_token,
            schema_path,
            images_dir,
            images_manifest,
        }
    }
}
