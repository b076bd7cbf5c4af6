//! API configuration.

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// SQLite database URL
    pub database_url: String,
    /// Directory where uploaded media is stored
    pub media_root: String,
    /// Max accepted upload size in bytes
    pub max_upload_bytes: usize,
    /// Secret used to sign session tokens
    pub jwt_secret: String,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            database_url: "sqlite://vidova.db".to_string(),
            media_root: "uploads".to_string(),
            max_upload_bytes: 100_000_000,
            jwt_secret: "dev-secret-change-me".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            media_root: std::env::var("MEDIA_ROOT").unwrap_or(defaults.media_root),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }
}
