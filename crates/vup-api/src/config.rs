//! API configuration.

/// Where objects are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Memory,
}

impl StorageBackend {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Some(Self::S3),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Where video records are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStore {
    Firestore,
    Memory,
}

impl RecordStore {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Some(Self::Firestore),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max upload body size
    pub max_upload_bytes: usize,
    /// Environment (development/production)
    pub environment: String,
    pub storage_backend: StorageBackend,
    pub record_store: RecordStore,
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
            max_upload_bytes: 2 * 1024 * 1024 * 1024, // 2 GiB
            environment: "development".to_string(),
            storage_backend: StorageBackend::S3,
            record_store: RecordStore::Firestore,
            metrics_enabled: true,
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
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            storage_backend: std::env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|s| StorageBackend::parse(&s))
                .unwrap_or(defaults.storage_backend),
            record_store: std::env::var("RECORD_STORE")
                .ok()
                .and_then(|s| RecordStore::parse(&s))
                .unwrap_or(defaults.record_store),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "API_PORT",
        "STORAGE_BACKEND",
        "RECORD_STORE",
        "METRICS_ENABLED",
        "CORS_ORIGINS",
    ];

    #[test]
    #[serial]
    fn test_defaults() {
        for var in VARS {
            std::env::remove_var(var);
        }
        let config = ApiConfig::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage_backend, StorageBackend::S3);
        assert_eq!(config.record_store, RecordStore::Firestore);
        assert!(config.metrics_enabled);
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024 * 1024);
    }

    #[test]
    #[serial]
    fn test_backends_from_env() {
        std::env::set_var("STORAGE_BACKEND", "Memory");
        std::env::set_var("RECORD_STORE", "memory");
        std::env::set_var("METRICS_ENABLED", "0");
        std::env::set_var("CORS_ORIGINS", "https://a.example, https://b.example");

        let config = ApiConfig::from_env();
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.record_store, RecordStore::Memory);
        assert!(!config.metrics_enabled);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );

        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_production_check() {
        let config = ApiConfig {
            environment: "Production".to_string(),
            ..Default::default()
        };
        assert!(config.is_production());
        assert!(!ApiConfig::default().is_production());
    }
}
