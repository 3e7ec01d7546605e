use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub filter: FilterConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub uploads: UploadConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Upper bound on `limit` for list endpoints.
    pub max_limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_seed: bool,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// URL prefix the stored files are served under.
    pub public_path: String,
    pub image_max_bytes: usize,
    pub file_max_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("FILTER_MAX_LIMIT") {
            self.filter.max_limit = v.parse().ok();
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            match v.trim().to_ascii_lowercase().as_str() {
                "memory" => self.database.backend = DatabaseBackend::Memory,
                "mongo" | "mongodb" => self.database.backend = DatabaseBackend::Mongo,
                other => tracing::warn!("Ignoring unknown DATABASE_BACKEND: {}", other),
            }
        }
        if let Ok(v) = env::var("MONGODB_URI") {
            self.database.uri = v;
        }
        if let Ok(v) = env::var("MONGODB_DB") {
            self.database.name = v;
        }

        // API overrides
        if let Ok(v) = env::var("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("BUILDPRO_API_PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_SEED") {
            self.api.enable_seed = v.parse().unwrap_or(self.api.enable_seed);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOADS_DIR") {
            self.uploads.dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("UPLOADS_IMAGE_MAX_BYTES") {
            self.uploads.image_max_bytes = v.parse().unwrap_or(self.uploads.image_max_bytes);
        }
        if let Ok(v) = env::var("UPLOADS_FILE_MAX_BYTES") {
            self.uploads.file_max_bytes = v.parse().unwrap_or(self.uploads.file_max_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn uploads() -> UploadConfig {
        UploadConfig {
            dir: PathBuf::from("public/uploads"),
            public_path: "/uploads".to_string(),
            image_max_bytes: 5 * 1024 * 1024,
            file_max_bytes: 10 * 1024 * 1024,
        }
    }

    fn database(name: &str) -> DatabaseConfig {
        DatabaseConfig {
            backend: DatabaseBackend::Mongo,
            uri: "mongodb://localhost:27017".to_string(),
            name: name.to_string(),
        }
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            filter: FilterConfig { max_limit: Some(1000) },
            database: Self::database("buildpro"),
            api: ApiConfig {
                port: 3000,
                enable_seed: true,
                enable_request_logging: true,
            },
            uploads: Self::uploads(),
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            filter: FilterConfig { max_limit: Some(500) },
            database: Self::database("buildpro_staging"),
            api: ApiConfig {
                port: 3000,
                enable_seed: true,
                enable_request_logging: true,
            },
            uploads: Self::uploads(),
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.yourbuildpro.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            filter: FilterConfig { max_limit: Some(500) },
            database: Self::database("buildpro"),
            api: ApiConfig {
                port: 3000,
                enable_seed: false,
                enable_request_logging: false,
            },
            uploads: Self::uploads(),
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.yourbuildpro.com".to_string()],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
