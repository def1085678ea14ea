use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
    pub identity: IdentitySettings,
    #[serde(default)]
    pub service_area: ServiceAreaSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which profile store backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
        }
    }
}

fn default_store_backend() -> StoreBackend { StoreBackend::Postgres }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// Which identity provider resolves bearer credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityBackend {
    Jwt,
    Appwrite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySettings {
    pub provider: IdentityBackend,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default)]
    pub appwrite: Option<AppwriteSettings>,
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub project_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAreaSettings {
    #[serde(default = "default_zip_codes")]
    pub zip_codes: Vec<String>,
}

impl Default for ServiceAreaSettings {
    fn default() -> Self {
        Self {
            zip_codes: default_zip_codes(),
        }
    }
}

// Canton, MI
fn default_zip_codes() -> Vec<String> {
    vec!["48187".to_string(), "48188".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with GOODFELLOWS_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., GOODFELLOWS__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        let settings = apply_env_overrides(settings)?;
        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Cross-field checks the deserializer cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Postgres && self.database.is_none() {
            return Err(ConfigError::Message(
                "store.backend = postgres requires a [database] section".to_string(),
            ));
        }

        match self.identity.provider {
            IdentityBackend::Jwt if self.identity.jwt_secret.as_deref().unwrap_or("").is_empty() => {
                Err(ConfigError::Message(
                    "identity.provider = jwt requires identity.jwt_secret".to_string(),
                ))
            }
            IdentityBackend::Appwrite if self.identity.appwrite.is_none() => Err(ConfigError::Message(
                "identity.provider = appwrite requires [identity.appwrite]".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix("GOODFELLOWS")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("identity.admin_emails")
        .with_list_parse_key("service_area.zip_codes")
        .try_parsing(true)
}

/// Apply conventional environment variables that are not prefixed
///
/// `DATABASE_URL` and `JWT_SECRET` are honoured so the service runs with
/// the same environment as the rest of the deployment.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        builder = builder.set_override("identity.jwt_secret", secret)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    #[test]
    fn test_defaults() {
        let settings = parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [store]
            backend = "memory"

            [identity]
            provider = "jwt"
            jwt_secret = "s3cret"
            "#,
        )
        .unwrap();

        assert_eq!(settings.store.backend, StoreBackend::Memory);
        assert_eq!(settings.service_area.zip_codes, vec!["48187", "48188"]);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, "json");
    }

    #[test]
    fn test_postgres_requires_database() {
        let result = parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [identity]
            provider = "jwt"
            jwt_secret = "s3cret"
            "#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_appwrite_requires_endpoint() {
        let result = parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [store]
            backend = "memory"

            [identity]
            provider = "appwrite"
            "#,
        );

        assert!(result.is_err());
    }
}
