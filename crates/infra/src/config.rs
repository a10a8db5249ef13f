//! Process configuration.
//!
//! Everything is read from environment variables once at startup. Absent
//! values fall back to defaults; present but malformed values are an error.

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use reportdesk_auth::HashingParams;

/// Development-only signing secret (64 bytes), used when `JWT_SECRET` is unset.
const DEV_JWT_SECRET: &str = "reportdesk-development-secret-do-not-use-in-production-0123456789";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("{key} is required when {because}")]
    Missing { key: &'static str, because: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub addr: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_secs: i64,
    /// `true` when `secret` is the built-in development value.
    pub using_dev_secret: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEV_JWT_SECRET.to_string(),
            expiration_secs: 86_400,
            using_dev_secret: true,
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_secs", &self.expiration_secs)
            .field("using_dev_secret", &self.using_dev_secret)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgres" => Ok(StoreBackend::Postgres),
            other => Err(format!("expected 'memory' or 'postgres', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database_url: None,
            max_connections: 5,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub admin: Option<AdminCredentials>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub jwt: JwtConfig,
    pub store: StoreConfig,
    pub password_hashing: HashingParams,
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = AppConfig::default();

        let http = HttpConfig {
            addr: parse_or(get("HTTP_ADDR"), "HTTP_ADDR", defaults.http.addr)?,
        };

        let jwt = match get("JWT_SECRET") {
            Some(secret) => JwtConfig {
                secret,
                expiration_secs: parse_or(get("JWT_EXPIRATION_SECS"), "JWT_EXPIRATION_SECS", defaults.jwt.expiration_secs)?,
                using_dev_secret: false,
            },
            None => JwtConfig {
                expiration_secs: parse_or(get("JWT_EXPIRATION_SECS"), "JWT_EXPIRATION_SECS", defaults.jwt.expiration_secs)?,
                ..defaults.jwt
            },
        };
        if jwt.expiration_secs <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRATION_SECS",
                message: "must be positive".to_string(),
            });
        }

        let store = StoreConfig {
            backend: parse_or(get("STORE_BACKEND"), "STORE_BACKEND", defaults.store.backend)?,
            database_url: get("DATABASE_URL"),
            max_connections: parse_or(get("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", defaults.store.max_connections)?,
        };
        if store.backend == StoreBackend::Postgres && store.database_url.is_none() {
            return Err(ConfigError::Missing {
                key: "DATABASE_URL",
                because: "STORE_BACKEND=postgres",
            });
        }

        let hashing = defaults.password_hashing;
        let password_hashing = HashingParams {
            memory_kib: parse_or(get("PASSWORD_HASH_MEMORY_KIB"), "PASSWORD_HASH_MEMORY_KIB", hashing.memory_kib)?,
            iterations: parse_or(get("PASSWORD_HASH_ITERATIONS"), "PASSWORD_HASH_ITERATIONS", hashing.iterations)?,
            parallelism: parse_or(get("PASSWORD_HASH_PARALLELISM"), "PASSWORD_HASH_PARALLELISM", hashing.parallelism)?,
        };

        let admin = match (get("BOOTSTRAP_ADMIN_USERNAME"), get("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            (Some(_), None) => {
                return Err(ConfigError::Missing {
                    key: "BOOTSTRAP_ADMIN_PASSWORD",
                    because: "BOOTSTRAP_ADMIN_USERNAME is set",
                });
            }
            _ => None,
        };

        Ok(Self {
            http,
            jwt,
            store,
            password_hashing,
            bootstrap: BootstrapConfig { admin },
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.http.addr.port(), 8080);
        assert_eq!(cfg.jwt.expiration_secs, 86_400);
        assert!(cfg.jwt.using_dev_secret);
        assert!(cfg.jwt.secret.len() >= 64);
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.bootstrap.admin, None);
    }

    #[test]
    fn reads_every_group() {
        let secret = "s".repeat(64);
        let cfg = config(&[
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", &secret),
            ("JWT_EXPIRATION_SECS", "600"),
            ("STORE_BACKEND", "Postgres"),
            ("DATABASE_URL", "postgres://localhost/reportdesk"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("PASSWORD_HASH_MEMORY_KIB", "4096"),
            ("BOOTSTRAP_ADMIN_USERNAME", "admin"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "Adm1n@pass"),
        ])
        .unwrap();

        assert_eq!(cfg.http.addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(cfg.jwt.secret, secret);
        assert!(!cfg.jwt.using_dev_secret);
        assert_eq!(cfg.jwt.expiration_secs, 600);
        assert_eq!(cfg.store.backend, StoreBackend::Postgres);
        assert_eq!(cfg.store.max_connections, 12);
        assert_eq!(cfg.password_hashing.memory_kib, 4096);
        assert_eq!(cfg.password_hashing.iterations, HashingParams::default().iterations);
        assert_eq!(cfg.bootstrap.admin.unwrap().username, "admin");
    }

    #[test]
    fn malformed_numbers_are_errors() {
        let err = config(&[("JWT_EXPIRATION_SECS", "a day")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_EXPIRATION_SECS", .. }));

        let err = config(&[("DATABASE_MAX_CONNECTIONS", "-1")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DATABASE_MAX_CONNECTIONS", .. }));

        let err = config(&[("JWT_EXPIRATION_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_EXPIRATION_SECS", .. }));
    }

    #[test]
    fn postgres_needs_a_url() {
        let err = config(&[("STORE_BACKEND", "postgres")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing {
                key: "DATABASE_URL",
                because: "STORE_BACKEND=postgres"
            }
        );
        assert!(config(&[("STORE_BACKEND", "sqlite")]).is_err());
    }

    #[test]
    fn admin_username_without_password_is_rejected() {
        assert!(config(&[("BOOTSTRAP_ADMIN_USERNAME", "admin")]).is_err());
        assert_eq!(config(&[("BOOTSTRAP_ADMIN_PASSWORD", "x")]).unwrap().bootstrap.admin, None);
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let cfg = config(&[("BOOTSTRAP_ADMIN_USERNAME", "admin"), ("BOOTSTRAP_ADMIN_PASSWORD", "hunter2")]).unwrap();
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains(DEV_JWT_SECRET));
    }
}
