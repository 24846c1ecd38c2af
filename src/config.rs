//! Configuration manager for microblog.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Secret used when neither `config.yaml` nor `SECRET_KEY` provide one.
pub const DEFAULT_SECRET_KEY: &str = "you-will-never-ever-guess";
pub const DEFAULT_POSTS_PER_PAGE: u32 = 25;
pub const DEFAULT_PORT: u16 = 8888;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Domain name of current instance.
    pub url: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Number of posts returned per page.
    pub posts_per_page: u32,
    #[serde(skip_deserializing)]
    pub version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Signs session tokens.
    #[serde(skip_serializing)]
    pub secret_key: String,
    /// Related to SQLite configuration.
    #[serde(skip_serializing)]
    pub database: Database,
    /// Related to Argon2 configuration.
    #[serde(skip_serializing)]
    pub argon2: Argon2,
    /// Related to avatar resolution.
    #[serde(skip_serializing)]
    pub avatar: Avatar,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_owned(),
            url: format!("http://localhost:{DEFAULT_PORT}"),
            port: DEFAULT_PORT,
            posts_per_page: DEFAULT_POSTS_PER_PAGE,
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            secret_key: DEFAULT_SECRET_KEY.to_owned(),
            database: Database::default(),
            argon2: Argon2::default(),
            avatar: Avatar::default(),
        }
    }
}

/// Database configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    /// Connection string, e.g. `sqlite://microblog.db?mode=rwc`.
    pub url: String,
    /// Maximum pool connections.
    pub pool_size: u32,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: crate::database::DEFAULT_DATABASE_URL.to_owned(),
            pool_size: crate::database::DEFAULT_POOL_SIZE,
        }
    }
}

/// Argon2 configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2 {
    /// Memory used while hashing.
    pub memory_cost: u32,
    /// Iterations of hash.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
}

impl Default for Argon2 {
    fn default() -> Self {
        Self {
            memory_cost: 1024 * 64, // 64 MiB.
            iterations: 4,
            parallelism: 2,
        }
    }
}

/// Avatar service configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Avatar {
    /// Host of the gravatar-compatible service.
    pub service: String,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            service: crate::avatar::DEFAULT_SERVICE.to_owned(),
        }
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location, then applies environment overrides.
    pub fn read(self) -> Result<Arc<Self>, url::ParseError> {
        let file_path: &Path = if self.path.is_file() {
            &self.path
        } else {
            Path::new(DEFAULT_CONFIG_PATH)
        };

        let mut config = match File::open(file_path) {
            Ok(file) => match serde_yaml::from_reader(file) {
                Ok(config) => config,
                Err(err) => self.error(err),
            },
            Err(err) => self.error(err),
        };

        config.version = VERSION.to_owned();
        config.apply_env(|key| std::env::var(key).ok());
        config.clamp();

        // normalize URLs.
        config.url = normalize_url(&config.url)?;
        config.avatar.service = normalize_url(&config.avatar.service)?;

        if config.secret_key == DEFAULT_SECRET_KEY {
            tracing::warn!(
                "using built-in secret key, set `SECRET_KEY` in production"
            );
        }

        Ok(Arc::new(config))
    }

    /// Apply `DATABASE_URL` and `SECRET_KEY` overrides.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = url;
        }
        if let Some(key) = var("SECRET_KEY").filter(|v| !v.is_empty()) {
            self.secret_key = key;
        }
    }

    /// Pages hold at least one post.
    fn clamp(&mut self) {
        if self.posts_per_page == 0 {
            tracing::warn!("`posts_per_page` is 0, using 1");
            self.posts_per_page = 1;
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file cannot be read");
        Self {
            version: VERSION.to_owned(),
            ..Default::default()
        }
    }
}

/// Normalizes a URL string by ensuring it starts with a valid scheme
/// (`http` or `https`).
fn normalize_url(url: &str) -> Result<String, url::ParseError> {
    let url_with_scheme =
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{url}")
        };

    let parsed_url = Url::parse(&url_with_scheme)?;
    Ok(parsed_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("www.gravatar.com").unwrap(),
            "https://www.gravatar.com/"
        );
        assert_eq!(
            normalize_url("http://localhost:8888").unwrap(),
            "http://localhost:8888/"
        );
        assert!(normalize_url("https://").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Configuration::default();
        config.apply_env(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".into()),
            "SECRET_KEY" => Some("s3cr3t".into()),
            _ => None,
        });

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.secret_key, "s3cr3t");
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let mut config = Configuration::default();
        config.apply_env(|_| Some(String::new()));

        assert_eq!(config.secret_key, DEFAULT_SECRET_KEY);
        assert_eq!(config.database.url, crate::database::DEFAULT_DATABASE_URL);
    }

    #[test]
    fn test_partial_yaml() {
        let config: Configuration =
            serde_yaml::from_str("name: demo\nposts_per_page: 3\n").unwrap();

        assert_eq!(config.name, "demo");
        assert_eq!(config.posts_per_page, 3);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.argon2, Argon2::default());
    }

    #[test]
    fn test_zero_posts_per_page() {
        let path = std::env::temp_dir()
            .join(format!("microblog-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "posts_per_page: 0\n").unwrap();

        let config = Configuration::default().path(path.clone()).read().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.posts_per_page, 1);
    }
}
