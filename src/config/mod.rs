mod file_config;

pub use file_config::{FileConfig, SearchFileConfig};

use crate::catalog_search::OpenLibraryConfig;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const MAX_SEARCH_LIMIT: usize = 100;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_file: PathBuf,
    pub port: u16,
    pub web_dir: Option<String>,
    pub logging_level: RequestsLoggingLevel,
    pub search_base_url: String,
    pub covers_base_url: String,
    pub search_timeout_sec: u64,
    pub search_limit: usize,
    pub max_body_bytes: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        let search = OpenLibraryConfig::default();
        Self {
            db_file: PathBuf::from("bookshelf.db"),
            port: 8080,
            web_dir: None,
            logging_level: RequestsLoggingLevel::Path,
            search_base_url: search.search_base_url,
            covers_base_url: search.covers_base_url,
            search_timeout_sec: search.timeout.as_secs(),
            search_limit: crate::server::config::DEFAULT_SEARCH_LIMIT,
            max_body_bytes: crate::server::config::DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_file: PathBuf,
    pub port: u16,
    pub web_dir: Option<String>,
    pub logging_level: RequestsLoggingLevel,
    pub search_base_url: String,
    pub covers_base_url: String,
    pub search_timeout_sec: u64,
    pub search_limit: usize,
    pub max_body_bytes: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let search = file.search.unwrap_or_default();

        let db_file = file
            .db_file
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_file.clone());
        if db_file.is_dir() {
            bail!("db_file points to a directory: {:?}", db_file);
        }

        let port = file.port.unwrap_or(cli.port);
        if port == 0 {
            bail!("port must be non-zero");
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let web_dir = file.web_dir.or_else(|| cli.web_dir.clone());
        if let Some(dir) = &web_dir {
            if !PathBuf::from(dir).is_dir() {
                bail!("Web directory does not exist: {:?}", dir);
            }
        }

        let search_base_url = search
            .base_url
            .unwrap_or_else(|| cli.search_base_url.clone());
        let covers_base_url = search
            .covers_base_url
            .unwrap_or_else(|| cli.covers_base_url.clone());

        let search_timeout_sec = search.timeout_sec.unwrap_or(cli.search_timeout_sec);
        if search_timeout_sec == 0 {
            bail!("search timeout must be greater than zero");
        }

        let search_limit = search.limit.unwrap_or(cli.search_limit);
        if !(1..=MAX_SEARCH_LIMIT).contains(&search_limit) {
            bail!(
                "search limit must be between 1 and {}, got {}",
                MAX_SEARCH_LIMIT,
                search_limit
            );
        }

        let max_body_bytes = file.max_body_bytes.unwrap_or(cli.max_body_bytes);
        if max_body_bytes == 0 {
            bail!("max body bytes must be greater than zero");
        }

        Ok(Self {
            db_file,
            port,
            web_dir,
            logging_level,
            search_base_url,
            covers_base_url,
            search_timeout_sec,
            search_limit,
            max_body_bytes,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            frontend_dir_path: self.web_dir.clone(),
            max_body_bytes: self.max_body_bytes,
            search_limit: self.search_limit,
        }
    }

    pub fn open_library_config(&self) -> OpenLibraryConfig {
        OpenLibraryConfig {
            search_base_url: self.search_base_url.clone(),
            covers_base_url: self.covers_base_url.clone(),
            timeout: Duration::from_secs(self.search_timeout_sec),
            ..Default::default()
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("body"),
            Some(RequestsLoggingLevel::Body)
        ));
        // Case insensitive
        assert!(matches!(
            parse_logging_level("HEADERS"),
            Some(RequestsLoggingLevel::Headers)
        ));
        assert!(parse_logging_level("verbose").is_none());
    }

    #[test]
    fn test_resolve_cli_only() {
        let web_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_file: PathBuf::from("/data/books.db"),
            port: 9000,
            web_dir: Some(web_dir.path().to_string_lossy().to_string()),
            logging_level: RequestsLoggingLevel::Headers,
            search_base_url: "http://localhost:7000".to_string(),
            covers_base_url: "http://localhost:7001".to_string(),
            search_timeout_sec: 3,
            search_limit: 25,
            max_body_bytes: 4096,
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_file, PathBuf::from("/data/books.db"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        assert_eq!(config.search_limit, 25);

        let server = config.server_config();
        assert_eq!(server.max_body_bytes, 4096);
        assert_eq!(
            server.frontend_dir_path,
            Some(web_dir.path().to_string_lossy().to_string())
        );

        let search = config.open_library_config();
        assert_eq!(search.search_base_url, "http://localhost:7000");
        assert_eq!(search.covers_base_url, "http://localhost:7001");
        assert_eq!(search.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let cli = CliConfig::default();
        let file_config = FileConfig {
            db_file: Some("/toml/books.db".to_string()),
            port: Some(4000),
            logging_level: Some("body".to_string()),
            search: Some(SearchFileConfig {
                limit: Some(5),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        assert_eq!(config.db_file, PathBuf::from("/toml/books.db"));
        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
        assert_eq!(config.search_limit, 5);
        // CLI value used when TOML doesn't specify
        assert_eq!(config.search_base_url, "https://openlibrary.org");
        assert_eq!(config.search_timeout_sec, 10);
    }

    #[test]
    fn test_invalid_toml_logging_level_falls_back_to_cli() {
        let cli = CliConfig {
            logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };
        let file_config = FileConfig {
            logging_level: Some("loud".to_string()),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();
        assert_eq!(config.logging_level, RequestsLoggingLevel::None);
    }

    #[test]
    fn test_resolve_rejects_zero_port() {
        let cli = CliConfig {
            port: 0,
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("port must be non-zero"));
    }

    #[test]
    fn test_resolve_rejects_search_limit_out_of_range() {
        for limit in [0, MAX_SEARCH_LIMIT + 1] {
            let cli = CliConfig {
                search_limit: limit,
                ..Default::default()
            };
            let err = AppConfig::resolve(&cli, None).unwrap_err();
            assert!(err.to_string().contains("search limit must be between"));
        }
    }

    #[test]
    fn test_resolve_rejects_zero_timeout() {
        let file_config = FileConfig {
            search: Some(SearchFileConfig {
                timeout_sec: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = AppConfig::resolve(&CliConfig::default(), Some(file_config));
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_missing_web_dir_error() {
        let cli = CliConfig {
            web_dir: Some("/nonexistent/path/that/should/not/exist".to_string()),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_db_file_is_directory_error() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_file: temp_dir.path().to_path_buf(),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("directory"));
    }

    #[test]
    fn test_load_file_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bookshelf.toml");
        std::fs::write(
            &path,
            r#"
port = 3100
logging_level = "none"

[search]
base_url = "http://127.0.0.1:9999"
limit = 20
"#,
        )
        .unwrap();

        let file_config = FileConfig::load(&path).unwrap();
        assert_eq!(file_config.port, Some(3100));
        assert_eq!(file_config.logging_level.as_deref(), Some("none"));
        let search = file_config.search.unwrap();
        assert_eq!(search.base_url.as_deref(), Some("http://127.0.0.1:9999"));
        assert_eq!(search.limit, Some(20));
        assert!(search.timeout_sec.is_none());
    }

    #[test]
    fn test_load_file_config_rejects_bad_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        assert!(FileConfig::load(&path).is_err());
    }
}
