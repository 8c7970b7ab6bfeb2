use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_PAGE: &str = "file:///workspace/architecture-firm/index.html";
const DEFAULT_SETTLE_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid page url {value}: {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("page file {}: {source}", .path.display())]
    MissingFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} cannot be expressed as a file url", .path.display())]
    NotFileUrl { path: PathBuf },
    #[error("{key} must be a whole number of milliseconds, got {value:?}")]
    InvalidDuration { key: &'static str, value: String },
    #[error("{key} must be a boolean, got {value:?}")]
    InvalidBool { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct VerifyConfig {
    pub page_url: Url,
    /// Extra wait after load so late scripts and timers can report errors.
    pub settle: Duration,
    /// Missing elements or empty collections fail the run.
    pub strict: bool,
    pub chrome_path: Option<PathBuf>,
}

impl VerifyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_sources(std::env::args().nth(1), |key| std::env::var(key).ok())
    }

    /// The CLI argument wins over `SITE_INDEX_URL`, which wins over the
    /// built-in page location.
    pub fn from_sources(
        arg: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw_page = arg
            .or_else(|| lookup("SITE_INDEX_URL"))
            .unwrap_or_else(|| DEFAULT_PAGE.to_string());

        let settle = match lookup("VERIFY_SETTLE_MS") {
            Some(value) => Duration::from_millis(value.trim().parse().map_err(|_| {
                ConfigError::InvalidDuration {
                    key: "VERIFY_SETTLE_MS",
                    value: value.clone(),
                }
            })?),
            None => Duration::from_millis(DEFAULT_SETTLE_MS),
        };

        let strict = match lookup("VERIFY_STRICT") {
            Some(value) => parse_bool("VERIFY_STRICT", &value)?,
            None => false,
        };

        Ok(Self {
            page_url: resolve_page(&raw_page)?,
            settle,
            strict,
            chrome_path: lookup("CHROME_PATH").map(PathBuf::from),
        })
    }
}

/// Accepts a URL, or a filesystem path that becomes a `file://` URL.
pub fn resolve_page(raw: &str) -> Result<Url, ConfigError> {
    if raw.contains("://") {
        return Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
            value: raw.to_string(),
            source,
        });
    }
    let path = Path::new(raw);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        path.canonicalize().map_err(|source| ConfigError::MissingFile {
            path: path.to_path_buf(),
            source,
        })?
    };
    Url::from_file_path(&absolute).map_err(|_| ConfigError::NotFileUrl { path: absolute })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_the_reference_page() {
        let cfg = VerifyConfig::from_sources(None, env(&[])).unwrap();
        assert_eq!(cfg.page_url.as_str(), DEFAULT_PAGE);
        assert_eq!(cfg.settle, Duration::from_millis(500));
        assert!(!cfg.strict);
        assert!(cfg.chrome_path.is_none());
    }

    #[test]
    fn cli_argument_beats_environment() {
        let cfg = VerifyConfig::from_sources(
            Some("http://localhost:8080/".to_string()),
            env(&[("SITE_INDEX_URL", "http://example.com/")]),
        )
        .unwrap();
        assert_eq!(cfg.page_url.as_str(), "http://localhost:8080/");

        let cfg =
            VerifyConfig::from_sources(None, env(&[("SITE_INDEX_URL", "http://example.com/")]))
                .unwrap();
        assert_eq!(cfg.page_url.as_str(), "http://example.com/");
    }

    #[test]
    fn filesystem_paths_become_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index.html");
        std::fs::write(&index, "<html></html>").unwrap();

        let url = resolve_page(index.to_str().unwrap()).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/index.html"));
    }

    #[test]
    fn missing_relative_path_is_reported() {
        let err = resolve_page("definitely/not/here.html").unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn tunables_are_validated() {
        let cfg = VerifyConfig::from_sources(
            None,
            env(&[("VERIFY_SETTLE_MS", "1200"), ("VERIFY_STRICT", "Yes")]),
        )
        .unwrap();
        assert_eq!(cfg.settle, Duration::from_millis(1200));
        assert!(cfg.strict);

        let err =
            VerifyConfig::from_sources(None, env(&[("VERIFY_SETTLE_MS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration { .. }));

        let err = VerifyConfig::from_sources(None, env(&[("VERIFY_STRICT", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBool { .. }));
    }
}
