use thiserror::Error;
use url::Url;

pub const BASE_URL_ENV: &str = "BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Base URL `{0}` must use http or https")]
    UnsupportedScheme(String),
}

/// Resolve the service base URL, falling back to [`DEFAULT_BASE_URL`] when unset or blank.
///
/// The returned URL always ends with `/` so endpoint paths join beneath it rather than replacing
/// its last segment.
pub fn resolve_base_url(raw: Option<&str>) -> Result<Url, ConfigError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_BASE_URL);

    let mut url = Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(raw.to_string()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
