//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup from values the
//! binary reads, then passed into controllers. Library code never reads
//! process-wide environment variables during request handling; that
//! keeps behaviour consistent across runtimes and test harnesses.

use crate::error::{ControllerError, ControllerResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Startup configuration for one client process.
#[derive(Clone, Debug)]
pub struct AppConfig {
    base_url: String,
    api_token: Option<String>,
    page_size: u32,
}

impl AppConfig {
    pub fn new(
        base_url: String,
        api_token: Option<String>,
        page_size: u32,
    ) -> ControllerResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ControllerError::Config("base url cannot be empty".into()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ControllerError::Config(format!(
                "base url {base_url:?} must start with http:// or https://"
            )));
        }
        if page_size == 0 {
            return Err(ControllerError::Config("page size must be at least 1".into()));
        }
        let api_token = api_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(Self {
            base_url,
            api_token,
            page_size,
        })
    }

    /// Builds a config from optional raw values (normally environment
    /// variables read by the binary), applying defaults for the rest.
    pub fn from_values(
        base_url: Option<String>,
        api_token: Option<String>,
        page_size: Option<String>,
    ) -> ControllerResult<Self> {
        let base_url = base_url
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let page_size = match page_size.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                ControllerError::Config(format!("page size {raw:?} is not a number"))
            })?,
            None => DEFAULT_PAGE_SIZE,
        };
        Self::new(base_url, api_token, page_size)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_values_are_absent() {
        let config = AppConfig::from_values(None, None, None).unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.api_token(), None);
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_trailing_slash_and_blank_token_are_normalised() {
        let config = AppConfig::from_values(
            Some("https://clinic.example/api/".into()),
            Some("   ".into()),
            Some("25".into()),
        )
        .unwrap();
        assert_eq!(config.base_url(), "https://clinic.example/api");
        assert_eq!(config.api_token(), None);
        assert_eq!(config.page_size(), 25);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(AppConfig::new("ftp://x".into(), None, 10).is_err());
        assert!(AppConfig::new("http://x".into(), None, 0).is_err());
        assert!(AppConfig::from_values(None, None, Some("ten".into())).is_err());
    }
}
