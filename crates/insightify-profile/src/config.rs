//! Configuration for company profile lookups

use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Configuration for the upstream providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Wikidata MediaWiki API (entity search)
    pub wikidata_api_url: String,

    /// Wikidata SPARQL endpoint
    pub wikidata_sparql_url: String,

    /// User-Agent sent to Wikidata (their policy asks for a contactable agent)
    pub wikidata_user_agent: String,

    /// Yahoo Finance symbol search endpoint
    pub yahoo_search_url: String,

    /// Yahoo Finance quote summary endpoint, ticker is appended as a path segment
    pub yahoo_quote_summary_url: String,

    /// Endpoint that hands out the Yahoo session cookie
    pub yahoo_cookie_url: String,

    /// Endpoint that exchanges the session cookie for a crumb
    pub yahoo_crumb_url: String,

    /// User-Agent sent to Yahoo; the default client identifier gets rejected
    pub yahoo_user_agent: String,

    /// Label language for knowledge graph lookups
    pub language: String,

    /// Timeout applied to every outbound request
    pub request_timeout: Duration,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            wikidata_api_url: "https://www.wikidata.org/w/api.php".to_string(),
            wikidata_sparql_url: "https://query.wikidata.org/sparql".to_string(),
            wikidata_user_agent: concat!(
                "insightify/",
                env!("CARGO_PKG_VERSION"),
                " (https://github.com/insightify/insightify)"
            )
            .to_string(),
            yahoo_search_url: "https://query2.finance.yahoo.com/v1/finance/search".to_string(),
            yahoo_quote_summary_url: "https://query2.finance.yahoo.com/v10/finance/quoteSummary"
                .to_string(),
            yahoo_cookie_url: "https://fc.yahoo.com".to_string(),
            yahoo_crumb_url: "https://query2.finance.yahoo.com/v1/test/getcrumb".to_string(),
            yahoo_user_agent: "Mozilla/5.0".to_string(),
            language: "en".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ProfileConfig {
    /// Create a new configuration builder
    pub fn builder() -> ProfileConfigBuilder {
        ProfileConfigBuilder::default()
    }

    /// Defaults overridden by `INSIGHTIFY_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("wikidata_api_url", &self.wikidata_api_url),
            ("wikidata_sparql_url", &self.wikidata_sparql_url),
            ("yahoo_search_url", &self.yahoo_search_url),
            ("yahoo_quote_summary_url", &self.yahoo_quote_summary_url),
            ("yahoo_cookie_url", &self.yahoo_cookie_url),
            ("yahoo_crumb_url", &self.yahoo_crumb_url),
        ] {
            Url::parse(value)
                .map_err(|e| ProfileError::ConfigError(format!("{name} is not a valid URL: {e}")))?;
        }

        if self.wikidata_user_agent.trim().is_empty() || self.yahoo_user_agent.trim().is_empty() {
            return Err(ProfileError::ConfigError(
                "user agents must not be empty".to_string(),
            ));
        }

        if self.language.is_empty()
            || !self
                .language
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ProfileError::ConfigError(format!(
                "invalid label language '{}'",
                self.language
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(ProfileError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for ProfileConfig
#[derive(Debug, Default)]
pub struct ProfileConfigBuilder {
    wikidata_api_url: Option<String>,
    wikidata_sparql_url: Option<String>,
    wikidata_user_agent: Option<String>,
    yahoo_search_url: Option<String>,
    yahoo_quote_summary_url: Option<String>,
    yahoo_cookie_url: Option<String>,
    yahoo_crumb_url: Option<String>,
    yahoo_user_agent: Option<String>,
    language: Option<String>,
    request_timeout: Option<Duration>,
}

impl ProfileConfigBuilder {
    /// Set the Wikidata entity search API
    pub fn wikidata_api_url(mut self, url: impl Into<String>) -> Self {
        self.wikidata_api_url = Some(url.into());
        self
    }

    /// Set the Wikidata SPARQL endpoint
    pub fn wikidata_sparql_url(mut self, url: impl Into<String>) -> Self {
        self.wikidata_sparql_url = Some(url.into());
        self
    }

    /// Set the User-Agent sent to Wikidata
    pub fn wikidata_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.wikidata_user_agent = Some(user_agent.into());
        self
    }

    /// Set the Yahoo symbol search endpoint
    pub fn yahoo_search_url(mut self, url: impl Into<String>) -> Self {
        self.yahoo_search_url = Some(url.into());
        self
    }

    /// Set the Yahoo quote summary endpoint
    pub fn yahoo_quote_summary_url(mut self, url: impl Into<String>) -> Self {
        self.yahoo_quote_summary_url = Some(url.into());
        self
    }

    /// Set the Yahoo cookie and crumb endpoints
    pub fn yahoo_session_urls(
        mut self,
        cookie_url: impl Into<String>,
        crumb_url: impl Into<String>,
    ) -> Self {
        self.yahoo_cookie_url = Some(cookie_url.into());
        self.yahoo_crumb_url = Some(crumb_url.into());
        self
    }

    /// Set the User-Agent sent to Yahoo
    pub fn yahoo_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.yahoo_user_agent = Some(user_agent.into());
        self
    }

    /// Set the label language
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Load overrides from environment
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(language) = var("INSIGHTIFY_LANGUAGE") {
            self.language = Some(language);
        }
        if let Some(secs) =
            var("INSIGHTIFY_REQUEST_TIMEOUT_SECS").and_then(|s| s.trim().parse::<u64>().ok())
        {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(user_agent) = var("INSIGHTIFY_WIKIDATA_USER_AGENT") {
            self.wikidata_user_agent = Some(user_agent);
        }
        if let Some(user_agent) = var("INSIGHTIFY_YAHOO_USER_AGENT") {
            self.yahoo_user_agent = Some(user_agent);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ProfileConfig> {
        let defaults = ProfileConfig::default();

        let config = ProfileConfig {
            wikidata_api_url: self.wikidata_api_url.unwrap_or(defaults.wikidata_api_url),
            wikidata_sparql_url: self
                .wikidata_sparql_url
                .unwrap_or(defaults.wikidata_sparql_url),
            wikidata_user_agent: self
                .wikidata_user_agent
                .unwrap_or(defaults.wikidata_user_agent),
            yahoo_search_url: self.yahoo_search_url.unwrap_or(defaults.yahoo_search_url),
            yahoo_quote_summary_url: self
                .yahoo_quote_summary_url
                .unwrap_or(defaults.yahoo_quote_summary_url),
            yahoo_cookie_url: self.yahoo_cookie_url.unwrap_or(defaults.yahoo_cookie_url),
            yahoo_crumb_url: self.yahoo_crumb_url.unwrap_or(defaults.yahoo_crumb_url),
            yahoo_user_agent: self.yahoo_user_agent.unwrap_or(defaults.yahoo_user_agent),
            language: self.language.unwrap_or(defaults.language),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}
