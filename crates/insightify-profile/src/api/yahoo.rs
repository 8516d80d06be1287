//! Yahoo Finance client
//!
//! Symbol search is a plain GET. The quote summary endpoint additionally wants a
//! session cookie and a crumb, so the client keeps a cookie store and asks for a
//! fresh crumb before every summary lookup.

use super::MarketData;
use crate::config::ProfileConfig;
use crate::error::{ProfileError, Result};
use crate::profile::FinancialSnapshot;
use crate::snapshot::{self, InfoBag};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

const PROVIDER: &str = "yahoo";

/// Quote summary modules merged into the info bag, lowest precedence first
const MODULES: &[&str] = &[
    "assetProfile",
    "summaryProfile",
    "summaryDetail",
    "financialData",
    "defaultKeyStatistics",
    "price",
    "quoteType",
];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    #[serde(default)]
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<InfoBag>>,
    #[serde(default)]
    error: Option<Value>,
}

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    client: Client,
    search_url: String,
    quote_summary_url: String,
    cookie_url: String,
    crumb_url: String,
}

impl YahooFinanceClient {
    /// Create a client for the endpoints in `config`
    pub fn new(config: &ProfileConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.yahoo_user_agent.as_str())
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            search_url: config.yahoo_search_url.clone(),
            quote_summary_url: config.yahoo_quote_summary_url.clone(),
            cookie_url: config.yahoo_cookie_url.clone(),
            crumb_url: config.yahoo_crumb_url.clone(),
        })
    }

    async fn search_symbol(&self, name: &str) -> Result<Option<String>> {
        let url = Url::parse_with_params(&self.search_url, &[("q", name)])
            .map_err(|e| ProfileError::ConfigError(format!("invalid Yahoo search URL: {e}")))?;

        debug!(%name, "searching Yahoo symbols");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ProfileError::UpstreamStatus {
                provider: PROVIDER,
                status: response.status().as_u16(),
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.quotes.into_iter().next().and_then(|quote| quote.symbol))
    }

    async fn fetch_crumb(&self) -> Result<String> {
        // Only the Set-Cookie matters here; the endpoint itself answers 404.
        self.client.get(&self.cookie_url).send().await?;

        let response = self.client.get(&self.crumb_url).send().await?;
        if !response.status().is_success() {
            return Err(ProfileError::UpstreamStatus {
                provider: PROVIDER,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        parse_crumb(&body)
    }

    fn quote_summary_url(&self, ticker: &str, crumb: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.quote_summary_url).map_err(|e| {
            ProfileError::ConfigError(format!("invalid Yahoo quote summary URL: {e}"))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                ProfileError::ConfigError("Yahoo quote summary URL cannot take a path".to_string())
            })?
            .push(ticker);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("modules", &MODULES.join(","));
            if let Some(crumb) = crumb {
                query.append_pair("crumb", crumb);
            }
        }
        Ok(url)
    }

    /// Wide field bag for a ticker
    pub async fn fetch_info(&self, ticker: &str) -> Result<InfoBag> {
        let crumb = match self.fetch_crumb().await {
            Ok(crumb) => Some(crumb),
            Err(e) => {
                warn!(error = %e, "could not obtain Yahoo crumb, continuing without");
                None
            }
        };

        let url = self.quote_summary_url(ticker, crumb.as_deref())?;
        debug!(%ticker, "fetching Yahoo quote summary");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ProfileError::UpstreamStatus {
                provider: PROVIDER,
                status: response.status().as_u16(),
            });
        }

        let body: QuoteSummaryResponse = response.json().await?;
        info_from_summary(body.quote_summary)
    }
}

#[async_trait]
impl MarketData for YahooFinanceClient {
    async fn resolve_ticker(&self, name: &str) -> Option<String> {
        match self.search_symbol(name).await {
            Ok(symbol) => symbol,
            Err(e) => {
                warn!(%name, error = %e, "Yahoo symbol search failed");
                None
            }
        }
    }

    async fn fetch_snapshot(&self, ticker: &str) -> Option<FinancialSnapshot> {
        match self.fetch_info(ticker).await {
            Ok(info) => Some(snapshot::from_info(&info)),
            Err(e) => {
                warn!(%ticker, error = %e, "dropping financial snapshot");
                None
            }
        }
    }

    async fn fetch_competitor_hint(&self, ticker: &str) -> Vec<String> {
        match self.fetch_info(ticker).await {
            Ok(info) => snapshot::competitor_hint(&info),
            Err(e) => {
                warn!(%ticker, error = %e, "Yahoo competitor lookup failed");
                Vec::new()
            }
        }
    }
}

fn parse_crumb(body: &str) -> Result<String> {
    let crumb = body.trim();
    if crumb.is_empty()
        || crumb.len() > 64
        || crumb.contains(char::is_whitespace)
        || crumb.contains('<')
    {
        return Err(ProfileError::payload(PROVIDER, "crumb endpoint returned no crumb"));
    }
    Ok(crumb.to_string())
}

/// `{"raw": 1.5, "fmt": "1.50"}` becomes `1.5`; empty objects carry nothing
fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Object(mut map) => {
            if let Some(raw) = map.remove("raw") {
                Some(raw)
            } else if map.is_empty() {
                None
            } else {
                Some(Value::Object(map))
            }
        }
        other => Some(other),
    }
}

fn info_from_summary(summary: QuoteSummary) -> Result<InfoBag> {
    if let Some(error) = summary.error.filter(|e| !e.is_null()) {
        return Err(ProfileError::payload(PROVIDER, error.to_string()));
    }

    let mut modules = summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProfileError::payload(PROVIDER, "no quoteSummary result"))?;

    let mut info = InfoBag::new();
    for name in MODULES {
        let Some(Value::Object(fields)) = modules.remove(*name) else {
            continue;
        };
        for (key, value) in fields {
            if let Some(value) = normalize(value) {
                info.insert(key, value);
            }
        }
    }
    Ok(info)
}
