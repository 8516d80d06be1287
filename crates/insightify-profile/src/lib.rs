//! Company profile aggregation
//!
//! This crate answers one question: given a company name, what do public data
//! sources say about it? A lookup combines:
//!
//! - Identity attributes and funding rounds from Wikidata
//! - A ticker symbol and a financial snapshot from Yahoo Finance
//! - A competitor list, taken from the first source that has one
//!
//! # Architecture
//!
//! [`CompanyProfiler`] drives a lookup against two provider traits:
//! - [`KnowledgeGraph`]: entity search and SPARQL lookups ([`WikidataClient`])
//! - [`MarketData`]: symbol search and quote summaries ([`YahooFinanceClient`])
//!
//! Provider failures never fail a lookup; they surface as missing sections or
//! "not available" markers. The [`server`] module exposes the profiler as a
//! single JSON endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use insightify_profile::{CompanyProfiler, CompanyQuery, ProfileConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ProfileConfig::from_env()?;
//!     let profiler = CompanyProfiler::from_config(&config)?;
//!
//!     let profile = profiler.profile(&CompanyQuery::parse("Apple")?).await;
//!     println!("{}", serde_json::to_string_pretty(&profile)?);
//!
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod api;
pub mod competitors;
pub mod config;
pub mod error;
pub mod profile;
pub mod server;
pub mod snapshot;

pub use aggregator::CompanyProfiler;
pub use api::{KnowledgeGraph, MarketData, WikidataClient, YahooFinanceClient};
pub use competitors::{CompetitorResolver, CompetitorSource};
pub use config::{ProfileConfig, ProfileConfigBuilder};
pub use error::{ProfileError, Result};
pub use profile::{
    CompanyProfile, CompanyQuery, CompetitorList, EntityId, FieldValue, FinancialSnapshot,
    FundingRound, KnowledgeAttributes,
};
pub use server::{AppState, router, serve};
