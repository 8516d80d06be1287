//! API clients for the upstream data providers
//!
//! Both provider traits are infallible by signature: implementations swallow
//! transport, status and decoding failures and hand back "no data" instead.
//! The one exception is [`MarketData::fetch_snapshot`], which drops the whole
//! snapshot rather than returning a partially mapped one.

pub mod sparql;
pub mod wikidata;
pub mod yahoo;

use crate::profile::{EntityId, FinancialSnapshot, FundingRound, KnowledgeAttributes};
use async_trait::async_trait;

pub use wikidata::WikidataClient;
pub use yahoo::YahooFinanceClient;

/// Structured knowledge graph (Wikidata in production)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KnowledgeGraph: Send + Sync {
    /// Best match for a company name
    async fn resolve_entity(&self, name: &str) -> Option<EntityId>;

    /// Identity attributes; anything missing becomes the "not available" marker
    async fn fetch_attributes(&self, entity: &EntityId) -> KnowledgeAttributes;

    /// Funding rounds recorded against the entity, possibly none
    async fn fetch_funding_rounds(&self, entity: &EntityId) -> Vec<FundingRound>;

    /// Names linked to the entity by the competitor relation
    async fn fetch_direct_competitors(&self, entity: &EntityId) -> Vec<String>;

    /// Industry the entity is classified under
    async fn fetch_industry_id(&self, entity: &EntityId) -> Option<EntityId>;

    /// Industry item whose label is exactly `industry`
    async fn search_industry_id(&self, industry: &str) -> Option<EntityId>;

    /// Every company in the industry except `exclude`, by descending entity id
    async fn fetch_companies_in_industry(
        &self,
        industry: &EntityId,
        exclude: Option<EntityId>,
    ) -> Vec<String>;
}

/// Financial market data (Yahoo Finance in production)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Ticker symbol of the first search hit for a company name
    async fn resolve_ticker(&self, name: &str) -> Option<String>;

    /// Full snapshot, or nothing at all if any part of the lookup failed
    async fn fetch_snapshot(&self, ticker: &str) -> Option<FinancialSnapshot>;

    /// Competitor names the provider lists for the ticker
    async fn fetch_competitor_hint(&self, ticker: &str) -> Vec<String>;
}
