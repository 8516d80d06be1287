//! Profile aggregation
//!
//! One lookup runs these steps in order, each one seeing everything the earlier
//! steps produced:
//!
//! 1. resolve the company to a knowledge graph entity
//! 2. fetch identity attributes and funding rounds (only with an entity)
//! 3. resolve a ticker symbol
//! 4. fetch the financial snapshot (only with a ticker)
//! 5. resolve competitors through [`CompetitorResolver`]
//!
//! No step can fail the lookup. Upstream failures show up as absent sections,
//! "not available" markers or the competitor sentinel.

use crate::api::{KnowledgeGraph, MarketData, WikidataClient, YahooFinanceClient};
use crate::competitors::{CompetitorContext, CompetitorResolver};
use crate::config::ProfileConfig;
use crate::error::Result;
use crate::profile::{CompanyProfile, CompanyQuery, KnowledgeAttributes};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Builds a [`CompanyProfile`] from the two providers
#[derive(Clone)]
pub struct CompanyProfiler {
    knowledge: Arc<dyn KnowledgeGraph>,
    market: Arc<dyn MarketData>,
}

impl CompanyProfiler {
    pub fn new(knowledge: Arc<dyn KnowledgeGraph>, market: Arc<dyn MarketData>) -> Self {
        Self { knowledge, market }
    }

    /// Profiler backed by the Wikidata and Yahoo Finance clients
    pub fn from_config(config: &ProfileConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(WikidataClient::new(config)?),
            Arc::new(YahooFinanceClient::new(config)?),
        ))
    }

    #[instrument(skip(self, query), fields(company = %query.name()))]
    pub async fn profile(&self, query: &CompanyQuery) -> CompanyProfile {
        let name = query.name();

        let entity = self.knowledge.resolve_entity(name).await;
        debug!(entity = ?entity, "entity resolved");

        let (wikidata_details, funding_rounds) = match &entity {
            Some(entity) => {
                let attributes = self.knowledge.fetch_attributes(entity).await;
                let rounds = self.knowledge.fetch_funding_rounds(entity).await;
                (Some(attributes), Some(rounds))
            }
            None => (None, None),
        };

        let ticker = self.market.resolve_ticker(name).await;
        debug!(ticker = ?ticker, "ticker resolved");

        let financial_data = match &ticker {
            Some(ticker) => self.market.fetch_snapshot(ticker).await,
            None => None,
        };

        let ctx = CompetitorContext {
            company_name: name,
            entity: entity.as_ref(),
            ticker: ticker.as_deref(),
            industry_label: wikidata_details
                .as_ref()
                .and_then(KnowledgeAttributes::industry_label),
        };
        let competitors = CompetitorResolver::new(self.knowledge.as_ref(), self.market.as_ref())
            .resolve(&ctx)
            .await;

        info!(
            entity = entity.is_some(),
            ticker = ticker.is_some(),
            financials = financial_data.is_some(),
            competitors = competitors.names().len(),
            "profile assembled"
        );

        CompanyProfile {
            company_name: name.to_string(),
            wikidata_id: entity,
            timestamp: Utc::now(),
            wikidata_details,
            funding_rounds,
            ticker,
            financial_data,
            competitors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockKnowledgeGraph, MockMarketData};
    use crate::profile::{
        CompetitorList, EntityId, FieldValue, FinancialSnapshot, FundingRound,
    };
    use serde_json::{Value, json};

    fn profiler(knowledge: MockKnowledgeGraph, market: MockMarketData) -> CompanyProfiler {
        CompanyProfiler::new(Arc::new(knowledge), Arc::new(market))
    }

    fn query(name: &str) -> CompanyQuery {
        CompanyQuery::parse(name).unwrap()
    }

    fn without_timestamp(profile: &CompanyProfile) -> Value {
        let mut value = serde_json::to_value(profile).unwrap();
        value.as_object_mut().unwrap().remove("timestamp");
        value
    }

    #[tokio::test]
    async fn test_unknown_company_has_only_the_skeleton() {
        let mut knowledge = MockKnowledgeGraph::new();
        let mut market = MockMarketData::new();
        knowledge
            .expect_resolve_entity()
            .withf(|name| name == "Acme Corp")
            .times(1)
            .return_const(None);
        market
            .expect_resolve_ticker()
            .withf(|name| name == "Acme Corp")
            .times(1)
            .return_const(None);

        let profile = profiler(knowledge, market).profile(&query("Acme Corp")).await;

        assert_eq!(
            without_timestamp(&profile),
            json!({
                "company_name": "Acme Corp",
                "wikidata_id": null,
                "ticker": null,
                "competitors": ["No competitors found"]
            })
        );
    }

    #[tokio::test]
    async fn test_entity_without_facts_reports_markers() {
        let mut knowledge = MockKnowledgeGraph::new();
        let mut market = MockMarketData::new();
        knowledge
            .expect_resolve_entity()
            .return_const(EntityId::parse("Q4830453"));
        knowledge
            .expect_fetch_attributes()
            .times(1)
            .return_const(KnowledgeAttributes::not_available());
        knowledge
            .expect_fetch_funding_rounds()
            .times(1)
            .return_const(Vec::<FundingRound>::new());
        knowledge
            .expect_fetch_industry_id()
            .return_const(None);
        knowledge
            .expect_fetch_direct_competitors()
            .return_const(Vec::<String>::new());
        market.expect_resolve_ticker().return_const(None);

        let profile = profiler(knowledge, market).profile(&query("Initech")).await;
        let value = without_timestamp(&profile);

        assert_eq!(value["wikidata_id"], json!("Q4830453"));
        assert_eq!(
            value["wikidata_details"],
            json!({
                "Industry": "N/A",
                "Country": "N/A",
                "Headquarters": "N/A",
                "Founded": "N/A",
                "Employees": "N/A"
            })
        );
        assert_eq!(value["funding_rounds"], json!([]));
        assert!(profile.competitors.is_none_found());
    }

    #[tokio::test]
    async fn test_failed_snapshot_is_omitted() {
        let mut knowledge = MockKnowledgeGraph::new();
        let mut market = MockMarketData::new();
        knowledge.expect_resolve_entity().return_const(None);
        market
            .expect_resolve_ticker()
            .return_const(Some("GLBX".to_string()));
        market
            .expect_fetch_snapshot()
            .withf(|ticker| ticker == "GLBX")
            .times(1)
            .return_const(None);
        market
            .expect_fetch_competitor_hint()
            .return_const(vec!["Initrode".to_string()]);

        let profile = profiler(knowledge, market).profile(&query("Globex")).await;
        let value = without_timestamp(&profile);

        assert_eq!(value["ticker"], json!("GLBX"));
        assert!(value.get("financial_data").is_none());
        assert_eq!(value["competitors"], json!(["Initrode"]));
    }

    #[tokio::test]
    async fn test_full_profile_feeds_industry_into_competitors() {
        let mut knowledge = MockKnowledgeGraph::new();
        let mut market = MockMarketData::new();
        knowledge
            .expect_resolve_entity()
            .return_const(EntityId::parse("Q2283"));
        knowledge
            .expect_fetch_attributes()
            .return_const(KnowledgeAttributes {
                industry: FieldValue::Available("software industry".to_string()),
                country: FieldValue::Available("United States of America".to_string()),
                ..KnowledgeAttributes::not_available()
            });
        knowledge
            .expect_fetch_funding_rounds()
            .return_const(vec![FundingRound {
                round: Some("Series A".to_string()),
                ..Default::default()
            }]);
        knowledge
            .expect_search_industry_id()
            .withf(|label| label == "software industry")
            .times(1)
            .return_const(EntityId::parse("Q638608"));
        knowledge
            .expect_fetch_companies_in_industry()
            .withf(|industry, exclude| {
                industry.as_str() == "Q638608"
                    && exclude.as_ref().map(EntityId::as_str) == Some("Q2283")
            })
            .return_const(vec!["Oracle".to_string(), "SAP".to_string()]);
        market
            .expect_resolve_ticker()
            .return_const(Some("MSFT".to_string()));
        market
            .expect_fetch_snapshot()
            .return_const(Some(FinancialSnapshot::default()));
        market
            .expect_fetch_competitor_hint()
            .return_const(Vec::<String>::new());

        let profile = profiler(knowledge, market).profile(&query("Microsoft")).await;

        assert_eq!(profile.company_name, "Microsoft");
        assert_eq!(profile.ticker.as_deref(), Some("MSFT"));
        assert!(profile.financial_data.is_some());
        assert_eq!(
            profile.competitors,
            CompetitorList::Found(vec!["Oracle".to_string(), "SAP".to_string()])
        );

        let value = without_timestamp(&profile);
        assert_eq!(value["wikidata_details"]["Industry"], json!("software industry"));
        assert_eq!(value["wikidata_details"]["Founded"], json!("N/A"));
        assert_eq!(
            value["funding_rounds"],
            json!([{"round": "Series A", "amount": "Unknown", "currency": "Unknown"}])
        );
    }

    #[tokio::test]
    async fn test_repeated_lookups_differ_only_in_timestamp() {
        let mut knowledge = MockKnowledgeGraph::new();
        let mut market = MockMarketData::new();
        knowledge.expect_resolve_entity().times(2).return_const(None);
        market
            .expect_resolve_ticker()
            .times(2)
            .return_const(Some("ACME".to_string()));
        market
            .expect_fetch_snapshot()
            .times(2)
            .return_const(Some(FinancialSnapshot::default()));
        market
            .expect_fetch_competitor_hint()
            .times(2)
            .return_const(vec!["Globex".to_string()]);

        let profiler = profiler(knowledge, market);
        let first = profiler.profile(&query("Acme Corp")).await;
        let second = profiler.profile(&query("Acme Corp")).await;

        assert_eq!(without_timestamp(&first), without_timestamp(&second));
        assert!(second.timestamp >= first.timestamp);
    }
}
