//! Competitor discovery
//!
//! Three sources are tried in a fixed order and the first one that produces any
//! name wins; later sources are never queried after that.

use crate::api::{KnowledgeGraph, MarketData};
use crate::profile::{CompetitorList, EntityId};
use std::collections::HashSet;
use tracing::debug;

/// Where a competitor list can come from, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompetitorSource {
    /// Names the market-data provider lists for the ticker
    MarketHint,
    /// Other companies classified under the same industry
    IndustryPeers,
    /// The knowledge graph's own competitor relation
    DirectRelation,
}

impl CompetitorSource {
    pub const CHAIN: [Self; 3] = [Self::MarketHint, Self::IndustryPeers, Self::DirectRelation];
}

/// What is known about the company by the time competitors are resolved
#[derive(Debug, Clone, Copy)]
pub struct CompetitorContext<'a> {
    pub company_name: &'a str,
    pub entity: Option<&'a EntityId>,
    pub ticker: Option<&'a str>,
    pub industry_label: Option<&'a str>,
}

/// Runs [`CompetitorSource::CHAIN`] against the two providers
pub struct CompetitorResolver<'a> {
    knowledge: &'a dyn KnowledgeGraph,
    market: &'a dyn MarketData,
}

impl<'a> CompetitorResolver<'a> {
    pub fn new(knowledge: &'a dyn KnowledgeGraph, market: &'a dyn MarketData) -> Self {
        Self { knowledge, market }
    }

    pub async fn resolve(&self, ctx: &CompetitorContext<'_>) -> CompetitorList {
        for source in CompetitorSource::CHAIN {
            let names = distinct(self.candidates(source, ctx).await);
            if !names.is_empty() {
                debug!(?source, count = names.len(), "competitors resolved");
                return CompetitorList::Found(names);
            }
            debug!(?source, "no competitors from source");
        }
        CompetitorList::NoneFound
    }

    async fn candidates(&self, source: CompetitorSource, ctx: &CompetitorContext<'_>) -> Vec<String> {
        match source {
            CompetitorSource::MarketHint => {
                let Some(ticker) = ctx.ticker else {
                    return Vec::new();
                };
                self.market
                    .fetch_competitor_hint(ticker)
                    .await
                    .into_iter()
                    .filter(|name| name != ctx.company_name)
                    .collect()
            }
            CompetitorSource::IndustryPeers => self.industry_peers(ctx).await,
            CompetitorSource::DirectRelation => match ctx.entity {
                Some(entity) => self.knowledge.fetch_direct_competitors(entity).await,
                None => Vec::new(),
            },
        }
    }

    async fn industry_peers(&self, ctx: &CompetitorContext<'_>) -> Vec<String> {
        let mut industry = None;
        if let Some(label) = ctx.industry_label {
            industry = self.knowledge.search_industry_id(label).await;
        }
        if industry.is_none() {
            if let Some(entity) = ctx.entity {
                industry = self.knowledge.fetch_industry_id(entity).await;
            }
        }

        let Some(industry) = industry else {
            return Vec::new();
        };
        self.knowledge
            .fetch_companies_in_industry(&industry, ctx.entity.cloned())
            .await
    }
}

fn distinct(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
