//! Company profile types
//!
//! Everything here is built fresh for one request and dropped once the response
//! has been serialized.

use crate::error::{ProfileError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Marker substituted for any attribute or metric the upstream did not report
pub const NOT_AVAILABLE: &str = "N/A";

/// Marker for missing fields inside a funding round
pub const UNKNOWN: &str = "Unknown";

/// Sole entry of the competitor list when no tier found anything
pub const NO_COMPETITORS: &str = "No competitors found";

static ENTITY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Q[1-9][0-9]*$").expect("entity id pattern is valid"));

/// Validated company name taken from the request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyQuery(String);

impl CompanyQuery {
    /// Trim the raw name; blank names are rejected like missing ones
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ProfileError::MissingCompanyName);
        }
        Ok(Self(name.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Knowledge graph item identifier (`Q` followed by digits)
///
/// Used for both companies and industries. Construction validates the form, so
/// an `EntityId` can be placed into a query without further escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        ENTITY_ID.is_match(raw).then(|| Self(raw.to_string()))
    }

    /// Parse the trailing path segment of an entity URI
    /// (`http://www.wikidata.org/entity/Q42`)
    pub fn from_uri(uri: &str) -> Option<Self> {
        uri.rsplit('/').next().and_then(Self::parse)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value reported upstream, or the "not available" marker
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<T> {
    Available(T),
    NotAvailable,
}

impl<T> Default for FieldValue<T> {
    fn default() -> Self {
        Self::NotAvailable
    }
}

impl<T> FieldValue<T> {
    pub fn as_available(&self) -> Option<&T> {
        match self {
            Self::Available(value) => Some(value),
            Self::NotAvailable => None,
        }
    }
}

impl<T> From<Option<T>> for FieldValue<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotAvailable, Self::Available)
    }
}

impl<T: Serialize> Serialize for FieldValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Available(value) => value.serialize(serializer),
            Self::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// Identity attributes from the knowledge graph
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KnowledgeAttributes {
    #[serde(rename = "Industry")]
    pub industry: FieldValue<String>,
    #[serde(rename = "Country")]
    pub country: FieldValue<String>,
    #[serde(rename = "Headquarters")]
    pub headquarters: FieldValue<String>,
    #[serde(rename = "Founded")]
    pub founded: FieldValue<String>,
    #[serde(rename = "Employees")]
    pub employees: FieldValue<String>,
}

impl KnowledgeAttributes {
    /// Bundle with every attribute set to the marker
    pub fn not_available() -> Self {
        Self::default()
    }

    /// Industry label, when the knowledge graph reported one
    pub fn industry_label(&self) -> Option<&str> {
        self.industry.as_available().map(String::as_str)
    }
}

/// One investment round recorded against the company
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FundingRound {
    #[serde(serialize_with = "unknown_if_missing")]
    pub round: Option<String>,
    #[serde(serialize_with = "unknown_if_missing")]
    pub amount: Option<String>,
    #[serde(serialize_with = "unknown_if_missing")]
    pub currency: Option<String>,
}

fn unknown_if_missing<S: Serializer>(
    value: &Option<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(UNKNOWN))
}

/// Named metrics of one snapshot section
pub type MetricGroup = BTreeMap<&'static str, FieldValue<serde_json::Value>>;

/// Market data for a ticker, grouped the way the response presents it
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FinancialSnapshot {
    pub company_info: MetricGroup,
    pub market_data: MetricGroup,
    pub financial_metrics: MetricGroup,
    pub income_statement: MetricGroup,
    pub balance_sheet: MetricGroup,
    pub dividend_info: MetricGroup,
}

/// Competitor names, or the explicit "none found" sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompetitorList {
    Found(Vec<String>),
    NoneFound,
}

impl CompetitorList {
    /// Real competitor names; empty for the sentinel
    pub fn names(&self) -> &[String] {
        match self {
            Self::Found(names) => names,
            Self::NoneFound => &[],
        }
    }

    pub fn is_none_found(&self) -> bool {
        matches!(self, Self::NoneFound)
    }
}

impl Serialize for CompetitorList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Found(names) => names.serialize(serializer),
            Self::NoneFound => [NO_COMPETITORS].serialize(serializer),
        }
    }
}

/// Aggregated response for one company
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyProfile {
    pub company_name: String,
    pub wikidata_id: Option<EntityId>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikidata_details: Option<KnowledgeAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_rounds: Option<Vec<FundingRound>>,
    pub ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_data: Option<FinancialSnapshot>,
    pub competitors: CompetitorList,
}
