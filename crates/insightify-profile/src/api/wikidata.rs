//! Wikidata client: entity search plus SPARQL lookups
//!
//! Every lookup degrades to "no data" on failure. The failure is logged at
//! `warn` and never reaches the caller.

use super::KnowledgeGraph;
use super::sparql::{self, Row, SparqlResponse};
use crate::config::ProfileConfig;
use crate::error::{ProfileError, Result};
use crate::profile::{EntityId, FieldValue, FundingRound, KnowledgeAttributes};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

const PROVIDER: &str = "wikidata";
const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// `wbsearchentities` response, reduced to what we read
#[derive(Debug, Deserialize)]
struct EntitySearchResponse {
    #[serde(default)]
    search: Vec<EntitySearchHit>,
}

#[derive(Debug, Deserialize)]
struct EntitySearchHit {
    id: String,
}

/// Wikidata API client
#[derive(Debug, Clone)]
pub struct WikidataClient {
    client: Client,
    api_url: String,
    sparql_url: String,
    language: String,
}

impl WikidataClient {
    /// Create a client for the endpoints in `config`
    pub fn new(config: &ProfileConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.wikidata_user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: config.wikidata_api_url.clone(),
            sparql_url: config.wikidata_sparql_url.clone(),
            language: config.language.clone(),
        })
    }

    async fn search_entity(&self, name: &str) -> Result<Option<EntityId>> {
        let url = Url::parse_with_params(
            &self.api_url,
            &[
                ("action", "wbsearchentities"),
                ("search", name),
                ("language", self.language.as_str()),
                ("format", "json"),
            ],
        )
        .map_err(|e| ProfileError::ConfigError(format!("invalid Wikidata API URL: {e}")))?;

        debug!(%name, "searching Wikidata entities");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ProfileError::UpstreamStatus {
                provider: PROVIDER,
                status: response.status().as_u16(),
            });
        }

        let body: EntitySearchResponse = response.json().await?;
        Ok(first_hit(body))
    }

    async fn try_select(&self, query: &str) -> Result<Vec<Row>> {
        let response = self
            .client
            .get(&self.sparql_url)
            .query(&[("query", query), ("format", "json")])
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProfileError::UpstreamStatus {
                provider: PROVIDER,
                status: response.status().as_u16(),
            });
        }

        let body: SparqlResponse = response.json().await?;
        Ok(body.into_rows())
    }

    /// Run a SELECT query; any failure yields no rows
    pub async fn select(&self, query: &str) -> Vec<Row> {
        debug!(%query, "running SPARQL query");
        match self.try_select(query).await {
            Ok(rows) => {
                debug!(rows = rows.len(), "SPARQL query returned");
                rows
            }
            Err(e) => {
                warn!(error = %e, "SPARQL query failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl KnowledgeGraph for WikidataClient {
    async fn resolve_entity(&self, name: &str) -> Option<EntityId> {
        match self.search_entity(name).await {
            Ok(entity) => entity,
            Err(e) => {
                warn!(%name, error = %e, "Wikidata entity search failed");
                None
            }
        }
    }

    async fn fetch_attributes(&self, entity: &EntityId) -> KnowledgeAttributes {
        let rows = self
            .select(&sparql::attributes_query(entity, &self.language))
            .await;
        attributes_from_rows(&rows)
    }

    async fn fetch_funding_rounds(&self, entity: &EntityId) -> Vec<FundingRound> {
        let rows = self
            .select(&sparql::funding_rounds_query(entity, &self.language))
            .await;
        funding_rounds_from_rows(&rows)
    }

    async fn fetch_direct_competitors(&self, entity: &EntityId) -> Vec<String> {
        let rows = self
            .select(&sparql::direct_competitors_query(entity, &self.language))
            .await;
        labels(&rows, "competitorLabel")
    }

    async fn fetch_industry_id(&self, entity: &EntityId) -> Option<EntityId> {
        let rows = self.select(&sparql::industry_of_query(entity)).await;
        first_entity(&rows, "industry")
    }

    async fn search_industry_id(&self, industry: &str) -> Option<EntityId> {
        let rows = self
            .select(&sparql::industry_by_label_query(industry, &self.language))
            .await;
        first_entity(&rows, "industry")
    }

    async fn fetch_companies_in_industry(
        &self,
        industry: &EntityId,
        exclude: Option<EntityId>,
    ) -> Vec<String> {
        let query = sparql::companies_in_industry_query(industry, exclude.as_ref(), &self.language);
        let rows = self.select(&query).await;
        labels(&rows, "companyLabel")
    }
}

fn first_hit(response: EntitySearchResponse) -> Option<EntityId> {
    let hit = response.search.into_iter().next()?;
    let entity = EntityId::parse(&hit.id);
    if entity.is_none() {
        warn!(id = %hit.id, "ignoring malformed Wikidata entity id");
    }
    entity
}

fn attribute(row: Option<&Row>, var: &str) -> FieldValue<String> {
    row.and_then(|row| sparql::value(row, var))
        .map(str::to_string)
        .into()
}

fn attributes_from_rows(rows: &[Row]) -> KnowledgeAttributes {
    let row = rows.first();
    KnowledgeAttributes {
        industry: attribute(row, "industryLabel"),
        country: attribute(row, "countryLabel"),
        headquarters: attribute(row, "hqLabel"),
        founded: attribute(row, "founded"),
        employees: attribute(row, "employees"),
    }
}

fn funding_rounds_from_rows(rows: &[Row]) -> Vec<FundingRound> {
    rows.iter()
        .map(|row| FundingRound {
            round: sparql::value(row, "investmentLabel").map(str::to_string),
            amount: sparql::value(row, "amount").map(str::to_string),
            currency: sparql::value(row, "currencyLabel").map(str::to_string),
        })
        .collect()
}

fn labels(rows: &[Row], var: &str) -> Vec<String> {
    rows.iter()
        .filter_map(|row| sparql::value(row, var))
        .map(str::to_string)
        .collect()
}

fn first_entity(rows: &[Row], var: &str) -> Option<EntityId> {
    rows.first()
        .and_then(|row| sparql::value(row, var))
        .and_then(EntityId::from_uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub;
    use serde_json::{Value, json};

    fn rows(value: Value) -> Vec<Row> {
        serde_json::from_value::<SparqlResponse>(value)
            .unwrap()
            .into_rows()
    }

    fn literal(value: &str) -> Value {
        json!({"type": "literal", "value": value})
    }

    fn uri(value: &str) -> Value {
        json!({"type": "uri", "value": value})
    }

    #[test]
    fn test_first_hit_takes_first_search_result() {
        let response: EntitySearchResponse = serde_json::from_value(json!({
            "searchinfo": {"search": "Google"},
            "search": [{"id": "Q95", "label": "Google"}, {"id": "Q20800404"}],
            "success": 1
        }))
        .unwrap();
        assert_eq!(first_hit(response), EntityId::parse("Q95"));
    }

    #[test]
    fn test_first_hit_empty_search() {
        let response: EntitySearchResponse =
            serde_json::from_value(json!({"search": [], "success": 1})).unwrap();
        assert_eq!(first_hit(response), None);

        let response: EntitySearchResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(first_hit(response), None);
    }

    #[test]
    fn test_attributes_partial_row() {
        let rows = rows(json!({"results": {"bindings": [{
            "industryLabel": literal("internet industry"),
            "countryLabel": literal("United States of America"),
            "founded": literal("1998-09-04T00:00:00Z")
        }]}}));

        let attributes = attributes_from_rows(&rows);
        assert_eq!(attributes.industry_label(), Some("internet industry"));
        assert_eq!(
            attributes.founded,
            FieldValue::Available("1998-09-04T00:00:00Z".to_string())
        );
        assert_eq!(attributes.headquarters, FieldValue::NotAvailable);
        assert_eq!(attributes.employees, FieldValue::NotAvailable);
    }

    #[test]
    fn test_attributes_without_rows_are_all_markers() {
        assert_eq!(
            attributes_from_rows(&[]),
            KnowledgeAttributes::not_available()
        );
    }

    #[test]
    fn test_funding_rounds_keep_missing_fields_empty() {
        let rows = rows(json!({"results": {"bindings": [
            {"investmentLabel": literal("Series B"), "amount": literal("+25000000"), "currencyLabel": literal("United States dollar")},
            {"investmentLabel": literal("seed round")}
        ]}}));

        let rounds = funding_rounds_from_rows(&rows);
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].amount.as_deref(), Some("+25000000"));
        assert_eq!(rounds[1].round.as_deref(), Some("seed round"));
        assert_eq!(rounds[1].currency, None);
    }

    #[test]
    fn test_labels_skip_unbound_rows() {
        let rows = rows(json!({"results": {"bindings": [
            {"company": uri("http://www.wikidata.org/entity/Q2283"), "companyLabel": literal("Microsoft")},
            {"company": uri("http://www.wikidata.org/entity/Q312")}
        ]}}));
        assert_eq!(labels(&rows, "companyLabel"), vec!["Microsoft".to_string()]);
    }

    #[test]
    fn test_first_entity_reads_uri_suffix() {
        let rows = rows(json!({"results": {"bindings": [
            {"industry": uri("http://www.wikidata.org/entity/Q880371")},
            {"industry": uri("http://www.wikidata.org/entity/Q11661")}
        ]}}));
        assert_eq!(first_entity(&rows, "industry"), EntityId::parse("Q880371"));
        assert_eq!(first_entity(&[], "industry"), None);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_degrades_to_empty() {
        let config = ProfileConfig::builder()
            .wikidata_api_url("http://127.0.0.1:9/w/api.php")
            .wikidata_sparql_url("http://127.0.0.1:9/sparql")
            .request_timeout(std::time::Duration::from_secs(2))
            .build()
            .unwrap();
        let client = WikidataClient::new(&config).unwrap();
        let entity = EntityId::parse("Q95").unwrap();

        assert_eq!(client.resolve_entity("Google").await, None);
        assert_eq!(
            client.fetch_attributes(&entity).await,
            KnowledgeAttributes::not_available()
        );
        assert!(client.fetch_funding_rounds(&entity).await.is_empty());
        assert!(client.fetch_direct_competitors(&entity).await.is_empty());
        assert_eq!(client.fetch_industry_id(&entity).await, None);
    }

    #[tokio::test]
    async fn test_error_status_and_bad_payload_degrade() {
        for (status, body) in stub::FAILING_ANSWERS {
            let base = stub::upstream(status, body).await;
            let config = ProfileConfig::builder()
                .wikidata_api_url(format!("{base}/w/api.php"))
                .wikidata_sparql_url(format!("{base}/sparql"))
                .build()
                .unwrap();
            let client = WikidataClient::new(&config).unwrap();
            let entity = EntityId::parse("Q95").unwrap();

            let search = client.search_entity("Google").await;
            let select = client.try_select("SELECT ?s WHERE { ?s ?p ?o }").await;
            if status.is_success() {
                assert!(matches!(search, Err(ProfileError::NetworkError(ref e)) if e.is_decode()));
                assert!(matches!(select, Err(ProfileError::NetworkError(ref e)) if e.is_decode()));
            } else {
                assert!(matches!(
                    search,
                    Err(ProfileError::UpstreamStatus { provider: "wikidata", status: 503 })
                ));
                assert!(matches!(
                    select,
                    Err(ProfileError::UpstreamStatus { provider: "wikidata", status: 503 })
                ));
            }

            assert_eq!(client.resolve_entity("Google").await, None);
            assert_eq!(
                client.fetch_attributes(&entity).await,
                KnowledgeAttributes::not_available()
            );
            assert!(client.fetch_funding_rounds(&entity).await.is_empty());
            assert!(client.fetch_direct_competitors(&entity).await.is_empty());
            assert_eq!(client.search_industry_id("software industry").await, None);
        }
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_resolve_entity_live() {
        let client = WikidataClient::new(&ProfileConfig::default()).unwrap();
        let entity = client.resolve_entity("Google").await;
        assert!(entity.is_some());
    }
}
