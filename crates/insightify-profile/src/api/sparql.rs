//! SPARQL query construction and result decoding for the Wikidata query service
//!
//! Queries are assembled from typed parameters only: item ids arrive as
//! [`EntityId`] (validated `Q<digits>`), free text goes through
//! [`string_literal`]. Nothing user supplied is pasted into a template verbatim.

use crate::profile::EntityId;
use serde::Deserialize;
use std::collections::HashMap;

/// Item classified as "industry"; label searches are restricted to its subclasses
const INDUSTRY_CLASS: &str = "Q8148";

/// `SELECT` response in the SPARQL 1.1 JSON results format
#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResponse {
    #[serde(default)]
    pub results: Option<SparqlResults>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub bindings: Vec<Row>,
}

/// One bound RDF term
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Binding {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// One solution: variable name to bound term; unbound OPTIONAL variables are absent
pub type Row = HashMap<String, Binding>;

impl SparqlResponse {
    pub fn into_rows(self) -> Vec<Row> {
        self.results.map(|r| r.bindings).unwrap_or_default()
    }
}

/// Value bound to `var` in `row`, if any
pub fn value<'a>(row: &'a Row, var: &str) -> Option<&'a str> {
    row.get(var).map(|binding| binding.value.as_str())
}

/// Quote `raw` as a SPARQL string literal, escaping every ECHAR
pub fn string_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn item(id: &EntityId) -> String {
    format!("wd:{id}")
}

fn label_service(language: &str) -> String {
    format!(
        "SERVICE wikibase:label {{ bd:serviceParam wikibase:language {}. }}",
        string_literal(language)
    )
}

/// Industry, country, headquarters, inception and employee count; at most one row
pub fn attributes_query(entity: &EntityId, language: &str) -> String {
    let subject = item(entity);
    format!(
        "SELECT ?industryLabel ?countryLabel ?hqLabel ?founded ?employees WHERE {{
  OPTIONAL {{ {subject} wdt:P452 ?industry. }}
  OPTIONAL {{ {subject} wdt:P17 ?country. }}
  OPTIONAL {{ {subject} wdt:P159 ?hq. }}
  OPTIONAL {{ {subject} wdt:P571 ?founded. }}
  OPTIONAL {{ {subject} wdt:P1128 ?employees. }}
  {}
}} LIMIT 1",
        label_service(language)
    )
}

/// Investments that name the entity as recipient
pub fn funding_rounds_query(entity: &EntityId, language: &str) -> String {
    format!(
        "SELECT ?investmentLabel ?amount ?currencyLabel WHERE {{
  ?investment wdt:P3320 {}.
  OPTIONAL {{ ?investment wdt:P4999 ?amount. }}
  OPTIONAL {{ ?investment wdt:P38 ?currency. }}
  {}
}}",
        item(entity),
        label_service(language)
    )
}

/// Competitors recorded directly on the entity
pub fn direct_competitors_query(entity: &EntityId, language: &str) -> String {
    format!(
        "SELECT ?competitorLabel WHERE {{
  {} wdt:P4886 ?competitor.
  {}
}}",
        item(entity),
        label_service(language)
    )
}

/// Industries the entity is classified under
pub fn industry_of_query(entity: &EntityId) -> String {
    format!(
        "SELECT ?industry WHERE {{
  {} wdt:P452 ?industry.
}}",
        item(entity)
    )
}

/// Industry item whose label in `language` is exactly `label`
pub fn industry_by_label_query(label: &str, language: &str) -> String {
    format!(
        "SELECT ?industry WHERE {{
  ?industry rdfs:label {}@{language};
            wdt:P31/wdt:P279* wd:{INDUSTRY_CLASS}.
}}
LIMIT 1",
        string_literal(label)
    )
}

/// Every company classified under `industry`, optionally leaving one out
pub fn companies_in_industry_query(
    industry: &EntityId,
    exclude: Option<&EntityId>,
    language: &str,
) -> String {
    let filter = exclude
        .map(|id| format!("\n  FILTER (?company != {})", item(id)))
        .unwrap_or_default();
    format!(
        "SELECT DISTINCT ?company ?companyLabel WHERE {{
  ?company wdt:P452 {}.{filter}
  {}
}}
ORDER BY DESC(?company)",
        item(industry),
        label_service(language)
    )
}
