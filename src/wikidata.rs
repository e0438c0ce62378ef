use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::TaxonId;
use crate::error::TaxochemError;
use crate::resolver::{NameMatcher, handle_status, http_client};

pub const SPARQL_ENDPOINT: &str = "https://query.wikidata.org/sparql";

/// Wikidata item for the taxonomic rank "species".
const SPECIES_RANK: &str = "Q7432";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesEntry {
    pub id: TaxonId,
    pub label: String,
}

#[derive(Clone)]
pub struct WikidataClient {
    client: Client,
    endpoint: String,
}

impl WikidataClient {
    pub fn new() -> Result<Self, TaxochemError> {
        Self::with_endpoint(SPARQL_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> Result<Self, TaxochemError> {
        Ok(Self {
            client: http_client()?,
            endpoint: endpoint.to_string(),
        })
    }

    /// All species whose parent-taxon chain reaches `genus`.
    pub fn species_in_genus(&self, genus: &TaxonId) -> Result<Vec<SpeciesEntry>, TaxochemError> {
        let raw = self.run_query(&species_query(genus))?;
        parse_species_listing(&raw)
    }

    fn run_query(&self, query: &str) -> Result<Value, TaxochemError> {
        debug!(endpoint = %self.endpoint, "sparql query");
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/sparql-results+json")
            .query(&[("query", query), ("format", "json")])
            .send()
            .map_err(|err| TaxochemError::ResolverHttp(err.to_string()))?;
        let response = handle_status(response)?;
        response
            .json()
            .map_err(|err| TaxochemError::ResolverHttp(err.to_string()))
    }
}

impl NameMatcher for WikidataClient {
    fn match_name(&self, name: &str) -> Result<Option<TaxonId>, TaxochemError> {
        let raw = self.run_query(&label_query(name))?;
        parse_first_match(&raw)
    }
}

pub fn label_query(name: &str) -> String {
    format!(
        "SELECT ?species WHERE {{ ?species rdfs:label \"{}\"@en. }} LIMIT 1",
        escape_literal(name)
    )
}

pub fn species_query(genus: &TaxonId) -> String {
    format!(
        "SELECT ?species ?speciesLabel WHERE {{ \
         ?species wdt:P171* wd:{genus} . \
         ?species wdt:P105 wd:{SPECIES_RANK} . \
         SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"[AUTO_LANGUAGE],en\". }} }}"
    )
}

/// First `?species` binding of a SPARQL JSON result, reduced to its Q-code.
pub fn parse_first_match(raw: &Value) -> Result<Option<TaxonId>, TaxochemError> {
    let bindings = bindings(raw)?;
    let Some(uri) = bindings
        .first()
        .and_then(|b| b.get("species"))
        .and_then(|v| v.get("value"))
        .and_then(|v| v.as_str())
    else {
        return Ok(None);
    };
    entity_id(uri).map(Some)
}

pub fn parse_species_listing(raw: &Value) -> Result<Vec<SpeciesEntry>, TaxochemError> {
    let mut species = Vec::new();
    for binding in bindings(raw)? {
        let uri = binding
            .get("species")
            .and_then(|v| v.get("value"))
            .and_then(|v| v.as_str());
        let label = binding
            .get("speciesLabel")
            .and_then(|v| v.get("value"))
            .and_then(|v| v.as_str());
        if let (Some(uri), Some(label)) = (uri, label) {
            species.push(SpeciesEntry {
                id: entity_id(uri)?,
                label: label.to_string(),
            });
        }
    }
    Ok(species)
}

fn bindings(raw: &Value) -> Result<&Vec<Value>, TaxochemError> {
    raw.get("results")
        .and_then(|v| v.get("bindings"))
        .and_then(|v| v.as_array())
        .ok_or_else(|| TaxochemError::ResolverResponse("missing results.bindings".to_string()))
}

fn entity_id(uri: &str) -> Result<TaxonId, TaxochemError> {
    let re = Regex::new(r"Q\d+$").map_err(|err| TaxochemError::ResolverResponse(err.to_string()))?;
    let id = re
        .find(uri)
        .map(|m| m.as_str())
        .ok_or_else(|| TaxochemError::ResolverResponse(format!("not a Wikidata entity: {uri}")))?;
    id.parse()
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
