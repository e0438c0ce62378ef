use reqwest::blocking::Client;
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::TaxonId;
use crate::error::TaxochemError;
use crate::resolver::{NameMatcher, handle_status, http_client};

pub const TNRS_ENDPOINT: &str = "https://api.opentreeoflife.org/v3/tnrs/match_names";

/// Open Tree of Life taxonomic name resolution; identifiers are OTT ids.
#[derive(Clone)]
pub struct OpenTreeClient {
    client: Client,
    endpoint: String,
}

impl OpenTreeClient {
    pub fn new() -> Result<Self, TaxochemError> {
        Self::with_endpoint(TNRS_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> Result<Self, TaxochemError> {
        Ok(Self {
            client: http_client()?,
            endpoint: endpoint.to_string(),
        })
    }
}

impl NameMatcher for OpenTreeClient {
    fn match_name(&self, name: &str) -> Result<Option<TaxonId>, TaxochemError> {
        debug!(endpoint = %self.endpoint, taxon = name, "tnrs match_names");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "names": [name] }))
            .send()
            .map_err(|err| TaxochemError::ResolverHttp(err.to_string()))?;
        let response = handle_status(response)?;
        let raw: Value = response
            .json()
            .map_err(|err| TaxochemError::ResolverHttp(err.to_string()))?;
        parse_match_names(&raw)
    }
}

pub fn parse_match_names(raw: &Value) -> Result<Option<TaxonId>, TaxochemError> {
    let results = raw
        .get("results")
        .and_then(|v| v.as_array())
        .ok_or_else(|| TaxochemError::ResolverResponse("missing results".to_string()))?;
    let ott_id = results
        .first()
        .and_then(|r| r.get("matches"))
        .and_then(|v| v.as_array())
        .and_then(|matches| matches.first())
        .and_then(|m| m.get("taxon"))
        .and_then(|t| t.get("ott_id"));
    match ott_id {
        None => Ok(None),
        Some(Value::Number(n)) => n.to_string().parse().map(Some),
        Some(Value::String(s)) => s.parse().map(Some),
        Some(other) => Err(TaxochemError::ResolverResponse(format!(
            "unexpected ott_id: {other}"
        ))),
    }
}
