use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TaxochemError;

/// Written wherever a taxon could not be matched to a registry entry.
pub const NOT_FOUND: &str = "Not Found";
/// Written wherever a structure carries no classifier output.
pub const NOT_CLASSIFIED: &str = "Not Classified";
/// Written upstream when the classifier call itself failed.
pub const API_ERROR: &str = "API Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    #[default]
    Species,
    Genus,
}

impl Rank {
    /// Sub-directory of the output root that holds per-taxon tables.
    pub fn data_dir(&self) -> &'static str {
        match self {
            Rank::Species => "species_data",
            Rank::Genus => "genus_data",
        }
    }

    /// Precomputed cross-reference column of the reference store.
    pub fn reported_count_column(&self) -> &'static str {
        match self {
            Rank::Species => "Reported_comp_Species",
            Rank::Genus => "Reported_comp_Genus",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Species => write!(f, "species"),
            Rank::Genus => write!(f, "genus"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    #[default]
    Wikidata,
    Opentree,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Wikidata => write!(f, "wikidata"),
            Service::Opentree => write!(f, "opentree"),
        }
    }
}

/// Registry token for a taxon, e.g. a Wikidata Q-code or an OTT id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaxonId(String);

impl TaxonId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaxonId {
    type Err = TaxochemError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        // Ids name per-taxon files, so path separators and blanks are rejected.
        let is_valid = !normalized.is_empty()
            && normalized != NOT_FOUND
            && !normalized
                .chars()
                .any(|ch| ch.is_whitespace() || ch == '/' || ch == '\\' || ch == '|');
        if !is_valid {
            return Err(TaxochemError::InvalidTaxonId(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalIdentifier {
    Resolved(TaxonId),
    Unresolved,
}

impl CanonicalIdentifier {
    /// Reads an identifier cell; blanks, the placeholder and malformed tokens
    /// all count as unresolved.
    pub fn from_cell(value: &str) -> Self {
        value
            .parse::<TaxonId>()
            .map(CanonicalIdentifier::Resolved)
            .unwrap_or(CanonicalIdentifier::Unresolved)
    }

    pub fn as_resolved(&self) -> Option<&TaxonId> {
        match self {
            CanonicalIdentifier::Resolved(id) => Some(id),
            CanonicalIdentifier::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, CanonicalIdentifier::Resolved(_))
    }
}

impl fmt::Display for CanonicalIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalIdentifier::Resolved(id) => write!(f, "{id}"),
            CanonicalIdentifier::Unresolved => write!(f, "{NOT_FOUND}"),
        }
    }
}

impl Serialize for CanonicalIdentifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Key a run groups the reference store by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum TaxonKey {
    Identifier(TaxonId),
    Genus(String),
}

impl TaxonKey {
    pub fn as_str(&self) -> &str {
        match self {
            TaxonKey::Identifier(id) => id.as_str(),
            TaxonKey::Genus(name) => name,
        }
    }

    /// Genus cells become keys only when they hold a usable name.
    pub fn genus(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty()
            || trimmed == NOT_FOUND
            || trimmed.contains(['/', '\\'])
        {
            return None;
        }
        Some(TaxonKey::Genus(trimmed.to_string()))
    }
}

impl fmt::Display for TaxonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One NPClassifier level (pathway, superclass or class) of a structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Classification {
    Classified(String),
    NotClassified,
    LookupFailed,
}

impl Classification {
    pub fn from_cell(value: &str) -> Self {
        match value.trim() {
            "" | NOT_CLASSIFIED => Classification::NotClassified,
            API_ERROR => Classification::LookupFailed,
            other => Classification::Classified(other.to_string()),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Classification::Classified(label) => Some(label),
            Classification::NotClassified | Classification::LookupFailed => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Classified(label) => write!(f, "{label}"),
            Classification::NotClassified => write!(f, "{NOT_CLASSIFIED}"),
            Classification::LookupFailed => write!(f, "{API_ERROR}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_taxon_id_trims() {
        let id: TaxonId = " Q123 ".parse().unwrap();
        assert_eq!(id.as_str(), "Q123");
    }

    #[test]
    fn parse_taxon_id_rejects_placeholder() {
        let err = NOT_FOUND.parse::<TaxonId>().unwrap_err();
        assert_matches!(err, TaxochemError::InvalidTaxonId(_));
    }

    #[test]
    fn identifier_cell_round_trip() {
        assert_eq!(CanonicalIdentifier::from_cell(""), CanonicalIdentifier::Unresolved);
        assert_eq!(CanonicalIdentifier::from_cell("Not Found").to_string(), NOT_FOUND);
        assert_eq!(CanonicalIdentifier::from_cell("Q42").to_string(), "Q42");
    }

    #[test]
    fn classification_sentinels() {
        assert_eq!(Classification::from_cell("  "), Classification::NotClassified);
        assert_eq!(Classification::from_cell("API Error"), Classification::LookupFailed);
        assert_eq!(Classification::from_cell("Alkaloids").label(), Some("Alkaloids"));
        assert_eq!(Classification::LookupFailed.to_string(), API_ERROR);
    }
}
