use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::Columns;
use crate::domain::{CanonicalIdentifier, Rank, TaxonKey};
use crate::error::TaxochemError;
use crate::resolver::Resolutions;
use crate::table::RawTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonRecord {
    pub name: String,
    pub genus: Option<String>,
    /// Every input cell, in header order.
    pub fields: Vec<String>,
    pub identifier: CanonicalIdentifier,
}

impl TaxonRecord {
    /// Grouping key of this taxon for a run at `rank`.
    pub fn key(&self, rank: Rank) -> Option<TaxonKey> {
        match rank {
            Rank::Species => self.identifier.as_resolved().cloned().map(TaxonKey::Identifier),
            Rank::Genus => self.genus.as_deref().and_then(TaxonKey::genus),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaxonTable {
    pub path: Utf8PathBuf,
    pub headers: Vec<String>,
    pub records: Vec<TaxonRecord>,
    pub identifier_column: String,
}

impl TaxonTable {
    /// Loads the table; the name column is always required, the genus column
    /// only for genus runs. A pre-filled identifier column seeds each record.
    pub fn load(path: &Utf8Path, columns: &Columns, rank: Rank) -> Result<Self, TaxochemError> {
        let raw = RawTable::load(path)?;
        let name_idx = raw.column(&columns.name)?;
        let genus_idx = match rank {
            Rank::Genus => Some(raw.column(&columns.genus)?),
            Rank::Species => raw.column(&columns.genus).ok(),
        };
        let identifier_idx = raw.column(&columns.identifier).ok();

        let records = raw
            .rows
            .into_iter()
            .map(|fields| {
                let cell = |idx: usize| fields.get(idx).map(|v| v.trim()).unwrap_or_default();
                let name = cell(name_idx).to_string();
                let genus = genus_idx
                    .map(cell)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string);
                let identifier = identifier_idx
                    .map(|idx| CanonicalIdentifier::from_cell(cell(idx)))
                    .unwrap_or(CanonicalIdentifier::Unresolved);
                TaxonRecord {
                    name,
                    genus,
                    fields,
                    identifier,
                }
            })
            .collect();

        Ok(Self {
            path: raw.path,
            headers: raw.headers,
            records,
            identifier_column: columns.identifier.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Names of records that still need a registry lookup.
    pub fn pending_names(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(|r| !r.identifier.is_resolved())
            .map(|r| r.name.as_str())
    }

    /// Fills unresolved identifier slots from `resolutions`.
    pub fn annotate(&mut self, resolutions: &Resolutions) {
        for record in &mut self.records {
            if !record.identifier.is_resolved() {
                record.identifier = resolutions.get(&record.name);
            }
        }
    }

    /// Distinct keys in first-seen order.
    pub fn keys(&self, rank: Rank) -> Vec<TaxonKey> {
        let mut seen = BTreeSet::new();
        self.records
            .iter()
            .filter_map(|r| r.key(rank))
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }
}
