use std::collections::BTreeMap;

use crate::domain::{CanonicalIdentifier, Rank, TaxonKey};
use crate::error::TaxochemError;
use crate::occurrence::OccurrenceTable;
use crate::resolver::Resolutions;
use crate::summary::ClassificationSummary;
use crate::taxa::TaxonTable;

pub const PREDICTED_CLASS: &str = "predicted_class";
pub const PREDICTED_SUPERCLASS: &str = "predicted_superclass";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedTaxonRecord {
    pub fields: Vec<String>,
    pub identifier: CanonicalIdentifier,
    pub summary: ClassificationSummary,
    pub reported_compounds: Option<String>,
}

/// Enriched rows plus the positions the derived columns occupy.
#[derive(Debug, Clone)]
pub struct EnrichedTable {
    pub headers: Vec<String>,
    pub records: Vec<EnrichedTaxonRecord>,
    identifier_col: usize,
    class_col: usize,
    superclass_col: usize,
    reported_col: usize,
}

impl EnrichedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.records.iter().map(|record| {
            let mut row = record.fields.clone();
            row.resize(self.headers.len(), String::new());
            row[self.identifier_col] = record.identifier.to_string();
            row[self.class_col] = record.summary.class_summary.clone();
            row[self.superclass_col] = record.summary.superclass_summary.clone();
            row[self.reported_col] = record.reported_compounds.clone().unwrap_or_default();
            row
        })
    }
}

/// Left-joins every taxon against the derived data. Output rows correspond
/// one-to-one, in order, with `taxa.records`; missing summaries and counts
/// become empty cells.
pub fn merge(
    taxa: &TaxonTable,
    identifiers: &Resolutions,
    summaries: &BTreeMap<TaxonKey, ClassificationSummary>,
    store: &OccurrenceTable,
    rank: Rank,
) -> Result<EnrichedTable, TaxochemError> {
    let mut headers = taxa.headers.clone();
    let identifier_col = column_slot(&mut headers, &taxa.identifier_column);
    let class_col = column_slot(&mut headers, PREDICTED_CLASS);
    let superclass_col = column_slot(&mut headers, PREDICTED_SUPERCLASS);
    let reported_col = column_slot(&mut headers, rank.reported_count_column());

    let mut records = Vec::with_capacity(taxa.len());
    for taxon in &taxa.records {
        let mut taxon = taxon.clone();
        if !taxon.identifier.is_resolved() {
            taxon.identifier = identifiers.get(&taxon.name);
        }
        let key = taxon.key(rank);
        let (summary, reported_compounds) = match &key {
            Some(key) => (
                summaries.get(key).cloned().unwrap_or_default(),
                store.reported_compounds(key)?,
            ),
            None => (ClassificationSummary::default(), None),
        };
        records.push(EnrichedTaxonRecord {
            fields: taxon.fields,
            identifier: taxon.identifier,
            summary,
            reported_compounds,
        });
    }

    Ok(EnrichedTable {
        headers,
        records,
        identifier_col,
        class_col,
        superclass_col,
        reported_col,
    })
}

/// Position of `name`, appended when the input does not carry it yet.
fn column_slot(headers: &mut Vec<String>, name: &str) -> usize {
    match headers.iter().position(|h| h == name) {
        Some(idx) => idx,
        None => {
            headers.push(name.to_string());
            headers.len() - 1
        }
    }
}
