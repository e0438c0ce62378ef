use std::collections::BTreeMap;

use crate::domain::{CanonicalIdentifier, Classification, TaxonKey};
use crate::error::TaxochemError;
use crate::occurrence::{
    OccurrenceRecord, OccurrenceSchema, OccurrenceTable, REFERENCE_COLUMNS, STRUCTURE_KEY,
};

pub const MULTI_VALUE_DELIMITER: &str = "|";
pub const SUPERCLASS_LABEL: &str = "chemical_superclass";
pub const CLASS_LABEL: &str = "chemical_class";

/// One distinct structure reported for a taxon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupedCompoundRecord {
    pub structure_key: String,
    pub pathway: Classification,
    pub superclass: Classification,
    pub class: Classification,
    /// First-seen values, aligned with [`OccurrenceSchema::scalar_columns`].
    pub scalars: Vec<String>,
    /// Pipe-joined values of every contributing row, aligned with
    /// [`REFERENCE_COLUMNS`].
    pub references: Vec<String>,
    /// Number of occurrence rows folded into this record.
    pub occurrences: usize,
}

impl DedupedCompoundRecord {
    fn start(row: &OccurrenceRecord) -> Self {
        Self {
            structure_key: row.structure_key.clone(),
            pathway: row.pathway.clone(),
            superclass: row.superclass.clone(),
            class: row.class.clone(),
            scalars: row.scalars.clone(),
            references: row.references.clone(),
            occurrences: 1,
        }
    }

    fn absorb(&mut self, row: &OccurrenceRecord) {
        for (joined, value) in self.references.iter_mut().zip(&row.references) {
            joined.push_str(MULTI_VALUE_DELIMITER);
            joined.push_str(value);
        }
        self.occurrences += 1;
    }

    /// `pathway-superclass`, with sentinels standing in for missing levels.
    pub fn superclass_label(&self) -> String {
        format!("{}-{}", self.pathway, self.superclass)
    }

    /// `pathway-class`, with sentinels standing in for missing levels.
    pub fn class_label(&self) -> String {
        format!("{}-{}", self.pathway, self.class)
    }

    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(self.scalars.len() + self.references.len() + 3);
        row.push(self.structure_key.clone());
        row.extend(self.scalars.iter().cloned());
        row.extend(self.references.iter().cloned());
        row.push(self.superclass_label());
        row.push(self.class_label());
        row
    }
}

/// Header row matching [`DedupedCompoundRecord::to_row`].
pub fn compound_headers(schema: &OccurrenceSchema) -> Vec<String> {
    let mut headers = vec![STRUCTURE_KEY.to_string()];
    headers.extend(schema.scalar_columns.iter().cloned());
    headers.extend(REFERENCE_COLUMNS.iter().map(|c| c.to_string()));
    headers.push(SUPERCLASS_LABEL.to_string());
    headers.push(CLASS_LABEL.to_string());
    headers
}

/// Distinct structures recorded for `taxon_id`, ordered by structural key.
/// An unresolved identifier yields nothing.
pub fn aggregate(
    taxon_id: &CanonicalIdentifier,
    table: &OccurrenceTable,
) -> Vec<DedupedCompoundRecord> {
    match taxon_id {
        CanonicalIdentifier::Resolved(id) => group_by_structure(&table.rows_for_taxon(id)),
        CanonicalIdentifier::Unresolved => Vec::new(),
    }
}

pub fn aggregate_key(
    key: &TaxonKey,
    table: &OccurrenceTable,
) -> Result<Vec<DedupedCompoundRecord>, TaxochemError> {
    Ok(group_by_structure(&table.rows_for(key)?))
}

/// Folds rows sharing a structural key: scalars come from the first row in
/// source order, reference fields keep every row's value in order.
pub fn group_by_structure(rows: &[&OccurrenceRecord]) -> Vec<DedupedCompoundRecord> {
    let mut groups: BTreeMap<&str, DedupedCompoundRecord> = BTreeMap::new();
    for row in rows.iter().copied() {
        match groups.get_mut(row.structure_key.as_str()) {
            Some(record) => record.absorb(row),
            None => {
                groups.insert(row.structure_key.as_str(), DedupedCompoundRecord::start(row));
            }
        }
    }
    groups.into_values().collect()
}
