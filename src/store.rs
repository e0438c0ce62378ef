use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::aggregate::{DedupedCompoundRecord, compound_headers};
use crate::domain::{Rank, TaxonKey};
use crate::error::TaxochemError;
use crate::merge::EnrichedTable;
use crate::occurrence::OccurrenceSchema;
use crate::table::{Delimiter, write_table};

/// Layout of a run's output directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: Utf8PathBuf,
}

impl ResultStore {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn taxon_dir(&self, rank: Rank) -> Utf8PathBuf {
        self.root.join(rank.data_dir())
    }

    pub fn taxon_table_path(&self, rank: Rank, key: &TaxonKey) -> Utf8PathBuf {
        self.taxon_dir(rank).join(format!("{key}.tsv"))
    }

    pub fn results_path(&self, file_name: &str) -> Utf8PathBuf {
        self.root.join(file_name)
    }

    pub fn ensure_root(&self) -> Result<(), TaxochemError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| TaxochemError::Filesystem(err.to_string()))
    }

    /// Writes one taxon's deduplicated compounds as TSV.
    pub fn write_compounds(
        &self,
        rank: Rank,
        key: &TaxonKey,
        schema: &OccurrenceSchema,
        records: &[DedupedCompoundRecord],
    ) -> Result<Utf8PathBuf, TaxochemError> {
        let path = self.taxon_table_path(rank, key);
        write_table(
            &path,
            Delimiter::Tab,
            &compound_headers(schema),
            records.iter().map(DedupedCompoundRecord::to_row),
        )?;
        Ok(path)
    }

    /// Writes the consolidated table as CSV, replacing any previous run's.
    pub fn write_results(
        &self,
        file_name: &str,
        table: &EnrichedTable,
    ) -> Result<Utf8PathBuf, TaxochemError> {
        let path = self.results_path(file_name);
        write_table(&path, Delimiter::Comma, &table.headers, table.rows())?;
        Ok(path)
    }
}
