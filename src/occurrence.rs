use std::collections::{BTreeSet, HashMap};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use crate::domain::{Classification, Rank, TaxonId, TaxonKey};
use crate::error::TaxochemError;
use crate::table::{column_index, data_load, open_reader, read_headers};

pub const STRUCTURE_KEY: &str = "structure_inchikey";
pub const PATHWAY: &str = "structure_taxonomy_npclassifier_01pathway";
pub const SUPERCLASS: &str = "structure_taxonomy_npclassifier_02superclass";
pub const CLASS: &str = "structure_taxonomy_npclassifier_03class";
pub const GENUS: &str = "organism_taxonomy_08genus";
pub const REFERENCE_COLUMNS: [&str; 2] = ["reference_wikidata", "reference_doi"];

/// Descriptor and lineage columns carried into per-taxon tables, in output
/// order. Columns absent from a given store are skipped.
pub const SCALAR_COLUMNS: [&str; 27] = [
    "structure_wikidata",
    "structure_inchi",
    "structure_smiles",
    "structure_molecular_formula",
    "structure_exact_mass",
    "structure_xlogp",
    "structure_smiles_2D",
    "structure_cid",
    "structure_nameIupac",
    "structure_nameTraditional",
    PATHWAY,
    SUPERCLASS,
    CLASS,
    "organism_wikidata",
    "organism_taxonomy_gbifid",
    "organism_taxonomy_ncbiid",
    "organism_taxonomy_ottid",
    "organism_taxonomy_01domain",
    "organism_taxonomy_02kingdom",
    "organism_taxonomy_03phylum",
    "organism_taxonomy_04class",
    "organism_taxonomy_05order",
    "organism_taxonomy_06family",
    "organism_taxonomy_07tribe",
    GENUS,
    "organism_taxonomy_09species",
    "organism_taxonomy_10varietas",
];

/// Column positions resolved against one store's header row.
#[derive(Debug, Clone)]
pub struct OccurrenceSchema {
    pub path: Utf8PathBuf,
    pub taxon_column: String,
    pub scalar_columns: Vec<String>,
    structure_key: usize,
    taxon_id: usize,
    pathway: usize,
    superclass: usize,
    class: usize,
    genus: Option<usize>,
    scalars: Vec<usize>,
    references: Vec<usize>,
    reported_species: Option<usize>,
    reported_genus: Option<usize>,
}

impl OccurrenceSchema {
    pub fn from_headers(
        headers: &[String],
        taxon_column: &str,
        path: &Utf8Path,
    ) -> Result<Self, TaxochemError> {
        let required = |name: &str| column_index(headers, name, path);
        let optional = |name: &str| headers.iter().position(|h| h == name);

        let references = REFERENCE_COLUMNS
            .iter()
            .map(|name| required(*name))
            .collect::<Result<Vec<_>, _>>()?;
        let (scalar_columns, scalars): (Vec<String>, Vec<usize>) = SCALAR_COLUMNS
            .iter()
            .filter_map(|name| optional(*name).map(|idx| (name.to_string(), idx)))
            .unzip();

        Ok(Self {
            path: path.to_path_buf(),
            taxon_column: taxon_column.to_string(),
            structure_key: required(STRUCTURE_KEY)?,
            taxon_id: required(taxon_column)?,
            pathway: required(PATHWAY)?,
            superclass: required(SUPERCLASS)?,
            class: required(CLASS)?,
            genus: optional(GENUS),
            scalar_columns,
            scalars,
            references,
            reported_species: optional(Rank::Species.reported_count_column()),
            reported_genus: optional(Rank::Genus.reported_count_column()),
        })
    }

    fn parse_row(&self, row: &csv::StringRecord) -> OccurrenceRecord {
        let cell = |idx: usize| row.get(idx).unwrap_or_default().trim();
        OccurrenceRecord {
            structure_key: cell(self.structure_key).to_string(),
            taxon_id: cell(self.taxon_id).parse().ok(),
            genus: self
                .genus
                .map(cell)
                .filter(|g| !g.is_empty())
                .map(str::to_string),
            pathway: Classification::from_cell(cell(self.pathway)),
            superclass: Classification::from_cell(cell(self.superclass)),
            class: Classification::from_cell(cell(self.class)),
            scalars: self.scalars.iter().map(|idx| cell(*idx).to_string()).collect(),
            references: self
                .references
                .iter()
                .map(|idx| cell(*idx).to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceRecord {
    pub structure_key: String,
    pub taxon_id: Option<TaxonId>,
    pub genus: Option<String>,
    pub pathway: Classification,
    pub superclass: Classification,
    pub class: Classification,
    /// Aligned with [`OccurrenceSchema::scalar_columns`].
    pub scalars: Vec<String>,
    /// Aligned with [`REFERENCE_COLUMNS`].
    pub references: Vec<String>,
}

/// Structure–organism occurrence rows, one per reference, indexed by taxon
/// identifier and by genus.
#[derive(Debug, Clone)]
pub struct OccurrenceTable {
    schema: OccurrenceSchema,
    records: Vec<OccurrenceRecord>,
    by_taxon: HashMap<TaxonId, Vec<usize>>,
    by_genus: HashMap<String, Vec<usize>>,
    reported_species: HashMap<TaxonId, String>,
    reported_genus: HashMap<String, String>,
}

impl OccurrenceTable {
    pub fn load(path: &Utf8Path, taxon_column: &str) -> Result<Self, TaxochemError> {
        let mut reader = open_reader(path)?;
        let headers = read_headers(&mut reader, path)?;
        let schema = OccurrenceSchema::from_headers(&headers, taxon_column, path)?;

        let mut table = Self {
            schema,
            records: Vec::new(),
            by_taxon: HashMap::new(),
            by_genus: HashMap::new(),
            reported_species: HashMap::new(),
            reported_genus: HashMap::new(),
        };
        let mut skipped = 0usize;
        for (idx, row) in reader.records().enumerate() {
            let row = row.map_err(|err| data_load(path, format!("row {}: {err}", idx + 1)))?;
            let record = table.schema.parse_row(&row);
            if record.structure_key.is_empty() {
                skipped += 1;
                continue;
            }
            table.index_reported(&row, &record);
            table.push(record);
        }

        if skipped > 0 {
            warn!(path = %path, skipped, "rows without a structure key ignored");
        }
        if table.records.is_empty() {
            warn!(path = %path, "reference store has no occurrence rows");
        }
        info!(
            path = %path,
            rows = table.records.len(),
            taxa = table.by_taxon.len(),
            "reference store loaded"
        );
        Ok(table)
    }

    pub fn schema(&self) -> &OccurrenceSchema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows recorded for taxon `id`, in source order.
    pub fn rows_for_taxon(&self, id: &TaxonId) -> Vec<&OccurrenceRecord> {
        self.collect(self.by_taxon.get(id))
    }

    /// Rows whose genus lineage equals `genus`, in source order.
    pub fn rows_for_genus(&self, genus: &str) -> Result<Vec<&OccurrenceRecord>, TaxochemError> {
        self.require_genus()?;
        Ok(self.collect(self.by_genus.get(genus)))
    }

    pub fn rows_for(&self, key: &TaxonKey) -> Result<Vec<&OccurrenceRecord>, TaxochemError> {
        match key {
            TaxonKey::Identifier(id) => Ok(self.rows_for_taxon(id)),
            TaxonKey::Genus(name) => self.rows_for_genus(name),
        }
    }

    fn collect(&self, indices: Option<&Vec<usize>>) -> Vec<&OccurrenceRecord> {
        indices
            .map(|idx| idx.iter().map(|i| &self.records[*i]).collect())
            .unwrap_or_default()
    }

    /// Reported-compound count for `key`: the store's precomputed column when
    /// present, otherwise the number of distinct structures on record.
    pub fn reported_compounds(&self, key: &TaxonKey) -> Result<Option<String>, TaxochemError> {
        let (precomputed, column) = match key {
            TaxonKey::Identifier(id) => (
                self.reported_species.get(id),
                self.schema.reported_species,
            ),
            TaxonKey::Genus(name) => {
                self.require_genus()?;
                (self.reported_genus.get(name), self.schema.reported_genus)
            }
        };
        if column.is_some() {
            return Ok(precomputed.cloned());
        }
        let rows = self.rows_for(key)?;
        if rows.is_empty() {
            return Ok(None);
        }
        let distinct = rows
            .iter()
            .map(|r| r.structure_key.as_str())
            .collect::<BTreeSet<_>>();
        Ok(Some(distinct.len().to_string()))
    }

    /// Fails unless the store carries the genus lineage column.
    pub fn require_genus(&self) -> Result<(), TaxochemError> {
        match self.schema.genus {
            Some(_) => Ok(()),
            None => Err(TaxochemError::MissingColumn {
                path: self.schema.path.clone(),
                column: GENUS.to_string(),
            }),
        }
    }

    fn push(&mut self, record: OccurrenceRecord) {
        let idx = self.records.len();
        if let Some(id) = &record.taxon_id {
            self.by_taxon.entry(id.clone()).or_default().push(idx);
        }
        if let Some(genus) = &record.genus {
            self.by_genus.entry(genus.clone()).or_default().push(idx);
        }
        self.records.push(record);
    }

    fn index_reported(&mut self, row: &csv::StringRecord, record: &OccurrenceRecord) {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        if let (Some(id), Some(count)) = (&record.taxon_id, cell(self.schema.reported_species)) {
            self.reported_species.entry(id.clone()).or_insert(count);
        }
        if let (Some(genus), Some(count)) = (&record.genus, cell(self.schema.reported_genus)) {
            self.reported_genus.entry(genus.clone()).or_insert(count);
        }
    }
}
