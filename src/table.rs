use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};

use camino::{Utf8Path, Utf8PathBuf};
use flate2::read::GzDecoder;

use crate::error::TaxochemError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    pub fn byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }

    pub fn from_extension(path: &str) -> Option<Self> {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".tsv") || lower.ends_with(".txt") {
            Some(Delimiter::Tab)
        } else if lower.ends_with(".csv") {
            Some(Delimiter::Comma)
        } else {
            None
        }
    }

    /// Picks tab when the header line has more tabs than commas.
    pub fn sniff(head: &[u8]) -> Self {
        let line = head.split(|b| *b == b'\n').next().unwrap_or_default();
        let tabs = line.iter().filter(|b| **b == b'\t').count();
        let commas = line.iter().filter(|b| **b == b',').count();
        if tabs > commas {
            Delimiter::Tab
        } else {
            Delimiter::Comma
        }
    }
}

pub(crate) fn data_load(path: &Utf8Path, message: impl Into<String>) -> TaxochemError {
    TaxochemError::DataLoad {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

pub fn open_reader(path: &Utf8Path) -> Result<csv::Reader<Box<dyn BufRead>>, TaxochemError> {
    let file = File::open(path.as_std_path()).map_err(|err| data_load(path, err.to_string()))?;
    let (inner_name, compressed) = match path.as_str().strip_suffix(".gz") {
        Some(stem) => (stem, true),
        None => (path.as_str(), false),
    };
    let mut reader: Box<dyn BufRead> = if compressed {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    let delimiter = match Delimiter::from_extension(inner_name) {
        Some(delimiter) => delimiter,
        None => {
            let head = reader
                .fill_buf()
                .map_err(|err| data_load(path, err.to_string()))?;
            Delimiter::sniff(head)
        }
    };
    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter.byte())
        .from_reader(reader))
}

/// Header row of an open reader; an absent or blank header is a load error.
pub fn read_headers<R: Read>(
    reader: &mut csv::Reader<R>,
    path: &Utf8Path,
) -> Result<Vec<String>, TaxochemError> {
    let headers = reader
        .headers()
        .map_err(|err| data_load(path, err.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect::<Vec<_>>();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(data_load(path, "no header row"));
    }
    Ok(headers)
}

/// A small table held fully as strings, used for taxon metadata.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub path: Utf8PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn load(path: &Utf8Path) -> Result<Self, TaxochemError> {
        let mut reader = open_reader(path)?;
        let headers = read_headers(&mut reader, path)?;
        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record =
                record.map_err(|err| data_load(path, format!("row {}: {err}", idx + 1)))?;
            rows.push(record.iter().map(|v| v.to_string()).collect());
        }
        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn column(&self, name: &str) -> Result<usize, TaxochemError> {
        column_index(&self.headers, name, &self.path)
    }
}

pub fn column_index(
    headers: &[String],
    name: &str,
    path: &Utf8Path,
) -> Result<usize, TaxochemError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| TaxochemError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

/// Writes a table through a temp file in the destination directory, replacing
/// any previous file of the same name.
pub fn write_table<I>(
    path: &Utf8Path,
    delimiter: Delimiter,
    headers: &[String],
    rows: I,
) -> Result<(), TaxochemError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or(Utf8Path::new("."));
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| TaxochemError::Filesystem(err.to_string()))?;
    let temp = tempfile::Builder::new()
        .prefix("taxochem-table")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| TaxochemError::Filesystem(err.to_string()))?;

    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter.byte())
            .from_writer(temp.as_file());
        writer
            .write_record(headers)
            .map_err(|err| TaxochemError::Filesystem(err.to_string()))?;
        for row in rows {
            writer
                .write_record(&row)
                .map_err(|err| TaxochemError::Filesystem(err.to_string()))?;
        }
        writer
            .flush()
            .map_err(|err| TaxochemError::Filesystem(err.to_string()))?;
    }

    if path.as_std_path().exists() {
        fs::remove_file(path.as_std_path())
            .map_err(|err| TaxochemError::Filesystem(err.to_string()))?;
    }
    temp.persist(path.as_std_path())
        .map_err(|err| TaxochemError::Filesystem(err.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_detection() {
        assert_eq!(Delimiter::from_extension("lotus.TSV"), Some(Delimiter::Tab));
        assert_eq!(Delimiter::from_extension("taxa.csv"), Some(Delimiter::Comma));
        assert_eq!(Delimiter::from_extension("lotus.dat"), None);
        assert_eq!(Delimiter::sniff(b"a\tb\tc,d\n1\t2\t3"), Delimiter::Tab);
        assert_eq!(Delimiter::sniff(b"a,b\n"), Delimiter::Comma);
    }
}
