use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum TaxochemError {
    #[error("invalid taxon identifier: {0}")]
    InvalidTaxonId(String),

    #[error("missing config file taxochem.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("requests_per_minute must be greater than zero, got {0}")]
    InvalidRate(u32),

    #[error("failed to load {path}: {message}")]
    #[diagnostic(help("check that the file exists and is a delimited text table"))]
    DataLoad { path: Utf8PathBuf, message: String },

    #[error("{path} has no column named `{column}`")]
    #[diagnostic(help("column names are case-sensitive and must match across tables"))]
    MissingColumn { path: Utf8PathBuf, column: String },

    #[error("name resolver request failed: {0}")]
    ResolverHttp(String),

    #[error("name resolver returned status {status}: {message}")]
    ResolverStatus { status: u16, message: String },

    #[error("unexpected name resolver response: {0}")]
    ResolverResponse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
