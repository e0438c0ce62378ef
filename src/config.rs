use std::fs;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{Rank, Service};
use crate::error::TaxochemError;

pub const DEFAULT_CONFIG_FILE: &str = "taxochem.json";
pub const DEFAULT_NAME_COLUMN: &str = "ATTRIBUTE_Species";
pub const DEFAULT_GENUS_COLUMN: &str = "Genus";
pub const DEFAULT_IDENTIFIER_COLUMN: &str = "wikidata_Qcode";
pub const DEFAULT_OUTPUT_FILE: &str = "Full_results.csv";
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 30;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub input: Utf8PathBuf,
    pub reference: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    #[serde(default)]
    pub rank: Option<Rank>,
    #[serde(default)]
    pub name_column: Option<String>,
    #[serde(default)]
    pub genus_column: Option<String>,
    #[serde(default)]
    pub identifier_column: Option<String>,
    #[serde(default)]
    pub requests_per_minute: Option<u32>,
    #[serde(default)]
    pub service: Option<Service>,
    #[serde(default)]
    pub output_file: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Columns {
    pub name: String,
    pub genus: String,
    pub identifier: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME_COLUMN.to_string(),
            genus: DEFAULT_GENUS_COLUMN.to_string(),
            identifier: DEFAULT_IDENTIFIER_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub input: Utf8PathBuf,
    pub reference: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub output_file: String,
    pub rank: Rank,
    pub columns: Columns,
    pub requests_per_minute: u32,
    pub service: Service,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, TaxochemError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Err(TaxochemError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| TaxochemError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| TaxochemError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, TaxochemError> {
        let requests_per_minute = config
            .requests_per_minute
            .unwrap_or(DEFAULT_REQUESTS_PER_MINUTE);
        if requests_per_minute == 0 {
            return Err(TaxochemError::InvalidRate(requests_per_minute));
        }

        let defaults = Columns::default();
        let columns = Columns {
            name: non_blank(config.name_column).unwrap_or(defaults.name),
            genus: non_blank(config.genus_column).unwrap_or(defaults.genus),
            identifier: non_blank(config.identifier_column).unwrap_or(defaults.identifier),
        };

        Ok(ResolvedConfig {
            input: config.input,
            reference: config.reference,
            output_dir: config.output_dir,
            output_file: non_blank(config.output_file)
                .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string()),
            rank: config.rank.unwrap_or_default(),
            columns,
            requests_per_minute,
            service: config.service.unwrap_or_default(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"input": "taxa.csv", "reference": "lotus.csv", "output_dir": "out"}"#,
        )
        .unwrap();

        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.rank, Rank::Species);
        assert_eq!(resolved.service, Service::Wikidata);
        assert_eq!(resolved.requests_per_minute, 30);
        assert_eq!(resolved.columns.identifier, "wikidata_Qcode");
        assert_eq!(resolved.output_file, "Full_results.csv");
    }
}
