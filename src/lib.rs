pub mod aggregate;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod merge;
pub mod occurrence;
pub mod opentree;
pub mod output;
pub mod rate_limit;
pub mod resolver;
pub mod store;
pub mod summary;
pub mod table;
pub mod taxa;
pub mod wikidata;
