use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::aggregate_key;
use crate::config::ResolvedConfig;
use crate::domain::{Rank, Service, TaxonKey};
use crate::error::TaxochemError;
use crate::merge::merge;
use crate::occurrence::OccurrenceTable;
use crate::opentree::OpenTreeClient;
use crate::rate_limit::FixedIntervalLimiter;
use crate::resolver::{IdentifierResolver, NameMatcher};
use crate::store::ResultStore;
use crate::summary::{ClassificationSummary, summarize};
use crate::taxa::TaxonTable;
use crate::wikidata::WikidataClient;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub rank: Rank,
    pub taxa: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub unresolved_names: Vec<String>,
    pub taxon_tables: usize,
    pub output_path: Utf8PathBuf,
    pub finished_at: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<M: NameMatcher> {
    store: ResultStore,
    resolver: IdentifierResolver<M>,
}

impl<M: NameMatcher> App<M> {
    pub fn new(store: ResultStore, resolver: IdentifierResolver<M>) -> Self {
        Self { store, resolver }
    }

    /// Runs the whole enrichment: load, resolve, aggregate and summarize per
    /// taxon, merge, write. Only structural failures (unreadable tables,
    /// missing columns, unwritable output) abort the run.
    pub fn run(
        &self,
        config: &ResolvedConfig,
        sink: &dyn ProgressSink,
    ) -> Result<RunReport, TaxochemError> {
        let started = Instant::now();
        sink.event(ProgressEvent {
            message: format!("phase=Load; reading {}", config.reference),
            elapsed: None,
        });
        let occurrences = OccurrenceTable::load(&config.reference, &config.columns.identifier)?;
        if config.rank == Rank::Genus {
            occurrences.require_genus()?;
        }
        let mut taxa = TaxonTable::load(&config.input, &config.columns, config.rank)?;

        sink.event(ProgressEvent {
            message: format!("phase=Resolve; {} taxa", taxa.len()),
            elapsed: Some(started.elapsed()),
        });
        let resolutions = self.resolver.resolve_all(taxa.pending_names());
        taxa.annotate(&resolutions);

        self.store.ensure_root()?;
        let keys = taxa.keys(config.rank);
        let summaries = self.summarize_taxa(&keys, &occurrences, config.rank, sink)?;

        sink.event(ProgressEvent {
            message: "phase=Merge; writing consolidated table".to_string(),
            elapsed: Some(started.elapsed()),
        });
        let enriched = merge(&taxa, &resolutions, &summaries, &occurrences, config.rank)?;
        let output_path = self.store.write_results(&config.output_file, &enriched)?;

        let unresolved = taxa
            .records
            .iter()
            .filter(|r| !r.identifier.is_resolved())
            .count();
        let mut seen = BTreeSet::new();
        let unresolved_names = taxa
            .records
            .iter()
            .filter(|r| !r.identifier.is_resolved() && !r.name.is_empty())
            .filter(|r| seen.insert(r.name.as_str()))
            .map(|r| r.name.clone())
            .collect::<Vec<_>>();

        let report = RunReport {
            rank: config.rank,
            taxa: taxa.len(),
            resolved: taxa.len() - unresolved,
            unresolved,
            unresolved_names,
            taxon_tables: keys.len(),
            output_path,
            finished_at: chrono::Utc::now().to_rfc3339(),
        };
        if report.unresolved > 0 {
            warn!(
                unresolved = report.unresolved,
                names = ?report.unresolved_names,
                "some taxa could not be resolved"
            );
        }
        info!(
            taxa = report.taxa,
            resolved = report.resolved,
            tables = report.taxon_tables,
            output = %report.output_path,
            "run complete"
        );
        Ok(report)
    }

    fn summarize_taxa(
        &self,
        keys: &[TaxonKey],
        occurrences: &OccurrenceTable,
        rank: Rank,
        sink: &dyn ProgressSink,
    ) -> Result<BTreeMap<TaxonKey, ClassificationSummary>, TaxochemError> {
        let mut summaries = BTreeMap::new();
        for key in keys {
            let compounds = aggregate_key(key, occurrences)?;
            let path = self
                .store
                .write_compounds(rank, key, occurrences.schema(), &compounds)?;
            sink.event(ProgressEvent {
                message: format!("phase=Aggregate; {key}: {} compounds", compounds.len()),
                elapsed: None,
            });
            info!(taxon = %key, compounds = compounds.len(), path = %path, "taxon table written");
            summaries.insert(key.clone(), summarize(&compounds));
        }
        Ok(summaries)
    }
}

/// Resolver for the configured service and request budget.
pub fn build_resolver(
    config: &ResolvedConfig,
) -> Result<IdentifierResolver<Box<dyn NameMatcher>>, TaxochemError> {
    let matcher: Box<dyn NameMatcher> = match config.service {
        Service::Wikidata => Box::new(WikidataClient::new()?),
        Service::Opentree => Box::new(OpenTreeClient::new()?),
    };
    let limiter = FixedIntervalLimiter::per_minute(config.requests_per_minute)?;
    Ok(IdentifierResolver::new(matcher, Box::new(limiter)))
}
