use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, RunReport};
use crate::wikidata::SpeciesEntry;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &RunReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_species(species: &[SpeciesEntry]) -> io::Result<()> {
        Self::print_json(&species)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Progress lines on stderr and a plain-text summary on stdout.
pub struct HumanOutput;

impl HumanOutput {
    pub fn print_report(report: &RunReport) -> io::Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout, "rank:          {}", report.rank)?;
        writeln!(stdout, "taxa:          {}", report.taxa)?;
        writeln!(stdout, "resolved:      {}", report.resolved)?;
        writeln!(stdout, "unresolved:    {}", report.unresolved)?;
        for name in &report.unresolved_names {
            writeln!(stdout, "  - {name}")?;
        }
        writeln!(stdout, "taxon tables:  {}", report.taxon_tables)?;
        writeln!(stdout, "output:        {}", report.output_path)?;
        Ok(())
    }

    pub fn print_species(species: &[SpeciesEntry]) -> io::Result<()> {
        let mut stdout = io::stdout();
        for entry in species {
            writeln!(stdout, "{}\t{}", entry.id, entry.label)?;
        }
        Ok(())
    }
}

impl ProgressSink for HumanOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => eprintln!("{} ({:.1}s)", event.message, elapsed.as_secs_f64()),
            None => eprintln!("{}", event.message),
        }
    }
}
