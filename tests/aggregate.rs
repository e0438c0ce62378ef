use std::collections::BTreeSet;

use camino::Utf8Path;
use taxochem::aggregate::{aggregate, aggregate_key, compound_headers, group_by_structure};
use taxochem::domain::{CanonicalIdentifier, TaxonKey};
use taxochem::occurrence::OccurrenceTable;
use taxochem::summary::summarize;

fn lotus() -> OccurrenceTable {
    OccurrenceTable::load(Utf8Path::new("tests/fixtures/lotus_sample.csv"), "wikidata_Qcode")
        .unwrap()
}

fn resolved(id: &str) -> CanonicalIdentifier {
    CanonicalIdentifier::Resolved(id.parse().unwrap())
}

#[test]
fn repeated_structure_collapses_to_one_record() {
    let table = lotus();
    let compounds = aggregate(&resolved("Q123"), &table);

    assert_eq!(compounds.len(), 2);
    assert_eq!(compounds[0].structure_key, "K1");
    assert_eq!(compounds[0].occurrences, 2);
    assert_eq!(compounds[0].references, vec!["Q501|Q502", "10.1/a|10.1/b"]);
    assert_eq!(compounds[1].structure_key, "K2");
    assert_eq!(compounds[1].occurrences, 1);

    let summary = summarize(&compounds);
    assert_eq!(summary.class_summary, "1 Terpenoid|1 Alkaloid");
    assert_eq!(summary.superclass_summary, "1 Monoterpenoid");
}

#[test]
fn derived_labels_use_placeholder_for_missing_levels() {
    let compounds = aggregate(&resolved("Q123"), &lotus());
    assert_eq!(compounds[0].class_label(), "Terpenoids-Terpenoid");
    assert_eq!(compounds[0].superclass_label(), "Terpenoids-Monoterpenoid");
    assert_eq!(compounds[1].superclass_label(), "Alkaloids-Not Classified");
}

#[test]
fn record_count_matches_distinct_keys() {
    let table = lotus();
    for id in ["Q123", "Q124", "Q777"] {
        let rows = table.rows_for_taxon(&id.parse().unwrap());
        let distinct = rows
            .iter()
            .map(|r| r.structure_key.as_str())
            .collect::<BTreeSet<_>>();
        assert_eq!(aggregate(&resolved(id), &table).len(), distinct.len());
    }
}

#[test]
fn unresolved_or_unknown_taxon_yields_nothing() {
    let table = lotus();
    assert!(aggregate(&CanonicalIdentifier::Unresolved, &table).is_empty());
    assert!(aggregate(&resolved("Q999"), &table).is_empty());
}

#[test]
fn row_order_only_changes_reference_order() {
    let table = lotus();
    let rows = table.rows_for_taxon(&"Q123".parse().unwrap());
    let forward = group_by_structure(&rows);
    let reversed = rows.iter().rev().copied().collect::<Vec<_>>();
    let backward = group_by_structure(&reversed);

    assert_eq!(forward.len(), backward.len());
    for (a, b) in forward.iter().zip(&backward) {
        assert_eq!(a.structure_key, b.structure_key);
        assert_eq!(a.class, b.class);
        let refs = |value: &str| value.split('|').map(str::to_string).collect::<BTreeSet<_>>();
        assert_eq!(refs(&a.references[0]), refs(&b.references[0]));
    }
    assert_eq!(forward[0].references[0], "Q501|Q502");
    assert_eq!(backward[0].references[0], "Q502|Q501");
    assert_eq!(summarize(&forward), summarize(&backward));
}

#[test]
fn scalars_come_from_first_row_in_source_order() {
    let table = lotus();
    let species = table
        .schema()
        .scalar_columns
        .iter()
        .position(|c| c == "organism_taxonomy_09species")
        .unwrap();
    let rows = table.rows_for_genus("Apis").unwrap();

    let forward = group_by_structure(&rows);
    assert_eq!(forward[0].structure_key, "K1");
    assert_eq!(forward[0].scalars[species], "Apis mellifera");

    let reversed = rows.iter().rev().copied().collect::<Vec<_>>();
    let backward = group_by_structure(&reversed);
    assert_eq!(backward[0].structure_key, "K1");
    assert_eq!(backward[0].scalars[species], "Apis cerana");
    assert_eq!(backward[0].references[0], "Q505|Q502|Q501");
}

#[test]
fn genus_key_pools_every_species() {
    let table = lotus();
    let compounds = aggregate_key(&TaxonKey::Genus("Apis".to_string()), &table).unwrap();
    let keys = compounds
        .iter()
        .map(|c| c.structure_key.as_str())
        .collect::<Vec<_>>();
    assert_eq!(keys, vec!["K1", "K2", "K3"]);
    assert_eq!(compounds[0].references[0], "Q501|Q502|Q505");
}

#[test]
fn rows_line_up_with_headers() {
    let table = lotus();
    let headers = compound_headers(table.schema());
    assert_eq!(headers.first().map(String::as_str), Some("structure_inchikey"));
    assert_eq!(
        &headers[headers.len() - 2..],
        &["chemical_superclass".to_string(), "chemical_class".to_string()]
    );
    for compound in aggregate(&resolved("Q124"), &table) {
        assert_eq!(compound.to_row().len(), headers.len());
    }
}
