use assert_matches::assert_matches;
use serde_json::{Value, json};
use taxochem::error::TaxochemError;
use taxochem::wikidata::{label_query, parse_first_match, parse_species_listing, species_query};

fn fixture(name: &str) -> Value {
    let raw = std::fs::read_to_string(format!("tests/fixtures/{name}")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn first_binding_becomes_qcode() {
    let raw = fixture("wikidata_species.json");
    let id = parse_first_match(&raw).unwrap().unwrap();
    assert_eq!(id.as_str(), "Q30034");
}

#[test]
fn empty_bindings_mean_no_match() {
    let raw = json!({ "head": { "vars": ["species"] }, "results": { "bindings": [] } });
    assert_eq!(parse_first_match(&raw).unwrap(), None);
}

#[test]
fn malformed_payload_is_reported() {
    assert_matches!(
        parse_first_match(&json!({ "error": "timeout" })),
        Err(TaxochemError::ResolverResponse(_))
    );
    let not_entity = json!({ "results": { "bindings": [
        { "species": { "type": "uri", "value": "http://example.org/thing" } }
    ] } });
    assert_matches!(parse_first_match(&not_entity), Err(TaxochemError::ResolverResponse(_)));
}

#[test]
fn species_listing_skips_unlabelled_entries() {
    let species = parse_species_listing(&fixture("wikidata_species.json")).unwrap();
    assert_eq!(species.len(), 2);
    assert_eq!(species[0].id.as_str(), "Q30034");
    assert_eq!(species[0].label, "Apis mellifera");
    assert_eq!(species[1].label, "Apis cerana");
}

#[test]
fn queries_embed_name_and_genus() {
    let query = label_query("Apis \"mellifera\"");
    assert!(query.contains(r#"rdfs:label "Apis \"mellifera\""@en"#));
    assert!(query.ends_with("LIMIT 1"));

    let query = species_query(&"Q131530".parse().unwrap());
    assert!(query.contains("wdt:P171* wd:Q131530"));
    assert!(query.contains("wdt:P105 wd:Q7432"));
}
