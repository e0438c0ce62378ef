use assert_matches::assert_matches;
use taxochem::domain::{CanonicalIdentifier, Classification, Rank, TaxonId, TaxonKey};
use taxochem::error::TaxochemError;

#[test]
fn taxon_id_rejects_placeholder_and_path_like_values() {
    assert_eq!(" Q30034 ".parse::<TaxonId>().unwrap().as_str(), "Q30034");
    for bad in ["", "   ", "Not Found", "Q1/Q2", "..\\x", "Q1|Q2", "Apis mellifera"] {
        assert_matches!(bad.parse::<TaxonId>(), Err(TaxochemError::InvalidTaxonId(_)));
    }
}

#[test]
fn identifier_cells_round_trip_through_display() {
    assert_eq!(CanonicalIdentifier::from_cell("Not Found"), CanonicalIdentifier::Unresolved);
    assert_eq!(CanonicalIdentifier::from_cell("").to_string(), "Not Found");
    assert_eq!(CanonicalIdentifier::from_cell("Q123").to_string(), "Q123");
    assert_eq!(
        serde_json::to_string(&CanonicalIdentifier::Unresolved).unwrap(),
        "\"Not Found\""
    );
}

#[test]
fn classification_cells() {
    assert_eq!(Classification::from_cell(" "), Classification::NotClassified);
    assert_eq!(Classification::from_cell("API Error"), Classification::LookupFailed);
    assert_eq!(Classification::from_cell("Iridoids").label(), Some("Iridoids"));
    assert_eq!(Classification::LookupFailed.label(), None);
}

#[test]
fn rank_layout() {
    assert_eq!(Rank::Species.data_dir(), "species_data");
    assert_eq!(Rank::Genus.data_dir(), "genus_data");
    assert_eq!(Rank::Species.reported_count_column(), "Reported_comp_Species");
    assert_eq!(Rank::Genus.reported_count_column(), "Reported_comp_Genus");
}

#[test]
fn genus_keys_ignore_unusable_cells() {
    assert_eq!(TaxonKey::genus(" Apis "), Some(TaxonKey::Genus("Apis".to_string())));
    assert_eq!(TaxonKey::genus(""), None);
    assert_eq!(TaxonKey::genus("Not Found"), None);
    assert_eq!(TaxonKey::genus("a/b"), None);
}
