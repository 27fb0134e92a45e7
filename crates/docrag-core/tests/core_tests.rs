use figment::{
    providers::{Format, Toml},
    Figment,
};

use docrag_core::config::{Config, SegmentationSettings};
use docrag_core::types::{Chunk, DocumentMetadata};
use docrag_core::Error;

#[test]
fn chunk_id_carries_source_and_ordinal() {
    let chunk = Chunk::new("policy.pdf", 3, "La prima anual se revisa cada año.".to_string());
    assert_eq!(chunk.id, "policy.pdf | section 3");
    assert_eq!(Chunk::source_from_id(&chunk.id), "policy.pdf");
    assert_eq!(chunk.ordinal, 3);
}

#[test]
fn chunk_validity_requires_alphabetic_text() {
    assert!(Chunk::new("a.txt", 1, "some words".to_string()).is_valid());
    assert!(!Chunk::new("a.txt", 1, "   \n\t ".to_string()).is_valid());
    assert!(!Chunk::new("a.txt", 1, "1234 --- 5678".to_string()).is_valid());
}

#[test]
fn segmentation_settings_reject_bad_overlap() {
    let settings = SegmentationSettings {
        strategy: "fixed".to_string(),
        chunk_size: 10,
        overlap_fraction: 1.0,
    };
    assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));

    let settings = SegmentationSettings {
        strategy: "fixed".to_string(),
        chunk_size: 10,
        overlap_fraction: -0.1,
    };
    assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn segmentation_settings_reject_non_advancing_window() {
    // chunk_size 1 with 60% overlap rounds the stride down to zero
    let settings = SegmentationSettings {
        strategy: "fixed".to_string(),
        chunk_size: 1,
        overlap_fraction: 0.6,
    };
    assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn malformed_segmentation_section_is_fatal() {
    let figment = Figment::new().merge(Toml::string(
        "[segmentation]\noverlap_fraction = \"not a number\"\n",
    ));
    let config = Config::from_figment(figment);
    assert!(matches!(config.segmentation(), Err(Error::InvalidConfig(_))));
}

#[test]
fn absent_segmentation_section_falls_back_to_defaults() {
    let config = Config::from_figment(Figment::new());
    let settings = config.segmentation().expect("defaults when the section is absent");
    assert_eq!(settings.strategy, "structural");
    assert_eq!(settings.chunk_size, 100);

    // Present-but-invalid values still reach validation and fail there
    let figment = Figment::new().merge(Toml::string(
        "[segmentation]\noverlap_fraction = 1.5\n",
    ));
    let config = Config::from_figment(figment);
    assert!(matches!(config.segmentation(), Err(Error::InvalidConfig(_))));
}

#[test]
fn segmentation_settings_defaults_are_valid() {
    let settings = SegmentationSettings::default();
    settings.validate().expect("defaults validate");
    assert_eq!(settings.stride(), 80);
}

#[test]
fn metadata_record_loads_with_missing_fields() {
    let meta: DocumentMetadata =
        serde_json::from_str(r#"{"title": "Seguro de moto", "domain_terms_present": ["prima"]}"#)
            .expect("partial record deserializes");
    assert_eq!(meta.title, "Seguro de moto");
    assert_eq!(meta.domain_terms_present, vec!["prima".to_string()]);
    assert!(meta.keywords.is_empty());
    assert!(meta.main_sections.is_empty());
    assert_eq!(meta.word_count, 0);
}
