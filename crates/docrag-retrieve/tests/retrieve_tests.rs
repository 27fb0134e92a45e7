use std::collections::HashMap;

use tempfile::TempDir;

use docrag_core::traits::Embedder;
use docrag_core::types::{Chunk, DocumentMetadata};
use docrag_core::Error;
use docrag_embed::{FakeEmbedder, EMBEDDING_DIM};
use docrag_index::store::{save_all, IndexArtifacts};
use docrag_index::FlatIndex;
use docrag_retrieve::{enrich, MetadataCatalog, Retriever, DOMAIN_TERM_BOOST, SECTION_BOOST};

fn insurance_metadata() -> DocumentMetadata {
    DocumentMetadata {
        title: "Condiciones del seguro".to_string(),
        domain_terms_present: vec!["seguro".to_string(), "póliza".to_string()],
        main_sections: vec!["COBERTURAS PRINCIPALES".to_string()],
        ..DocumentMetadata::default()
    }
}

fn build_retriever(texts: &[&str], catalog: MetadataCatalog) -> Retriever {
    let embedder = FakeEmbedder::new(EMBEDDING_DIM);
    let owned: Vec<String> = texts.iter().map(|t| (*t).to_string()).collect();
    let vectors = embedder.embed_batch(&owned).expect("embed corpus");
    let index = FlatIndex::build(EMBEDDING_DIM, &vectors).expect("build index");
    let ids: Vec<String> = (1..=texts.len())
        .map(|i| format!("poliza.txt | section {}", i))
        .collect();
    let artifacts = IndexArtifacts::new(index, ids, owned).expect("aligned");
    Retriever::new(Box::new(embedder), artifacts, catalog).expect("retriever")
}

#[test]
fn enrich_applies_fixed_multipliers() {
    let meta = insurance_metadata();

    let with_term = Chunk::new("poliza.txt", 1, "La póliza cubre daños a terceros.".to_string());
    let enriched = enrich(&with_term, &meta);
    assert!(enriched.contains_domain_term);
    assert!(!enriched.in_important_section);
    assert!((enriched.relevance_score - DOMAIN_TERM_BOOST).abs() < 1e-6);

    let with_both = Chunk::new(
        "poliza.txt",
        2,
        "COBERTURAS PRINCIPALES del seguro de moto.".to_string(),
    );
    let enriched = enrich(&with_both, &meta);
    assert!(enriched.contains_domain_term);
    assert!(enriched.in_important_section);
    assert!((enriched.relevance_score - DOMAIN_TERM_BOOST * SECTION_BOOST).abs() < 1e-6);

    let with_neither = Chunk::new("poliza.txt", 3, "Texto sin nada especial.".to_string());
    let enriched = enrich(&with_neither, &meta);
    assert!((enriched.relevance_score - 1.0).abs() < 1e-6);
}

#[test]
fn missing_metadata_degrades_to_neutral_weight() {
    let catalog = MetadataCatalog::default();
    let weight = catalog.weight_for("desconocido.txt", "la póliza cubre el siniestro");
    assert!(!weight.contains_domain_term);
    assert!(!weight.in_important_section);
    assert!((weight.relevance_score - 1.0).abs() < 1e-6);
}

#[test]
fn domain_term_flag_breaks_a_distance_tie() {
    // Two identical vectors, so both candidates sit at the same distance;
    // only one document's metadata flags the domain term.
    let embedder = FakeEmbedder::new(EMBEDDING_DIM);
    let text = "contenido identico en ambos documentos".to_string();
    let vectors = embedder
        .embed_batch(&[text.clone(), text.clone()])
        .expect("embed");
    let index = FlatIndex::build(EMBEDDING_DIM, &vectors).expect("build");
    let ids = vec![
        "sin_meta.txt | section 1".to_string(),
        "con_meta.txt | section 1".to_string(),
    ];
    let texts = vec![text.clone(), text];
    let artifacts = IndexArtifacts::new(index, ids, texts).expect("aligned");

    let mut records = HashMap::new();
    records.insert(
        "con_meta.txt".to_string(),
        DocumentMetadata {
            domain_terms_present: vec!["contenido".to_string()],
            ..DocumentMetadata::default()
        },
    );
    let retriever = Retriever::new(
        Box::new(embedder),
        artifacts,
        MetadataCatalog::from_records(records),
    )
    .expect("retriever");

    let results = retriever
        .retrieve("contenido identico en ambos documentos", 2)
        .expect("retrieve");
    assert_eq!(results[0].chunk_id, "con_meta.txt | section 1");
    assert!(
        results[0].final_score > results[1].final_score,
        "flagged chunk scores strictly higher"
    );
    assert!((results[0].distance - results[1].distance).abs() < 1e-6);
}

#[test]
fn motorcycle_query_finds_the_motorcycle_chunk() {
    let mut records = HashMap::new();
    records.insert("poliza.txt".to_string(), insurance_metadata());
    let retriever = build_retriever(
        &[
            "El seguro de moto cubre daños a terceros.",
            "La póliza de hogar incluye incendios.",
        ],
        MetadataCatalog::from_records(records),
    );

    let results = retriever
        .retrieve("¿Qué cubre el seguro de moto?", 1)
        .expect("retrieve");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk_id, "poliza.txt | section 1");
    assert!(results[0].text.contains("seguro de moto"));
}

#[test]
fn retrieve_is_deterministic() {
    let retriever = build_retriever(
        &[
            "El seguro de moto cubre daños a terceros.",
            "La póliza de hogar incluye incendios.",
            "La prima se abona de forma anual.",
        ],
        MetadataCatalog::default(),
    );

    let first = retriever.retrieve("¿Qué cubre la póliza?", 3).expect("first");
    let second = retriever.retrieve("¿Qué cubre la póliza?", 3).expect("second");
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.chunk_id, b.chunk_id);
        assert_eq!(a.final_score, b.final_score);
    }
}

#[test]
fn k_beyond_corpus_returns_everything() {
    let retriever = build_retriever(
        &[
            "El seguro de moto cubre daños a terceros.",
            "La póliza de hogar incluye incendios.",
        ],
        MetadataCatalog::default(),
    );
    let results = retriever.retrieve("seguro", 50).expect("retrieve");
    assert_eq!(results.len(), 2, "clamped to corpus size, no error");
}

#[test]
fn invalid_k_and_empty_index_are_caller_errors() {
    let retriever = build_retriever(&["Texto de ejemplo."], MetadataCatalog::default());
    assert!(matches!(retriever.retrieve("q", 0), Err(Error::InvalidArgument(_))));

    let empty = Retriever::new(
        Box::new(FakeEmbedder::new(EMBEDDING_DIM)),
        IndexArtifacts::new(
            FlatIndex::new(EMBEDDING_DIM).expect("index"),
            Vec::new(),
            Vec::new(),
        )
        .expect("aligned"),
        MetadataCatalog::default(),
    )
    .expect("retriever");
    assert!(matches!(empty.retrieve("q", 3), Err(Error::IndexNotReady(_))));
}

#[test]
fn embedder_dimension_mismatch_is_rejected_up_front() {
    let artifacts = IndexArtifacts::new(
        FlatIndex::new(128).expect("index"),
        Vec::new(),
        Vec::new(),
    )
    .expect("aligned");
    let err = Retriever::new(
        Box::new(FakeEmbedder::new(EMBEDDING_DIM)),
        artifacts,
        MetadataCatalog::default(),
    )
    .expect_err("mismatch");
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn persisted_retriever_matches_the_live_one() {
    let tmp = TempDir::new().expect("tempdir");
    let corpus = [
        "El seguro de moto cubre daños a terceros.",
        "La póliza de hogar incluye incendios.",
        "La prima se abona de forma anual.",
    ];
    let embedder = FakeEmbedder::new(EMBEDDING_DIM);
    let owned: Vec<String> = corpus.iter().map(|t| (*t).to_string()).collect();
    let vectors = embedder.embed_batch(&owned).expect("embed");
    let index = FlatIndex::build(EMBEDDING_DIM, &vectors).expect("build");
    let ids: Vec<String> = (1..=corpus.len())
        .map(|i| format!("poliza.txt | section {}", i))
        .collect();
    let artifacts = IndexArtifacts::new(index, ids, owned).expect("aligned");
    save_all(&artifacts, tmp.path()).expect("save");

    let live = Retriever::new(
        Box::new(FakeEmbedder::new(EMBEDDING_DIM)),
        artifacts,
        MetadataCatalog::default(),
    )
    .expect("live retriever");
    let reloaded = Retriever::open(
        Box::new(FakeEmbedder::new(EMBEDDING_DIM)),
        tmp.path(),
        MetadataCatalog::default(),
    )
    .expect("reloaded retriever");

    for k in 1..=corpus.len() {
        let a = live.retrieve("¿Qué cubre el seguro?", k).expect("live");
        let b = reloaded.retrieve("¿Qué cubre el seguro?", k).expect("reloaded");
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.chunk_id, y.chunk_id, "same ids in the same order");
        }
    }
}

#[test]
fn context_concatenates_top_k_texts() {
    let retriever = build_retriever(
        &[
            "El seguro de moto cubre daños a terceros.",
            "La póliza de hogar incluye incendios.",
        ],
        MetadataCatalog::default(),
    );
    let context = retriever
        .context_for("¿Qué cubre el seguro de moto?", 2)
        .expect("context");
    let lines: Vec<&str> = context.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("seguro de moto"), "best match comes first");
}
