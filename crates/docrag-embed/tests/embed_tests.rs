use docrag_core::traits::Embedder;
use docrag_core::Error;
use docrag_embed::{get_default_embedder, FakeEmbedder, EMBEDDING_DIM};

#[test]
fn fake_embedder_shapes_and_determinism() {
    // Force the fake embedder to avoid loading the real model
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");

    let embedder = get_default_embedder().expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), EMBEDDING_DIM, "embedding dim is 384");

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn empty_batch_is_rejected() {
    let embedder = FakeEmbedder::new(EMBEDDING_DIM);
    let err = embedder.embed_batch(&[]).expect_err("empty input must fail");
    assert!(matches!(err, Error::EmptyInput(_)));
}

#[test]
fn batch_order_is_preserved() {
    let embedder = FakeEmbedder::new(EMBEDDING_DIM);
    let texts = vec![
        "la prima del seguro".to_string(),
        "el clima de mañana".to_string(),
    ];
    let batched = embedder.embed_batch(&texts).expect("batch");
    let single_a = embedder.embed_batch(&texts[..1].to_vec()).expect("single a");
    let single_b = embedder.embed_batch(&texts[1..].to_vec()).expect("single b");

    assert_eq!(batched[0], single_a[0]);
    assert_eq!(batched[1], single_b[0]);
    assert_ne!(batched[0], batched[1], "different texts embed differently");
}

#[test]
fn shared_tokens_reduce_distance() {
    let embedder = FakeEmbedder::new(EMBEDDING_DIM);
    let texts = vec![
        "el seguro de moto cubre daños".to_string(),
        "el seguro de moto cubre incendios".to_string(),
        "recetas de cocina vegetariana".to_string(),
    ];
    let embs = embedder.embed_batch(&texts).expect("batch");

    let d = |a: &[f32], b: &[f32]| -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
    };
    assert!(
        d(&embs[0], &embs[1]) < d(&embs[0], &embs[2]),
        "texts sharing most tokens are closer"
    );
}
