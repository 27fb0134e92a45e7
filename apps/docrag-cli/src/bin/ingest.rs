use std::{env, path::PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use docrag_core::config::{Config, SegmentationSettings};
use docrag_core::traits::SegmentationStrategy;
use docrag_index::store::{save_all, IndexArtifacts};
use docrag_index::FlatIndex;
use docrag_embed::get_default_embedder;
use docrag_segment::{DocumentLoader, FixedWindowSegmenter, PlainTextExtractor, StructuralSegmenter};

const EMBED_BATCH: usize = 64;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;
    // Validated before any document I/O: a bad overlap aborts the whole run
    let settings = config.segmentation()?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut data_dir = None;
    for arg in &args {
        if !arg.starts_with('-') {
            data_dir = Some(PathBuf::from(arg));
        }
    }
    let data_dir = data_dir.unwrap_or_else(|| {
        let dir: String = config
            .get("data.raw_dir")
            .unwrap_or_else(|_| "data".to_string());
        PathBuf::from(dir)
    });
    let index_dir = PathBuf::from(
        config
            .get::<String>("data.index_dir")
            .unwrap_or_else(|_| "index".to_string()),
    );

    println!("Document Ingestion\n==================");
    println!("Corpus directory: {}", data_dir.display());
    println!("Segmentation: {} strategy", settings.strategy);

    let strategy: Box<dyn SegmentationStrategy> = build_strategy(&settings)?;
    let loader = DocumentLoader::new(Box::new(PlainTextExtractor), strategy);
    let (chunks, summary) = loader.load_directory(&data_dir)?;
    println!(
        "✂️  {} fragments from {} documents ({} skipped)",
        chunks.len(),
        summary.processed,
        summary.skipped
    );
    for doc in &summary.skipped_docs {
        println!("⚠️  skipped: {}", doc);
    }

    let embedder = get_default_embedder()?;
    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} fragments ({percent}%)")?
            .progress_chars("#>-"),
    );
    let mut vectors = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(EMBED_BATCH) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        vectors.extend(embedder.embed_batch(&texts)?);
        pb.inc(batch.len() as u64);
    }
    pb.finish_with_message("embedding completed");

    let index = FlatIndex::build(embedder.dim(), &vectors)?;
    let ids = chunks.iter().map(|c| c.id.clone()).collect();
    let texts = chunks.iter().map(|c| c.text.clone()).collect();
    let artifacts = IndexArtifacts::new(index, ids, texts)?;
    save_all(&artifacts, &index_dir)?;

    println!("\n✅ Indexed {} fragments into {}", chunks.len(), index_dir.display());
    println!("📊 Documents: {} processed, {} skipped", summary.processed, summary.skipped);
    println!("\n💡 To query, use: cargo run --bin docrag-query '<question>'");
    Ok(())
}

fn build_strategy(settings: &SegmentationSettings) -> anyhow::Result<Box<dyn SegmentationStrategy>> {
    let strategy: Box<dyn SegmentationStrategy> = match settings.strategy.as_str() {
        "fixed" => Box::new(FixedWindowSegmenter::new(
            settings.chunk_size,
            settings.overlap_fraction,
        )?),
        _ => Box::new(StructuralSegmenter::new()),
    };
    Ok(strategy)
}
