use std::{env, fs, path::PathBuf};

use docrag_core::config::Config;
use docrag_retrieve::MetadataGenerator;
use docrag_segment::PlainTextExtractor;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let data_dir = args
        .iter()
        .find(|a| !a.starts_with('-'))
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let dir: String = config
                .get("data.raw_dir")
                .unwrap_or_else(|_| "data".to_string());
            PathBuf::from(dir)
        });
    let metadata_file = PathBuf::from(
        config
            .get::<String>("data.metadata_file")
            .unwrap_or_else(|_| "document_metadata.json".to_string()),
    );

    println!("Metadata Generation\n===================");
    println!("Corpus directory: {}", data_dir.display());

    let generator = MetadataGenerator::new();
    let catalog = generator.generate_catalog(&data_dir, &PlainTextExtractor)?;
    fs::write(&metadata_file, serde_json::to_string_pretty(&catalog)?)?;

    println!("✅ Metadata for {} documents written to {}", catalog.len(), metadata_file.display());
    Ok(())
}
