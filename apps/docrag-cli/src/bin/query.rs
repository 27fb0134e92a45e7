use std::{env, path::PathBuf, process};

use docrag_core::config::Config;
use docrag_embed::get_default_embedder;
use docrag_retrieve::{MetadataCatalog, Retriever};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let mut query = None;
    let mut k = 3usize;
    let mut show_context = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-k" => {
                if let Some(n) = args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) {
                    k = n;
                    i += 1;
                } else {
                    eprintln!("Error: -k requires a number");
                    process::exit(1);
                }
            }
            "--context" | "-c" => show_context = true,
            _ if !args[i].starts_with('-') => query = Some(args[i].clone()),
            _ => {}
        }
        i += 1;
    }
    let Some(query) = query else {
        eprintln!("Usage: docrag-query '<question>' [-k N] [--context]");
        process::exit(1);
    };

    let index_dir = PathBuf::from(
        config
            .get::<String>("data.index_dir")
            .unwrap_or_else(|_| "index".to_string()),
    );
    let metadata_file = PathBuf::from(
        config
            .get::<String>("data.metadata_file")
            .unwrap_or_else(|_| "document_metadata.json".to_string()),
    );

    let embedder = get_default_embedder()?;
    let catalog = MetadataCatalog::load_or_default(&metadata_file);
    let retriever = Retriever::open(embedder, &index_dir, catalog)?;
    println!(
        "🔍 Searching {} indexed fragments for: {}",
        retriever.indexed_fragments(),
        query
    );

    let results = retriever.retrieve(&query, k)?;
    for (rank, result) in results.iter().enumerate() {
        println!(
            "\n--- Result {} (score {:.3}, distance {:.3}) ---",
            rank + 1,
            result.final_score,
            result.distance
        );
        println!("Fragment: {}", result.chunk_id);
        let preview: String = result.text.chars().take(200).collect();
        println!("{}", preview);
    }

    if show_context {
        println!("\n=== Context for answer generation ===");
        println!("{}", retriever.context_for(&query, k)?);
    }
    Ok(())
}
