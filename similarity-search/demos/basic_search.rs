//! # Basic Search Example
//!
//! Splits a few short documents into chunks, indexes them, runs a query,
//! prints an LLM prompt built from the results, and saves the index.
//!
//! Uses a deterministic `HashingEmbedder` over the bundled WordPiece
//! vocabulary so it runs with no model files.
//!
//! Run: `RUST_LOG=info cargo run --example basic_search`

use std::sync::Arc;

use similarity_search::{
    BertTokenizer, Embedder, IndexConfig, Metadata, MetricKind, SimilarityIndex, TokenSplitter,
    Tokenizer, chunk_text, export_llm_prompt,
};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// HashingEmbedder: feature-hashed bag of WordPiece tokens
// ---------------------------------------------------------------------------

struct HashingEmbedder {
    tokenizer: BertTokenizer,
    dimensions: usize,
}

#[async_trait::async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> similarity_search::Result<Vec<f32>> {
        let mut embedding = vec![0.0f32; self.dimensions];
        for token in self.tokenizer.tokenize(text) {
            let hash = token.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        Ok(embedding)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

const DOCUMENTS: &[(&str, &str, &str)] = &[
    (
        "games",
        "games.txt",
        "Play free games online today. New games are added to the world list every week. \
         Read the news before you play.",
    ),
    (
        "music",
        "music.txt",
        "Search free music online. You can play any music you like. \
         Read the full terms before you buy any products.",
    ),
    (
        "privacy",
        "privacy.txt",
        "Read the privacy policy. The policy should tell you which products we sell \
         and how we use the news you read.",
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // -- 1. Build the index -------------------------------------------------
    let tokenizer = BertTokenizer::bundled()?;
    let config = IndexConfig::builder()
        .name("basic-search-demo")
        .metric(MetricKind::Cosine)
        .default_top_k(3)
        .storage_dir(std::env::temp_dir().join("similarity-search-demo"))
        .build()?;

    let mut index = SimilarityIndex::builder()
        .config(config)
        .embedder(Arc::new(HashingEmbedder { tokenizer: tokenizer.clone(), dimensions: 128 }))
        .build()
        .await?;
    println!("index '{}' ready, dimension {}", index.name(), index.dimension());

    // -- 2. Split and add documents -----------------------------------------
    let splitter = TokenSplitter::new(Arc::new(tokenizer));
    for (id, source, text) in DOCUMENTS {
        let metadata = Metadata::from([("source".to_string(), source.to_string())]);
        let chunks = chunk_text(&splitter, id, text, &metadata, 16, 0);
        index
            .add_items_with_progress(
                chunks.iter().map(|c| c.id.clone()).collect(),
                chunks.iter().map(|c| c.text.clone()).collect(),
                chunks.iter().map(|c| c.metadata.clone()).collect(),
                None,
                |chunk_id| println!("  encoded {chunk_id}"),
            )
            .await?;
    }
    println!("{} chunks, ~{} bytes", index.len(), index.estimated_size_in_bytes());

    // -- 3. Query -----------------------------------------------------------
    let query = "where can I play free games";
    let results = index.search(query, None, None).await;
    for result in &results {
        println!("{:>6.3}  {:<10} {}", result.score, result.id, result.text);
    }

    println!("\n{}\n", export_llm_prompt(query, &results));

    // -- 4. Persist ---------------------------------------------------------
    let path = index.save_index(None, None)?;
    println!("saved to {}", path.display());

    Ok(())
}
