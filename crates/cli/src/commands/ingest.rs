//! Ingest command handler.
//!
//! Builds (or rebuilds) the corpus index from text sources.

use clap::Args;
use std::path::PathBuf;
use thermo_core::{config::AppConfig, AppResult};
use thermo_retrieval::{create_provider, ingest, IngestOptions, VectorIndex};

/// Build the corpus index from text sources
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories containing text sources
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Chunk size in characters
    #[arg(long, default_value_t = 500)]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks
    #[arg(long, default_value_t = 50)]
    pub overlap: usize,

    /// Output stats as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    /// Execute the ingest command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        let provider = create_provider(&config.embedding)?;
        let index = VectorIndex::new(config.index_dir());

        let options = IngestOptions {
            paths: self.paths.clone(),
            chunk_size: self.chunk_size,
            overlap: self.overlap,
        };

        let stats = ingest(&index, provider.as_ref(), &options).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&stats)
                .map_err(|e| thermo_core::AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!(
                "Indexed {} chunks from {} sources ({} bytes) in {:.2}s",
                stats.chunks_count,
                stats.sources_count,
                stats.bytes_processed,
                stats.duration_secs
            );
        }

        Ok(())
    }
}
