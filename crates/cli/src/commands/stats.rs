//! Stats command handler.
//!
//! Shows statistics for the persisted corpus index.

use clap::Args;
use thermo_core::{config::AppConfig, AppResult};
use thermo_retrieval::VectorIndex;

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    /// Execute the stats command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let index = VectorIndex::new(config.index_dir());

        if !index.load() {
            println!("No corpus indexed yet. Run `thermo ingest <paths>` to build one.");
            return Ok(());
        }

        let stats = index.stats()?;
        let disk_size = index.disk_size();

        if self.json {
            let output = serde_json::json!({
                "chunkCount": stats.chunk_count,
                "dimensions": stats.dimensions,
                "builtAt": stats.built_at,
                "diskSizeBytes": disk_size,
            });
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| thermo_core::AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("Chunks:     {}", stats.chunk_count);
            println!("Dimensions: {}", stats.dimensions);
            match stats.built_at {
                Some(ts) => println!("Built at:   {}", ts.to_rfc3339()),
                None => println!("Built at:   unknown"),
            }
            println!("Disk size:  {} bytes", disk_size);
        }

        Ok(())
    }
}
