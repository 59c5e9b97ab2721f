//! Corpus ingestion: walk sources, chunk, embed, build the index.
//!
//! The ingestor reads pre-extracted UTF-8 text sources. Chunk boundaries
//! and cleaning live here, not in the index — the index only sees the
//! final (texts, vectors) pair.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use thermo_core::{AppError, AppResult};

use crate::chunker;
use crate::embeddings::EmbeddingProvider;
use crate::index::VectorIndex;

/// Extensions accepted as text sources.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "text"];

/// Number of chunks embedded per provider call.
const EMBED_BATCH: usize = 64;

/// Options for an ingest run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Files or directories to ingest
    pub paths: Vec<PathBuf>,

    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks
    pub overlap: usize,
}

/// Statistics from an ingest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of source files processed
    pub sources_count: u32,

    /// Number of chunks indexed
    pub chunks_count: u32,

    /// Total bytes of source text processed
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Ingest the given paths and rebuild the index.
pub async fn ingest(
    index: &VectorIndex,
    provider: &dyn EmbeddingProvider,
    options: &IngestOptions,
) -> AppResult<IngestStats> {
    let start = Instant::now();

    tracing::info!("Starting ingest of {} path(s)", options.paths.len());

    let mut texts: Vec<String> = Vec::new();
    let mut sources_count = 0u32;
    let mut bytes_processed = 0u64;

    for path in &options.paths {
        if path.is_file() {
            if let Some(bytes) = collect_source(path, options, &mut texts) {
                sources_count += 1;
                bytes_processed += bytes;
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && is_text_source(entry_path) {
                    if let Some(bytes) = collect_source(entry_path, options, &mut texts) {
                        sources_count += 1;
                        bytes_processed += bytes;
                    }
                }
            }
        } else {
            tracing::warn!("Skipping {:?}: not a file or directory", path);
        }
    }

    if texts.is_empty() {
        return Err(AppError::Index(format!(
            "no text chunks produced from {:?}; nothing to index",
            options.paths
        )));
    }

    tracing::info!(
        "Embedding {} chunks with provider '{}' (model: {})",
        texts.len(),
        provider.provider_name(),
        provider.model_name()
    );

    let mut vectors = Vec::with_capacity(texts.len());
    for batch in texts.chunks(EMBED_BATCH) {
        vectors.extend(provider.embed_batch(batch).await?);
    }

    let chunks_count = index.build(texts, vectors)? as u32;

    let duration = start.elapsed();

    tracing::info!(
        "Ingest completed: {} sources, {} chunks, {} bytes in {:.2}s",
        sources_count,
        chunks_count,
        bytes_processed,
        duration.as_secs_f64()
    );

    Ok(IngestStats {
        sources_count,
        chunks_count,
        bytes_processed,
        duration_secs: duration.as_secs_f64(),
    })
}

/// Read and chunk one source file, appending into `texts`.
///
/// Unreadable or non-UTF-8 sources are skipped with a warning rather
/// than aborting the whole run.
fn collect_source(path: &Path, options: &IngestOptions, texts: &mut Vec<String>) -> Option<u64> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!("Skipping {:?}: {}", path, e);
            return None;
        }
    };

    let bytes = contents.len() as u64;
    let chunks = chunker::chunk_text(&contents, options.chunk_size, options.overlap);

    tracing::debug!("Collected {:?}: {} chunks, {} bytes", path, chunks.len(), bytes);

    texts.extend(chunks);
    Some(bytes)
}

fn is_text_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::trigram::TrigramProvider;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ingest_builds_queryable_index() {
        let corpus_dir = TempDir::new().unwrap();
        std::fs::write(
            corpus_dir.path().join("conduction.txt"),
            "Conduction moves heat through a solid along a temperature gradient. ".repeat(8),
        )
        .unwrap();
        std::fs::write(
            corpus_dir.path().join("radiation.md"),
            "Radiation transfers energy between surfaces as electromagnetic waves. ".repeat(8),
        )
        .unwrap();
        // Not a text extension, must be ignored
        std::fs::write(corpus_dir.path().join("notes.bin"), [0u8, 159, 146, 150]).unwrap();

        let index_dir = TempDir::new().unwrap();
        let index = VectorIndex::new(index_dir.path());
        let provider = TrigramProvider::new(64);

        let options = IngestOptions {
            paths: vec![corpus_dir.path().to_path_buf()],
            chunk_size: 120,
            overlap: 20,
        };

        let stats = ingest(&index, &provider, &options).await.unwrap();
        assert_eq!(stats.sources_count, 2);
        assert!(stats.chunks_count > 0);
        assert!(index.is_ready());

        let query = provider.embed("heat conduction in a solid").await.unwrap();
        let results = index.query(&query, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].text.contains("Conduction"));
    }

    #[tokio::test]
    async fn test_ingest_with_no_sources_is_an_error() {
        let corpus_dir = TempDir::new().unwrap();
        let index_dir = TempDir::new().unwrap();
        let index = VectorIndex::new(index_dir.path());
        let provider = TrigramProvider::new(64);

        let options = IngestOptions {
            paths: vec![corpus_dir.path().to_path_buf()],
            chunk_size: 120,
            overlap: 20,
        };

        let result = ingest(&index, &provider, &options).await;
        assert!(result.is_err());
        assert!(!index.is_ready());
    }

    #[test]
    fn test_is_text_source() {
        assert!(is_text_source(Path::new("a/b/notes.txt")));
        assert!(is_text_source(Path::new("README.MD")));
        assert!(!is_text_source(Path::new("corpus.pdf")));
        assert!(!is_text_source(Path::new("no_extension")));
    }
}
