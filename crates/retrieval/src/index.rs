//! Brute-force exact nearest-neighbor index.
//!
//! The corpus is small enough to scan in full, so every query computes
//! the Euclidean distance to every stored vector. Results are ordered by
//! ascending distance with ties broken by ascending chunk id, which
//! makes the ranking fully deterministic regardless of how the vectors
//! were produced or stored.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use thermo_core::{AppError, AppResult};

use crate::store;
use crate::types::{Chunk, IndexStats};

/// One immutable, fully built corpus snapshot.
///
/// Published behind an `Arc`: in-flight queries keep whatever snapshot
/// they started with while a rebuild swaps in a new one.
struct Snapshot {
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    dims: usize,
    built_at: Option<DateTime<Utc>>,
}

/// In-memory index over the (chunks, vectors) pair.
///
/// Starts `NotReady`; `build` or `load` transitions it to `Ready`.
/// Queries against a `NotReady` index fail with
/// [`AppError::IndexNotReady`] rather than being retried internally.
pub struct VectorIndex {
    dir: PathBuf,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    // Serializes builders without ever blocking queries: the snapshot
    // write lock is only taken for the final swap.
    build_lock: Mutex<()>,
}

impl VectorIndex {
    /// Create an index rooted at `dir`, initially `NotReady`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            snapshot: RwLock::new(None),
            build_lock: Mutex::new(()),
        }
    }

    /// Whether a snapshot is currently published.
    pub fn is_ready(&self) -> bool {
        self.snapshot.read().unwrap().is_some()
    }

    /// Build a fresh snapshot from parallel (texts, vectors) lists.
    ///
    /// The new pair is validated and persisted before the snapshot is
    /// published in a single swap, so concurrent queries observe either
    /// the old corpus or the new one, never a partial state. On any
    /// failure the previous snapshot stays untouched.
    ///
    /// Returns the number of chunks indexed.
    pub fn build(&self, texts: Vec<String>, vectors: Vec<Vec<f32>>) -> AppResult<usize> {
        if texts.is_empty() || vectors.is_empty() {
            return Err(AppError::DimensionMismatch(
                "cannot build an index from an empty corpus".to_string(),
            ));
        }

        if texts.len() != vectors.len() {
            return Err(AppError::DimensionMismatch(format!(
                "{} chunks but {} vectors",
                texts.len(),
                vectors.len()
            )));
        }

        let dims = vectors[0].len();
        if dims == 0 {
            return Err(AppError::DimensionMismatch(
                "vectors have zero dimensions".to_string(),
            ));
        }

        if let Some(bad) = vectors.iter().position(|v| v.len() != dims) {
            return Err(AppError::DimensionMismatch(format!(
                "vector {} has length {}, expected {}",
                bad,
                vectors[bad].len(),
                dims
            )));
        }

        let _guard = self.build_lock.lock().unwrap();

        store::save(&self.dir, &texts, &vectors, dims)?;

        let chunks: Vec<Chunk> = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk { id: i as u32, text })
            .collect();
        let count = chunks.len();

        let snapshot = Arc::new(Snapshot {
            chunks,
            vectors,
            dims,
            built_at: Some(Utc::now()),
        });

        *self.snapshot.write().unwrap() = Some(snapshot);

        tracing::info!("Index built with {} chunks ({} dimensions)", count, dims);

        Ok(count)
    }

    /// Restore a previously persisted snapshot.
    ///
    /// Returns whether the index is `Ready` afterwards. Absent state is
    /// normal on first run; corrupt state is discarded with a warning.
    /// Neither is fatal.
    pub fn load(&self) -> bool {
        match store::load(&self.dir) {
            Ok(Some((texts, vectors, dims))) => {
                let built_at = std::fs::metadata(self.dir.join(store::VECTORS_FILE))
                    .and_then(|m| m.modified())
                    .map(DateTime::<Utc>::from)
                    .ok();

                let chunks: Vec<Chunk> = texts
                    .into_iter()
                    .enumerate()
                    .map(|(i, text)| Chunk { id: i as u32, text })
                    .collect();
                let count = chunks.len();

                let snapshot = Arc::new(Snapshot {
                    chunks,
                    vectors,
                    dims,
                    built_at,
                });

                *self.snapshot.write().unwrap() = Some(snapshot);

                tracing::info!("Loaded corpus with {} chunks ({} dimensions)", count, dims);
                true
            }
            Ok(None) => {
                tracing::debug!("No persisted index at {:?}", self.dir);
                false
            }
            Err(e) => {
                tracing::warn!("Discarding corrupt persisted index at {:?}: {}", self.dir, e);
                false
            }
        }
    }

    /// Return the `min(k, corpus size)` chunks nearest to `query`.
    ///
    /// `k` is clamped silently — asking for more neighbors than exist
    /// returns all of them. Callers never see the stored vectors.
    pub fn query(&self, query: &[f32], k: usize) -> AppResult<Vec<Chunk>> {
        let snapshot = self
            .snapshot
            .read()
            .unwrap()
            .clone()
            .ok_or(AppError::IndexNotReady)?;

        if query.len() != snapshot.dims {
            return Err(AppError::DimensionMismatch(format!(
                "query vector has length {}, index has {}",
                query.len(),
                snapshot.dims
            )));
        }

        // Rank positions, not chunks: position == id, so the (distance,
        // position) sort key gives the deterministic tie-break by id.
        let mut ranked: Vec<(f32, usize)> = snapshot
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (l2_distance(query, v), i))
            .collect();

        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .map(|(_, i)| snapshot.chunks[i].clone())
            .collect())
    }

    /// Statistics for the current snapshot.
    pub fn stats(&self) -> AppResult<IndexStats> {
        let snapshot = self
            .snapshot
            .read()
            .unwrap()
            .clone()
            .ok_or(AppError::IndexNotReady)?;

        Ok(IndexStats {
            chunk_count: snapshot.chunks.len(),
            dimensions: snapshot.dims,
            built_at: snapshot.built_at,
        })
    }

    /// On-disk size of the persisted artifacts, in bytes.
    pub fn disk_size(&self) -> u64 {
        [store::CHUNKS_FILE, store::VECTORS_FILE]
            .iter()
            .filter_map(|name| std::fs::metadata(self.dir.join(name)).ok())
            .map(|m| m.len())
            .sum()
    }
}

/// Euclidean (L2) distance between two equal-length vectors.
fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn texts(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_query_returns_min_k_sorted_by_distance() {
        let temp = TempDir::new().unwrap();
        let index = VectorIndex::new(temp.path());

        index
            .build(
                texts(&["far", "near", "mid"]),
                vec![
                    vec![10.0, 0.0],
                    vec![1.0, 0.0],
                    vec![5.0, 0.0],
                ],
            )
            .unwrap();

        let results = index.query(&[0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "near");
        assert_eq!(results[1].text, "mid");

        // k larger than the corpus is clamped, not an error
        let all = index.query(&[0.0, 0.0], 100).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].text, "far");

        // k == 0 is valid and empty
        assert!(index.query(&[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_equal_distance_ties_break_by_ascending_id() {
        let temp = TempDir::new().unwrap();
        let index = VectorIndex::new(temp.path());

        // Chunks 1 and 3 are synthetically identical; 0 and 2 pad the corpus.
        index
            .build(
                texts(&["pad-a", "twin-low", "pad-b", "twin-high"]),
                vec![
                    vec![9.0, 9.0],
                    vec![1.0, 1.0],
                    vec![8.0, 8.0],
                    vec![1.0, 1.0],
                ],
            )
            .unwrap();

        let results = index.query(&[1.0, 1.0], 4).unwrap();
        assert_eq!(results[0].id, 1);
        assert_eq!(results[0].text, "twin-low");
        assert_eq!(results[1].id, 3);
        assert_eq!(results[1].text, "twin-high");
    }

    #[test]
    fn test_build_then_load_answers_identical_queries() {
        let temp = TempDir::new().unwrap();
        let query = [0.3f32, -0.7, 0.2];

        let first = VectorIndex::new(temp.path());
        first
            .build(
                texts(&["a", "b", "c", "d"]),
                vec![
                    vec![0.1, 0.2, 0.3],
                    vec![-0.5, 0.5, 0.0],
                    vec![0.3, -0.7, 0.2],
                    vec![1.0, 1.0, 1.0],
                ],
            )
            .unwrap();
        let before = first.query(&query, 4).unwrap();

        // Simulated process restart: a fresh index over the same directory
        let second = VectorIndex::new(temp.path());
        assert!(second.load());
        let after = second.query(&query, 4).unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn test_mismatched_build_leaves_previous_snapshot_untouched() {
        let temp = TempDir::new().unwrap();
        let index = VectorIndex::new(temp.path());

        index
            .build(texts(&["original"]), vec![vec![1.0, 0.0]])
            .unwrap();

        let err = index
            .build(texts(&["one", "two"]), vec![vec![1.0, 0.0]])
            .unwrap_err();
        assert!(matches!(err, AppError::DimensionMismatch(_)));

        let err = index
            .build(
                texts(&["one", "two"]),
                vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]],
            )
            .unwrap_err();
        assert!(matches!(err, AppError::DimensionMismatch(_)));

        let err = index.build(vec![], vec![]).unwrap_err();
        assert!(matches!(err, AppError::DimensionMismatch(_)));

        // The original corpus still answers
        let results = index.query(&[1.0, 0.0], 1).unwrap();
        assert_eq!(results[0].text, "original");
    }

    #[test]
    fn test_query_before_build_is_not_ready() {
        let temp = TempDir::new().unwrap();
        let index = VectorIndex::new(temp.path());
        assert!(!index.is_ready());
        assert!(matches!(
            index.query(&[1.0], 1),
            Err(AppError::IndexNotReady)
        ));
    }

    #[test]
    fn test_query_with_wrong_dimensionality() {
        let temp = TempDir::new().unwrap();
        let index = VectorIndex::new(temp.path());
        index.build(texts(&["a"]), vec![vec![1.0, 0.0]]).unwrap();

        assert!(matches!(
            index.query(&[1.0, 0.0, 0.0], 1),
            Err(AppError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_load_of_corrupt_state_degrades_to_not_ready() {
        let temp = TempDir::new().unwrap();
        let index = VectorIndex::new(temp.path());
        index.build(texts(&["a"]), vec![vec![1.0]]).unwrap();

        std::fs::write(temp.path().join(store::VECTORS_FILE), b"garbage").unwrap();

        let fresh = VectorIndex::new(temp.path());
        assert!(!fresh.load());
        assert!(!fresh.is_ready());
    }

    #[test]
    fn test_rebuild_replaces_corpus_atomically_for_readers() {
        let temp = TempDir::new().unwrap();
        let index = std::sync::Arc::new(VectorIndex::new(temp.path()));
        index
            .build(texts(&["old-a", "old-b"]), vec![vec![0.0], vec![1.0]])
            .unwrap();

        let reader = {
            let index = std::sync::Arc::clone(&index);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let results = index.query(&[0.5], 2).unwrap();
                    // Every observation is one complete corpus generation
                    assert_eq!(results.len(), 2);
                    let old = results.iter().all(|c| c.text.starts_with("old-"));
                    let new = results.iter().all(|c| c.text.starts_with("new-"));
                    assert!(old || new);
                }
            })
        };

        for _ in 0..20 {
            index
                .build(texts(&["new-a", "new-b"]), vec![vec![0.0], vec![1.0]])
                .unwrap();
        }

        reader.join().unwrap();
    }
}
