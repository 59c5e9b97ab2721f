//! Retrieval type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable unit of corpus text.
///
/// The `id` is the chunk's ordinal position in the build that produced
/// it — its index in the persisted sequence. Ids are never reused within
/// a build and do not survive a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable ordinal identifier, assigned at build time
    pub id: u32,

    /// Opaque text payload, not interpreted by the index
    pub text: String,
}

/// Statistics for a built or loaded index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of chunks in the current snapshot
    pub chunk_count: usize,

    /// Embedding dimensionality
    pub dimensions: usize,

    /// When the snapshot was built (file mtime for loaded snapshots)
    pub built_at: Option<DateTime<Utc>>,
}
