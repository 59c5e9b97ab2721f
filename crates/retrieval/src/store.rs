//! Durable storage for the (chunks, vectors) pair.
//!
//! Two parallel artifacts are written together under the index
//! directory: `chunks.json`, an ordered JSON array of chunk texts whose
//! position is the chunk id, and `vectors.bin`, a dense row-major array
//! of little-endian f32 values behind a small shape header. A reader
//! that cannot reconstruct both artifacts treats the pair as absent.

use std::fs;
use std::path::Path;

use thermo_core::{AppError, AppResult};

/// Chunk list artifact name.
pub const CHUNKS_FILE: &str = "chunks.json";

/// Vector array artifact name.
pub const VECTORS_FILE: &str = "vectors.bin";

const VECTORS_MAGIC: &[u8; 4] = b"TVEC";
const VECTORS_VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// Write both artifacts, replacing any previous pair.
///
/// Each artifact is written to a temporary sibling and renamed into
/// place, so a crash mid-write leaves either the old pair or a
/// mismatched pair that `load` rejects as corrupt.
pub fn save(dir: &Path, texts: &[String], vectors: &[Vec<f32>], dims: usize) -> AppResult<()> {
    fs::create_dir_all(dir)?;

    let chunks_bytes = serde_json::to_vec_pretty(texts)?;
    let vectors_bytes = encode_vectors(vectors, dims)?;

    let chunks_tmp = dir.join(format!("{}.tmp", CHUNKS_FILE));
    let vectors_tmp = dir.join(format!("{}.tmp", VECTORS_FILE));

    fs::write(&chunks_tmp, &chunks_bytes)?;
    fs::write(&vectors_tmp, &vectors_bytes)?;

    fs::rename(&vectors_tmp, dir.join(VECTORS_FILE))?;
    fs::rename(&chunks_tmp, dir.join(CHUNKS_FILE))?;

    tracing::debug!(
        "Persisted {} chunks and a {}x{} vector array to {:?}",
        texts.len(),
        vectors.len(),
        dims,
        dir
    );

    Ok(())
}

/// Read a previously persisted pair.
///
/// Returns `Ok(None)` when either artifact is missing — one without the
/// other is treated as an absent pair, never a partial corpus. Corrupt
/// or disagreeing artifacts are errors; the index layer downgrades them
/// to `NotReady` with a warning.
pub fn load(dir: &Path) -> AppResult<Option<(Vec<String>, Vec<Vec<f32>>, usize)>> {
    let chunks_path = dir.join(CHUNKS_FILE);
    let vectors_path = dir.join(VECTORS_FILE);

    if !chunks_path.exists() || !vectors_path.exists() {
        return Ok(None);
    }

    let texts: Vec<String> = serde_json::from_slice(&fs::read(&chunks_path)?)?;
    let (vectors, dims) = decode_vectors(&fs::read(&vectors_path)?)?;

    if texts.len() != vectors.len() {
        return Err(AppError::Index(format!(
            "persisted pair disagrees: {} chunks but {} vectors",
            texts.len(),
            vectors.len()
        )));
    }

    Ok(Some((texts, vectors, dims)))
}

/// Encode the vector list as magic + version + rows + dims + f32 LE data.
fn encode_vectors(vectors: &[Vec<f32>], dims: usize) -> AppResult<Vec<u8>> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + vectors.len() * dims * 4);
    bytes.extend_from_slice(VECTORS_MAGIC);
    bytes.extend_from_slice(&VECTORS_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(vectors.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&(dims as u32).to_le_bytes());

    for (row_idx, row) in vectors.iter().enumerate() {
        if row.len() != dims {
            return Err(AppError::DimensionMismatch(format!(
                "vector {} has length {}, expected {}",
                row_idx,
                row.len(),
                dims
            )));
        }
        for &value in row {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }

    Ok(bytes)
}

/// Decode the vector artifact back into rows, validating the header.
fn decode_vectors(bytes: &[u8]) -> AppResult<(Vec<Vec<f32>>, usize)> {
    if bytes.len() < HEADER_LEN {
        return Err(AppError::Index(
            "vector artifact too short for its header".to_string(),
        ));
    }

    if &bytes[0..4] != VECTORS_MAGIC {
        return Err(AppError::Index(
            "vector artifact has an unrecognized magic number".to_string(),
        ));
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != VECTORS_VERSION {
        return Err(AppError::Index(format!(
            "unsupported vector artifact version {}",
            version
        )));
    }

    let rows = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let dims = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;

    let expected = HEADER_LEN + rows * dims * 4;
    if bytes.len() != expected {
        return Err(AppError::Index(format!(
            "vector artifact is {} bytes, expected {} for shape {}x{}",
            bytes.len(),
            expected,
            rows,
            dims
        )));
    }

    let mut vectors = Vec::with_capacity(rows);
    let mut offset = HEADER_LEN;
    for _ in 0..rows {
        let mut row = Vec::with_capacity(dims);
        for _ in 0..dims {
            let value = f32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ]);
            row.push(value);
            offset += 4;
        }
        vectors.push(row);
    }

    Ok((vectors, dims))
}
