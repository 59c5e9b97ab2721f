//! Text chunking with configurable size and overlap.
//!
//! Character-based chunking; boundaries are clamped to valid UTF-8
//! char boundaries.

/// Split text into overlapping segments.
///
/// Trailing fragments shorter than a tenth of the chunk size are
/// dropped. Returns plain texts — ids are assigned when the index is
/// built.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return vec![];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + chunk_size).min(text.len());
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }

        let piece = &text[start..end];

        if piece.len() < chunk_size / 10 {
            break;
        }

        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        let step = if chunk_size > overlap {
            chunk_size - overlap
        } else {
            chunk_size
        };

        let mut next_start = start + step;
        while next_start < text.len() && !text.is_char_boundary(next_start) {
            next_start += 1;
        }
        start = next_start;
    }

    tracing::debug!(
        "Chunked {} bytes into {} chunks (size: {}, overlap: {})",
        text.len(),
        chunks.len(),
        chunk_size,
        overlap
    );

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_basic() {
        let text = "a".repeat(1000);
        let chunks = chunk_text(&text, 200, 50);
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.len() <= 200));
    }

    #[test]
    fn test_chunk_text_no_overlap() {
        let text = "a".repeat(300);
        let chunks = chunk_text(&text, 100, 0);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_chunk_text_empty() {
        assert!(chunk_text("", 100, 10).is_empty());
        assert!(chunk_text("anything", 0, 0).is_empty());
    }

    #[test]
    fn test_chunk_text_with_overlap() {
        let text = "abcdefghij".repeat(20);
        let chunks = chunk_text(&text, 50, 10);

        assert!(chunks.len() >= 2);
        // The tail of one chunk reappears at the head of the next
        let first_tail: String = chunks[0].chars().rev().take(10).collect();
        let second_head: String = chunks[1].chars().take(10).collect();
        assert!(first_tail.chars().any(|c| second_head.contains(c)));
    }

    #[test]
    fn test_chunk_text_respects_utf8_boundaries() {
        let text = "héllo wörld ünïcode ".repeat(30);
        let chunks = chunk_text(&text, 37, 7);
        // Would panic on a bad boundary slice; also verify nothing is empty
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }
}
