use crate::models::DocumentChunk;

/// Split-point candidates in priority order: paragraph break, line break,
/// sentence end, word boundary. A hard character cut is the last resort.
const SPLIT_PRIORITY: [&str; 4] = ["\n\n", "\n", ". ", " "];

#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    pub chunk_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_chars: 600,
            overlap_chars: 150,
        }
    }
}

/// Splits normalized text into overlapping segments of at most
/// `chunk_chars` characters.
///
/// Each boundary is placed at the latest split point inside the window,
/// trying the separators in [`SPLIT_PRIORITY`] order; when none occurs the
/// window is cut at the size limit. Every chunk after the first starts
/// `overlap_chars` characters before the previous boundary so that context
/// spanning a boundary is kept in both segments.
pub fn split_text(text: &str, config: ChunkerConfig) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let hard_end = (start + config.chunk_chars.max(1)).min(chars.len());
        let end = if hard_end == chars.len() {
            hard_end
        } else {
            find_split_point(&chars, start, hard_end)
        };

        let piece: String = chars[start..end].iter().collect();
        if !piece.trim().is_empty() {
            pieces.push(piece);
        }

        if end == chars.len() {
            break;
        }

        let overlapped = end.saturating_sub(config.overlap_chars);
        start = if overlapped > start { overlapped } else { end };
    }

    pieces
}

/// Latest occurrence of the highest-priority separator within the window,
/// returning the index just past the separator. Falls back to the hard cut.
fn find_split_point(chars: &[char], start: usize, hard_end: usize) -> usize {
    for separator in SPLIT_PRIORITY {
        let sep: Vec<char> = separator.chars().collect();
        if hard_end - start < sep.len() {
            continue;
        }

        let mut candidate = hard_end - sep.len();
        loop {
            if chars[candidate..candidate + sep.len()] == sep[..] && candidate > start {
                return candidate + sep.len();
            }
            if candidate <= start + 1 {
                break;
            }
            candidate -= 1;
        }
    }

    hard_end
}

/// Chunks one page of normalized text, tagging every chunk with its source
/// file and a running per-document index.
pub fn build_chunks(
    source: &str,
    page: u32,
    text: &str,
    config: ChunkerConfig,
    start_index: u64,
) -> (Vec<DocumentChunk>, u64) {
    let mut cursor = start_index;
    let mut chunks = Vec::new();

    for piece in split_text(text, config) {
        chunks.push(DocumentChunk {
            source: source.to_string(),
            page,
            chunk_index: cursor,
            text: piece,
        });
        cursor = cursor.saturating_add(1);
    }

    (chunks, cursor)
}
