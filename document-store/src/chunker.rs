//! Boundary-aware text chunking for indexing.
//!
//! Long content is split into overlapping chunks before embedding so a
//! single page or record yields retrieval units of useful granularity.
//! Splits prefer sentence terminators and newlines, fall back to word
//! boundaries, and only ever hard-split when a single token is longer than
//! the whole target. Chunks never start or end mid-word and all offsets are
//! valid UTF-8 boundaries.

use serde::{Deserialize, Serialize};

/// A chunk of text produced from a longer document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk text.
    pub content: String,

    /// Byte offset of the chunk start in the original content.
    pub start: usize,

    /// Byte offset one past the chunk end in the original content.
    pub end: usize,
}

/// Configuration for the chunker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Target chunk size in characters.
    pub target_chars: usize,

    /// Overlap between consecutive chunks in characters, aligned down to a
    /// word boundary.
    pub overlap_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            target_chars: 800,
            overlap_chars: 80,
        }
    }
}

/// Splits text on sentence and word boundaries.
#[derive(Debug, Clone, Default)]
pub struct TextChunker {
    config: ChunkerConfig,
}

impl TextChunker {
    /// Create a chunker with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chunker with custom configuration.
    pub fn with_config(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Split content into chunks.
    ///
    /// Content at or below the target size comes back as a single chunk.
    /// Later chunks re-include roughly `overlap_chars` characters from the
    /// end of the previous chunk to preserve context across the split.
    pub fn chunk(&self, content: &str) -> Vec<Chunk> {
        let chars: Vec<(usize, char)> = content.char_indices().collect();
        let total = chars.len();
        let target = self.config.target_chars.max(1);

        if total <= target {
            let trimmed = content.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            return vec![Chunk {
                content: trimmed.to_string(),
                start: 0,
                end: content.len(),
            }];
        }

        let mut chunks = Vec::new();
        let mut start = 0usize; // char index

        while start < total {
            let remaining = total - start;
            if remaining <= target {
                self.push_chunk(content, &chars, start, total, &mut chunks);
                break;
            }

            let split = self.find_split(&chars, start, start + target);
            self.push_chunk(content, &chars, start, split, &mut chunks);

            let mut next = split.saturating_sub(self.config.overlap_chars).max(start + 1);
            // Walk the overlap start forward to a word boundary.
            while next < split && !is_word_start(&chars, next) {
                next += 1;
            }
            start = next;
        }

        chunks
    }

    /// Pick the split position (exclusive char index) for a chunk starting
    /// at `start` with hard limit `limit`.
    fn find_split(&self, chars: &[(usize, char)], start: usize, limit: usize) -> usize {
        let floor = start + (limit - start) / 2;

        // Prefer a sentence terminator or newline in the upper half of the
        // window.
        let mut pos = limit;
        while pos > floor {
            let i = pos - 1;
            let c = chars[i].1;
            if c == '\n' {
                return pos;
            }
            if matches!(c, '.' | '!' | '?')
                && chars.get(pos).is_none_or(|(_, next)| next.is_whitespace())
            {
                return pos;
            }
            pos -= 1;
        }

        // No sentence boundary: back off to the nearest whitespace so the
        // split never lands inside a word.
        let mut pos = limit;
        while pos > start {
            if chars[pos - 1].1.is_whitespace() {
                return pos;
            }
            pos -= 1;
        }

        // A single token longer than the target; hard-split at the limit.
        limit
    }

    /// Append the chunk covering char range `[start, end)`, skipping
    /// whitespace-only slices.
    fn push_chunk(
        &self,
        content: &str,
        chars: &[(usize, char)],
        start: usize,
        end: usize,
        chunks: &mut Vec<Chunk>,
    ) {
        let byte_start = chars[start].0;
        let byte_end = chars.get(end).map_or(content.len(), |(offset, _)| *offset);

        let slice = &content[byte_start..byte_end];
        let trimmed = slice.trim();
        if trimmed.is_empty() {
            return;
        }

        chunks.push(Chunk {
            content: trimmed.to_string(),
            start: byte_start,
            end: byte_end,
        });
    }
}

/// Whether `pos` begins a word (start of text or preceded by whitespace).
fn is_word_start(chars: &[(usize, char)], pos: usize) -> bool {
    pos == 0 || chars[pos - 1].1.is_whitespace()
}
