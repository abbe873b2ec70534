use serde::{Deserialize, Serialize};

use super::types::{Chunk, Segment};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl SplitterConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `chunk_size` is zero or `chunk_overlap` is not
    /// smaller than `chunk_size`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                overlap: self.chunk_overlap,
                size: self.chunk_size,
            });
        }
        Ok(())
    }
}

/// Splits segments into overlapping windows measured in characters.
///
/// Each cut prefers, in order: a paragraph break, a line break, a sentence end, a
/// word boundary, then a hard cut at `chunk_size`. Only cut points in the back
/// half of the usable window qualify. The next window starts exactly
/// `chunk_overlap` characters before the previous cut, so stripping that prefix
/// from every chunk but the first reproduces the segment.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an invalid configuration.
    pub fn new(config: SplitterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> SplitterConfig {
        self.config
    }

    #[must_use]
    pub fn split(&self, segment: &Segment) -> Vec<Chunk> {
        if segment.text.trim().is_empty() {
            return Vec::new();
        }
        let chars: Vec<char> = segment.text.chars().collect();
        window_bounds(&chars, self.config.chunk_size, self.config.chunk_overlap)
            .into_iter()
            .enumerate()
            .map(|(i, (start, end))| Chunk {
                text: chars[start..end].iter().collect(),
                metadata: segment.metadata.clone(),
                chunk_index: i,
            })
            .collect()
    }

    #[must_use]
    pub fn split_all(&self, segments: &[Segment]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = segments.iter().flat_map(|s| self.split(s)).collect();
        tracing::debug!(
            segments = segments.len(),
            chunks = chunks.len(),
            "split segments"
        );
        chunks
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Boundary {
    Word,
    Sentence,
    Line,
    Paragraph,
}

/// Kind of boundary that ends right before `chars[end]`, if any.
fn boundary_at(chars: &[char], end: usize) -> Option<Boundary> {
    let last = chars[end - 1];
    let prev = end.checked_sub(2).map(|i| chars[i]);
    if last == '\n' {
        if prev == Some('\n') {
            return Some(Boundary::Paragraph);
        }
        return Some(Boundary::Line);
    }
    if last.is_whitespace() {
        if matches!(prev, Some('.' | '?' | '!')) {
            return Some(Boundary::Sentence);
        }
        return Some(Boundary::Word);
    }
    None
}

fn window_bounds(chars: &[char], size: usize, overlap: usize) -> Vec<(usize, usize)> {
    let len = chars.len();
    let mut bounds = Vec::new();
    let mut start = 0;

    loop {
        if len - start <= size {
            bounds.push((start, len));
            return bounds;
        }
        let hard_end = start + size;
        // Every cut must leave new content past the overlap.
        let lowest = (start + overlap + (size - overlap) / 2).max(start + overlap + 1);

        let mut best: Option<(Boundary, usize)> = None;
        for end in (lowest..=hard_end).rev() {
            if let Some(kind) = boundary_at(chars, end)
                && best.is_none_or(|(found, _)| kind > found)
            {
                best = Some((kind, end));
                if kind == Boundary::Paragraph {
                    break;
                }
            }
        }
        let end = best.map_or(hard_end, |(_, end)| end);

        bounds.push((start, end));
        start = end - overlap;
    }
}
