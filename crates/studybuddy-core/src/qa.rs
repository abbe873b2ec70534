//! Retrieval-augmented question answering with source citations.

use std::fmt;

use studybuddy_llm::LlmProvider;
use studybuddy_memory::{ConfigError, SearchHit};

use crate::error::StudyError;
use crate::generation::GenerationContext;
use crate::prompt;

/// A retrieved source: file name and one-based page, when the format has pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Citation {
    pub source_file: String,
    pub page: Option<u32>,
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            Some(page) => write!(f, "{} (page {page})", self.source_file),
            None => f.write_str(&self.source_file),
        }
    }
}

/// Model output plus the sources that were put in front of it.
///
/// `text` is returned as generated. Citations written inside it are not checked
/// against `citations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl Answer {
    /// True when the model used the "not found" reply.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.text.contains(prompt::NOT_FOUND_SENTINEL)
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text.trim_end())?;
        if self.citations.is_empty() {
            return Ok(());
        }
        f.write_str("\n\nRetrieved from: ")?;
        for (i, citation) in self.citations.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{citation}")?;
        }
        Ok(())
    }
}

/// Distinct (file, page) pairs in retrieval order.
pub(crate) fn citations(hits: &[SearchHit]) -> Vec<Citation> {
    let mut out: Vec<Citation> = Vec::with_capacity(hits.len());
    for hit in hits {
        let citation = Citation {
            source_file: hit.chunk.metadata.source_file.clone(),
            page: hit.chunk.metadata.display_page(),
        };
        if !out.contains(&citation) {
            out.push(citation);
        }
    }
    out
}

/// Answer `question` from the `k` most similar chunks.
///
/// # Errors
///
/// Returns [`ConfigError`] for a blank question or `k == 0`, `EmptyIndex` when
/// nothing is indexed, or the embedding/generation error.
pub async fn answer<P: LlmProvider>(
    ctx: &GenerationContext<'_, P>,
    question: &str,
    k: usize,
) -> Result<Answer, StudyError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ConfigError::Invalid("question must not be empty".into()).into());
    }

    let hits = ctx
        .index
        .search(ctx.provider, question, k, &ctx.retrieval_scope)
        .await?;
    tracing::debug!(hits = hits.len(), "retrieved context for question");

    let text = ctx.complete(&prompt::qa_prompt(question, &hits)).await?;
    Ok(Answer {
        text,
        citations: citations(&hits),
    })
}
