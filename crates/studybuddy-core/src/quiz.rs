//! Multiple-choice quiz generation over the whole corpus or a single source file.

use std::fmt;

use studybuddy_llm::LlmProvider;
use studybuddy_memory::{ConfigError, IndexError, SearchFilter, SearchHit};

use crate::error::StudyError;
use crate::generation::GenerationContext;
use crate::prompt;
use crate::qa::{Citation, citations};

/// Retrieval query used to pull broadly representative content.
pub const OVERVIEW_QUERY: &str = "summary overview main topics";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    num_questions: u32,
    scope_file: Option<String>,
}

impl QuizRequest {
    /// A blank `scope_file` means the whole corpus.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `num_questions` is not a positive
    /// count.
    pub fn new(num_questions: i64, scope_file: Option<String>) -> Result<Self, ConfigError> {
        let num_questions = u32::try_from(num_questions)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "number of questions must be a positive integer, got {num_questions}"
                ))
            })?;
        let scope_file = scope_file
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        Ok(Self {
            num_questions,
            scope_file,
        })
    }

    #[must_use]
    pub fn num_questions(&self) -> u32 {
        self.num_questions
    }

    #[must_use]
    pub fn scope_file(&self) -> Option<&str> {
        self.scope_file.as_deref()
    }
}

/// Parse a user-supplied question count.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for anything other than a positive integer.
pub fn parse_question_count(input: &str) -> Result<u32, ConfigError> {
    let trimmed = input.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{trimmed:?} is not a whole number")))?;
    QuizRequest::new(value, None).map(|r| r.num_questions)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    /// Generated text, unmodified.
    pub text: String,
    pub num_questions: u32,
    pub scope_file: Option<String>,
    /// Sources of the content the quiz was generated from.
    pub sources: Vec<Citation>,
}

impl Quiz {
    /// Number of `Q<n>:` headings in the output. The model may not produce the
    /// count it was asked for.
    #[must_use]
    pub fn detected_questions(&self) -> usize {
        self.text
            .lines()
            .filter(|line| is_question_heading(line))
            .count()
    }
}

impl fmt::Display for Quiz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text.trim_end())
    }
}

fn is_question_heading(line: &str) -> bool {
    let line = line.trim_start().trim_start_matches(['*', '#', ' ']);
    let Some(rest) = line.strip_prefix('Q') else {
        return false;
    };
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && rest[digits..].starts_with(':')
}

/// Generate a quiz from the `k` chunks closest to [`OVERVIEW_QUERY`].
///
/// With a scope file, the top `pool` candidates are ranked and only chunks from
/// that file are kept. The pool grows to `k` per indexed source, and to the
/// whole index when it still holds fewer than `k` chunks of the file.
///
/// # Errors
///
/// Returns `NoMatch` when no indexed chunk belongs to the scope file (the quiz
/// is never silently widened to other files), `EmptyIndex`, a
/// [`ConfigError`] for `k == 0`, or the embedding/generation error.
pub async fn generate<P: LlmProvider>(
    ctx: &GenerationContext<'_, P>,
    request: &QuizRequest,
    k: usize,
    pool: usize,
) -> Result<Quiz, StudyError> {
    let hits = match request.scope_file() {
        None => {
            ctx.index
                .search(ctx.provider, OVERVIEW_QUERY, k, &ctx.retrieval_scope)
                .await?
        }
        Some(file) => scoped_hits(ctx, file, k, pool).await?,
    };

    let prompt = prompt::quiz_prompt(request.num_questions(), request.scope_file(), &hits);
    let text = ctx.complete(&prompt).await?;
    let quiz = Quiz {
        text,
        num_questions: request.num_questions(),
        scope_file: request.scope_file.clone(),
        sources: citations(&hits),
    };

    let detected = quiz.detected_questions();
    if detected != quiz.num_questions as usize {
        tracing::debug!(
            requested = quiz.num_questions,
            detected,
            "quiz question count differs from request"
        );
    }
    Ok(quiz)
}

/// Filtered ranking for a scoped quiz. When the pool leaves fewer than `k`
/// chunks of `file`, the ranking is repeated over the whole index so that
/// `NoMatch` only means the file has no indexed chunk at all.
async fn scoped_hits<P: LlmProvider>(
    ctx: &GenerationContext<'_, P>,
    file: &str,
    k: usize,
    pool: usize,
) -> Result<Vec<SearchHit>, IndexError> {
    let total = ctx.index.len();
    let sources = ctx.index.list_source_files().len();
    let pool = pool.max(k.saturating_mul(sources)).min(total).max(k);
    let filter = SearchFilter::source_file(file);
    tracing::debug!(file, pool, k, "scoped quiz retrieval");

    let first = ctx
        .index
        .search_filtered(ctx.provider, OVERVIEW_QUERY, k, pool, &filter, &ctx.retrieval_scope)
        .await;
    let short = match &first {
        Ok(hits) => hits.len() < k,
        Err(IndexError::NoMatch { .. }) => true,
        Err(_) => false,
    };
    if !short || pool >= total {
        return first;
    }

    tracing::debug!(file, pool, total, "scoped pool under-filled, ranking whole index");
    ctx.index
        .search_filtered(ctx.provider, OVERVIEW_QUERY, k, total, &filter, &ctx.retrieval_scope)
        .await
}
