//! Prompt templates for cited answers and multiple-choice quizzes.

use std::fmt::Write;

use studybuddy_memory::SearchHit;

/// Reply the model is told to give when the context does not contain the answer.
pub const NOT_FOUND_SENTINEL: &str = "I couldn't find the answer in the notes provided.";

const QA_TEMPLATE: &str = "\
You are a helpful study assistant. Use only the following pieces of context to answer the question at the end.
If the answer is not in the context, say \"{sentinel}\"

Be clear, concise, and educational in your responses.

IMPORTANT: After providing your answer, you MUST cite your sources by listing:
- Source filename(s)
- Page number(s) if available

Format your response as:
[Your detailed answer here]

Sources:
- Filename: [source_file], Page: [page number]
(Include all relevant sources used)

<context>
{context}
</context>

Question: {question}

Answer:";

const QUIZ_TEMPLATE: &str = "\
You are a test generator. Based on the following content{scope}, create {num_questions} multiple-choice questions.

For each question:
- Write a clear question based on the content
- Provide 4 options (A, B, C, D)
- Mark the correct answer
- Include a brief explanation

Format each question like this:

Q1: [Question text]
A) [Option A]
B) [Option B]
C) [Option C]
D) [Option D]
Correct Answer: [Letter]
Explanation: [Brief explanation]

<context>
{context}
</context>

Generate {num_questions} multiple-choice questions:";

/// Join retrieved chunks into one context block, each labelled with its source
/// file and one-based page so the model can cite it.
#[must_use]
pub fn format_context(hits: &[SearchHit]) -> String {
    let mut out = String::new();
    for (i, hit) in hits.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let meta = &hit.chunk.metadata;
        let _ = match meta.display_page() {
            Some(page) => writeln!(out, "[Source: {}, page {page}]", meta.source_file),
            None => writeln!(out, "[Source: {}]", meta.source_file),
        };
        out.push_str(hit.chunk.text.trim_end());
    }
    out
}

#[must_use]
pub fn qa_prompt(question: &str, hits: &[SearchHit]) -> String {
    fill(
        QA_TEMPLATE,
        &[
            ("sentinel", NOT_FOUND_SENTINEL),
            ("question", question.trim()),
            ("context", &format_context(hits)),
        ],
    )
}

/// `num_questions` is passed through as given; the model is not guaranteed to
/// comply.
#[must_use]
pub fn quiz_prompt(num_questions: u32, scope_file: Option<&str>, hits: &[SearchHit]) -> String {
    let scope = scope_file
        .map(|file| format!(" from \"{file}\""))
        .unwrap_or_default();
    fill(
        QUIZ_TEMPLATE,
        &[
            ("scope", &scope),
            ("num_questions", &num_questions.to_string()),
            ("context", &format_context(hits)),
        ],
    )
}

/// Substitute `{name}` placeholders in one pass over `template`. Inserted values
/// are never scanned again, so braces in user text or documents stay literal.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail.find('}').and_then(|close| {
            let name = &tail[1..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
