//! Study session orchestration: corpus loading, cited question answering and quiz
//! generation over an embedding index.

pub mod config;
pub mod error;
pub mod generation;
pub mod prompt;
pub mod qa;
pub mod quiz;
pub mod session;

pub use config::{Config, Settings};
pub use error::{ErrorKind, StudyError};
pub use generation::GenerationContext;
pub use qa::{Answer, Citation};
pub use quiz::{Quiz, QuizRequest, parse_question_count};
pub use session::{CorpusSource, LoadSummary, PreparedCorpus, Session};
