//! Embedding and generation capabilities behind one provider trait.
//!
//! The rest of the workspace only sees [`LlmProvider`]: `embed(text) -> vector`
//! and `complete(prompt, options) -> text`. Every call the core makes goes through a
//! [`CallScope`], which adds a per-call timeout and cooperative cancellation.

pub mod any;
pub mod compatible;
pub mod error;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod provider;
pub mod retry;
pub mod scope;

pub use error::LlmError;
pub use provider::{GenerationOptions, LlmProvider};
pub use scope::CallScope;
