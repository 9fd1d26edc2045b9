//! Language model trait and implementations
//!
//! Both call sites (indicator selection and answer phrasing) go through
//! [`LanguageModel::generate`]; they differ only in the [`OutputFormat`].

use crate::Result;
use async_trait::async_trait;

pub mod gemini;
pub use gemini::GeminiClient;

/// Constraint placed on the model's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Machine-parseable JSON, enforced by the provider.
    Json,
    /// Unconstrained prose.
    Text,
}

/// Trait for text generation (LLM controlled)
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str, format: OutputFormat) -> Result<String>;
}
