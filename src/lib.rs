//! Economic Data Agent
//!
//! Answers natural-language economic questions in four steps:
//! - asks a language model which FRED series fits the question
//! - fetches that series' units and trailing observations
//! - reduces the observations to the latest data point
//! - asks the model to phrase an answer citing that point
//!
//! PIPELINE:
//! QUESTION → SELECT → FETCH → SUMMARIZE → RESPOND → ANSWER

pub mod agent;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod llm;
pub mod models;
pub mod provider;
pub mod responder;
pub mod selector;
pub mod summarizer;

pub use error::Result;

// Re-export common types
pub use agent::EconAgent;
pub use config::AgentConfig;
pub use error::{AgentError, ErrorKind};
pub use models::*;
