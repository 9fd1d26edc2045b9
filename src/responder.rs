//! Answer phrasing
//!
//! Hands the question and the observation summary back to the model and
//! returns its prose verbatim.

use crate::llm::{LanguageModel, OutputFormat};
use crate::models::{Answer, ObservationSummary, Question};
use crate::Result;
use tracing::{debug, info};

pub fn build_prompt(question: &Question, summary: &ObservationSummary) -> Result<String> {
    let data = serde_json::to_string_pretty(summary)?;

    Ok(format!(
        "Answer this question using the data:\n\
         Question: {}\n\
         Data: {}\n\n\
         Provide a brief, clear answer citing specific numbers.",
        question.text, data
    ))
}

pub async fn respond(
    llm: &dyn LanguageModel,
    question: &Question,
    summary: &ObservationSummary,
) -> Result<Answer> {
    let prompt = build_prompt(question, summary)?;

    info!(question_id = %question.question_id, "RESPOND: phrasing answer");
    debug!(prompt = %prompt, "Response prompt");

    let text = llm.generate(&prompt, OutputFormat::Text).await?;
    debug!(reply = %text, "Response reply");

    Ok(Answer { text })
}
