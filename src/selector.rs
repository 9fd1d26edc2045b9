//! Indicator selection
//!
//! Asks the model, under a JSON output constraint, which series code best
//! answers the question.

use crate::config::ExampleCode;
use crate::error::AgentError;
use crate::llm::{LanguageModel, OutputFormat};
use crate::models::{IndicatorSelection, Question};
use crate::Result;
use serde::Deserialize;
use tracing::{debug, info};

pub struct IndicatorSelector {
    example_codes: Vec<ExampleCode>,
}

impl IndicatorSelector {
    pub fn new(example_codes: Vec<ExampleCode>) -> Self {
        Self { example_codes }
    }

    pub fn build_prompt(&self, question: &Question) -> String {
        let examples = self
            .example_codes
            .iter()
            .map(|example| match &example.label {
                Some(label) => format!("{} ({})", example.code, label),
                None => example.code.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "What FRED series code would help answer the question below?\n\
             Question: {}\n\n\
             Common FRED codes: {}\n\n\
             Return ONLY valid JSON in this exact format: \
             {{\"explanation\": \"why this helps\", \"series_code\": \"EXACT_FRED_CODE\"}}",
            question.text, examples
        )
    }

    pub async fn select(
        &self,
        llm: &dyn LanguageModel,
        question: &Question,
    ) -> Result<IndicatorSelection> {
        let prompt = self.build_prompt(question);

        info!(question_id = %question.question_id, "THINK: selecting indicator");
        debug!(prompt = %prompt, "Selection prompt");

        let reply = llm.generate(&prompt, OutputFormat::Json).await?;
        debug!(reply = %reply, "Selection reply");

        let selection = parse_selection(&reply)?;

        info!(
            series_code = %selection.series_code,
            explanation = %selection.explanation,
            "Indicator selected"
        );

        Ok(selection)
    }
}

#[derive(Debug, Deserialize)]
struct RawSelection {
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    series_code: Option<String>,
}

/// Parse the model's reply into a selection, requiring a non-empty code.
pub fn parse_selection(reply: &str) -> Result<IndicatorSelection> {
    let body = strip_code_fence(reply);

    let raw: RawSelection = serde_json::from_str(body).map_err(|e| {
        AgentError::MalformedSelection(format!("reply is not a JSON object: {}", e))
    })?;

    let series_code = raw
        .series_code
        .map(|code| code.trim().to_ascii_uppercase())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AgentError::MalformedSelection("series_code missing".to_string()))?;

    Ok(IndicatorSelection {
        explanation: raw.explanation.unwrap_or_default(),
        series_code,
    })
}

/// Some replies arrive wrapped in a ```json fence despite the constraint.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
