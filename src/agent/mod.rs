//! Main orchestrator - runs the four-stage pipeline for one question
//!
//! START → SELECTING → FETCHING → SUMMARIZING → RESPONDING → DONE
//!
//! Any stage failure moves to FAILED and is returned as a value.

use crate::config::AgentConfig;
use crate::fetcher::DataFetcher;
use crate::llm::{GeminiClient, LanguageModel};
use crate::models::{AgentOutcome, Answer, IndicatorSelection, ObservationSummary, PipelineStage, Question};
use crate::provider::{FredClient, SeriesProvider};
use crate::selector::IndicatorSelector;
use crate::{responder, summarizer, Result};
use std::time::Instant;
use tracing::{debug, error, info};

/// Successful pipeline output, before it is folded into an outcome.
struct Completed {
    selection: IndicatorSelection,
    summary: ObservationSummary,
    answer: Answer,
}

/// Answers economic questions from a language model and a series provider.
///
/// Both handles are read-only after construction and can serve any number
/// of questions, one at a time.
pub struct EconAgent {
    llm: Box<dyn LanguageModel>,
    provider: Box<dyn SeriesProvider>,
    selector: IndicatorSelector,
    fetcher: DataFetcher,
}

impl EconAgent {
    pub fn new(
        llm: Box<dyn LanguageModel>,
        provider: Box<dyn SeriesProvider>,
        config: &AgentConfig,
    ) -> Self {
        Self {
            llm,
            provider,
            selector: IndicatorSelector::new(config.example_codes.clone()),
            fetcher: DataFetcher::new(config.window_years),
        }
    }

    /// Agent backed by Gemini and FRED.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let llm = Box::new(GeminiClient::new(config)?);
        let provider = Box::new(FredClient::new(config)?);

        info!(model = %config.model, window_days = config.window_days(), "Agent initialized");

        Ok(Self::new(llm, provider, config))
    }

    /// Answer one question. Never fails: errors come back as
    /// [`AgentOutcome::Failed`] tagged with the stage that raised them.
    pub async fn answer(&self, question: &Question) -> AgentOutcome {
        let start_time = Instant::now();
        let mut stage = PipelineStage::Start;

        info!(
            question_id = %question.question_id,
            question = %question.text,
            "Question received"
        );

        match self.run(question, &mut stage).await {
            Ok(completed) => {
                stage = stage.advance();
                info!(
                    question_id = %question.question_id,
                    %stage,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Answer ready"
                );

                AgentOutcome::Answered {
                    answer: completed.answer,
                    selection: completed.selection,
                    summary: completed.summary,
                }
            }
            Err(e) => {
                let kind = e.kind();
                let detail = e.to_string();
                let terminal = fail(stage);

                error!(
                    question_id = %question.question_id,
                    %stage,
                    %terminal,
                    %kind,
                    "Error: {}",
                    detail
                );

                AgentOutcome::Failed {
                    stage,
                    kind,
                    detail,
                }
            }
        }
    }

    /// Runs the stages in order. `stage` always holds the stage in progress,
    /// so on error it names the one that failed.
    async fn run(&self, question: &Question, stage: &mut PipelineStage) -> Result<Completed> {
        *stage = transition(*stage);
        let selection = self.selector.select(self.llm.as_ref(), question).await?;

        *stage = transition(*stage);
        let fetched = self
            .fetcher
            .fetch(self.provider.as_ref(), &selection.series_code)
            .await?;

        *stage = transition(*stage);
        let summary = summarizer::summarize(
            &selection.series_code,
            &fetched.window,
            &fetched.metadata.units,
        )?;
        info!(
            current_value = summary.current_value,
            current_date = %summary.current_date,
            units = %summary.units,
            "OBSERVE: summary"
        );

        *stage = transition(*stage);
        let answer = responder::respond(self.llm.as_ref(), question, &summary).await?;

        Ok(Completed {
            selection,
            summary,
            answer,
        })
    }
}

fn transition(from: PipelineStage) -> PipelineStage {
    let to = from.advance();
    debug!(%from, %to, "Stage transition");
    to
}

fn fail(from: PipelineStage) -> PipelineStage {
    let to = from.fail();
    debug!(%from, %to, "Stage transition");
    to
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AgentError, ErrorKind};
    use crate::llm::OutputFormat;
    use crate::models::{DateRange, Observation, SeriesMetadata};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Replays canned replies and records every prompt it was given.
    #[derive(Clone, Default)]
    struct ScriptedLlm {
        replies: Arc<Mutex<VecDeque<Result<String>>>>,
        calls: Arc<Mutex<Vec<(String, OutputFormat)>>>,
    }

    impl ScriptedLlm {
        fn with_replies(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                calls: Arc::default(),
            }
        }

        fn calls(&self) -> Vec<(String, OutputFormat)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedLlm {
        async fn generate(&self, prompt: &str, format: OutputFormat) -> Result<String> {
            self.calls.lock().unwrap().push((prompt.to_string(), format));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AgentError::ProviderUnavailable("script exhausted".into())))
        }
    }

    #[derive(Clone, Default)]
    struct FakeProvider {
        units: Option<String>,
        points: Vec<Observation>,
        metadata_calls: Arc<Mutex<u32>>,
        observation_calls: Arc<Mutex<u32>>,
    }

    impl FakeProvider {
        fn known(units: &str, points: Vec<Observation>) -> Self {
            Self {
                units: Some(units.to_string()),
                points,
                ..Self::default()
            }
        }

        fn total_calls(&self) -> u32 {
            *self.metadata_calls.lock().unwrap() + *self.observation_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl SeriesProvider for FakeProvider {
        async fn get_metadata(&self, series_code: &str) -> Result<SeriesMetadata> {
            *self.metadata_calls.lock().unwrap() += 1;
            match &self.units {
                Some(units) => Ok(SeriesMetadata {
                    series_code: series_code.to_string(),
                    units: units.clone(),
                }),
                None => Err(AgentError::UnknownSeries(series_code.to_string())),
            }
        }

        async fn get_observations(
            &self,
            _series_code: &str,
            _range: DateRange,
        ) -> Result<Vec<Observation>> {
            *self.observation_calls.lock().unwrap() += 1;
            Ok(self.points.clone())
        }
    }

    fn agent(llm: &ScriptedLlm, provider: &FakeProvider) -> EconAgent {
        let config = AgentConfig::new("google", "fred");
        EconAgent::new(Box::new(llm.clone()), Box::new(provider.clone()), &config)
    }

    fn unrate_points() -> Vec<Observation> {
        vec![
            Observation::new(date("2024-03-01"), 3.9),
            Observation::new(date("2024-04-01"), 3.9),
            Observation::new(date("2024-05-01"), 4.0),
        ]
    }

    #[tokio::test]
    async fn test_unemployment_question_end_to_end() {
        let llm = ScriptedLlm::with_replies(vec![
            Ok(r#"{"explanation": "headline unemployment", "series_code": "UNRATE"}"#.to_string()),
            Ok("US unemployment was 4.0 Percent in May 2024.".to_string()),
        ]);
        let provider = FakeProvider::known("Percent", unrate_points());

        let outcome = agent(&llm, &provider)
            .answer(&Question::new("What is the US unemployment rate?"))
            .await;

        let AgentOutcome::Answered {
            answer,
            selection,
            summary,
        } = &outcome
        else {
            panic!("expected an answer, got {:?}", outcome);
        };

        assert_eq!(selection.series_code, "UNRATE");
        assert_eq!(
            summary,
            &ObservationSummary {
                current_value: 4.0,
                current_date: date("2024-05-01"),
                units: "Percent".to_string(),
            }
        );
        assert!(answer.text.contains("4.0"));
        assert!(answer.text.contains("Percent"));
        assert_eq!(outcome.text(), answer.text);

        let calls = llm.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, OutputFormat::Json);
        assert_eq!(calls[1].1, OutputFormat::Text);
        assert!(calls[1].0.contains("What is the US unemployment rate?"));
        assert!(calls[1].0.contains(r#""current_value": 4.0"#));
        assert!(calls[1].0.contains(r#""current_date": "2024-05-01""#));
        assert!(calls[1].0.contains("Percent"));
    }

    #[tokio::test]
    async fn test_malformed_selection_fails_fast() {
        let llm = ScriptedLlm::with_replies(vec![Ok("{\"series_code\": ".to_string())]);
        let provider = FakeProvider::known("Percent", unrate_points());

        let outcome = agent(&llm, &provider)
            .answer(&Question::new("What is inflation?"))
            .await;

        assert!(outcome.text().starts_with("Error:"));
        assert!(!outcome.text().contains("Percent"));
        assert!(matches!(
            outcome,
            AgentOutcome::Failed {
                stage: PipelineStage::Selecting,
                kind: ErrorKind::MalformedSelection,
                ..
            }
        ));
        assert_eq!(provider.total_calls(), 0);
        assert_eq!(llm.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_series_code_fails_fast() {
        let llm = ScriptedLlm::with_replies(vec![Ok(r#"{"explanation": "hmm"}"#.to_string())]);
        let provider = FakeProvider::known("Percent", unrate_points());

        let outcome = agent(&llm, &provider)
            .answer(&Question::new("How is the housing market?"))
            .await;

        assert!(matches!(
            outcome,
            AgentOutcome::Failed {
                kind: ErrorKind::MalformedSelection,
                ..
            }
        ));
        assert_eq!(provider.total_calls(), 0);
        assert_eq!(llm.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_series_never_responds() {
        let llm = ScriptedLlm::with_replies(vec![
            Ok(r#"{"explanation": "x", "series_code": "UNRATE"}"#.to_string()),
            Ok("should not be used".to_string()),
        ]);
        let provider = FakeProvider::known("Percent", vec![]);

        let outcome = agent(&llm, &provider)
            .answer(&Question::new("What is the US unemployment rate?"))
            .await;

        assert!(matches!(
            outcome,
            AgentOutcome::Failed {
                stage: PipelineStage::Fetching,
                kind: ErrorKind::EmptySeries,
                ..
            }
        ));
        assert_eq!(llm.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_series() {
        let llm = ScriptedLlm::with_replies(vec![Ok(
            r#"{"explanation": "x", "series_code": "MADEUP"}"#.to_string()
        )]);
        let provider = FakeProvider::default();

        let outcome = agent(&llm, &provider)
            .answer(&Question::new("What is the madeup index?"))
            .await;

        assert!(matches!(
            outcome,
            AgentOutcome::Failed {
                stage: PipelineStage::Fetching,
                kind: ErrorKind::UnknownSeries,
                ..
            }
        ));
        assert_eq!(*provider.observation_calls.lock().unwrap(), 0);
        assert_eq!(outcome.text(), "Error: Unknown series: MADEUP");
    }

    #[test]
    fn test_responder_outage_is_reported_not_raised() {
        let llm = ScriptedLlm::with_replies(vec![
            Ok(r#"{"explanation": "x", "series_code": "DFF"}"#.to_string()),
            Err(AgentError::ProviderUnavailable("Gemini API returned 503".into())),
        ]);
        let provider = FakeProvider::known(
            "Percent",
            vec![Observation::new(date("2024-06-14"), 5.33)],
        );

        let outcome = tokio_test::block_on(
            agent(&llm, &provider).answer(&Question::new("What is the fed funds rate?")),
        );

        assert_eq!(
            outcome,
            AgentOutcome::Failed {
                stage: PipelineStage::Responding,
                kind: ErrorKind::ProviderUnavailable,
                detail: "Provider unavailable: Gemini API returned 503".to_string(),
            }
        );
        assert_eq!(llm.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_agent_is_reusable_across_questions() {
        let llm = ScriptedLlm::with_replies(vec![
            Ok("not json".to_string()),
            Ok(r#"{"explanation": "x", "series_code": "UNRATE"}"#.to_string()),
            Ok("Unemployment is 4.0 Percent.".to_string()),
        ]);
        let provider = FakeProvider::known("Percent", unrate_points());
        let agent = agent(&llm, &provider);

        let first = agent.answer(&Question::new("first")).await;
        let second = agent.answer(&Question::new("second")).await;

        assert!(!first.is_answered());
        assert!(second.is_answered());
    }

    #[tokio::test]
    async fn test_out_of_range_window_is_reported_not_raised() {
        let llm = ScriptedLlm::with_replies(vec![Ok(
            r#"{"explanation": "x", "series_code": "UNRATE"}"#.to_string()
        )]);
        let provider = FakeProvider::known("Percent", unrate_points());
        let mut config = AgentConfig::new("google", "fred");
        config.window_years = 300_000;
        let agent = EconAgent::new(Box::new(llm.clone()), Box::new(provider.clone()), &config);

        let outcome = agent
            .answer(&Question::new("What is the US unemployment rate?"))
            .await;

        assert!(outcome.text().starts_with("Error:"));
        assert!(matches!(
            outcome,
            AgentOutcome::Failed {
                stage: PipelineStage::Fetching,
                kind: ErrorKind::Config,
                ..
            }
        ));
        assert_eq!(*provider.observation_calls.lock().unwrap(), 0);
        assert_eq!(llm.calls().len(), 1);
    }
}
