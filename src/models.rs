//! Core data models for the economic data agent
//!
//! Everything here lives for a single question; nothing is persisted.

use crate::error::ErrorKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ================= Question =================
//

#[derive(Debug, Clone)]
pub struct Question {
    pub question_id: Uuid,
    pub text: String,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            question_id: Uuid::new_v4(),
            text: text.into(),
        }
    }
}

//
// ================= Selection =================
//

/// The model's structured choice of indicator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndicatorSelection {
    #[serde(default)]
    pub explanation: String,
    pub series_code: String,
}

//
// ================= Series Data =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesMetadata {
    pub series_code: String,
    pub units: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Observations for one series, always held in ascending date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationWindow {
    points: Vec<Observation>,
}

impl ObservationWindow {
    pub fn new(mut points: Vec<Observation>) -> Self {
        // Stable sort keeps provider order for duplicate dates.
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Start and end dates (inclusive) of a fetch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// What the fetcher hands to the summarizer.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSeries {
    pub metadata: SeriesMetadata,
    pub window: ObservationWindow,
}

//
// ================= Summary & Answer =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservationSummary {
    pub current_value: f64,
    pub current_date: NaiveDate,
    pub units: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
}

//
// ================= Pipeline State =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PipelineStage {
    Start,
    Selecting,
    Fetching,
    Summarizing,
    Responding,
    Done,
    Failed,
}

impl PipelineStage {
    /// Next working stage on success. Terminal stages stay put.
    pub fn advance(self) -> Self {
        match self {
            PipelineStage::Start => PipelineStage::Selecting,
            PipelineStage::Selecting => PipelineStage::Fetching,
            PipelineStage::Fetching => PipelineStage::Summarizing,
            PipelineStage::Summarizing => PipelineStage::Responding,
            PipelineStage::Responding => PipelineStage::Done,
            PipelineStage::Done => PipelineStage::Done,
            PipelineStage::Failed => PipelineStage::Failed,
        }
    }

    /// Stage entered when the current one errors. `Done` cannot fail.
    pub fn fail(self) -> Self {
        match self {
            PipelineStage::Done => PipelineStage::Done,
            _ => PipelineStage::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::Start => "START",
            PipelineStage::Selecting => "SELECTING",
            PipelineStage::Fetching => "FETCHING",
            PipelineStage::Summarizing => "SUMMARIZING",
            PipelineStage::Responding => "RESPONDING",
            PipelineStage::Done => "DONE",
            PipelineStage::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

/// Result of answering one question. Failures are values, never panics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AgentOutcome {
    Answered {
        answer: Answer,
        selection: IndicatorSelection,
        summary: ObservationSummary,
    },
    Failed {
        stage: PipelineStage,
        kind: ErrorKind,
        detail: String,
    },
}

impl AgentOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, AgentOutcome::Answered { .. })
    }

    /// Answer text, or `Error: <detail>` for failures.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AgentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentOutcome::Answered { answer, .. } => f.write_str(&answer.text),
            AgentOutcome::Failed { detail, .. } => write!(f, "Error: {}", detail),
        }
    }
}
