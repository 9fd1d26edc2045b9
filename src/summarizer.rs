//! Reduces a fetched window to its latest observation.

use crate::error::AgentError;
use crate::models::{ObservationSummary, ObservationWindow};
use crate::Result;

/// Latest value, its date and the series units. `series_code` only labels
/// the error for an empty window.
pub fn summarize(
    series_code: &str,
    window: &ObservationWindow,
    units: &str,
) -> Result<ObservationSummary> {
    let latest = window
        .latest()
        .ok_or_else(|| AgentError::EmptySeries(series_code.to_string()))?;

    Ok(ObservationSummary {
        current_value: latest.value,
        current_date: latest.date,
        units: units.to_string(),
    })
}
