//! Data fetching
//!
//! Resolves the series units and the trailing observation window for the
//! selected code.

use crate::config::DAYS_PER_YEAR;
use crate::error::AgentError;
use crate::models::{DateRange, FetchedSeries, ObservationWindow};
use crate::provider::SeriesProvider;
use crate::Result;
use chrono::{Duration, NaiveDate, Utc};
use tracing::info;

pub struct DataFetcher {
    window_days: i64,
}

impl DataFetcher {
    pub fn new(window_years: u32) -> Self {
        Self {
            window_days: i64::from(window_years) * DAYS_PER_YEAR,
        }
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    /// Window ending today (UTC).
    pub async fn fetch(
        &self,
        provider: &dyn SeriesProvider,
        series_code: &str,
    ) -> Result<FetchedSeries> {
        self.fetch_until(provider, series_code, Utc::now().date_naive())
            .await
    }

    /// Window ending on `today`. Metadata is fetched first so an unknown code
    /// never triggers an observations request.
    pub async fn fetch_until(
        &self,
        provider: &dyn SeriesProvider,
        series_code: &str,
        today: NaiveDate,
    ) -> Result<FetchedSeries> {
        info!(series_code, "ACT: fetching series");

        let metadata = provider.get_metadata(series_code).await?;
        let range = trailing_range(today, self.window_days)?;

        info!(start = %range.start, end = %range.end, units = %metadata.units, "Period");

        let points = provider.get_observations(series_code, range).await?;
        let window = ObservationWindow::new(points);

        let Some(latest) = window.latest() else {
            return Err(AgentError::EmptySeries(series_code.to_string()));
        };

        info!(
            points = window.len(),
            latest_value = latest.value,
            latest_date = %latest.date,
            "Fetched observations"
        );

        Ok(FetchedSeries { metadata, window })
    }
}

/// `[end - days, end]` using whole days, no calendar arithmetic.
pub fn trailing_range(end: NaiveDate, days: i64) -> Result<DateRange> {
    let start = Duration::try_days(days)
        .and_then(|span| end.checked_sub_signed(span))
        .ok_or_else(|| {
            AgentError::Config(format!("a {}-day window before {} is out of range", days, end))
        })?;

    Ok(DateRange { start, end })
}
