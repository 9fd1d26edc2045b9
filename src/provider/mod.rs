//! Statistical data provider trait and implementations

use crate::models::{DateRange, Observation, SeriesMetadata};
use crate::Result;
use async_trait::async_trait;

pub mod fred;
pub use fred::FredClient;

/// Read-only access to a catalog of economic time series.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Descriptive metadata for a series. Fails with `UnknownSeries` when the
    /// provider does not recognise the code.
    async fn get_metadata(&self, series_code: &str) -> Result<SeriesMetadata>;

    /// Observations within `range`, oldest first.
    async fn get_observations(&self, series_code: &str, range: DateRange)
        -> Result<Vec<Observation>>;
}
