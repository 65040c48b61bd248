use crate::error::Result;
use crate::models::{Dataset, ViewOutcome};
use crate::processors::coordinate_validator::{CoordinateValidator, ValidationOutcome};
use crate::processors::search_filter::SearchFilter;
use crate::processors::view_builder::MapViewBuilder;
use crate::readers::RecordReader;
use crate::utils::constants::DEFAULT_ZOOM;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Somewhere a validated dataset can be obtained from.
pub trait DatasetSource {
    fn load_dataset(&mut self) -> Result<Arc<Dataset>>;
}

/// Reads and validates the CSV file on every call.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for CsvSource {
    fn load_dataset(&mut self) -> Result<Arc<Dataset>> {
        let outcome = load_validated(&self.path)?;
        Ok(Arc::new(outcome.dataset))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub zoom: u8,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self { zoom: DEFAULT_ZOOM }
    }
}

/// Load the input file and drop rows without usable coordinates.
pub fn load_validated(path: &Path) -> Result<ValidationOutcome> {
    let table = RecordReader::new().read_records(path)?;
    let outcome = CoordinateValidator::new().validate(&table);

    info!(
        path = %path.display(),
        rows = outcome.report.total_rows,
        kept = outcome.report.valid_rows,
        dropped = outcome.report.dropped_rows(),
        "Dataset loaded"
    );

    Ok(outcome)
}

/// Run one interaction: load, filter, build the view.
///
/// Load failures are returned as errors. A search without matches is the
/// [`ViewOutcome::NoResults`] state, and no view is built for it.
pub fn build_view<S>(source: &mut S, query: &str, options: &ViewOptions) -> Result<ViewOutcome>
where
    S: DatasetSource + ?Sized,
{
    let dataset = source.load_dataset()?;
    view_from_dataset(&dataset, query, options)
}

/// Filter and build stages over an already loaded dataset.
pub fn view_from_dataset(dataset: &Dataset, query: &str, options: &ViewOptions) -> Result<ViewOutcome> {
    let filter = SearchFilter::new(query);
    let filtered = filter.apply(dataset);

    if filtered.is_empty() {
        info!(query = filter.needle(), "No records match the search");
        return Ok(ViewOutcome::NoResults);
    }

    debug!(query = filter.needle(), matches = filtered.len(), "Building map view");
    let view = MapViewBuilder::with_zoom(options.zoom).build(&filtered)?;
    Ok(ViewOutcome::Markers(view))
}
