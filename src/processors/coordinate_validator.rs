use crate::models::{CustomerRecord, Dataset, RawRecord};
use crate::readers::RawTable;
use crate::utils::coordinates::{coerce_coordinate, is_valid_position};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub total_rows: usize,
    pub valid_rows: usize,
    /// Rows where a coordinate was empty or not a number
    pub missing_coordinates: usize,
    /// Rows where both coordinates parsed but fell outside the bounds
    pub out_of_range: usize,
}

impl ValidationReport {
    pub fn dropped_rows(&self) -> usize {
        self.missing_coordinates + self.out_of_range
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Coordinate Validation Report\n");
        summary.push_str("============================\n");
        summary.push_str(&format!("Rows read: {}\n", self.total_rows));
        summary.push_str(&format!("Rows kept: {}\n", self.valid_rows));
        summary.push_str(&format!(
            "Rows dropped: {} (missing/invalid: {}, out of range: {})\n",
            self.dropped_rows(),
            self.missing_coordinates,
            self.out_of_range
        ));
        summary
    }
}

#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub dataset: Dataset,
    pub report: ValidationReport,
}

/// Why a raw row did not make it into the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    MissingCoordinate,
    OutOfRange,
}

#[derive(Debug, Default)]
pub struct CoordinateValidator;

impl CoordinateValidator {
    pub fn new() -> Self {
        Self
    }

    /// Coerce and range-check every row, returning a new dataset.
    ///
    /// Rejected rows are dropped silently; only the counters record them.
    pub fn validate(&self, table: &RawTable) -> ValidationOutcome {
        let mut report = ValidationReport {
            total_rows: table.len(),
            ..Default::default()
        };
        let mut records = Vec::with_capacity(table.len());

        for (row, raw) in table.records.iter().enumerate() {
            match self.validate_row(raw) {
                Ok(record) => records.push(record),
                Err(rejection) => {
                    debug!(row = row + 1, ?rejection, lat = %raw.lat, lon = %raw.lon, "Dropping row");
                    match rejection {
                        RowRejection::MissingCoordinate => report.missing_coordinates += 1,
                        RowRejection::OutOfRange => report.out_of_range += 1,
                    }
                }
            }
        }

        report.valid_rows = records.len();

        ValidationOutcome {
            dataset: Dataset::from_validated(records),
            report,
        }
    }

    /// Validate a single raw row
    pub fn validate_row(&self, raw: &RawRecord) -> Result<CustomerRecord, RowRejection> {
        let latitude = coerce_coordinate(&raw.lat);
        let longitude = coerce_coordinate(&raw.lon);

        match (latitude, longitude) {
            (Some(lat), Some(lon)) if is_valid_position(lat, lon) => {
                Ok(CustomerRecord::from_raw(raw, lat, lon))
            }
            (Some(_), Some(_)) => Err(RowRejection::OutOfRange),
            _ => Err(RowRejection::MissingCoordinate),
        }
    }
}
