use crate::error::{MapError, Result};
use crate::models::{CustomerRecord, Dataset, MapView, MarkerDescriptor, PopupFields};
use crate::utils::constants::{DEFAULT_ZOOM, GOOGLE_MAPS_BASE_URL, TOOLTIP_MAX_CHARS};
use crate::utils::coordinates::{centroid, format_coordinate};

pub struct MapViewBuilder {
    zoom: u8,
}

impl MapViewBuilder {
    pub fn new() -> Self {
        Self { zoom: DEFAULT_ZOOM }
    }

    pub fn with_zoom(zoom: u8) -> Self {
        Self { zoom }
    }

    /// Build the map view for a filtered dataset.
    ///
    /// The center is the mean position of the records passed in. Fails with
    /// [`MapError::EmptyDataset`] when there is nothing to center on.
    pub fn build(&self, dataset: &Dataset) -> Result<MapView> {
        let (center_lat, center_lon) =
            centroid(dataset.iter().map(CustomerRecord::position)).ok_or(MapError::EmptyDataset)?;

        let markers = dataset.iter().map(build_marker).collect();

        Ok(MapView {
            center_lat,
            center_lon,
            zoom: self.zoom,
            markers,
        })
    }
}

impl Default for MapViewBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_marker(record: &CustomerRecord) -> MarkerDescriptor {
    MarkerDescriptor {
        latitude: record.latitude,
        longitude: record.longitude,
        tooltip: truncate_tooltip(&record.name),
        popup: PopupFields {
            name: record.name.clone(),
            account: record.account.clone(),
            municipality: record.municipality.clone(),
            meter_number: record.meter_number.clone(),
            meter_brand: record.meter_brand.clone(),
        },
        link_url: google_maps_url(record.latitude, record.longitude),
    }
}

/// First 40 characters of a name
pub fn truncate_tooltip(name: &str) -> String {
    name.chars().take(TOOLTIP_MAX_CHARS).collect()
}

pub fn google_maps_url(latitude: f64, longitude: f64) -> String {
    format!(
        "{}?q={},{}",
        GOOGLE_MAPS_BASE_URL,
        format_coordinate(latitude),
        format_coordinate(longitude)
    )
}
