use serde::{Deserialize, Serialize};

/// Customer details shown inside a marker popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupFields {
    pub name: String,
    pub account: String,
    pub municipality: String,
    pub meter_number: String,
    pub meter_brand: String,
}

/// Presentation view of one record. Regenerated on every search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDescriptor {
    pub latitude: f64,
    pub longitude: f64,
    pub tooltip: String,
    pub popup: PopupFields,
    pub link_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub markers: Vec<MarkerDescriptor>,
}

impl MapView {
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

/// Result of one pipeline run that loaded successfully.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome {
    Markers(MapView),
    /// The search matched nothing; no map is built.
    NoResults,
}

impl ViewOutcome {
    pub fn is_no_results(&self) -> bool {
        matches!(self, ViewOutcome::NoResults)
    }

    pub fn map_view(&self) -> Option<&MapView> {
        match self {
            ViewOutcome::Markers(view) => Some(view),
            ViewOutcome::NoResults => None,
        }
    }
}
