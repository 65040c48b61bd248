pub mod coordinate_validator;
pub mod dataset_cache;
pub mod pipeline;
pub mod search_filter;
pub mod view_builder;

pub use coordinate_validator::{CoordinateValidator, RowRejection, ValidationOutcome, ValidationReport};
pub use dataset_cache::DatasetCache;
pub use pipeline::{build_view, load_validated, view_from_dataset, CsvSource, DatasetSource, ViewOptions};
pub use search_filter::{filter_dataset, SearchFilter};
pub use view_builder::{build_marker, google_maps_url, truncate_tooltip, MapViewBuilder};
