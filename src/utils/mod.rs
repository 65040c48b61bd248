pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::{coerce_coordinate, format_coordinate, is_valid_position};
pub use filename::generate_default_html_filename;
pub use progress::ProgressReporter;
