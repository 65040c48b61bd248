use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default HTML map filename with format: agpe-map-{YYMMDD}.html
pub fn generate_default_html_filename() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!("agpe-map-{:02}{:02}{:02}.html", year, month, day);
    PathBuf::from("output").join(filename)
}
