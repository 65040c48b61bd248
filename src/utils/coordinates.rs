use crate::utils::constants::{MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Coerce a raw cell into a coordinate value.
///
/// Anything that does not parse as a decimal number becomes `None` instead of
/// an error, so a bad cell only ever drops its own row.
///
/// # Examples
/// ```
/// use agpe_map::utils::coerce_coordinate;
///
/// assert_eq!(coerce_coordinate(" 5.8 "), Some(5.8));
/// assert_eq!(coerce_coordinate("n/a"), None);
/// ```
pub fn coerce_coordinate(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Check a latitude/longitude pair against the inclusive geographic bounds.
///
/// NaN never passes.
pub fn is_valid_position(latitude: f64, longitude: f64) -> bool {
    (MIN_LAT..=MAX_LAT).contains(&latitude) && (MIN_LON..=MAX_LON).contains(&longitude)
}

/// Format a coordinate for interpolation into a URL.
///
/// Plain decimal notation, never an exponent, shortest form that round-trips.
/// Integral values keep a trailing `.0` (`-73.0`, not `-73`).
pub fn format_coordinate(value: f64) -> String {
    let mut formatted = value.to_string();
    if value.is_finite() && !formatted.contains('.') {
        formatted.push_str(".0");
    }
    formatted
}

/// Arithmetic mean of a sequence of positions, `None` when there are none.
pub fn centroid<I>(positions: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut count = 0usize;
    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;

    for (lat, lon) in positions {
        count += 1;
        lat_sum += lat;
        lon_sum += lon;
    }

    if count == 0 {
        None
    } else {
        Some((lat_sum / count as f64, lon_sum / count as f64))
    }
}
