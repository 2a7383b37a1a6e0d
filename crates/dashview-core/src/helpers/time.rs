// crates/dashview-core/src/helpers/time.rs
//
// Display strings for transport state: speed labels, progress readout and
// the position/duration clock.

/// Format a rate with at most two fraction digits and an `x` suffix.
///
/// ```
/// use dashview_core::helpers::time::format_speed;
/// assert_eq!(format_speed(0.25), "0.25x");
/// assert_eq!(format_speed(0.5),  "0.5x");
/// assert_eq!(format_speed(10.0), "10x");
/// ```
pub fn format_speed(rate: f32) -> String {
    format!("{}x", trim_fraction(rate as f64))
}

/// Format a normalised progress value with at most two fraction digits.
///
/// ```
/// use dashview_core::helpers::time::format_progress;
/// assert_eq!(format_progress(0.0),    "0");
/// assert_eq!(format_progress(0.3712), "0.37");
/// assert_eq!(format_progress(1.0),    "1");
/// ```
pub fn format_progress(progress: f64) -> String {
    trim_fraction(progress)
}

/// Format seconds as `M:SS`, or `H:MM:SS` from one hour up.
///
/// ```
/// use dashview_core::helpers::time::format_clock;
/// assert_eq!(format_clock(0.0),    "0:00");
/// assert_eq!(format_clock(61.9),   "1:01");
/// assert_eq!(format_clock(3875.0), "1:04:35");
/// ```
pub fn format_clock(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 { secs as u64 } else { 0 };
    if total >= 3600 {
        format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    } else {
        format!("{}:{:02}", total / 60, total % 60)
    }
}

fn trim_fraction(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
