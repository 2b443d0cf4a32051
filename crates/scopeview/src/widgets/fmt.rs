//! Human-readable metric formatting helpers.

use scopeview_api::Metric;

/// Format bytes into a compact human-readable string (e.g., "245M", "1.2G").
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn fmt_bytes_short(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}G", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{}M", bytes / 1_000_000)
    } else if bytes >= 1_000 {
        format!("{}K", bytes / 1_000)
    } else {
        format!("{bytes}B")
    }
}

/// Format a metric value the way its `format` hint asks for.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn fmt_metric(metric: &Metric) -> String {
    match metric.format.as_deref() {
        Some("percent") => format!("{:.1}%", metric.value),
        Some("filesize") => fmt_bytes_short(metric.value.max(0.0) as u64),
        Some("integer") => format!("{:.0}", metric.value),
        _ => format!("{:.2}", metric.value),
    }
}

/// `-` for missing values, otherwise the value with one decimal and a unit.
pub fn fmt_optional(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "-".to_owned(), |v| format!("{v:.1}{unit}"))
}

/// Fraction of the metric's range covered by its value, in percent.
pub fn metric_pct(metric: &Metric) -> f64 {
    let span = metric.max - metric.min;
    if span <= 0.0 {
        return 0.0;
    }
    ((metric.value - metric.min) / span * 100.0).clamp(0.0, 100.0)
}

/// Render a percentage bar split into filled and empty portions.
///
/// Returns `(filled, empty)` strings of `█` and `░` characters that together
/// span `width` character positions. Caller applies styling per segment.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn fmt_pct_bar(pct: f64, width: u16) -> (String, String) {
    let clamped = pct.clamp(0.0, 100.0);
    let filled_count = ((clamped / 100.0) * f64::from(width)).round() as u16;
    let empty_count = width.saturating_sub(filled_count);
    (
        "█".repeat(usize::from(filled_count)),
        "░".repeat(usize::from(empty_count)),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn metric(format: Option<&str>, value: f64, max: f64) -> Metric {
        serde_json::from_value(serde_json::json!({
            "id": "m", "format": format, "value": value, "min": 0.0, "max": max
        }))
        .unwrap()
    }

    #[test]
    fn formats_follow_the_hint() {
        assert_eq!(fmt_metric(&metric(Some("percent"), 12.345, 100.0)), "12.3%");
        assert_eq!(fmt_metric(&metric(Some("filesize"), 2_500_000.0, 0.0)), "2M");
        assert_eq!(fmt_metric(&metric(Some("integer"), 41.6, 0.0)), "42");
        assert_eq!(fmt_metric(&metric(None, 0.5, 0.0)), "0.50");
    }

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(fmt_optional(None, " ms"), "-");
        assert_eq!(fmt_optional(Some(3.26), " ms"), "3.3 ms");
    }

    #[test]
    fn pct_handles_degenerate_range() {
        assert!(metric_pct(&metric(None, 5.0, 0.0)).abs() < f64::EPSILON);
        assert!((metric_pct(&metric(None, 50.0, 200.0)) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bar_spans_full_width() {
        let (filled, empty) = fmt_pct_bar(50.0, 10);
        assert_eq!(filled.chars().count(), 5);
        assert_eq!(empty.chars().count(), 5);
        let (filled, empty) = fmt_pct_bar(150.0, 4);
        assert_eq!((filled.chars().count(), empty.chars().count()), (4, 0));
    }
}
