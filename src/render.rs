use std::fmt::Write;

use crate::forecast::normalize::UNKNOWN;
use crate::forecast::types::ForecastEntry;

/// Plain-text forecast: a heading per report, one line per area beneath it.
pub fn render_text(entries: &[ForecastEntry]) -> String {
    if entries.is_empty() {
        return "no forecast data\n".to_string();
    }

    let mut out = String::new();
    let mut current: Option<(&str, &str)> = None;

    for entry in entries {
        let heading = (entry.publishing_office.as_str(), entry.report_datetime.as_str());
        if current != Some(heading) {
            if current.is_some() {
                out.push('\n');
            }
            // Writing to a String cannot fail.
            let _ = writeln!(out, "{} {}", heading.0, heading.1);
            current = Some(heading);
        }
        let _ = writeln!(
            out,
            "area: {} weather: {}",
            entry.area_name.as_deref().unwrap_or(UNKNOWN),
            entry.weather
        );
    }

    out
}
