use super::types::{ForecastEntry, ForecastReport};

pub const UNKNOWN: &str = "unknown";
pub const NO_DATA: &str = "no data";

/// Flatten a JMA payload into one row per (report × area).
///
/// Missing `publishingOffice`/`reportDatetime` become [`UNKNOWN`]; an area
/// with no `weathers` keeps its row with [`NO_DATA`]. `created_at` is left
/// for the store to stamp.
pub fn normalize(office_code: &str, reports: &[ForecastReport]) -> Vec<ForecastEntry> {
    let mut entries = Vec::new();

    for report in reports {
        let publishing_office = report.publishing_office.as_deref().unwrap_or(UNKNOWN);
        let report_datetime = report.report_datetime.as_deref().unwrap_or(UNKNOWN);

        for series in &report.time_series {
            for area in &series.areas {
                let weather = area.weathers.first().map(String::as_str).unwrap_or(NO_DATA);
                let area_name = area.area.as_ref().and_then(|a| a.name.clone());

                entries.push(ForecastEntry {
                    office_code: office_code.to_string(),
                    publishing_office: publishing_office.to_string(),
                    report_datetime: report_datetime.to_string(),
                    area_name,
                    weather: weather.to_string(),
                    created_at: None,
                });
            }
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Vec<ForecastReport> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_single_report_single_area() {
        let reports = parse(json!([{
            "publishingOffice": "Tokyo Office",
            "reportDatetime": "2024-01-01T00:00:00+09:00",
            "timeSeries": [{"areas": [{"area": {"name": "Tokyo"}, "weathers": ["Sunny"]}]}]
        }]));

        let entries = normalize("130000", &reports);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].weather, "Sunny");
        assert_eq!(entries[0].publishing_office, "Tokyo Office");
        assert_eq!(entries[0].report_datetime, "2024-01-01T00:00:00+09:00");
        assert_eq!(entries[0].area_name.as_deref(), Some("Tokyo"));
        assert_eq!(entries[0].office_code, "130000");
    }

    #[test]
    fn test_cross_product_row_count() {
        let area = |name: &str| json!({"area": {"name": name}, "weathers": ["晴れ", "くもり"]});
        let report = json!({
            "publishingOffice": "気象庁",
            "reportDatetime": "2024-05-01T11:00:00+09:00",
            "timeSeries": [
                {"timeDefines": ["2024-05-01T11:00:00+09:00"], "areas": [area("東京地方"), area("伊豆諸島北部")]},
                {"areas": [area("小笠原諸島")]}
            ]
        });
        let reports = parse(json!([report.clone(), report.clone(), report]));

        // 3 reports × (2 + 1) areas
        let entries = normalize("130000", &reports);
        assert_eq!(entries.len(), 9);
        assert!(entries.iter().all(|e| e.weather == "晴れ"));
    }

    #[test]
    fn test_empty_weathers_becomes_placeholder() {
        let reports = parse(json!([{
            "publishingOffice": "Tokyo Office",
            "reportDatetime": "2024-01-01T00:00:00+09:00",
            "timeSeries": [{"areas": [
                {"area": {"name": "Tokyo"}, "weathers": []},
                {"area": {"name": "Izu"}, "pops": ["10", "20"]}
            ]}]
        }]));

        let entries = normalize("130000", &reports);

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.weather == NO_DATA));
    }

    #[test]
    fn test_missing_header_fields_and_area_name() {
        let reports = parse(json!([{
            "timeSeries": [{"areas": [{"weathers": ["Rain"]}]}]
        }]));

        let entries = normalize("016000", &reports);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].publishing_office, UNKNOWN);
        assert_eq!(entries[0].report_datetime, UNKNOWN);
        assert_eq!(entries[0].area_name, None);
        assert_eq!(entries[0].weather, "Rain");
    }

    #[test]
    fn test_report_without_time_series_yields_nothing() {
        let reports = parse(json!([{"publishingOffice": "X", "reportDatetime": "Y"}]));
        assert!(normalize("130000", &reports).is_empty());
        assert!(normalize("130000", &[]).is_empty());
    }
}
