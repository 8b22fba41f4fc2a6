use serde::{Deserialize, Serialize};

/// Yearly per-station aggregate. The same shape backs the batch-computed
/// `weather_summary` table and the live `/api/weather/stats` response; an
/// aggregate is `None` when the year holds no valid reading for that field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: String,
    pub station_id: String,
    pub avg_max_temp: Option<f64>,
    pub avg_min_temp: Option<f64>,
    pub total_precipitation_cm: Option<f64>,
}

impl YearlySummary {
    /// One-line rendering for the post-ingest preview printout
    pub fn preview_line(&self) -> String {
        format!(
            "{} {}: avg max {}, avg min {}, precipitation {} cm",
            self.year,
            self.station_id,
            format_reading(self.avg_max_temp),
            format_reading(self.avg_min_temp),
            format_reading(self.total_precipitation_cm),
        )
    }
}

fn format_reading(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_line() {
        let summary = YearlySummary {
            year: "1985".to_string(),
            station_id: "USC00110072".to_string(),
            avg_max_temp: Some(156.25),
            avg_min_temp: None,
            total_precipitation_cm: Some(84.2),
        };

        assert_eq!(
            summary.preview_line(),
            "1985 USC00110072: avg max 156.2, avg min n/a, precipitation 84.2 cm"
        );
    }
}
