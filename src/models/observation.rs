use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::constants::MISSING_SENTINEL;

/// Compact `YYYYMMDD` date representation used by the source files, the
/// database and the API, distinct from chrono's default ISO-8601 serde form.
pub mod compact_date {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y%m%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&value, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// One station-day reading. Measurement values are stored exactly as read,
/// including the `-9999` missing sentinel; temperatures are in tenths of a
/// degree Celsius and precipitation in tenths of a millimetre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(with = "compact_date")]
    pub date: NaiveDate,
    pub station_id: String,
    pub max_temp: f64,
    pub min_temp: f64,
    #[serde(rename = "precipitation_amount")]
    pub precipitation: f64,
}

impl Observation {
    pub fn new(
        date: NaiveDate,
        station_id: String,
        max_temp: f64,
        min_temp: f64,
        precipitation: f64,
    ) -> Self {
        Self {
            date,
            station_id,
            max_temp,
            min_temp,
            precipitation,
        }
    }

    /// Date in the compact `YYYYMMDD` form used for storage and filtering
    pub fn date_string(&self) -> String {
        self.date.format(compact_date::FORMAT).to_string()
    }

    /// Calendar year as the four leading characters of the compact date
    pub fn year(&self) -> String {
        self.date.format("%Y").to_string()
    }

    pub fn max_temp_reading(&self) -> Option<f64> {
        reading(self.max_temp)
    }

    pub fn min_temp_reading(&self) -> Option<f64> {
        reading(self.min_temp)
    }

    pub fn precipitation_reading(&self) -> Option<f64> {
        reading(self.precipitation)
    }

    pub fn has_any_reading(&self) -> bool {
        self.max_temp_reading().is_some()
            || self.min_temp_reading().is_some()
            || self.precipitation_reading().is_some()
    }
}

fn reading(value: f64) -> Option<f64> {
    if value == MISSING_SENTINEL {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn observation(max_temp: f64, min_temp: f64, precipitation: f64) -> Observation {
        Observation::new(
            NaiveDate::from_ymd_opt(2020, 3, 14).unwrap(),
            "USC00110072".to_string(),
            max_temp,
            min_temp,
            precipitation,
        )
    }

    #[test]
    fn test_date_formatting() {
        let obs = observation(211.0, 89.0, 25.0);
        assert_eq!(obs.date_string(), "20200314");
        assert_eq!(obs.year(), "2020");
    }

    #[test]
    fn test_sentinel_readings() {
        let obs = observation(211.0, -9999.0, -9999.0);
        assert_eq!(obs.max_temp_reading(), Some(211.0));
        assert_eq!(obs.min_temp_reading(), None);
        assert_eq!(obs.precipitation_reading(), None);
        assert!(obs.has_any_reading());

        let all_missing = observation(-9999.0, -9999.0, -9999.0);
        assert!(!all_missing.has_any_reading());
    }

    #[test]
    fn test_json_round_trip() {
        let obs = observation(211.0, 89.0, -9999.0);
        let json = serde_json::to_value(&obs).unwrap();

        assert_eq!(json["date"], "20200314");
        assert_eq!(json["station_id"], "USC00110072");
        assert_eq!(json["precipitation_amount"], -9999.0);

        let back: Observation = serde_json::from_value(json).unwrap();
        assert_eq!(back, obs);
    }
}
