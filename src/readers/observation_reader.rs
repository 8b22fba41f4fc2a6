use crate::error::{Result, WeatherError};
use crate::models::{compact_date, Observation};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reader for station observation files: whitespace-delimited, headerless,
/// one `date max_temp min_temp precipitation_amount` row per station-day.
pub struct ObservationReader;

impl ObservationReader {
    pub fn new() -> Self {
        Self
    }

    /// Read observations from a file (station ID taken from the file stem)
    pub fn read_observations(&self, path: &Path) -> Result<Vec<Observation>> {
        let station_id = self.extract_station_id_from_path(path)?;
        self.read_observations_with_station_id(path, &station_id)
    }

    /// Read observations from a file with an explicit station ID
    pub fn read_observations_with_station_id(
        &self,
        path: &Path,
        station_id: &str,
    ) -> Result<Vec<Observation>> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut observations = Vec::new();

        for (index, line_result) in reader.lines().enumerate() {
            let line = line_result?;

            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            observations.push(self.parse_observation_line(&line, station_id, index + 1)?);
        }

        Ok(observations)
    }

    /// Extract the station ID from the file name (e.g. USC00110072.txt -> USC00110072)
    pub fn extract_station_id_from_path(&self, path: &Path) -> Result<String> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                WeatherError::InvalidFormat(format!(
                    "Could not extract station ID from file name: {}",
                    path.display()
                ))
            })
    }

    /// Parse a single `date max_temp min_temp precipitation_amount` line
    fn parse_observation_line(
        &self,
        line: &str,
        station_id: &str,
        line_number: usize,
    ) -> Result<Observation> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != 4 {
            return Err(WeatherError::InvalidFormat(format!(
                "Line {}: expected 4 fields, found {}",
                line_number,
                parts.len()
            )));
        }

        let date = NaiveDate::parse_from_str(parts[0], compact_date::FORMAT).map_err(|_| {
            WeatherError::InvalidFormat(format!("Line {}: invalid date '{}'", line_number, parts[0]))
        })?;

        let max_temp = parse_value(parts[1], "max_temp", line_number)?;
        let min_temp = parse_value(parts[2], "min_temp", line_number)?;
        let precipitation = parse_value(parts[3], "precipitation_amount", line_number)?;

        Ok(Observation::new(
            date,
            station_id.to_string(),
            max_temp,
            min_temp,
            precipitation,
        ))
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_value(raw: &str, field: &str, line_number: usize) -> Result<f64> {
    raw.parse::<f64>().map_err(|_| {
        WeatherError::InvalidFormat(format!(
            "Line {}: invalid {} value '{}'",
            line_number, field, raw
        ))
    })
}
