//! Weather series import from JSON and CSV files.
//!
//! The accepted column set follows the Open-Meteo daily export:
//! `time`, `temperature_2m_max`, `temperature_2m_min`, `temperature_2m_mean`,
//! `precipitation_sum`, `sunshine_duration` (seconds), plus optional
//! `wind_speed_10m_max` and `weather_code`. JSON documents may wrap records
//! in `{"data": [...]}` or be a bare array; CSV uses the same column names
//! as headers. Missing measurements appear as null/empty and stay `None`.

use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use acre_core::{AcreError, AcreResult, DailyWeather, WeatherSeries};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// One raw record as it appears on disk.
#[derive(Debug, Deserialize)]
struct RawWeatherRecord {
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    temperature_2m_mean: Option<f64>,
    #[serde(default)]
    temperature_2m_max: Option<f64>,
    #[serde(default)]
    temperature_2m_min: Option<f64>,
    #[serde(default)]
    precipitation_sum: Option<f64>,
    /// Seconds of sunshine, per the Open-Meteo convention
    #[serde(default)]
    sunshine_duration: Option<f64>,
    #[serde(default)]
    wind_speed_10m_max: Option<f64>,
    #[serde(default)]
    weather_code: Option<i32>,
}

/// JSON document shapes: wrapped or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeatherDocument {
    Wrapped { data: Vec<RawWeatherRecord> },
    Bare(Vec<RawWeatherRecord>),
}

impl RawWeatherRecord {
    /// Records without a parseable date are unusable and skipped.
    fn into_daily(self) -> Option<DailyWeather> {
        let stamp = self.time.or(self.date)?;
        let date = parse_date(&stamp)?;
        Some(DailyWeather {
            date,
            temperature_mean: self.temperature_2m_mean,
            temperature_max: self.temperature_2m_max,
            temperature_min: self.temperature_2m_min,
            precipitation: self.precipitation_sum,
            sunshine_hours: self.sunshine_duration.map(|s| s / SECONDS_PER_HOUR),
            wind_speed: self.wind_speed_10m_max,
            weather_code: self.weather_code,
        })
    }
}

/// ISO-8601 date, tolerating a trailing time component.
fn parse_date(stamp: &str) -> Option<NaiveDate> {
    let date_part = stamp.get(..10).unwrap_or(stamp);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Read a weather series from a `.json` or `.csv` file.
pub fn read_weather_series(path: &Path) -> AcreResult<WeatherSeries> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("json") => read_json(path),
        Some("csv") => read_csv(path),
        other => Err(AcreError::Parse(format!(
            "unsupported weather file extension {:?} (expected .json or .csv)",
            other.unwrap_or("<none>")
        ))),
    }
}

fn read_json(path: &Path) -> AcreResult<WeatherSeries> {
    let content = fs::read_to_string(path)?;
    let document: WeatherDocument = serde_json::from_str(&content)
        .map_err(|e| AcreError::Parse(format!("{}: {}", path.display(), e)))?;
    let raw = match document {
        WeatherDocument::Wrapped { data } => data,
        WeatherDocument::Bare(records) => records,
    };
    collect(raw)
}

fn read_csv(path: &Path) -> AcreResult<WeatherSeries> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| AcreError::Parse(format!("{}: {}", path.display(), e)))?;
    let mut raw = Vec::new();
    for row in reader.deserialize::<RawWeatherRecord>() {
        raw.push(row.map_err(|e| AcreError::Parse(format!("{}: {}", path.display(), e)))?);
    }
    collect(raw)
}

fn collect(raw: Vec<RawWeatherRecord>) -> AcreResult<WeatherSeries> {
    let records: Vec<DailyWeather> = raw.into_iter().filter_map(|r| r.into_daily()).collect();
    WeatherSeries::from_unordered(records)
}

/// File-backed [`acre_algo::WeatherSource`].
pub struct FileWeatherSource {
    path: std::path::PathBuf,
}

impl FileWeatherSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl acre_algo::WeatherSource for FileWeatherSource {
    fn daily_series(&self, start: NaiveDate, end: NaiveDate) -> AcreResult<WeatherSeries> {
        let series = read_weather_series(&self.path)?;
        let slice: Vec<DailyWeather> = series
            .records()
            .iter()
            .filter(|r| start <= r.date && r.date <= end)
            .cloned()
            .collect();
        WeatherSeries::new(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join(name)).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        dir
    }

    #[test]
    fn reads_wrapped_json() {
        let dir = write_temp(
            "weather.json",
            r#"{"data": [
                {"time": "2025-04-01", "temperature_2m_mean": 18.5,
                 "temperature_2m_max": 24.0, "temperature_2m_min": 12.0,
                 "precipitation_sum": 0.0, "sunshine_duration": 36000},
                {"time": "2025-04-02", "temperature_2m_mean": null,
                 "temperature_2m_max": 22.0, "temperature_2m_min": 11.0}
            ]}"#,
        );
        let series = read_weather_series(&dir.path().join("weather.json")).unwrap();
        assert_eq!(series.len(), 2);
        let first = &series.records()[0];
        assert_eq!(first.temperature_mean, Some(18.5));
        assert_eq!(first.sunshine_hours, Some(10.0));
        assert_eq!(series.records()[1].temperature_mean, None);
    }

    #[test]
    fn reads_bare_array_with_datetime_stamps() {
        let dir = write_temp(
            "weather.json",
            r#"[{"time": "2025-04-01T00:00:00Z", "temperature_2m_mean": 20.0}]"#,
        );
        let series = read_weather_series(&dir.path().join("weather.json")).unwrap();
        assert_eq!(
            series.start_date(),
            Some(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())
        );
    }

    #[test]
    fn reads_csv_with_empty_cells() {
        let dir = write_temp(
            "weather.csv",
            "time,temperature_2m_mean,temperature_2m_max,temperature_2m_min,precipitation_sum,sunshine_duration\n\
             2025-04-01,18.5,24.0,12.0,0.0,36000\n\
             2025-04-02,,22.0,11.0,,\n",
        );
        let series = read_weather_series(&dir.path().join("weather.csv")).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.records()[1].temperature_mean, None);
        assert_eq!(series.records()[1].temperature_max, Some(22.0));
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = write_temp("weather.parquet", "");
        let result = read_weather_series(&dir.path().join("weather.parquet"));
        assert!(matches!(result, Err(AcreError::Parse(_))));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let dir = write_temp(
            "weather.json",
            r#"[{"time": "2025-04-01"}, {"time": "2025-04-01"}]"#,
        );
        let result = read_weather_series(&dir.path().join("weather.json"));
        assert!(matches!(result, Err(AcreError::Validation(_))));
    }

    #[test]
    fn source_slices_to_the_requested_range() {
        use acre_algo::WeatherSource;
        let dir = write_temp(
            "weather.json",
            r#"[{"time": "2025-04-01"}, {"time": "2025-04-02"}, {"time": "2025-04-03"}]"#,
        );
        let source = FileWeatherSource::new(dir.path().join("weather.json"));
        let series = source
            .daily_series(
                NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
                NaiveDate::from_ymd_opt(2025, 4, 3).unwrap(),
            )
            .unwrap();
        assert_eq!(series.len(), 2);
    }
}
