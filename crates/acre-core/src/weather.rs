//! Daily weather observations and validated series.
//!
//! A [`WeatherSeries`] is an ordered sequence of one record per date with
//! strictly increasing dates. Scalar measurements are individually optional;
//! consumers decide how to treat gaps (the growth simulator credits zero GDD
//! for a missing mean temperature).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AcreError, AcreResult};

/// One day of weather observations at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub date: NaiveDate,
    /// Daily mean temperature (°C)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_mean: Option<f64>,
    /// Daily maximum temperature (°C)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_max: Option<f64>,
    /// Daily minimum temperature (°C)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_min: Option<f64>,
    /// Precipitation sum (mm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
    /// Sunshine duration (hours)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunshine_hours: Option<f64>,
    /// Wind speed (m/s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    /// WMO weather code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<i32>,
}

impl DailyWeather {
    /// A record with a date and no measurements
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            temperature_mean: None,
            temperature_max: None,
            temperature_min: None,
            precipitation: None,
            sunshine_hours: None,
            wind_speed: None,
            weather_code: None,
        }
    }

    /// Convenience constructor for the common temperature triple
    pub fn with_temperatures(date: NaiveDate, mean: f64, max: f64, min: f64) -> Self {
        Self {
            temperature_mean: Some(mean),
            temperature_max: Some(max),
            temperature_min: Some(min),
            ..Self::empty(date)
        }
    }
}

/// An ordered, duplicate-free sequence of daily weather records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DailyWeather>", into = "Vec<DailyWeather>")]
pub struct WeatherSeries {
    records: Vec<DailyWeather>,
}

impl WeatherSeries {
    /// Build a series, validating that dates are strictly increasing.
    pub fn new(records: Vec<DailyWeather>) -> AcreResult<Self> {
        for pair in records.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(AcreError::Validation(format!(
                    "weather series dates must be strictly increasing ({} then {})",
                    pair[0].date, pair[1].date
                )));
            }
        }
        Ok(Self { records })
    }

    /// Build a series from unordered records, sorting and rejecting
    /// duplicate dates.
    pub fn from_unordered(mut records: Vec<DailyWeather>) -> AcreResult<Self> {
        records.sort_by_key(|r| r.date);
        Self::new(records)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[DailyWeather] {
        &self.records
    }

    /// First date covered by the series
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    /// Last date covered by the series
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Look up a single day by date (binary search; dates are sorted)
    pub fn get(&self, date: NaiveDate) -> Option<&DailyWeather> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.records[i])
    }

    /// Iterate records from the given date (inclusive) onward.
    ///
    /// Starts at the first record on or after `date`; a caller that needs
    /// contiguous coverage must check the dates it receives.
    pub fn iter_from(&self, date: NaiveDate) -> impl Iterator<Item = &DailyWeather> {
        let start = self
            .records
            .partition_point(|r| r.date < date);
        self.records[start..].iter()
    }
}

impl TryFrom<Vec<DailyWeather>> for WeatherSeries {
    type Error = AcreError;

    fn try_from(records: Vec<DailyWeather>) -> AcreResult<Self> {
        Self::new(records)
    }
}

impl From<WeatherSeries> for Vec<DailyWeather> {
    fn from(series: WeatherSeries) -> Self {
        series.records
    }
}
