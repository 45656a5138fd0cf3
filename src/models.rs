//! Core data structures for AQI training and prediction.
//!
//! Defines pollutant kinds, readings, engineered feature rows, the typed
//! model feature schema, and prediction results.

use crate::constants::{CATEGORICAL_FEATURES, NUMERIC_FEATURES};
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// Pollutant kinds reported by monitoring stations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    Pm25,
    Pm10,
    No2,
    So2,
    Co,
    Ozone,
    Nh3,
}

impl Pollutant {
    /// All kinds, in feature-column order
    pub const ALL: [Pollutant; 7] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
        Pollutant::Ozone,
        Pollutant::Nh3,
    ];

    /// Label used in input files and as the feature column name
    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::No2 => "NO2",
            Pollutant::So2 => "SO2",
            Pollutant::Co => "CO",
            Pollutant::Ozone => "OZONE",
            Pollutant::Nh3 => "NH3",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Pollutant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Pollutant::ALL
            .into_iter()
            .find(|p| p.label() == label)
            .ok_or_else(|| format!("unknown pollutant '{}'", label))
    }
}

/// One value per pollutant kind
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PollutantLevels<T>(pub [T; 7]);

impl<T> PollutantLevels<T> {
    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, &T)> {
        Pollutant::ALL.into_iter().zip(self.0.iter())
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PollutantLevels<U> {
        PollutantLevels(self.0.map(f))
    }
}

impl<T> Index<Pollutant> for PollutantLevels<T> {
    type Output = T;

    fn index(&self, pollutant: Pollutant) -> &T {
        &self.0[pollutant.index()]
    }
}

impl<T> IndexMut<Pollutant> for PollutantLevels<T> {
    fn index_mut(&mut self, pollutant: Pollutant) -> &mut T {
        &mut self.0[pollutant.index()]
    }
}

/// A single long-format measurement
#[derive(Debug, Clone, PartialEq)]
pub struct PollutantReading {
    pub state: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<NaiveDateTime>,
    pub pollutant: Pollutant,
    pub concentration: Option<f64>,
}

/// Calendar attributes derived from a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    /// 1..=12
    pub month: u32,
    /// 0..=23
    pub hour: u32,
    /// 0..=6, Monday = 0
    pub day_of_week: u32,
}

impl Calendar {
    pub fn from_timestamp(timestamp: &NaiveDateTime) -> Self {
        Self {
            month: timestamp.month(),
            hour: timestamp.hour(),
            day_of_week: timestamp.weekday().num_days_from_monday(),
        }
    }
}

/// One engineered row per (state, city, latitude, longitude, timestamp)
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub state: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: NaiveDateTime,
    pub pollutants: PollutantLevels<Option<f64>>,
    pub calendar: Calendar,
}

/// Typed feature schema shared by the trainer and the prediction service
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFeatures {
    pub pollutants: PollutantLevels<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub calendar: Calendar,
    pub state: String,
    pub city: String,
}

impl ModelFeatures {
    /// Numeric values in `NUMERIC_FEATURES` order
    pub fn numeric(&self) -> [f64; NUMERIC_FEATURES.len()] {
        let p = &self.pollutants.0;
        [
            p[0],
            p[1],
            p[2],
            p[3],
            p[4],
            p[5],
            p[6],
            self.latitude,
            self.longitude,
            self.calendar.month as f64,
            self.calendar.hour as f64,
            self.calendar.day_of_week as f64,
        ]
    }

    /// Categorical values in `CATEGORICAL_FEATURES` order
    pub fn categorical(&self) -> [&str; CATEGORICAL_FEATURES.len()] {
        [self.state.as_str(), self.city.as_str()]
    }
}

/// A feature record with its AQI label
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    pub features: ModelFeatures,
    pub aqi: f64,
}

/// AQI bands, ordered from cleanest to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    Healthy,
    Good,
    Moderate,
    Poor,
    Worst,
}

impl AqiCategory {
    /// Map an AQI value onto its band (inclusive upper bounds)
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi <= 25.0 {
            AqiCategory::Healthy
        } else if aqi <= 50.0 {
            AqiCategory::Good
        } else if aqi <= 100.0 {
            AqiCategory::Moderate
        } else if aqi <= 200.0 {
            AqiCategory::Poor
        } else {
            AqiCategory::Worst
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Healthy => "Healthy",
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::Worst => "Worst",
        }
    }

    pub fn advisory(&self) -> &'static str {
        match self {
            AqiCategory::Healthy => "Air is clean.",
            AqiCategory::Good => "Air quality is acceptable.",
            AqiCategory::Moderate => "Sensitive groups should limit outdoor activity.",
            AqiCategory::Poor => "Avoid outdoor exertion.",
            AqiCategory::Worst => "Health alert: everyone may be affected.",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a single prediction request
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub aqi: f64,
    pub category: AqiCategory,
    pub advisory: &'static str,
}

impl Prediction {
    pub fn from_aqi(aqi: f64) -> Self {
        let category = AqiCategory::from_aqi(aqi);
        Self {
            aqi,
            category,
            advisory: category.advisory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_pollutant_labels_round_trip() {
        for pollutant in Pollutant::ALL {
            assert_eq!(pollutant.label().parse::<Pollutant>(), Ok(pollutant));
        }
        assert_eq!(" OZONE ".parse::<Pollutant>(), Ok(Pollutant::Ozone));
        assert!("pm2.5".parse::<Pollutant>().is_err());
        assert!("CO2".parse::<Pollutant>().is_err());
    }

    #[test]
    fn test_pollutant_order_matches_feature_columns() {
        for (i, pollutant) in Pollutant::ALL.iter().enumerate() {
            assert_eq!(NUMERIC_FEATURES[i], pollutant.label());
        }
    }

    #[test]
    fn test_category_boundaries() {
        let cases = [
            (0.0, AqiCategory::Healthy),
            (25.0, AqiCategory::Healthy),
            (25.1, AqiCategory::Good),
            (50.0, AqiCategory::Good),
            (50.1, AqiCategory::Moderate),
            (100.0, AqiCategory::Moderate),
            (100.1, AqiCategory::Poor),
            (200.0, AqiCategory::Poor),
            (200.1, AqiCategory::Worst),
            (480.0, AqiCategory::Worst),
        ];
        for (aqi, expected) in cases {
            assert_eq!(AqiCategory::from_aqi(aqi), expected, "aqi = {}", aqi);
        }
    }

    #[test]
    fn test_prediction_carries_advisory() {
        let prediction = Prediction::from_aqi(150.0);
        assert_eq!(prediction.category, AqiCategory::Poor);
        assert_eq!(prediction.advisory, "Avoid outdoor exertion.");

        assert_eq!(AqiCategory::Healthy.advisory(), "Air is clean.");
        assert_eq!(
            AqiCategory::Worst.advisory(),
            "Health alert: everyone may be affected."
        );
    }

    #[test]
    fn test_calendar_from_timestamp() {
        // 2024-03-21 was a Thursday
        let ts = NaiveDate::from_ymd_opt(2024, 3, 21)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        let calendar = Calendar::from_timestamp(&ts);
        assert_eq!(calendar.month, 3);
        assert_eq!(calendar.hour, 14);
        assert_eq!(calendar.day_of_week, 3);
    }

    #[test]
    fn test_model_features_numeric_order() {
        let mut pollutants = PollutantLevels([0.0; 7]);
        pollutants[Pollutant::Pm25] = 12.0;
        pollutants[Pollutant::Nh3] = 4.0;

        let features = ModelFeatures {
            pollutants,
            latitude: 28.6,
            longitude: 77.2,
            calendar: Calendar {
                month: 11,
                hour: 12,
                day_of_week: 6,
            },
            state: "Delhi".to_string(),
            city: "Delhi".to_string(),
        };

        let numeric = features.numeric();
        assert_eq!(numeric[0], 12.0);
        assert_eq!(numeric[6], 4.0);
        assert_eq!(numeric[7], 28.6);
        assert_eq!(numeric[9], 11.0);
        assert_eq!(numeric[11], 6.0);
        assert_eq!(features.categorical(), ["Delhi", "Delhi"]);
    }
}
