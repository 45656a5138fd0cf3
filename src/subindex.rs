//! Pollutant sub-index calculators.
//!
//! Maps a raw concentration onto the 0-500 sub-index scale by linear
//! interpolation inside fixed breakpoint bands. Above the last band the
//! final slope continues without a cap.

use crate::models::{Pollutant, PollutantLevels};

/// One interpolation band: concentrations in `(c_low, c_high]` map onto
/// `[i_low, i_high]`
#[derive(Debug, Clone, Copy)]
struct Band {
    c_low: f64,
    c_high: f64,
    i_low: f64,
    i_high: f64,
}

impl Band {
    const fn new(c_low: f64, c_high: f64, i_low: f64, i_high: f64) -> Self {
        Self {
            c_low,
            c_high,
            i_low,
            i_high,
        }
    }

    fn interpolate(&self, x: f64) -> f64 {
        let (index_span, conc_span) = (self.i_high - self.i_low, self.c_high - self.c_low);
        if index_span == conc_span {
            // unit slope, keep the value exact
            return self.i_low + (x - self.c_low);
        }
        self.i_low + (x - self.c_low) * index_span / conc_span
    }
}

const PM25_BANDS: [Band; 6] = [
    Band::new(0.0, 30.0, 0.0, 50.0),
    Band::new(30.0, 60.0, 50.0, 100.0),
    Band::new(60.0, 90.0, 100.0, 200.0),
    Band::new(90.0, 120.0, 200.0, 300.0),
    Band::new(120.0, 250.0, 300.0, 400.0),
    // open-ended, slope 100/130
    Band::new(250.0, 380.0, 400.0, 500.0),
];

const PM10_BANDS: [Band; 6] = [
    Band::new(0.0, 50.0, 0.0, 50.0),
    Band::new(50.0, 100.0, 50.0, 100.0),
    Band::new(100.0, 250.0, 100.0, 200.0),
    Band::new(250.0, 350.0, 200.0, 300.0),
    Band::new(350.0, 430.0, 300.0, 400.0),
    // open-ended, slope 100/80
    Band::new(430.0, 510.0, 400.0, 500.0),
];

fn sub_index(bands: &[Band], x: f64) -> f64 {
    let last = bands.len() - 1;
    let band = bands[..last]
        .iter()
        .find(|band| x <= band.c_high)
        .unwrap_or(&bands[last]);
    band.interpolate(x)
}

/// PM2.5 sub-index for a concentration in µg/m³
pub fn pm25_sub_index(x: f64) -> f64 {
    sub_index(&PM25_BANDS, x)
}

/// PM10 sub-index for a concentration in µg/m³
pub fn pm10_sub_index(x: f64) -> f64 {
    sub_index(&PM10_BANDS, x)
}

/// Sub-index for the pollutants that take part in the AQI, `None` otherwise
/// or when the concentration is absent
pub fn sub_index_for(pollutant: Pollutant, concentration: Option<f64>) -> Option<f64> {
    match pollutant {
        Pollutant::Pm25 => concentration.map(pm25_sub_index),
        Pollutant::Pm10 => concentration.map(pm10_sub_index),
        _ => None,
    }
}

/// Overall AQI: the largest available PM2.5/PM10 sub-index
pub fn aqi_from_levels(levels: &PollutantLevels<Option<f64>>) -> Option<f64> {
    [Pollutant::Pm25, Pollutant::Pm10]
        .into_iter()
        .filter_map(|p| sub_index_for(p, levels[p]))
        .reduce(f64::max)
}
