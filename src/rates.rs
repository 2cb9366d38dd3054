//! Age-banded annual interest rate table

use serde::{Deserialize, Serialize};

/// Rate applied when an age falls outside every band
pub const FALLBACK_RATE: f64 = 0.04;

/// One inclusive age band and its annual rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    pub min_age: u32,
    pub max_age: u32,
    /// Annual rate as a decimal fraction (0.05 = 5%)
    pub annual_rate: f64,
}

impl RateBand {
    pub const fn new(min_age: u32, max_age: u32, annual_rate: f64) -> Self {
        Self { min_age, max_age, annual_rate }
    }

    /// Inclusive on both ends
    pub fn contains(&self, age: u32) -> bool {
        age >= self.min_age && age <= self.max_age
    }
}

/// Ordered set of disjoint age bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    bands: Vec<RateBand>,
}

impl RateTable {
    /// Build a table from explicit bands, checked in the given order
    pub fn from_bands(bands: Vec<RateBand>) -> Self {
        Self { bands }
    }

    /// Standard consumer lending tiers
    pub fn default_tiers() -> Self {
        Self {
            bands: vec![
                RateBand::new(0, 25, 0.05),   // Up to 25: 5%
                RateBand::new(26, 40, 0.03),  // 26-40: 3%
                RateBand::new(41, 60, 0.02),  // 41-60: 2%
                RateBand::new(61, 999, 0.04), // 61+: 4%
            ],
        }
    }

    /// Annual rate for an attained age
    pub fn rate_for_age(&self, age: u32) -> f64 {
        self.band_for_age(age)
            .map(|band| band.annual_rate)
            .unwrap_or(FALLBACK_RATE)
    }

    /// Band containing the age, if any
    pub fn band_for_age(&self, age: u32) -> Option<&RateBand> {
        self.bands.iter().find(|band| band.contains(age))
    }

    pub fn bands(&self) -> &[RateBand] {
        &self.bands
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::default_tiers()
    }
}
