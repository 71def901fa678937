//! Tunables of the widget pipeline.
//!
//! Every field has a default, so an empty `[widgets]` table (or none at all)
//! yields the stock dashboard.

use serde::{Deserialize, Serialize};

use crate::classifier::FWD_EDU_VENDOR_PATTERN;

/// Size slot a widget family renders in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBand {
    Nominal,
    /// Sonar.
    Wide,
    /// Soil moisture, pH and temperature.
    Fixed,
    /// Line detector.
    Compact,
}

/// CSS size expression per [`SizeBand`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeBands {
    #[serde(default = "default_nominal")]
    pub nominal: String,
    #[serde(default = "default_wide")]
    pub wide: String,
    #[serde(default = "default_fixed")]
    pub fixed: String,
    #[serde(default = "default_compact")]
    pub compact: String,
}

fn default_nominal() -> String {
    "clamp(6rem, 12vw, 14vh)".to_string()
}
fn default_wide() -> String {
    "clamp(6rem, 15vw, 20vh)".to_string()
}
fn default_fixed() -> String {
    "clamp(14rem, 12vw, 16vh)".to_string()
}
fn default_compact() -> String {
    "clamp(4rem, 8vw, 12vh)".to_string()
}

impl Default for SizeBands {
    fn default() -> Self {
        Self {
            nominal: default_nominal(),
            wide: default_wide(),
            fixed: default_fixed(),
            compact: default_compact(),
        }
    }
}

impl SizeBands {
    pub fn get(&self, band: SizeBand) -> &str {
        match band {
            SizeBand::Nominal => &self.nominal,
            SizeBand::Wide => &self.wide,
            SizeBand::Fixed => &self.fixed,
            SizeBand::Compact => &self.compact,
        }
    }
}

/// Configuration consumed by the classifier and the dispatch engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Case-insensitive vendor pattern marking the FWD-Edu device family.
    #[serde(default = "default_vendor_pattern")]
    pub vendor_pattern: String,

    /// Clicks per turn assumed while a rotary encoder has not reported it.
    #[serde(default = "default_clicks_per_turn")]
    pub default_clicks_per_turn: u16,

    #[serde(default)]
    pub size_bands: SizeBands,
}

fn default_vendor_pattern() -> String {
    FWD_EDU_VENDOR_PATTERN.to_string()
}
fn default_clicks_per_turn() -> u16 {
    20
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            vendor_pattern: default_vendor_pattern(),
            default_clicks_per_turn: default_clicks_per_turn(),
            size_bands: SizeBands::default(),
        }
    }
}
