//! # Calculator Settings
//!
//! Tunable thresholds for the recommendation rules and the few fixed
//! business parameters (minimum acceptable markup, ideal setup share).
//! Every struct has a `Default` with the house values, and every field is
//! `#[serde(default)]` so a settings file only needs the values it changes.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::settings::CalculatorSettings;
//!
//! let json = r#"{ "quotation": { "low_margin_percent": 20.0 } }"#;
//! let settings: CalculatorSettings = serde_json::from_str(json).unwrap();
//! assert_eq!(settings.quotation.low_margin_percent, 20.0);
//! assert_eq!(settings.quotation.high_margin_percent, 50.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Settings for every calculator family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CalculatorSettings {
    pub overhead: OverheadSettings,
    pub setup: SetupSettings,
    pub quotation: QuotationSettings,
}

impl CalculatorSettings {
    /// Parse settings from JSON, filling unspecified values with defaults.
    pub fn from_json(json: &str) -> CalcResult<Self> {
        let settings: CalculatorSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that would make a calculator divide by zero.
    pub fn validate(&self) -> CalcResult<()> {
        let target = self.setup.target_setup_share_percent;
        if !(target > 0.0 && target < 100.0) {
            return Err(CalcError::invalid_input(
                "setup.target_setup_share_percent",
                target.to_string(),
                "Target setup share must be between 0 and 100 (exclusive)",
            ));
        }
        if self.setup.assumed_cycle_time_per_part_min < 0.0 {
            return Err(CalcError::invalid_input(
                "setup.assumed_cycle_time_per_part_min",
                self.setup.assumed_cycle_time_per_part_min.to_string(),
                "Assumed cycle time cannot be negative",
            ));
        }
        if self.quotation.healthy_margin_min_percent > self.quotation.healthy_margin_max_percent {
            return Err(CalcError::invalid_input(
                "quotation.healthy_margin_min_percent",
                self.quotation.healthy_margin_min_percent.to_string(),
                "Healthy margin range minimum exceeds maximum",
            ));
        }
        Ok(())
    }
}

/// Thresholds for overhead allocation advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverheadSettings {
    /// A job absorbing more than this share of the overhead pool is flagged
    pub dominant_share_percent: f64,

    /// Coefficient of variation of machine or labor hours above which an
    /// equal split is considered a poor fit
    pub equal_split_variation_limit: f64,
}

impl Default for OverheadSettings {
    fn default() -> Self {
        OverheadSettings {
            dominant_share_percent: 50.0,
            equal_split_variation_limit: 0.5,
        }
    }
}

/// Thresholds for setup estimation advice and batch analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupSettings {
    /// Cycle time per part assumed when judging the setup share (minutes)
    pub assumed_cycle_time_per_part_min: f64,

    /// Setup share of per-part time above which setup is a cost driver (%)
    pub setup_share_warning_percent: f64,

    /// Batches below this quantity count as small
    pub small_batch_quantity: u32,

    /// Adjusted setup time above which offline preparation is suggested (minutes)
    pub long_setup_minutes: f64,

    /// Setup share of total batch time the ideal batch size aims for (%)
    pub target_setup_share_percent: f64,
}

impl Default for SetupSettings {
    fn default() -> Self {
        SetupSettings {
            assumed_cycle_time_per_part_min: 2.0,
            setup_share_warning_percent: 25.0,
            small_batch_quantity: 10,
            long_setup_minutes: 120.0,
            target_setup_share_percent: 10.0,
        }
    }
}

/// Thresholds and fixed parameters for quotation pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotationSettings {
    pub low_margin_percent: f64,
    pub high_margin_percent: f64,
    pub healthy_margin_min_percent: f64,
    pub healthy_margin_max_percent: f64,
    pub material_share_warning_percent: f64,
    pub labor_share_warning_percent: f64,
    pub overhead_share_warning_percent: f64,

    /// Half-width of the band around the competitor price treated as "similar" (%)
    pub competitor_dead_zone_percent: f64,

    /// Volume tiers below this margin trigger an erosion warning (%)
    pub volume_margin_floor_percent: f64,

    /// Minimum acceptable price = base cost × (1 + this)
    pub minimum_acceptable_markup: f64,

    /// Margin at or above which a price is considered viable (%)
    pub viable_margin_percent: f64,
}

impl Default for QuotationSettings {
    fn default() -> Self {
        QuotationSettings {
            low_margin_percent: 15.0,
            high_margin_percent: 50.0,
            healthy_margin_min_percent: 25.0,
            healthy_margin_max_percent: 35.0,
            material_share_warning_percent: 60.0,
            labor_share_warning_percent: 40.0,
            overhead_share_warning_percent: 30.0,
            competitor_dead_zone_percent: 5.0,
            volume_margin_floor_percent: 10.0,
            minimum_acceptable_markup: 0.10,
            viable_margin_percent: 10.0,
        }
    }
}
