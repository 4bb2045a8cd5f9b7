//! # Cost Calculations
//!
//! This module contains every calculator. Each one follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate_*(input) -> CalcResult<*Result>` - Pure calculation function
//! - `calculate_*_with(input, &settings)` - Same, with explicit thresholds
//!
//! ## Available Calculations
//!
//! - [`overhead`] - Overhead allocation, overhead rate, method comparison
//! - [`setup`] - Setup/changeover estimate, ideal batch size, scenario savings
//! - [`quotation`] - Quotation pricing, margin/markup helpers, discount impact
//!
//! ## Request Dispatch
//!
//! [`CalculationRequest`] wraps any calculator's input behind a `"type"` tag
//! so a caller can submit one JSON document and get the matching
//! [`CalculationOutput`] back.
//!
//! ```rust
//! use calc_core::calculations::{CalculationOutput, CalculationRequest};
//! use calc_core::settings::CalculatorSettings;
//!
//! let json = r#"{ "type": "PriceForMargin", "base_cost": 100.0, "target_margin_percent": 20.0 }"#;
//! let request: CalculationRequest = serde_json::from_str(json).unwrap();
//! let output = request.run(&CalculatorSettings::default()).unwrap();
//! assert!(matches!(output, CalculationOutput::PriceForMargin { price } if price == 125.0));
//! ```

pub mod overhead;
pub mod quotation;
pub mod setup;

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::settings::CalculatorSettings;

// Re-export commonly used types
pub use overhead::{
    AllocationComparisonInput, AllocationJob, AllocationMethod, MethodComparison, OverheadAllocationInput,
    OverheadAllocationResult, OverheadRateResult,
};
pub use quotation::{
    CompetitorPosition, DiscountImpactResult, MarginAtPriceResult, PaymentTerms, QuotationMarginInput,
    QuotationMarginResult, RiskFactor, VolumeDiscount,
};
pub use setup::{IdealBatchResult, SetupEstimatorInput, SetupEstimatorResult, SetupScenarioResult};

/// A single calculation request, tagged by calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationRequest {
    OverheadAllocation(OverheadAllocationInput),
    OverheadRate {
        total_overhead: f64,
        total_direct_costs: f64,
    },
    AllocationComparison(AllocationComparisonInput),
    SetupEstimate(SetupEstimatorInput),
    IdealBatchSize {
        adjusted_setup_total: f64,
        cutting_time_per_part: f64,
    },
    SetupScenario {
        before_time: f64,
        after_time: f64,
        annual_setup_count: u32,
        labor_rate: f64,
    },
    QuotationMargin(QuotationMarginInput),
    MarginAtPrice {
        base_cost: f64,
        selling_price: f64,
    },
    PriceForMargin {
        base_cost: f64,
        target_margin_percent: f64,
    },
    DiscountImpact {
        original_price: f64,
        base_cost: f64,
        discount_percent: f64,
    },
}

/// The result of a [`CalculationRequest`], tagged the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationOutput {
    OverheadAllocation(OverheadAllocationResult),
    OverheadRate(OverheadRateResult),
    AllocationComparison { methods: Vec<MethodComparison> },
    SetupEstimate(SetupEstimatorResult),
    IdealBatchSize(IdealBatchResult),
    SetupScenario(SetupScenarioResult),
    QuotationMargin(QuotationMarginResult),
    MarginAtPrice(MarginAtPriceResult),
    PriceForMargin { price: f64 },
    DiscountImpact(DiscountImpactResult),
}

impl CalculationRequest {
    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationRequest::OverheadAllocation(_) => "OverheadAllocation",
            CalculationRequest::OverheadRate { .. } => "OverheadRate",
            CalculationRequest::AllocationComparison(_) => "AllocationComparison",
            CalculationRequest::SetupEstimate(_) => "SetupEstimate",
            CalculationRequest::IdealBatchSize { .. } => "IdealBatchSize",
            CalculationRequest::SetupScenario { .. } => "SetupScenario",
            CalculationRequest::QuotationMargin(_) => "QuotationMargin",
            CalculationRequest::MarginAtPrice { .. } => "MarginAtPrice",
            CalculationRequest::PriceForMargin { .. } => "PriceForMargin",
            CalculationRequest::DiscountImpact { .. } => "DiscountImpact",
        }
    }

    /// Run the matching calculator.
    pub fn run(&self, settings: &CalculatorSettings) -> CalcResult<CalculationOutput> {
        let _span = tracing::debug_span!("calculation", calc_type = self.calc_type()).entered();

        let output = match self {
            CalculationRequest::OverheadAllocation(input) => {
                CalculationOutput::OverheadAllocation(overhead::allocate_overhead_with(input, &settings.overhead)?)
            }
            CalculationRequest::OverheadRate {
                total_overhead,
                total_direct_costs,
            } => CalculationOutput::OverheadRate(overhead::calculate_overhead_rate(*total_overhead, *total_direct_costs)?),
            CalculationRequest::AllocationComparison(input) => CalculationOutput::AllocationComparison {
                methods: overhead::compare_allocation_methods(input)?,
            },
            CalculationRequest::SetupEstimate(input) => {
                CalculationOutput::SetupEstimate(setup::calculate_setup_estimate_with(input, &settings.setup)?)
            }
            CalculationRequest::IdealBatchSize {
                adjusted_setup_total,
                cutting_time_per_part,
            } => CalculationOutput::IdealBatchSize(setup::calculate_ideal_batch_size_with(
                *adjusted_setup_total,
                *cutting_time_per_part,
                &settings.setup,
            )?),
            CalculationRequest::SetupScenario {
                before_time,
                after_time,
                annual_setup_count,
                labor_rate,
            } => CalculationOutput::SetupScenario(setup::compare_setup_scenarios(
                *before_time,
                *after_time,
                *annual_setup_count,
                *labor_rate,
            )?),
            CalculationRequest::QuotationMargin(input) => CalculationOutput::QuotationMargin(
                quotation::calculate_quotation_margin_with(input, &settings.quotation)?,
            ),
            CalculationRequest::MarginAtPrice {
                base_cost,
                selling_price,
            } => CalculationOutput::MarginAtPrice(quotation::calculate_margin_at_price_with(
                *base_cost,
                *selling_price,
                &settings.quotation,
            )?),
            CalculationRequest::PriceForMargin {
                base_cost,
                target_margin_percent,
            } => CalculationOutput::PriceForMargin {
                price: quotation::calculate_price_for_margin(*base_cost, *target_margin_percent)?,
            },
            CalculationRequest::DiscountImpact {
                original_price,
                base_cost,
                discount_percent,
            } => CalculationOutput::DiscountImpact(quotation::calculate_discount_impact(
                *original_price,
                *base_cost,
                *discount_percent,
            )?),
        };

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_overhead() {
        let json = r#"{
            "type": "OverheadAllocation",
            "total_overhead": 1000.0,
            "allocation_method": "EqualSplit",
            "jobs": [ { "job_name": "A" }, { "job_name": "B" } ]
        }"#;
        let request: CalculationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.calc_type(), "OverheadAllocation");
        match request.run(&CalculatorSettings::default()).unwrap() {
            CalculationOutput::OverheadAllocation(r) => assert_eq!(r.jobs[1].allocated_overhead, 500.0),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_setup_uses_settings() {
        let request = CalculationRequest::IdealBatchSize {
            adjusted_setup_total: 60.0,
            cutting_time_per_part: 2.0,
        };
        let mut settings = CalculatorSettings::default();
        settings.setup.target_setup_share_percent = 20.0;
        match request.run(&settings).unwrap() {
            CalculationOutput::IdealBatchSize(r) => assert_eq!(r.ideal_batch_size, 120),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_error_propagates() {
        let request = CalculationRequest::DiscountImpact {
            original_price: 100.0,
            base_cost: 70.0,
            discount_percent: 100.0,
        };
        let err = request.run(&CalculatorSettings::default()).unwrap_err();
        assert_eq!(err.field(), Some("discount_percent"));
    }

    #[test]
    fn test_output_serialization_tagged() {
        let output = CalculationRequest::MarginAtPrice {
            base_cost: 80.0,
            selling_price: 100.0,
        }
        .run(&CalculatorSettings::default())
        .unwrap();
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.starts_with("{\"type\":\"MarginAtPrice\""));
        assert!(json.contains("\"is_viable\":true"));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: Result<CalculationRequest, _> = serde_json::from_str(r#"{"type": "LaserCutting"}"#);
        assert!(result.is_err());
    }
}
