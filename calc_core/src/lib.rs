//! # calc_core - Manufacturing Cost Calculation Engine
//!
//! `calc_core` is the computational heart of Costwise: overhead allocation,
//! setup/changeover estimation and quotation margin simulation for job
//! shops. All inputs and outputs are JSON-serializable so the same types
//! back web forms, the CLI and report exports.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Fail Fast**: Invalid input is a structured error, never NaN in a result
//! - **Deterministic Advice**: Recommendations come from ordered rule lists
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::calculations::quotation::calculate_discount_impact;
//!
//! let impact = calculate_discount_impact(100.0, 70.0, 10.0).unwrap();
//! assert_eq!(impact.new_margin_percent, 22.2);
//!
//! let json = serde_json::to_string_pretty(&impact).unwrap();
//! assert!(json.contains("margin_reduction"));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Overhead, setup and quotation calculators plus request dispatch
//! - [`setup_factors`] - Setup time lookup tables and experience multipliers
//! - [`settings`] - Tunable thresholds with house defaults
//! - [`recommendations`] - Ordered predicate → message rules
//! - [`rounding`] - Display precision helpers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod errors;
pub mod recommendations;
pub mod rounding;
pub mod settings;
pub mod setup_factors;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalculationOutput, CalculationRequest};
pub use errors::{CalcError, CalcResult};
pub use settings::CalculatorSettings;
