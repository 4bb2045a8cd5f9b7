//! # Setup/Changeover Estimation
//!
//! Converts seven categorical setup descriptors into a setup time and
//! cost, spread over the batch.
//!
//! ## Method
//!
//! ```text
//! raw_total           = programming + loading + machine prep + inspection + fixture
//! adjusted_total      = raw_total × experience multiplier
//! setup_time_per_part = adjusted_total / batch_quantity
//! setup_cost_per_part = setup_time_per_part / 60 × setup_labor_rate
//! ```
//!
//! Base times and multipliers come from [`crate::setup_factors`]. The
//! multiplier can be below 1.0 (expert operator on a repeat job), so the
//! adjusted total is not guaranteed to exceed the raw total.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::setup::{calculate_setup_estimate, SetupEstimatorInput};
//!
//! let input = SetupEstimatorInput {
//!     batch_quantity: 50,
//!     setup_labor_rate: 60.0,
//!     ..Default::default()
//! };
//!
//! let result = calculate_setup_estimate(&input).unwrap();
//! // Moderate 30 + Medium 10 + ToolChange 15 + Standard 15 + None 0, multiplier 1.0
//! assert_eq!(result.adjusted_total, 70.0);
//! assert!((result.setup_cost_per_part - 1.4).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::recommendations::{evaluate_rules, Rule};
use crate::rounding::{percent_of, round_currency, round_minutes, round_percent, round_to};
use crate::settings::SetupSettings;
use crate::setup_factors::{
    experience_multiplier, FixtureComplexity, InspectionLevel, JobFamiliarity, MachineChange, MaterialSize,
    OperatorExperience, ProgrammingComplexity,
};

/// Input parameters for a setup estimate.
///
/// ## JSON Example
///
/// ```json
/// {
///   "programming_complexity": "Complex",
///   "material_size": "Large",
///   "machine_change": "MaterialChange",
///   "inspection_level": "FirstArticle",
///   "fixture_complexity": "Moderate",
///   "operator_experience": "Intermediate",
///   "job_familiarity": "FirstTime",
///   "batch_quantity": 25,
///   "setup_labor_rate": 65.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupEstimatorInput {
    pub programming_complexity: ProgrammingComplexity,
    pub material_size: MaterialSize,
    pub machine_change: MachineChange,
    pub inspection_level: InspectionLevel,
    pub fixture_complexity: FixtureComplexity,
    pub operator_experience: OperatorExperience,
    pub job_familiarity: JobFamiliarity,

    /// Parts in the batch (≥ 1)
    pub batch_quantity: u32,

    /// Setup labor rate (currency per hour)
    pub setup_labor_rate: f64,
}

impl Default for SetupEstimatorInput {
    fn default() -> Self {
        SetupEstimatorInput {
            programming_complexity: ProgrammingComplexity::default(),
            material_size: MaterialSize::default(),
            machine_change: MachineChange::default(),
            inspection_level: InspectionLevel::default(),
            fixture_complexity: FixtureComplexity::default(),
            operator_experience: OperatorExperience::default(),
            job_familiarity: JobFamiliarity::default(),
            batch_quantity: 1,
            setup_labor_rate: 0.0,
        }
    }
}

impl SetupEstimatorInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if self.batch_quantity == 0 {
            return Err(CalcError::invalid_input("batch_quantity", "0", "Batch quantity must be at least 1"));
        }
        require_non_negative("setup_labor_rate", self.setup_labor_rate)?;
        Ok(())
    }

    /// Sum of the five base times before the experience adjustment (minutes)
    pub fn raw_total_minutes(&self) -> f64 {
        self.programming_complexity.minutes()
            + self.material_size.minutes()
            + self.machine_change.minutes()
            + self.inspection_level.minutes()
            + self.fixture_complexity.minutes()
    }

    /// Combined operator/familiarity multiplier
    pub fn experience_multiplier(&self) -> f64 {
        experience_multiplier(self.operator_experience, self.job_familiarity)
    }
}

/// Results from a setup estimate.
///
/// Minutes are rounded to 0.1, money to cents. Per-part time and cost are
/// left unrounded: they are small and usually multiplied back up by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupEstimatorResult {
    // === Components (minutes) ===
    pub programming_time: f64,
    pub loading_time: f64,
    pub machine_prep_time: f64,
    pub inspection_time: f64,
    pub fixture_time: f64,

    // === Totals ===
    /// Sum of the five components (minutes)
    pub raw_total: f64,
    /// Operator × familiarity multiplier applied to the raw total
    pub experience_multiplier: f64,
    /// Raw total × multiplier (minutes)
    pub adjusted_total: f64,
    /// Labor cost of the whole setup (currency)
    pub total_setup_cost: f64,

    // === Per part ===
    /// Adjusted total / batch quantity (minutes)
    pub setup_time_per_part: f64,
    /// Setup time per part / 60 × labor rate (currency)
    pub setup_cost_per_part: f64,
    /// Setup share of per-part time, using the assumed cycle time (%)
    pub setup_share_percent: f64,

    pub recommendations: Vec<String>,
}

/// Estimate setup time and cost with default thresholds.
pub fn calculate_setup_estimate(input: &SetupEstimatorInput) -> CalcResult<SetupEstimatorResult> {
    calculate_setup_estimate_with(input, &SetupSettings::default())
}

/// Estimate setup time and cost with explicit thresholds.
pub fn calculate_setup_estimate_with(
    input: &SetupEstimatorInput,
    settings: &SetupSettings,
) -> CalcResult<SetupEstimatorResult> {
    input.validate()?;

    let raw_total = input.raw_total_minutes();
    let multiplier = input.experience_multiplier();
    let adjusted_total = raw_total * multiplier;

    let setup_time_per_part = adjusted_total / f64::from(input.batch_quantity);
    let setup_cost_per_part = setup_time_per_part / 60.0 * input.setup_labor_rate;
    let total_setup_cost = adjusted_total / 60.0 * input.setup_labor_rate;

    let per_part_total = setup_time_per_part + settings.assumed_cycle_time_per_part_min;
    let setup_share = if per_part_total > 0.0 {
        percent_of(setup_time_per_part, per_part_total)
    } else {
        0.0
    };

    let ctx = SetupContext {
        input,
        adjusted_total,
        setup_share,
        settings,
    };
    let recommendations = evaluate_rules(&setup_rules(), &ctx);

    tracing::debug!(
        raw_total,
        multiplier,
        adjusted_total,
        batch_quantity = input.batch_quantity,
        "setup estimated"
    );

    Ok(SetupEstimatorResult {
        programming_time: input.programming_complexity.minutes(),
        loading_time: input.material_size.minutes(),
        machine_prep_time: input.machine_change.minutes(),
        inspection_time: input.inspection_level.minutes(),
        fixture_time: input.fixture_complexity.minutes(),
        raw_total: round_minutes(raw_total),
        experience_multiplier: round_to(multiplier, 2),
        adjusted_total: round_minutes(adjusted_total),
        total_setup_cost: round_currency(total_setup_cost),
        setup_time_per_part,
        setup_cost_per_part,
        setup_share_percent: round_percent(setup_share),
        recommendations,
    })
}

// ============================================================================
// Recommendations
// ============================================================================

struct SetupContext<'a> {
    input: &'a SetupEstimatorInput,
    adjusted_total: f64,
    setup_share: f64,
    settings: &'a SetupSettings,
}

fn setup_rules<'a>() -> [Rule<SetupContext<'a>>; 6] {
    [
        Rule::new("setup_share", setup_share),
        Rule::new("complex_fixture_small_batch", complex_fixture_small_batch),
        Rule::new("long_setup", long_setup),
        Rule::new("new_complex_program", new_complex_program),
        Rule::new("novice_operator", novice_operator),
        Rule::new("first_article_on_repeat", first_article_on_repeat),
    ]
}

fn setup_share(ctx: &SetupContext<'_>) -> Option<String> {
    (ctx.setup_share > ctx.settings.setup_share_warning_percent).then(|| {
        format!(
            "Setup is {:.0}% of per-part time at a batch of {}, making it a significant cost driver. Larger or combined batches would spread it further.",
            ctx.setup_share, ctx.input.batch_quantity
        )
    })
}

fn complex_fixture_small_batch(ctx: &SetupContext<'_>) -> Option<String> {
    (ctx.input.fixture_complexity == FixtureComplexity::Complex
        && ctx.input.batch_quantity < ctx.settings.small_batch_quantity)
        .then(|| {
            format!(
                "A complex fixture rarely pays back on a batch of {}. Consider a simpler fixture or modular workholding.",
                ctx.input.batch_quantity
            )
        })
}

fn long_setup(ctx: &SetupContext<'_>) -> Option<String> {
    (ctx.adjusted_total > ctx.settings.long_setup_minutes).then(|| {
        format!(
            "Adjusted setup of {:.0} minutes exceeds {:.0}. Move programming and fixture preparation offline so the machine is not idle during changeover.",
            ctx.adjusted_total, ctx.settings.long_setup_minutes
        )
    })
}

fn new_complex_program(ctx: &SetupContext<'_>) -> Option<String> {
    let complex = matches!(
        ctx.input.programming_complexity,
        ProgrammingComplexity::Complex | ProgrammingComplexity::VeryComplex
    );
    let unfamiliar = matches!(
        ctx.input.job_familiarity,
        JobFamiliarity::FirstTime | JobFamiliarity::Occasional
    );
    (complex && unfamiliar).then(|| {
        "Save the program and write a setup sheet for this job; repeat runs will set up considerably faster.".to_string()
    })
}

fn novice_operator(ctx: &SetupContext<'_>) -> Option<String> {
    (ctx.input.operator_experience == OperatorExperience::Novice).then(|| {
        "Pair the novice operator with an experienced setter for the first piece to shorten setup and reduce scrap risk."
            .to_string()
    })
}

fn first_article_on_repeat(ctx: &SetupContext<'_>) -> Option<String> {
    (ctx.input.inspection_level == InspectionLevel::FirstArticle
        && ctx.input.job_familiarity == JobFamiliarity::Repeat)
        .then(|| {
            "First-article inspection on a repeat job may exceed what the customer requires. Confirm the inspection plan."
                .to_string()
        })
}

// ============================================================================
// Ideal batch size
// ============================================================================

/// Batch size at which setup reaches the target share of total batch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdealBatchResult {
    pub ideal_batch_size: u32,
    /// Setup share of total batch time at that size (%)
    pub setup_time_percentage: f64,
    /// Setup + cutting time for the whole batch (minutes)
    pub total_time_for_batch: f64,
}

/// Ideal batch size with the default 10% setup-share target.
///
/// This is an illustrative figure, not a scheduling recommendation: it
/// ignores demand, inventory carrying cost and due dates.
///
/// ```rust
/// use calc_core::calculations::setup::calculate_ideal_batch_size;
///
/// let ideal = calculate_ideal_batch_size(60.0, 2.0).unwrap();
/// assert_eq!(ideal.ideal_batch_size, 270);
/// assert_eq!(ideal.setup_time_percentage, 10.0);
/// ```
pub fn calculate_ideal_batch_size(adjusted_setup_total: f64, cutting_time_per_part: f64) -> CalcResult<IdealBatchResult> {
    calculate_ideal_batch_size_with(adjusted_setup_total, cutting_time_per_part, &SetupSettings::default())
}

/// Ideal batch size with an explicit setup-share target.
pub fn calculate_ideal_batch_size_with(
    adjusted_setup_total: f64,
    cutting_time_per_part: f64,
    settings: &SetupSettings,
) -> CalcResult<IdealBatchResult> {
    require_non_negative("adjusted_setup_total", adjusted_setup_total)?;
    require_positive("cutting_time_per_part", cutting_time_per_part)?;
    let target = settings.target_setup_share_percent / 100.0;
    if !(target > 0.0 && target < 1.0) {
        return Err(CalcError::invalid_input(
            "target_setup_share_percent",
            settings.target_setup_share_percent.to_string(),
            "Target setup share must be between 0 and 100 (exclusive)",
        ));
    }

    // S / (S + Q·c) = t  =>  Q = S·(1/t − 1) / c
    let exact = adjusted_setup_total * (1.0 / target - 1.0) / cutting_time_per_part;
    let rounded = exact.round();
    if !rounded.is_finite() || rounded > f64::from(u32::MAX) {
        tracing::warn!(exact, "ideal batch size out of range");
        return Err(CalcError::calculation_failed(
            "Ideal batch size",
            format!("Solved batch size {exact} exceeds the largest representable quantity"),
        ));
    }
    let ideal_batch_size = (rounded as u32).max(1);

    let total_time = adjusted_setup_total + f64::from(ideal_batch_size) * cutting_time_per_part;
    let setup_time_percentage = percent_of(adjusted_setup_total, total_time);

    tracing::debug!(exact, ideal_batch_size, "ideal batch size solved");

    Ok(IdealBatchResult {
        ideal_batch_size,
        setup_time_percentage: round_percent(setup_time_percentage),
        total_time_for_batch: round_minutes(total_time),
    })
}

// ============================================================================
// Scenario comparison
// ============================================================================

/// Savings from a setup-reduction project.
///
/// Negative values mean the "after" setup is slower than "before"; they are
/// reported as-is and flagged by `is_improvement = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupScenarioResult {
    /// Minutes saved per setup
    pub time_savings_per_setup: f64,
    /// Minutes saved per year
    pub annual_time_savings: f64,
    pub cost_savings_per_setup: f64,
    pub annual_cost_savings: f64,
    /// Savings as a share of the before time (%)
    pub percent_reduction: f64,
    pub is_improvement: bool,
}

/// Compare setup time before and after an improvement.
///
/// ```rust
/// use calc_core::calculations::setup::compare_setup_scenarios;
///
/// let s = compare_setup_scenarios(90.0, 30.0, 200, 60.0).unwrap();
/// assert_eq!(s.annual_time_savings, 12000.0);
/// assert_eq!(s.annual_cost_savings, 12000.0);
/// ```
pub fn compare_setup_scenarios(
    before_time: f64,
    after_time: f64,
    annual_setup_count: u32,
    labor_rate: f64,
) -> CalcResult<SetupScenarioResult> {
    require_non_negative("before_time", before_time)?;
    require_non_negative("after_time", after_time)?;
    require_non_negative("labor_rate", labor_rate)?;

    let time_savings = before_time - after_time;
    let annual_time = time_savings * f64::from(annual_setup_count);
    let cost_per_setup = time_savings * labor_rate / 60.0;
    let annual_cost = annual_time * labor_rate / 60.0;
    let percent_reduction = if before_time > 0.0 {
        percent_of(time_savings, before_time)
    } else {
        0.0
    };

    if time_savings < 0.0 {
        tracing::debug!(before_time, after_time, "setup scenario is a regression");
    }

    Ok(SetupScenarioResult {
        time_savings_per_setup: round_minutes(time_savings),
        annual_time_savings: round_minutes(annual_time),
        cost_savings_per_setup: round_currency(cost_per_setup),
        annual_cost_savings: round_currency(annual_cost),
        percent_reduction: round_percent(percent_reduction),
        is_improvement: time_savings > 0.0,
    })
}
