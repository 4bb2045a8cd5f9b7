//! # Overhead Allocation
//!
//! Spreads a fixed overhead pool across jobs in proportion to a chosen cost
//! driver, plus two decision-support helpers: a single blended overhead rate
//! and a side-by-side comparison of every allocation basis for one job.
//!
//! ## Formulas
//!
//! ```text
//! Equal split:   OH_i = OH / n
//! Metric basis:  OH_i = OH × b_i / Σb
//! Share:         p_i  = OH_i / OH × 100
//! Total cost:    C_i  = OH_i + material_cost_i
//! ```
//!
//! `total_cost_with_overhead` always stacks the overhead on the job's
//! material cost, whichever basis drove the allocation.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::overhead::{
//!     allocate_overhead, AllocationJob, AllocationMethod, OverheadAllocationInput,
//! };
//!
//! let input = OverheadAllocationInput {
//!     total_overhead: 1000.0,
//!     allocation_method: AllocationMethod::MachineHours,
//!     jobs: vec![
//!         AllocationJob::new("Job A").with_machine_hours(30.0),
//!         AllocationJob::new("Job B").with_machine_hours(70.0),
//!     ],
//! };
//!
//! let result = allocate_overhead(&input).unwrap();
//! assert_eq!(result.jobs[0].allocated_overhead, 300.0);
//! assert_eq!(result.jobs[1].overhead_percent, 70.0);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::recommendations::{evaluate_rules, Rule};
use crate::rounding::{percent_of, round_currency, round_percent};
use crate::settings::OverheadSettings;

/// Cost driver used to spread overhead across jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AllocationMethod {
    /// Proportional to machine hours
    #[default]
    MachineHours,
    /// Proportional to labor hours
    LaborHours,
    /// Proportional to direct material cost
    MaterialCost,
    /// Proportional to floor space occupied
    FloorSpace,
    /// Same amount for every job
    EqualSplit,
}

impl AllocationMethod {
    /// All allocation methods, in comparison order
    pub const ALL: [AllocationMethod; 5] = [
        AllocationMethod::MachineHours,
        AllocationMethod::LaborHours,
        AllocationMethod::MaterialCost,
        AllocationMethod::FloorSpace,
        AllocationMethod::EqualSplit,
    ];

    /// Human label reported in results
    pub fn display_name(&self) -> &'static str {
        match self {
            AllocationMethod::MachineHours => "Machine Hours",
            AllocationMethod::LaborHours => "Labor Hours",
            AllocationMethod::MaterialCost => "Material Cost",
            AllocationMethod::FloorSpace => "Floor Space",
            AllocationMethod::EqualSplit => "Equal Split",
        }
    }

    /// Field name of the basis metric on [`AllocationJob`]
    pub fn basis_field(&self) -> Option<&'static str> {
        match self {
            AllocationMethod::MachineHours => Some("machine_hours"),
            AllocationMethod::LaborHours => Some("labor_hours"),
            AllocationMethod::MaterialCost => Some("material_cost"),
            AllocationMethod::FloorSpace => Some("floor_space"),
            AllocationMethod::EqualSplit => None,
        }
    }

    /// The job's basis value for this method (`None` for an equal split)
    pub fn basis(&self, job: &AllocationJob) -> Option<f64> {
        match self {
            AllocationMethod::MachineHours => Some(job.machine_hours),
            AllocationMethod::LaborHours => Some(job.labor_hours),
            AllocationMethod::MaterialCost => Some(job.material_cost),
            AllocationMethod::FloorSpace => Some(job.floor_space),
            AllocationMethod::EqualSplit => None,
        }
    }
}

impl std::fmt::Display for AllocationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One job competing for a share of the overhead pool.
///
/// ## JSON Example
///
/// ```json
/// {
///   "job_name": "Bracket run",
///   "machine_hours": 30.0,
///   "labor_hours": 12.0,
///   "material_cost": 450.0,
///   "floor_space": 20.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AllocationJob {
    /// Job label, unique within one request
    pub job_name: String,
    pub machine_hours: f64,
    pub labor_hours: f64,
    /// Direct material cost (currency)
    pub material_cost: f64,
    /// Floor space occupied (any consistent area unit)
    pub floor_space: f64,
}

impl AllocationJob {
    /// Create a job with all metrics zero
    pub fn new(job_name: impl Into<String>) -> Self {
        AllocationJob {
            job_name: job_name.into(),
            ..Default::default()
        }
    }

    pub fn with_machine_hours(mut self, hours: f64) -> Self {
        self.machine_hours = hours;
        self
    }

    pub fn with_labor_hours(mut self, hours: f64) -> Self {
        self.labor_hours = hours;
        self
    }

    pub fn with_material_cost(mut self, cost: f64) -> Self {
        self.material_cost = cost;
        self
    }

    pub fn with_floor_space(mut self, area: f64) -> Self {
        self.floor_space = area;
        self
    }

    fn validate(&self, index: usize) -> CalcResult<()> {
        require_non_negative(&format!("jobs[{index}].machine_hours"), self.machine_hours)?;
        require_non_negative(&format!("jobs[{index}].labor_hours"), self.labor_hours)?;
        require_non_negative(&format!("jobs[{index}].material_cost"), self.material_cost)?;
        require_non_negative(&format!("jobs[{index}].floor_space"), self.floor_space)?;
        Ok(())
    }
}

/// Input for [`allocate_overhead`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadAllocationInput {
    /// Overhead pool to distribute (currency, > 0)
    pub total_overhead: f64,
    pub allocation_method: AllocationMethod,
    /// Jobs in display order; must not be empty
    pub jobs: Vec<AllocationJob>,
}

impl OverheadAllocationInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("total_overhead", self.total_overhead)?;
        if self.jobs.is_empty() {
            return Err(CalcError::invalid_input("jobs", "[]", "At least one job is required"));
        }
        let mut seen = HashSet::new();
        for (index, job) in self.jobs.iter().enumerate() {
            job.validate(index)?;
            if !seen.insert(job.job_name.as_str()) {
                return Err(CalcError::invalid_input(
                    format!("jobs[{index}].job_name"),
                    job.job_name.clone(),
                    "Job names must be unique within a request",
                ));
            }
        }
        Ok(())
    }

    /// Sum of the chosen basis metric across all jobs (`None` for an equal split)
    pub fn basis_total(&self) -> Option<f64> {
        self.allocation_method.basis_field()?;
        Some(
            self.jobs
                .iter()
                .filter_map(|job| self.allocation_method.basis(job))
                .sum(),
        )
    }
}

/// Overhead assigned to one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAllocation {
    pub job_name: String,
    /// Allocated overhead (currency, 2 dp)
    pub allocated_overhead: f64,
    /// Share of the overhead pool (%, 1 dp)
    pub overhead_percent: f64,
    /// Allocated overhead + material cost (currency, 2 dp)
    pub total_cost_with_overhead: f64,
}

/// A job and amount, used for the highest/lowest summary entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAmount {
    pub job_name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub average_overhead_per_job: f64,
    pub highest_overhead: JobAmount,
    pub lowest_overhead: JobAmount,
}

/// Results from overhead allocation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "jobs": [
///     { "job_name": "Job A", "allocated_overhead": 300.0, "overhead_percent": 30.0, "total_cost_with_overhead": 300.0 },
///     { "job_name": "Job B", "allocated_overhead": 700.0, "overhead_percent": 70.0, "total_cost_with_overhead": 700.0 }
///   ],
///   "total_allocated": 1000.0,
///   "allocation_method": "Machine Hours",
///   "summary": {
///     "average_overhead_per_job": 500.0,
///     "highest_overhead": { "job_name": "Job B", "amount": 700.0 },
///     "lowest_overhead": { "job_name": "Job A", "amount": 300.0 }
///   },
///   "recommendations": ["..."]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadAllocationResult {
    /// One entry per input job, in input order
    pub jobs: Vec<JobAllocation>,
    /// Sum of allocated overhead; equals the pool to the cent
    pub total_allocated: f64,
    /// Human label of the method used
    pub allocation_method: String,
    pub summary: AllocationSummary,
    pub recommendations: Vec<String>,
}

impl OverheadAllocationResult {
    /// Allocation for a job by name
    pub fn job(&self, job_name: &str) -> Option<&JobAllocation> {
        self.jobs.iter().find(|j| j.job_name == job_name)
    }
}

/// Allocate overhead with default thresholds.
///
/// # Returns
///
/// * `Ok(OverheadAllocationResult)` - Per-job allocation, summary and advice
/// * `Err(CalcError::InvalidInput)` - Non-positive pool, empty or duplicate jobs, negative metrics
/// * `Err(CalcError::CalculationFailed)` - The chosen basis sums to zero across all jobs
pub fn allocate_overhead(input: &OverheadAllocationInput) -> CalcResult<OverheadAllocationResult> {
    allocate_overhead_with(input, &OverheadSettings::default())
}

/// Allocate overhead with explicit thresholds.
pub fn allocate_overhead_with(
    input: &OverheadAllocationInput,
    settings: &OverheadSettings,
) -> CalcResult<OverheadAllocationResult> {
    input.validate()?;

    let method = input.allocation_method;
    let job_count = input.jobs.len() as f64;

    // === Raw (unrounded) allocation ===
    let raw: Vec<f64> = match input.basis_total() {
        None => vec![input.total_overhead / job_count; input.jobs.len()],
        Some(total_basis) => {
            if total_basis <= 0.0 {
                tracing::warn!(method = %method, "allocation basis sums to zero");
                return Err(CalcError::calculation_failed(
                    "Overhead allocation",
                    format!(
                        "Total {} across all jobs is zero; choose another allocation method",
                        method.display_name().to_lowercase()
                    ),
                ));
            }
            input
                .jobs
                .iter()
                .map(|job| input.total_overhead * method.basis(job).unwrap_or(0.0) / total_basis)
                .collect()
        }
    };

    let allocated = reconcile_to_cents(&raw, input.total_overhead);

    let jobs: Vec<JobAllocation> = input
        .jobs
        .iter()
        .zip(raw.iter().zip(allocated.iter()))
        .map(|(job, (&raw_amount, &amount))| JobAllocation {
            job_name: job.job_name.clone(),
            allocated_overhead: amount,
            overhead_percent: round_percent(percent_of(raw_amount, input.total_overhead)),
            total_cost_with_overhead: round_currency(amount + job.material_cost),
        })
        .collect();

    let total_allocated = round_currency(allocated.iter().sum());
    let summary = summarize(&jobs, input.total_overhead);

    let ctx = OverheadContext {
        input,
        allocations: &jobs,
        settings,
    };
    let recommendations = evaluate_rules(&overhead_rules(), &ctx);

    tracing::debug!(
        method = %method,
        jobs = jobs.len(),
        total_allocated,
        "overhead allocated"
    );

    Ok(OverheadAllocationResult {
        jobs,
        total_allocated,
        allocation_method: method.display_name().to_string(),
        summary,
        recommendations,
    })
}

/// Split the rounded pool into whole cents by largest remainder.
///
/// Each job starts at the floor of its exact share in cents. The leftover
/// cents go one at a time to the largest fractional remainders (input order
/// on ties), so every amount stays within one cent of its exact share, none
/// is negative, and the amounts sum exactly to the pool rounded to cents.
fn reconcile_to_cents(raw: &[f64], total: f64) -> Vec<f64> {
    let pool_cents = (total * 100.0).round() as i64;
    let scaled: Vec<f64> = raw.iter().map(|&v| v * 100.0).collect();
    // Epsilon absorbs 0.29 * 100 = 28.999...
    let mut cents: Vec<i64> = scaled.iter().map(|&c| (c + 1e-9).floor().max(0.0) as i64).collect();
    let remainders: Vec<f64> = scaled.iter().zip(&cents).map(|(&c, &f)| c - f as f64).collect();

    let mut order: Vec<usize> = (0..raw.len()).collect();
    // Stable sort keeps input order on equal remainders
    order.sort_by(|&a, &b| remainders[b].total_cmp(&remainders[a]));

    let mut leftover = pool_cents - cents.iter().sum::<i64>();
    for &i in order.iter().cycle().take(raw.len() * 2) {
        if leftover > 0 {
            cents[i] += 1;
            leftover -= 1;
        } else {
            break;
        }
    }
    // Float noise can overshoot by a cent; take it back from the smallest remainders
    for &i in order.iter().rev() {
        if leftover >= 0 {
            break;
        }
        if cents[i] > 0 {
            cents[i] -= 1;
            leftover += 1;
        }
    }

    cents.into_iter().map(|c| c as f64 / 100.0).collect()
}

fn summarize(jobs: &[JobAllocation], total_overhead: f64) -> AllocationSummary {
    // Strict comparisons keep the first job on ties
    let mut highest = &jobs[0];
    let mut lowest = &jobs[0];
    for job in &jobs[1..] {
        if job.allocated_overhead > highest.allocated_overhead {
            highest = job;
        }
        if job.allocated_overhead < lowest.allocated_overhead {
            lowest = job;
        }
    }

    AllocationSummary {
        average_overhead_per_job: round_currency(total_overhead / jobs.len() as f64),
        highest_overhead: JobAmount {
            job_name: highest.job_name.clone(),
            amount: highest.allocated_overhead,
        },
        lowest_overhead: JobAmount {
            job_name: lowest.job_name.clone(),
            amount: lowest.allocated_overhead,
        },
    }
}

// ============================================================================
// Recommendations
// ============================================================================

struct OverheadContext<'a> {
    input: &'a OverheadAllocationInput,
    allocations: &'a [JobAllocation],
    settings: &'a OverheadSettings,
}

fn overhead_rules<'a>() -> [Rule<OverheadContext<'a>>; 5] {
    [
        Rule::new("single_job", single_job),
        Rule::new("dominant_job", dominant_job),
        Rule::new("overhead_exceeds_material", overhead_exceeds_material),
        Rule::new("equal_split_variation", equal_split_variation),
        Rule::new("zero_basis_jobs", zero_basis_jobs),
    ]
}

fn single_job(ctx: &OverheadContext<'_>) -> Option<String> {
    (ctx.allocations.len() == 1).then(|| {
        "Only one job in the pool: it carries the full overhead regardless of allocation method.".to_string()
    })
}

fn dominant_job(ctx: &OverheadContext<'_>) -> Option<String> {
    if ctx.allocations.len() < 2 {
        return None;
    }
    let dominant: Vec<String> = ctx
        .allocations
        .iter()
        .filter(|a| a.overhead_percent > ctx.settings.dominant_share_percent)
        .map(|a| format!("{} ({:.1}%)", a.job_name, a.overhead_percent))
        .collect();
    (!dominant.is_empty()).then(|| {
        format!(
            "Overhead dominates {}: more than {:.0}% of the pool sits on one job. Confirm the {} basis reflects its real use of shared resources.",
            dominant.join(", "),
            ctx.settings.dominant_share_percent,
            ctx.input.allocation_method.display_name().to_lowercase()
        )
    })
}

fn overhead_exceeds_material(ctx: &OverheadContext<'_>) -> Option<String> {
    let heavy: Vec<&str> = ctx
        .input
        .jobs
        .iter()
        .zip(ctx.allocations)
        .filter(|(job, a)| job.material_cost > 0.0 && a.allocated_overhead > job.material_cost)
        .map(|(job, _)| job.job_name.as_str())
        .collect();
    (!heavy.is_empty()).then(|| {
        format!(
            "Allocated overhead exceeds direct material cost for {}. Quote these jobs on fully burdened cost, not material alone.",
            heavy.join(", ")
        )
    })
}

fn equal_split_variation(ctx: &OverheadContext<'_>) -> Option<String> {
    if ctx.input.allocation_method != AllocationMethod::EqualSplit || ctx.input.jobs.len() < 2 {
        return None;
    }
    let machine_cv = coefficient_of_variation(ctx.input.jobs.iter().map(|j| j.machine_hours));
    let labor_cv = coefficient_of_variation(ctx.input.jobs.iter().map(|j| j.labor_hours));
    let limit = ctx.settings.equal_split_variation_limit;
    if machine_cv <= limit && labor_cv <= limit {
        return None;
    }
    let better = if machine_cv >= labor_cv {
        AllocationMethod::MachineHours
    } else {
        AllocationMethod::LaborHours
    };
    Some(format!(
        "Jobs differ widely in machine and labor hours, so an equal split under-costs the heavier jobs. Consider allocating by {}.",
        better.display_name().to_lowercase()
    ))
}

fn zero_basis_jobs(ctx: &OverheadContext<'_>) -> Option<String> {
    let method = ctx.input.allocation_method;
    let field = method.basis_field()?;
    let zero: Vec<&str> = ctx
        .input
        .jobs
        .iter()
        .filter(|job| method.basis(job) == Some(0.0))
        .map(|job| job.job_name.as_str())
        .collect();
    (!zero.is_empty()).then(|| {
        format!(
            "{} report zero {} and carry no overhead under this method. Check the inputs or use a basis every job consumes.",
            zero.join(", "),
            field.replace('_', " ")
        )
    })
}

/// Population standard deviation over mean; zero when the mean is zero.
fn coefficient_of_variation(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean = values.clone().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean
}

// ============================================================================
// Overhead rate
// ============================================================================

/// Blended overhead rate as a percentage of direct cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadRateResult {
    /// Overhead / direct costs × 100 (%, 1 dp)
    pub overhead_rate: f64,
    pub description: String,
}

/// Overhead rate over direct costs.
///
/// Fails with `InvalidInput` when `total_direct_costs` is not positive,
/// rather than reporting an infinite rate.
///
/// ```rust
/// use calc_core::calculations::overhead::calculate_overhead_rate;
///
/// let rate = calculate_overhead_rate(4500.0, 10000.0).unwrap();
/// assert_eq!(rate.overhead_rate, 45.0);
/// assert!(calculate_overhead_rate(4500.0, 0.0).is_err());
/// ```
pub fn calculate_overhead_rate(total_overhead: f64, total_direct_costs: f64) -> CalcResult<OverheadRateResult> {
    require_non_negative("total_overhead", total_overhead)?;
    require_positive("total_direct_costs", total_direct_costs)?;

    let rate = percent_of(total_overhead, total_direct_costs);
    let overhead_rate = round_percent(rate);

    Ok(OverheadRateResult {
        overhead_rate,
        description: format!(
            "{:.1}% overhead rate: every 1.00 of direct cost carries {:.2} of overhead.",
            overhead_rate,
            rate / 100.0
        ),
    })
}

// ============================================================================
// Method comparison
// ============================================================================

/// Input for [`compare_allocation_methods`]: one job and the shop-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationComparisonInput {
    pub total_overhead: f64,
    pub job: AllocationJob,
    pub total_machine_hours: f64,
    pub total_labor_hours: f64,
    pub total_material_cost: f64,
    pub total_floor_space: f64,
    /// Number of jobs sharing the pool (for the equal split)
    pub job_count: u32,
}

impl AllocationComparisonInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("total_overhead", self.total_overhead)?;
        self.job.validate(0).map_err(|e| match e {
            CalcError::InvalidInput { field, value, reason } => {
                CalcError::invalid_input(field.replacen("jobs[0]", "job", 1), value, reason)
            }
            other => other,
        })?;
        if self.job_count == 0 {
            return Err(CalcError::invalid_input("job_count", "0", "At least one job is required"));
        }
        for method in AllocationMethod::ALL {
            let (Some(field), Some(value)) = (method.basis_field(), method.basis(&self.job)) else {
                continue;
            };
            let total = self.total_for(method).unwrap_or(0.0);
            let total_field = format!("total_{field}");
            require_positive(&total_field, total)?;
            if value > total {
                return Err(CalcError::invalid_input(
                    total_field,
                    total.to_string(),
                    format!("Total is smaller than the job's own {} ({})", field.replace('_', " "), value),
                ));
            }
        }
        Ok(())
    }

    /// Shop-wide total for a metric-based method
    pub fn total_for(&self, method: AllocationMethod) -> Option<f64> {
        match method {
            AllocationMethod::MachineHours => Some(self.total_machine_hours),
            AllocationMethod::LaborHours => Some(self.total_labor_hours),
            AllocationMethod::MaterialCost => Some(self.total_material_cost),
            AllocationMethod::FloorSpace => Some(self.total_floor_space),
            AllocationMethod::EqualSplit => None,
        }
    }
}

/// One method's allocation for the compared job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodComparison {
    pub method: AllocationMethod,
    /// Human label of the method
    pub label: String,
    /// Overhead this job would carry (currency, 2 dp)
    pub allocated_amount: f64,
    /// Deviation from the mean across methods (%, 1 dp)
    pub difference: f64,
}

/// Allocate the pool to one job under every method, in
/// [`AllocationMethod::ALL`] order, and report each method's deviation
/// from the mean allocation.
pub fn compare_allocation_methods(input: &AllocationComparisonInput) -> CalcResult<Vec<MethodComparison>> {
    input.validate()?;

    let amounts: Vec<(AllocationMethod, f64)> = AllocationMethod::ALL
        .iter()
        .map(|&method| {
            let amount = match (method.basis(&input.job), input.total_for(method)) {
                (Some(value), Some(total)) => input.total_overhead * value / total,
                _ => input.total_overhead / f64::from(input.job_count),
            };
            (method, amount)
        })
        .collect();

    // Equal split is always positive, so the mean is too
    let mean = amounts.iter().map(|(_, a)| a).sum::<f64>() / amounts.len() as f64;

    let comparison = amounts
        .into_iter()
        .map(|(method, amount)| MethodComparison {
            method,
            label: method.display_name().to_string(),
            allocated_amount: round_currency(amount),
            difference: round_percent((amount - mean) / mean * 100.0),
        })
        .collect();

    tracing::debug!(job = %input.job.job_name, mean, "allocation methods compared");
    Ok(comparison)
}
