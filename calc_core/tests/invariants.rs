//! Calculation Invariant Tests
//!
//! Properties every calculator must hold across a grid of inputs, plus the
//! reference scenarios used to check the formulas by hand.

use calc_core::calculations::overhead::{
    allocate_overhead, AllocationJob, AllocationMethod, OverheadAllocationInput,
};
use calc_core::calculations::quotation::{
    calculate_discount_impact, calculate_margin_at_price, calculate_price_for_margin, calculate_quotation_margin,
    PaymentTerms, QuotationMarginInput, RiskFactor,
};
use calc_core::calculations::setup::{calculate_setup_estimate, SetupEstimatorInput};
use calc_core::setup_factors::{JobFamiliarity, OperatorExperience};

fn shop_jobs() -> Vec<AllocationJob> {
    vec![
        AllocationJob::new("Brackets")
            .with_machine_hours(12.5)
            .with_labor_hours(6.0)
            .with_material_cost(420.0)
            .with_floor_space(30.0),
        AllocationJob::new("Enclosures")
            .with_machine_hours(31.0)
            .with_labor_hours(22.5)
            .with_material_cost(1890.0)
            .with_floor_space(85.0),
        AllocationJob::new("Shafts")
            .with_machine_hours(7.25)
            .with_labor_hours(3.0)
            .with_material_cost(260.0)
            .with_floor_space(12.0),
        AllocationJob::new("Frames")
            .with_machine_hours(18.0)
            .with_labor_hours(15.0)
            .with_material_cost(975.0)
            .with_floor_space(140.0),
    ]
}

// Includes pools worth less than a cent per job
const POOLS: [f64; 8] = [0.01, 0.03, 0.05, 1.0, 999.99, 1000.0, 12_345.67, 250_000.0];

// ============================================================================
// Overhead allocation
// ============================================================================

#[test]
fn invariant_allocation_conserves_pool() {
    for pool in POOLS {
        for method in AllocationMethod::ALL {
            let input = OverheadAllocationInput {
                total_overhead: pool,
                allocation_method: method,
                jobs: shop_jobs(),
            };
            let result = allocate_overhead(&input).unwrap();
            let sum: f64 = result.jobs.iter().map(|j| j.allocated_overhead).sum();
            assert!(
                (sum - pool).abs() < 1e-6 * pool.max(1.0),
                "{method}: allocated {sum} of {pool}"
            );
            assert!((result.total_allocated - pool).abs() < 1e-6 * pool.max(1.0));
            assert!(
                result.jobs.iter().all(|j| j.allocated_overhead >= 0.0),
                "{method}: negative allocation from pool {pool}"
            );
        }
    }
}

#[test]
fn invariant_allocation_percent_sums_to_hundred() {
    for pool in POOLS {
        for method in AllocationMethod::ALL {
            let input = OverheadAllocationInput {
                total_overhead: pool,
                allocation_method: method,
                jobs: shop_jobs(),
            };
            let result = allocate_overhead(&input).unwrap();
            let sum: f64 = result.jobs.iter().map(|j| j.overhead_percent).sum();
            // Each share is rounded to 0.1
            assert!((sum - 100.0).abs() <= 0.05 * result.jobs.len() as f64, "{method}: {sum}");
            assert!(result.jobs.iter().all(|j| (0.0..=100.0).contains(&j.overhead_percent)));
        }
    }
}

#[test]
fn invariant_equal_split_ignores_job_attributes() {
    let baseline = OverheadAllocationInput {
        total_overhead: 7200.0,
        allocation_method: AllocationMethod::EqualSplit,
        jobs: shop_jobs(),
    };
    let expected: Vec<f64> = allocate_overhead(&baseline)
        .unwrap()
        .jobs
        .iter()
        .map(|j| j.allocated_overhead)
        .collect();

    // Rotate every metric between jobs, keeping names and count
    let mut permuted = baseline.clone();
    let n = permuted.jobs.len();
    for i in 0..n {
        let donor = &baseline.jobs[(i + 1) % n];
        permuted.jobs[i].machine_hours = donor.machine_hours;
        permuted.jobs[i].labor_hours = donor.labor_hours * 3.0;
        permuted.jobs[i].material_cost = donor.material_cost + 10.0;
        permuted.jobs[i].floor_space = 0.0;
    }
    let actual: Vec<f64> = allocate_overhead(&permuted)
        .unwrap()
        .jobs
        .iter()
        .map(|j| j.allocated_overhead)
        .collect();

    assert_eq!(expected, actual);
    assert!(expected.iter().all(|&a| a == 1800.0));
}

#[test]
fn invariant_recommendations_deterministic() {
    for method in AllocationMethod::ALL {
        let input = OverheadAllocationInput {
            total_overhead: 5000.0,
            allocation_method: method,
            jobs: shop_jobs(),
        };
        let a = allocate_overhead(&input).unwrap().recommendations;
        let b = allocate_overhead(&input).unwrap().recommendations;
        assert_eq!(a, b);
    }
}

#[test]
fn scenario_equal_split_two_jobs() {
    let input = OverheadAllocationInput {
        total_overhead: 1000.0,
        allocation_method: AllocationMethod::EqualSplit,
        jobs: vec![AllocationJob::new("A"), AllocationJob::new("B")],
    };
    let result = allocate_overhead(&input).unwrap();
    for job in &result.jobs {
        assert_eq!(job.allocated_overhead, 500.0);
        assert_eq!(job.overhead_percent, 50.0);
    }
}

#[test]
fn scenario_machine_hours_split() {
    let input = OverheadAllocationInput {
        total_overhead: 1000.0,
        allocation_method: AllocationMethod::MachineHours,
        jobs: vec![
            AllocationJob::new("Job A").with_machine_hours(30.0),
            AllocationJob::new("Job B").with_machine_hours(70.0),
        ],
    };
    let result = allocate_overhead(&input).unwrap();
    assert_eq!(result.jobs[0].allocated_overhead, 300.0);
    assert_eq!(result.jobs[0].overhead_percent, 30.0);
    assert_eq!(result.jobs[1].allocated_overhead, 700.0);
    assert_eq!(result.jobs[1].overhead_percent, 70.0);
}

// ============================================================================
// Quotation
// ============================================================================

fn quote(base_cost: f64, margin: f64) -> QuotationMarginInput {
    QuotationMarginInput {
        base_cost,
        material_cost: base_cost * 0.5,
        labor_cost: base_cost * 0.3,
        overhead_cost: base_cost * 0.2,
        target_margin_percent: margin,
        payment_terms: PaymentTerms::Immediate,
        risk_factor: RiskFactor::Low,
        competitor_price: None,
        volume_discounts: None,
    }
}

#[test]
fn invariant_markup_exceeds_margin() {
    for base in [10.0, 100.0, 2_500.0] {
        let mut margin = 5.0;
        while margin < 100.0 {
            let r = calculate_quotation_margin(&quote(base, margin)).unwrap();
            assert!(
                r.markup_percent > r.margin_percent,
                "base {base}, margin {margin}: markup {} vs margin {}",
                r.markup_percent,
                r.margin_percent
            );
            margin += 5.0;
        }
    }
    // At zero margin they coincide
    let r = calculate_quotation_margin(&quote(100.0, 0.0)).unwrap();
    assert_eq!(r.markup_percent, 0.0);
    assert_eq!(r.margin_percent, 0.0);
}

#[test]
fn invariant_price_composition_sums_to_hundred() {
    for margin in [0.0, 12.5, 25.0, 40.0, 75.0] {
        let r = calculate_quotation_margin(&quote(340.0, margin)).unwrap();
        let total = r.material_percent + r.labor_percent + r.overhead_percent + r.profit_percent;
        assert!((total - 100.0).abs() <= 0.2, "margin {margin}: {total}");
    }
}

#[test]
fn invariant_margin_round_trip() {
    for base in [1.0, 73.5, 1000.0, 48_000.0] {
        for margin in [0.0, 1.0, 10.0, 22.5, 35.0, 60.0, 90.0] {
            let price = calculate_price_for_margin(base, margin).unwrap();
            let back = calculate_margin_at_price(base, price).unwrap();
            assert!(
                (back.margin_percent - margin).abs() <= 0.15,
                "base {base}, margin {margin}: got {}",
                back.margin_percent
            );
        }
    }
}

#[test]
fn invariant_surcharges_are_monotone() {
    let mut previous = 0.0;
    for terms in PaymentTerms::ALL {
        for risk in RiskFactor::ALL {
            let mut input = quote(100.0, 25.0);
            input.payment_terms = terms;
            input.risk_factor = risk;
            let r = calculate_quotation_margin(&input).unwrap();
            assert!(r.final_recommended_price >= r.adjusted_price);
            assert!(r.adjusted_price >= r.suggested_price);
            if terms == PaymentTerms::Immediate && risk == RiskFactor::Low {
                assert_eq!(r.final_recommended_price, r.suggested_price);
            }
            previous = f64::max(previous, r.final_recommended_price);
        }
    }
    // Net 90 + high risk is the most expensive combination
    assert!((previous - 133.3333 * 1.03 * 1.10).abs() < 0.01);
}

#[test]
fn invariant_discount_monotonicity() {
    for (price, cost) in [(100.0, 70.0), (250.0, 0.0), (80.0, 95.0)] {
        let mut last_margin = f64::INFINITY;
        let mut discount = 0.0;
        while discount < 100.0 {
            let r = calculate_discount_impact(price, cost, discount).unwrap();
            assert!(r.margin_reduction >= 0.0);
            if discount > 0.0 {
                assert!(r.profit_loss > 0.0);
            } else {
                assert_eq!(r.profit_loss, 0.0);
            }
            assert!(r.new_margin_percent <= last_margin);
            last_margin = r.new_margin_percent;
            discount += 7.5;
        }
    }
}

#[test]
fn scenario_quotation_core() {
    let r = calculate_quotation_margin(&quote(100.0, 20.0)).unwrap();
    assert_eq!(r.suggested_price, 125.0);
    assert_eq!(r.profit_amount, 25.0);
    assert_eq!(r.markup_percent, 25.0);
}

#[test]
fn scenario_quotation_net60() {
    let mut input = quote(100.0, 20.0);
    input.payment_terms = PaymentTerms::Net60;
    let r = calculate_quotation_margin(&input).unwrap();
    assert_eq!(r.suggested_price, 125.0);
    assert_eq!(r.payment_terms_adjustment, 2.5);
    assert_eq!(r.adjusted_price, 127.5);
}

#[test]
fn scenario_discount_impact() {
    let r = calculate_discount_impact(100.0, 70.0, 10.0).unwrap();
    assert_eq!(r.discounted_price, 90.0);
    assert_eq!(r.original_margin_percent, 30.0);
    assert_eq!(r.new_margin_percent, 22.2);
    assert_eq!(r.margin_reduction, 7.8);
}

// ============================================================================
// Setup
// ============================================================================

#[test]
fn invariant_setup_time_per_part_decreases_with_batch() {
    let mut previous = f64::INFINITY;
    for batch_quantity in [1, 2, 3, 5, 10, 25, 100, 1_000, 10_000, 100_000] {
        let input = SetupEstimatorInput {
            batch_quantity,
            setup_labor_rate: 55.0,
            ..Default::default()
        };
        let r = calculate_setup_estimate(&input).unwrap();
        assert!(r.setup_time_per_part < previous, "batch {batch_quantity}");
        previous = r.setup_time_per_part;
    }
}

#[test]
fn invariant_more_experience_never_slower() {
    for fam in JobFamiliarity::ALL {
        let mut previous = f64::INFINITY;
        for op in OperatorExperience::ALL {
            let input = SetupEstimatorInput {
                operator_experience: op,
                job_familiarity: fam,
                batch_quantity: 20,
                setup_labor_rate: 60.0,
                ..Default::default()
            };
            let r = calculate_setup_estimate(&input).unwrap();
            assert!(r.adjusted_total <= previous);
            previous = r.adjusted_total;
        }
    }
}
