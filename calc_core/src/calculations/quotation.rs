//! # Quotation Margin Simulation
//!
//! Turns a cost structure and a target margin into a recommended selling
//! price, then layers payment-terms and risk surcharges on top.
//!
//! ## Margin vs. Markup
//!
//! Margin is profit over **price**, markup is profit over **cost**. For the
//! same profit, markup is always the larger number:
//!
//! ```text
//! price  = cost / (1 − margin/100)
//! profit = price − cost
//! margin = profit / price × 100
//! markup = profit / cost  × 100
//! ```
//!
//! ## Price Build-up
//!
//! ```text
//! suggested_price       = base_cost / (1 − M)
//! adjusted_price        = suggested_price × (1 + payment surcharge)
//! final_recommended     = adjusted_price  × (1 + risk surcharge)
//! ```
//!
//! The risk surcharge compounds on the payment-adjusted price; the order is
//! part of the contract.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::quotation::{
//!     calculate_quotation_margin, PaymentTerms, QuotationMarginInput, RiskFactor,
//! };
//!
//! let input = QuotationMarginInput {
//!     base_cost: 100.0,
//!     material_cost: 50.0,
//!     labor_cost: 30.0,
//!     overhead_cost: 20.0,
//!     target_margin_percent: 20.0,
//!     payment_terms: PaymentTerms::Net60,
//!     risk_factor: RiskFactor::Low,
//!     competitor_price: None,
//!     volume_discounts: None,
//! };
//!
//! let result = calculate_quotation_margin(&input).unwrap();
//! assert_eq!(result.suggested_price, 125.0);
//! assert_eq!(result.markup_percent, 25.0);
//! assert_eq!(result.adjusted_price, 127.5);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, require_percent, require_positive, CalcError, CalcResult};
use crate::recommendations::{evaluate_rules, Rule};
use crate::rounding::{percent_of, round_currency, round_percent};
use crate::settings::QuotationSettings;

/// Customer payment terms. Longer terms carry a financing surcharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentTerms {
    /// Payment on delivery: 0%
    #[default]
    Immediate,
    /// Net 30 days: 1%
    Net30,
    /// Net 60 days: 2%
    Net60,
    /// Net 90 days: 3%
    Net90,
}

impl PaymentTerms {
    pub const ALL: [PaymentTerms; 4] = [
        PaymentTerms::Immediate,
        PaymentTerms::Net30,
        PaymentTerms::Net60,
        PaymentTerms::Net90,
    ];

    /// Surcharge as a fraction of the suggested price
    pub fn surcharge_rate(&self) -> f64 {
        match self {
            PaymentTerms::Immediate => 0.0,
            PaymentTerms::Net30 => 0.01,
            PaymentTerms::Net60 => 0.02,
            PaymentTerms::Net90 => 0.03,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentTerms::Immediate => "Immediate",
            PaymentTerms::Net30 => "Net 30",
            PaymentTerms::Net60 => "Net 60",
            PaymentTerms::Net90 => "Net 90",
        }
    }
}

impl std::fmt::Display for PaymentTerms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Job risk (new customer, tight tolerances, unproven process...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RiskFactor {
    /// 0%
    #[default]
    Low,
    /// 5%
    Medium,
    /// 10%
    High,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 3] = [RiskFactor::Low, RiskFactor::Medium, RiskFactor::High];

    /// Surcharge as a fraction of the payment-adjusted price
    pub fn surcharge_rate(&self) -> f64 {
        match self {
            RiskFactor::Low => 0.0,
            RiskFactor::Medium => 0.05,
            RiskFactor::High => 0.10,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RiskFactor::Low => "Low",
            RiskFactor::Medium => "Medium",
            RiskFactor::High => "High",
        }
    }
}

impl std::fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A quantity break offered to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeDiscount {
    pub quantity: u32,
    /// Discount off the final recommended price (%, 0-100)
    pub discount_percent: f64,
}

/// Input parameters for a quotation.
///
/// `material_cost + labor_cost + overhead_cost` is expected to approach
/// `base_cost` but is not required to match it.
///
/// ## JSON Example
///
/// ```json
/// {
///   "base_cost": 100.0,
///   "material_cost": 50.0,
///   "labor_cost": 30.0,
///   "overhead_cost": 20.0,
///   "target_margin_percent": 25.0,
///   "payment_terms": "Net30",
///   "risk_factor": "Medium",
///   "competitor_price": 140.0,
///   "volume_discounts": [ { "quantity": 100, "discount_percent": 5.0 } ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationMarginInput {
    /// Full unit cost (currency, > 0)
    pub base_cost: f64,
    pub material_cost: f64,
    pub labor_cost: f64,
    pub overhead_cost: f64,
    /// Margin on selling price (%, 0 ≤ M < 100)
    pub target_margin_percent: f64,
    #[serde(default)]
    pub payment_terms: PaymentTerms,
    #[serde(default)]
    pub risk_factor: RiskFactor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_discounts: Option<Vec<VolumeDiscount>>,
}

impl QuotationMarginInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("base_cost", self.base_cost)?;
        require_non_negative("material_cost", self.material_cost)?;
        require_non_negative("labor_cost", self.labor_cost)?;
        require_non_negative("overhead_cost", self.overhead_cost)?;
        require_percent("target_margin_percent", self.target_margin_percent, false)?;
        if let Some(price) = self.competitor_price {
            require_positive("competitor_price", price)?;
        }
        for (index, tier) in self.volume_discounts.iter().flatten().enumerate() {
            if tier.quantity == 0 {
                return Err(CalcError::invalid_input(
                    format!("volume_discounts[{index}].quantity"),
                    "0",
                    "Tier quantity must be at least 1",
                ));
            }
            require_percent(&format!("volume_discounts[{index}].discount_percent"), tier.discount_percent, true)?;
        }
        Ok(())
    }
}

/// Pricing at one volume tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumePricingTier {
    pub quantity: u32,
    pub discount_percent: f64,
    pub price_per_unit: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    /// Profit / revenue (%). Reported as −100 when the tier is free.
    pub margin_percent: f64,
}

/// Where the quote sits relative to a competitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitorPosition {
    Lower,
    Similar,
    Higher,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorComparison {
    pub competitor_price: f64,
    /// Final recommended price − competitor price
    pub price_difference: f64,
    /// Price difference / competitor price (%)
    pub percentage_difference: f64,
    pub position: CompetitorPosition,
}

/// Results from quotation pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationMarginResult {
    // === Core price ===
    /// Price that yields the target margin, before surcharges
    pub suggested_price: f64,
    pub profit_amount: f64,
    /// Target margin on price, echoed (%)
    pub margin_percent: f64,
    /// Profit over base cost (%)
    pub markup_percent: f64,

    // === Price composition (share of suggested price, %) ===
    pub material_percent: f64,
    pub labor_percent: f64,
    pub overhead_percent: f64,
    pub profit_percent: f64,

    // === Surcharges ===
    pub payment_terms_adjustment: f64,
    /// Suggested price + payment-terms surcharge
    pub adjusted_price: f64,
    pub risk_adjustment: f64,
    /// Adjusted price + risk surcharge
    pub final_recommended_price: f64,

    // === Optional analyses ===
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_pricing: Option<Vec<VolumePricingTier>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_comparison: Option<CompetitorComparison>,

    // === Floors ===
    /// Equals base cost
    pub break_even_price: f64,
    /// Base cost plus the minimum acceptable markup (10%)
    pub minimum_acceptable_price: f64,

    pub recommendations: Vec<String>,
}

impl QuotationMarginResult {
    /// Whether the final price clears the minimum acceptable price
    pub fn is_above_minimum(&self) -> bool {
        self.final_recommended_price >= self.minimum_acceptable_price
    }
}

/// Price a quotation with default thresholds.
pub fn calculate_quotation_margin(input: &QuotationMarginInput) -> CalcResult<QuotationMarginResult> {
    calculate_quotation_margin_with(input, &QuotationSettings::default())
}

/// Price a quotation with explicit thresholds.
pub fn calculate_quotation_margin_with(
    input: &QuotationMarginInput,
    settings: &QuotationSettings,
) -> CalcResult<QuotationMarginResult> {
    input.validate()?;

    // === Core price ===
    let suggested_price = price_for_margin(input.base_cost, input.target_margin_percent);
    let profit_amount = suggested_price - input.base_cost;
    let markup = percent_of(profit_amount, input.base_cost);

    let shares = PriceShares {
        material: percent_of(input.material_cost, suggested_price),
        labor: percent_of(input.labor_cost, suggested_price),
        overhead: percent_of(input.overhead_cost, suggested_price),
        profit: percent_of(profit_amount, suggested_price),
    };

    // === Surcharges (risk compounds on the payment-adjusted price) ===
    let payment_adjustment = suggested_price * input.payment_terms.surcharge_rate();
    let adjusted_price = suggested_price + payment_adjustment;
    let risk_adjustment = adjusted_price * input.risk_factor.surcharge_rate();
    let final_price = adjusted_price + risk_adjustment;

    let minimum_acceptable = input.base_cost * (1.0 + settings.minimum_acceptable_markup);

    // === Optional analyses ===
    let volume_pricing: Option<Vec<VolumePricingTier>> = input
        .volume_discounts
        .as_ref()
        .filter(|tiers| !tiers.is_empty())
        .map(|tiers| {
            tiers
                .iter()
                .map(|tier| volume_tier(tier, final_price, input.base_cost))
                .collect()
        });

    let competitor_comparison = input
        .competitor_price
        .map(|competitor| compare_competitor(final_price, competitor, settings.competitor_dead_zone_percent));

    let ctx = QuoteContext {
        input,
        shares: &shares,
        payment_adjustment,
        risk_adjustment,
        final_price,
        minimum_acceptable,
        volume_pricing: volume_pricing.as_deref(),
        competitor: competitor_comparison.as_ref(),
        settings,
    };
    let recommendations = evaluate_rules(&quote_rules(), &ctx);

    tracing::debug!(
        base_cost = input.base_cost,
        target_margin = input.target_margin_percent,
        suggested_price,
        final_price,
        "quotation priced"
    );

    Ok(QuotationMarginResult {
        suggested_price: round_currency(suggested_price),
        profit_amount: round_currency(profit_amount),
        margin_percent: round_percent(input.target_margin_percent),
        markup_percent: round_percent(markup),
        material_percent: round_percent(shares.material),
        labor_percent: round_percent(shares.labor),
        overhead_percent: round_percent(shares.overhead),
        profit_percent: round_percent(shares.profit),
        payment_terms_adjustment: round_currency(payment_adjustment),
        adjusted_price: round_currency(adjusted_price),
        risk_adjustment: round_currency(risk_adjustment),
        final_recommended_price: round_currency(final_price),
        volume_pricing,
        competitor_comparison,
        break_even_price: round_currency(input.base_cost),
        minimum_acceptable_price: round_currency(minimum_acceptable),
        recommendations,
    })
}

/// Unrounded `cost / (1 − M/100)`; `margin_percent` already validated.
fn price_for_margin(base_cost: f64, margin_percent: f64) -> f64 {
    base_cost / (1.0 - margin_percent / 100.0)
}

fn volume_tier(tier: &VolumeDiscount, final_price: f64, base_cost: f64) -> VolumePricingTier {
    let quantity = f64::from(tier.quantity);
    let price_per_unit = final_price * (1.0 - tier.discount_percent / 100.0);
    let total_revenue = price_per_unit * quantity;
    let total_profit = total_revenue - base_cost * quantity;
    let margin_percent = if total_revenue > 0.0 {
        percent_of(total_profit, total_revenue)
    } else {
        -100.0
    };

    VolumePricingTier {
        quantity: tier.quantity,
        discount_percent: tier.discount_percent,
        price_per_unit: round_currency(price_per_unit),
        total_revenue: round_currency(total_revenue),
        total_profit: round_currency(total_profit),
        margin_percent: round_percent(margin_percent),
    }
}

fn compare_competitor(final_price: f64, competitor_price: f64, dead_zone: f64) -> CompetitorComparison {
    let price_difference = final_price - competitor_price;
    let percentage_difference = percent_of(price_difference, competitor_price);
    let position = if percentage_difference < -dead_zone {
        CompetitorPosition::Lower
    } else if percentage_difference > dead_zone {
        CompetitorPosition::Higher
    } else {
        CompetitorPosition::Similar
    };

    CompetitorComparison {
        competitor_price: round_currency(competitor_price),
        price_difference: round_currency(price_difference),
        percentage_difference: round_percent(percentage_difference),
        position,
    }
}

// ============================================================================
// Recommendations
// ============================================================================

struct PriceShares {
    material: f64,
    labor: f64,
    overhead: f64,
    profit: f64,
}

struct QuoteContext<'a> {
    input: &'a QuotationMarginInput,
    shares: &'a PriceShares,
    payment_adjustment: f64,
    risk_adjustment: f64,
    final_price: f64,
    minimum_acceptable: f64,
    volume_pricing: Option<&'a [VolumePricingTier]>,
    competitor: Option<&'a CompetitorComparison>,
    settings: &'a QuotationSettings,
}

fn quote_rules<'a>() -> [Rule<QuoteContext<'a>>; 13] {
    [
        Rule::new("low_margin", low_margin),
        Rule::new("high_margin", high_margin),
        Rule::new("below_minimum", below_minimum),
        Rule::new("material_share", material_share),
        Rule::new("labor_share", labor_share),
        Rule::new("overhead_share", overhead_share),
        Rule::new("payment_terms", payment_terms),
        Rule::new("high_risk", high_risk),
        Rule::new("competitor_position", competitor_position),
        Rule::new("volume_erosion", volume_erosion),
        Rule::new("cost_breakdown_mismatch", cost_breakdown_mismatch),
        Rule::new("healthy_margin", healthy_margin),
        Rule::new("verify_costs", verify_costs),
    ]
}

fn low_margin(ctx: &QuoteContext<'_>) -> Option<String> {
    let margin = ctx.input.target_margin_percent;
    (margin < ctx.settings.low_margin_percent).then(|| {
        format!(
            "A {:.1}% margin is below {:.0}% and leaves little room for cost overruns or negotiation.",
            margin, ctx.settings.low_margin_percent
        )
    })
}

fn high_margin(ctx: &QuoteContext<'_>) -> Option<String> {
    let margin = ctx.input.target_margin_percent;
    (margin > ctx.settings.high_margin_percent).then(|| {
        format!(
            "A {:.1}% margin is above {:.0}% and may price this quote out of competitive bids.",
            margin, ctx.settings.high_margin_percent
        )
    })
}

fn below_minimum(ctx: &QuoteContext<'_>) -> Option<String> {
    (ctx.final_price < ctx.minimum_acceptable).then(|| {
        format!(
            "The recommended price of {:.2} is below the minimum acceptable price of {:.2}.",
            ctx.final_price, ctx.minimum_acceptable
        )
    })
}

fn material_share(ctx: &QuoteContext<'_>) -> Option<String> {
    (ctx.shares.material > ctx.settings.material_share_warning_percent).then(|| {
        format!(
            "Material is {:.1}% of the price. Review nesting and material utilisation, and confirm supplier pricing before committing.",
            ctx.shares.material
        )
    })
}

fn labor_share(ctx: &QuoteContext<'_>) -> Option<String> {
    (ctx.shares.labor > ctx.settings.labor_share_warning_percent).then(|| {
        format!(
            "Labor is {:.1}% of the price. Look for setup reduction or automation before quoting repeat volumes.",
            ctx.shares.labor
        )
    })
}

fn overhead_share(ctx: &QuoteContext<'_>) -> Option<String> {
    (ctx.shares.overhead > ctx.settings.overhead_share_warning_percent).then(|| {
        format!(
            "Overhead is {:.1}% of the price. Check that the overhead rate applied to this job reflects its actual resource use.",
            ctx.shares.overhead
        )
    })
}

fn payment_terms(ctx: &QuoteContext<'_>) -> Option<String> {
    let terms = ctx.input.payment_terms;
    (terms != PaymentTerms::Immediate).then(|| {
        format!(
            "{} terms add a {:.0}% surcharge ({:.2}) to cover the cost of carrying the receivable.",
            terms,
            terms.surcharge_rate() * 100.0,
            ctx.payment_adjustment
        )
    })
}

fn high_risk(ctx: &QuoteContext<'_>) -> Option<String> {
    (ctx.input.risk_factor == RiskFactor::High).then(|| {
        format!(
            "High risk: a {:.0}% buffer ({:.2}) is included for scrap, rework and schedule slip.",
            RiskFactor::High.surcharge_rate() * 100.0,
            ctx.risk_adjustment
        )
    })
}

fn competitor_position(ctx: &QuoteContext<'_>) -> Option<String> {
    let comparison = ctx.competitor?;
    let pct = comparison.percentage_difference.abs();
    Some(match comparison.position {
        CompetitorPosition::Higher => format!(
            "The quote is {pct:.1}% above the competitor. Justify it with lead time, quality or service, or revisit costs."
        ),
        CompetitorPosition::Lower => format!(
            "The quote is {pct:.1}% below the competitor. There may be room to raise the price."
        ),
        CompetitorPosition::Similar => format!(
            "The quote is within {:.0}% of the competitor. Compete on lead time and service.",
            ctx.settings.competitor_dead_zone_percent
        ),
    })
}

fn volume_erosion(ctx: &QuoteContext<'_>) -> Option<String> {
    let floor = ctx.settings.volume_margin_floor_percent;
    let eroded: Vec<String> = ctx
        .volume_pricing?
        .iter()
        .filter(|tier| tier.margin_percent < floor)
        .map(|tier| tier.quantity.to_string())
        .collect();
    (!eroded.is_empty()).then(|| {
        format!(
            "Volume discounts at quantity {} push the margin below {:.0}%. Cap the discount at those tiers.",
            eroded.join(", "),
            floor
        )
    })
}

fn cost_breakdown_mismatch(ctx: &QuoteContext<'_>) -> Option<String> {
    let input = ctx.input;
    let breakdown = input.material_cost + input.labor_cost + input.overhead_cost;
    // Only flag when a breakdown was given and it is off by more than a cent
    (breakdown > 0.0 && (breakdown - input.base_cost).abs() > 0.01).then(|| {
        format!(
            "Material, labor and overhead sum to {:.2}, not the base cost of {:.2}. The price composition will not add up to 100%.",
            breakdown, input.base_cost
        )
    })
}

fn healthy_margin(ctx: &QuoteContext<'_>) -> Option<String> {
    let margin = ctx.input.target_margin_percent;
    let (min, max) = (
        ctx.settings.healthy_margin_min_percent,
        ctx.settings.healthy_margin_max_percent,
    );
    (min <= margin && margin <= max).then(|| {
        format!("A {margin:.1}% margin is within the healthy {min:.0}-{max:.0}% range for job-shop work.")
    })
}

fn verify_costs(_: &QuoteContext<'_>) -> Option<String> {
    Some("Verify actual material, labor and overhead costs before sending the quotation.".to_string())
}

// ============================================================================
// Standalone helpers
// ============================================================================

/// Margin and markup achieved by a given selling price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginAtPriceResult {
    pub margin_percent: f64,
    pub markup_percent: f64,
    pub profit_amount: f64,
    /// Margin meets the viability threshold (10%)
    pub is_viable: bool,
}

/// Margin at a selling price, with the default viability threshold.
///
/// ```rust
/// use calc_core::calculations::quotation::calculate_margin_at_price;
///
/// let r = calculate_margin_at_price(80.0, 100.0).unwrap();
/// assert_eq!(r.margin_percent, 20.0);
/// assert_eq!(r.markup_percent, 25.0);
/// assert!(r.is_viable);
/// ```
pub fn calculate_margin_at_price(base_cost: f64, selling_price: f64) -> CalcResult<MarginAtPriceResult> {
    calculate_margin_at_price_with(base_cost, selling_price, &QuotationSettings::default())
}

pub fn calculate_margin_at_price_with(
    base_cost: f64,
    selling_price: f64,
    settings: &QuotationSettings,
) -> CalcResult<MarginAtPriceResult> {
    require_positive("base_cost", base_cost)?;
    require_positive("selling_price", selling_price)?;

    let profit = selling_price - base_cost;
    let margin = percent_of(profit, selling_price);

    Ok(MarginAtPriceResult {
        margin_percent: round_percent(margin),
        markup_percent: round_percent(percent_of(profit, base_cost)),
        profit_amount: round_currency(profit),
        is_viable: margin >= settings.viable_margin_percent,
    })
}

/// Selling price that yields `target_margin_percent` on price.
///
/// ```rust
/// use calc_core::calculations::quotation::calculate_price_for_margin;
///
/// assert_eq!(calculate_price_for_margin(100.0, 20.0).unwrap(), 125.0);
/// assert!(calculate_price_for_margin(100.0, 100.0).is_err());
/// ```
pub fn calculate_price_for_margin(base_cost: f64, target_margin_percent: f64) -> CalcResult<f64> {
    require_positive("base_cost", base_cost)?;
    require_percent("target_margin_percent", target_margin_percent, false)?;
    Ok(round_currency(price_for_margin(base_cost, target_margin_percent)))
}

/// Margin erosion caused by a flat discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountImpactResult {
    pub discounted_price: f64,
    pub original_margin_percent: f64,
    pub new_margin_percent: f64,
    /// Percentage points of margin lost (≥ 0)
    pub margin_reduction: f64,
    /// Profit given up per unit (≥ 0)
    pub profit_loss: f64,
}

/// Apply a flat percentage discount and report the margin erosion.
///
/// `discount_percent` must be in `[0, 100)`: a 100% discount leaves no
/// price to take a margin on.
pub fn calculate_discount_impact(
    original_price: f64,
    base_cost: f64,
    discount_percent: f64,
) -> CalcResult<DiscountImpactResult> {
    require_positive("original_price", original_price)?;
    require_non_negative("base_cost", base_cost)?;
    require_percent("discount_percent", discount_percent, false)?;

    let discounted_price = original_price * (1.0 - discount_percent / 100.0);
    let original_margin = percent_of(original_price - base_cost, original_price);
    let new_margin = percent_of(discounted_price - base_cost, discounted_price);

    Ok(DiscountImpactResult {
        discounted_price: round_currency(discounted_price),
        original_margin_percent: round_percent(original_margin),
        new_margin_percent: round_percent(new_margin),
        margin_reduction: round_percent(original_margin - new_margin),
        profit_loss: round_currency(original_price - discounted_price),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> QuotationMarginInput {
        QuotationMarginInput {
            base_cost: 100.0,
            material_cost: 50.0,
            labor_cost: 30.0,
            overhead_cost: 20.0,
            target_margin_percent: 20.0,
            payment_terms: PaymentTerms::Immediate,
            risk_factor: RiskFactor::Low,
            competitor_price: None,
            volume_discounts: None,
        }
    }

    #[test]
    fn test_core_price() {
        let r = calculate_quotation_margin(&base_input()).unwrap();
        assert_eq!(r.suggested_price, 125.0);
        assert_eq!(r.profit_amount, 25.0);
        assert_eq!(r.margin_percent, 20.0);
        assert_eq!(r.markup_percent, 25.0);
        assert_eq!(r.final_recommended_price, 125.0);
        assert_eq!(r.break_even_price, 100.0);
        assert_eq!(r.minimum_acceptable_price, 110.0);
        assert!(r.is_above_minimum());
    }

    #[test]
    fn test_price_composition() {
        let r = calculate_quotation_margin(&base_input()).unwrap();
        assert_eq!(r.material_percent, 40.0);
        assert_eq!(r.labor_percent, 24.0);
        assert_eq!(r.overhead_percent, 16.0);
        assert_eq!(r.profit_percent, 20.0);
    }

    #[test]
    fn test_payment_terms_net60() {
        let mut input = base_input();
        input.payment_terms = PaymentTerms::Net60;
        let r = calculate_quotation_margin(&input).unwrap();
        assert_eq!(r.payment_terms_adjustment, 2.5);
        assert_eq!(r.adjusted_price, 127.5);
    }

    #[test]
    fn test_risk_compounds_on_adjusted_price() {
        let mut input = base_input();
        input.payment_terms = PaymentTerms::Net90;
        input.risk_factor = RiskFactor::High;
        let r = calculate_quotation_margin(&input).unwrap();
        // 125 × 1.03 = 128.75; risk 12.875; final 141.625
        assert_eq!(r.adjusted_price, 128.75);
        assert!((r.risk_adjustment - 12.88).abs() < 0.011);
        assert!((r.final_recommended_price - 141.63).abs() < 0.011);
    }

    #[test]
    fn test_volume_pricing() {
        let mut input = base_input();
        input.volume_discounts = Some(vec![
            VolumeDiscount { quantity: 10, discount_percent: 0.0 },
            VolumeDiscount { quantity: 100, discount_percent: 12.0 },
            VolumeDiscount { quantity: 500, discount_percent: 100.0 },
        ]);
        let r = calculate_quotation_margin(&input).unwrap();
        let tiers = r.volume_pricing.unwrap();
        assert_eq!(tiers[0].price_per_unit, 125.0);
        assert_eq!(tiers[0].total_revenue, 1250.0);
        assert_eq!(tiers[0].total_profit, 250.0);
        assert_eq!(tiers[0].margin_percent, 20.0);

        // 125 × 0.88 = 110
        assert_eq!(tiers[1].price_per_unit, 110.0);
        assert_eq!(tiers[1].total_profit, 1000.0);
        assert_eq!(tiers[1].margin_percent, 9.1);

        assert_eq!(tiers[2].price_per_unit, 0.0);
        assert_eq!(tiers[2].total_revenue, 0.0);
        assert_eq!(tiers[2].margin_percent, -100.0);

        assert!(r
            .recommendations
            .iter()
            .any(|m| m.starts_with("Volume discounts at quantity 100, 500")));
    }

    #[test]
    fn test_empty_volume_list_omitted() {
        let mut input = base_input();
        input.volume_discounts = Some(vec![]);
        let r = calculate_quotation_margin(&input).unwrap();
        assert!(r.volume_pricing.is_none());
    }

    #[test]
    fn test_competitor_positions() {
        let mut input = base_input();

        input.competitor_price = Some(100.0);
        let c = calculate_quotation_margin(&input).unwrap().competitor_comparison.unwrap();
        assert_eq!(c.price_difference, 25.0);
        assert_eq!(c.percentage_difference, 25.0);
        assert_eq!(c.position, CompetitorPosition::Higher);

        input.competitor_price = Some(150.0);
        let c = calculate_quotation_margin(&input).unwrap().competitor_comparison.unwrap();
        assert_eq!(c.position, CompetitorPosition::Lower);

        // 125 vs 121: +3.3% is inside the ±5% band
        input.competitor_price = Some(121.0);
        let c = calculate_quotation_margin(&input).unwrap().competitor_comparison.unwrap();
        assert_eq!(c.position, CompetitorPosition::Similar);
    }

    #[test]
    fn test_recommendation_order() {
        let mut input = base_input();
        input.target_margin_percent = 10.0;
        input.material_cost = 70.0;
        input.labor_cost = 20.0;
        input.overhead_cost = 10.0;
        input.payment_terms = PaymentTerms::Net30;
        input.risk_factor = RiskFactor::High;
        input.competitor_price = Some(100.0);
        let r = calculate_quotation_margin(&input).unwrap();

        let names = crate::recommendations::fired_rule_names(
            &quote_rules(),
            &QuoteContext {
                input: &input,
                shares: &PriceShares {
                    material: r.material_percent,
                    labor: r.labor_percent,
                    overhead: r.overhead_percent,
                    profit: r.profit_percent,
                },
                payment_adjustment: r.payment_terms_adjustment,
                risk_adjustment: r.risk_adjustment,
                final_price: r.final_recommended_price,
                minimum_acceptable: r.minimum_acceptable_price,
                volume_pricing: None,
                competitor: r.competitor_comparison.as_ref(),
                settings: &QuotationSettings::default(),
            },
        );
        assert_eq!(
            names,
            vec!["low_margin", "material_share", "payment_terms", "high_risk", "competitor_position", "verify_costs"]
        );
        assert_eq!(r.recommendations.len(), names.len());
        assert!(r.recommendations[0].starts_with("A 10.0% margin is below 15%"));
        assert!(r.recommendations[2].starts_with("Net 30 terms add a 1% surcharge (1.11)"));
    }

    #[test]
    fn test_healthy_margin_and_verify_last() {
        let mut input = base_input();
        input.target_margin_percent = 30.0;
        let r = calculate_quotation_margin(&input).unwrap();
        let n = r.recommendations.len();
        assert!(r.recommendations[n - 2].starts_with("A 30.0% margin is within the healthy 25-35% range"));
        assert_eq!(
            r.recommendations[n - 1],
            "Verify actual material, labor and overhead costs before sending the quotation."
        );
    }

    #[test]
    fn test_cost_breakdown_mismatch() {
        let mut input = base_input();
        input.overhead_cost = 5.0;
        let r = calculate_quotation_margin(&input).unwrap();
        assert!(r.recommendations.iter().any(|m| m.starts_with("Material, labor and overhead sum to 85.00")));
    }

    #[test]
    fn test_below_minimum() {
        let mut input = base_input();
        input.target_margin_percent = 5.0;
        let r = calculate_quotation_margin(&input).unwrap();
        assert!(!r.is_above_minimum());
        assert!(r.recommendations.iter().any(|m| m.contains("below the minimum acceptable price")));
    }

    #[test]
    fn test_invalid_inputs() {
        let mut input = base_input();
        input.target_margin_percent = 100.0;
        assert_eq!(
            calculate_quotation_margin(&input).unwrap_err().field(),
            Some("target_margin_percent")
        );

        let mut input = base_input();
        input.base_cost = 0.0;
        assert_eq!(calculate_quotation_margin(&input).unwrap_err().field(), Some("base_cost"));

        let mut input = base_input();
        input.competitor_price = Some(0.0);
        assert!(calculate_quotation_margin(&input).is_err());

        let mut input = base_input();
        input.volume_discounts = Some(vec![VolumeDiscount { quantity: 5, discount_percent: 120.0 }]);
        assert_eq!(
            calculate_quotation_margin(&input).unwrap_err().field(),
            Some("volume_discounts[0].discount_percent")
        );
    }

    #[test]
    fn test_margin_at_price() {
        let r = calculate_margin_at_price(95.0, 100.0).unwrap();
        assert_eq!(r.margin_percent, 5.0);
        assert!(!r.is_viable);
        assert!(calculate_margin_at_price(95.0, 0.0).is_err());
    }

    #[test]
    fn test_discount_impact() {
        let r = calculate_discount_impact(100.0, 70.0, 10.0).unwrap();
        assert_eq!(r.discounted_price, 90.0);
        assert_eq!(r.original_margin_percent, 30.0);
        assert_eq!(r.new_margin_percent, 22.2);
        assert_eq!(r.margin_reduction, 7.8);
        assert_eq!(r.profit_loss, 10.0);
    }

    #[test]
    fn test_discount_impact_rejects_full_discount() {
        assert!(calculate_discount_impact(100.0, 70.0, 100.0).is_err());
    }

    #[test]
    fn test_serialization_skips_absent_options() {
        let r = calculate_quotation_margin(&base_input()).unwrap();
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("volume_pricing"));
        assert!(!json.contains("competitor_comparison"));
        let roundtrip: QuotationMarginResult = serde_json::from_str(&json).unwrap();
        assert_eq!(r, roundtrip);
    }

    #[test]
    fn test_input_defaults_from_json() {
        let json = r#"{"base_cost": 80, "material_cost": 40, "labor_cost": 25, "overhead_cost": 15, "target_margin_percent": 25}"#;
        let input: QuotationMarginInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.payment_terms, PaymentTerms::Immediate);
        assert_eq!(input.risk_factor, RiskFactor::Low);
        assert!(input.competitor_price.is_none());
    }
}
