//! # Rounding Helpers
//!
//! Reported figures follow a fixed display precision: money to cents,
//! percentages and minutes to one decimal. Arithmetic is always done on
//! unrounded values; rounding happens only when a result field is filled.

/// Decimal places for monetary amounts
pub const CURRENCY_PLACES: i32 = 2;

/// Decimal places for percentages
pub const PERCENT_PLACES: i32 = 1;

/// Decimal places for durations in minutes
pub const MINUTE_PLACES: i32 = 1;

/// Round `value` to `places` decimal places (half away from zero).
///
/// ```rust
/// use calc_core::rounding::round_to;
/// assert_eq!(round_to(2.345, 1), 2.3);
/// assert_eq!(round_to(-1.25, 1), -1.3);
/// ```
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round() / factor;
    // Avoid reporting "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Round a monetary amount to cents.
pub fn round_currency(value: f64) -> f64 {
    round_to(value, CURRENCY_PLACES)
}

/// Round a percentage to one decimal.
pub fn round_percent(value: f64) -> f64 {
    round_to(value, PERCENT_PLACES)
}

/// Round a duration in minutes to one decimal.
pub fn round_minutes(value: f64) -> f64 {
    round_to(value, MINUTE_PLACES)
}

/// `part / whole × 100`. The caller guarantees `whole != 0`.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    part / whole * 100.0
}
