//! # Recommendation Rules
//!
//! Advisory messages are produced by ordered lists of independent rules.
//! Each rule inspects a calculator-specific context and either fires a
//! message or stays silent. Output order is the order of the rule slice,
//! so the same input always yields the same list.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::recommendations::{evaluate_rules, Rule};
//!
//! struct Ctx { margin: f64 }
//!
//! const RULES: &[Rule<Ctx>] = &[
//!     Rule::new("low_margin", |c: &Ctx| (c.margin < 15.0).then(|| "Margin is thin".to_string())),
//!     Rule::new("always", |_: &Ctx| Some("Verify costs".to_string())),
//! ];
//!
//! let out = evaluate_rules(RULES, &Ctx { margin: 10.0 });
//! assert_eq!(out, vec!["Margin is thin", "Verify costs"]);
//! ```

/// A named predicate → message rule evaluated against a context `C`.
pub struct Rule<C> {
    /// Stable identifier, used in debug logs and tests
    pub name: &'static str,
    /// Returns the message when the rule fires
    pub evaluate: fn(&C) -> Option<String>,
}

impl<C> Rule<C> {
    /// Create a rule
    pub const fn new(name: &'static str, evaluate: fn(&C) -> Option<String>) -> Self {
        Rule { name, evaluate }
    }
}

/// Run `rules` in order against `ctx` and collect every fired message.
pub fn evaluate_rules<C>(rules: &[Rule<C>], ctx: &C) -> Vec<String> {
    rules
        .iter()
        .filter_map(|rule| {
            let message = (rule.evaluate)(ctx);
            if message.is_some() {
                tracing::debug!(rule = rule.name, "recommendation fired");
            }
            message
        })
        .collect()
}

/// Names of the rules that fire for `ctx`, in evaluation order.
pub fn fired_rule_names<C>(rules: &[Rule<C>], ctx: &C) -> Vec<&'static str> {
    rules
        .iter()
        .filter(|rule| (rule.evaluate)(ctx).is_some())
        .map(|rule| rule.name)
        .collect()
}
