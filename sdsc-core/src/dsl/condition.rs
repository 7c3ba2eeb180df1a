//! Condition evaluation for dynamic rules (§4.7).
//!
//! The DSL grammar itself only names the condition text (§4.3); a rule
//! actor still needs to decide, on every metric update, whether the
//! condition currently holds. This is the minimal numeric-threshold
//! evaluator that backs that decision for the reference grammar in
//! `simple.rs` (`WHEN <metric> <op> <threshold>`).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use regex::Regex;

// Layer 3: Internal module imports
use crate::messages::MetricSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
}

impl Operator {
    fn apply(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Operator::Gt => lhs > rhs,
            Operator::Ge => lhs >= rhs,
            Operator::Lt => lhs < rhs,
            Operator::Le => lhs <= rhs,
            Operator::Eq => (lhs - rhs).abs() < f64::EPSILON,
        }
    }
}

/// A parsed `WHEN <metric> <op> <threshold>` clause.
#[derive(Debug, Clone)]
pub struct Condition {
    pub metric_key: String,
    pub operator: Operator,
    pub threshold: f64,
}

impl Condition {
    /// Parse `condition_text` (the `WHEN …` span, with or without the
    /// leading `WHEN`). Returns `None` if it does not match the expected
    /// `<metric> <op> <value>` shape.
    pub fn parse(condition_text: &str) -> Option<Self> {
        let re = Regex::new(r"(?i)WHEN\s+([A-Za-z0-9_.]+)\s*(>=|<=|==|>|<)\s*(-?\d+(?:\.\d+)?)")
            .expect("valid regex");
        let caps = re.captures(condition_text)?;
        let metric_key = caps[1].to_string();
        let operator = match &caps[2] {
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            "==" => Operator::Eq,
            _ => return None,
        };
        let threshold: f64 = caps[3].parse().ok()?;
        Some(Condition {
            metric_key,
            operator,
            threshold,
        })
    }

    /// Does `sample` satisfy this condition? Matches when the sample's
    /// metric name contains the condition's metric key (e.g. `metric.cpu`
    /// matches a `cpu` condition key).
    pub fn evaluate(&self, sample: &MetricSample) -> bool {
        if !sample
            .metric_name
            .to_lowercase()
            .contains(&self.metric_key.to_lowercase())
        {
            return false;
        }
        self.operator.apply(sample.measured_mbps, self.threshold)
    }
}
