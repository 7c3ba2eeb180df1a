//! DSL Parser Interface (C2, §4.2).
//!
//! The core depends only on the [`ParsedRule`] AST and the [`DslParser`]
//! trait; [`SimpleDslParser`] is one concrete grammar, grounded in the
//! original controller's `condition_re` regex, supplied so the rest of the
//! system has something real to parse against.

pub mod condition;
pub mod simple;

pub use condition::{Condition, Operator};
pub use simple::SimpleDslParser;

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::error::DslError;
use crate::model::SizePredicate;

/// The action a rule requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Set {
        filter_name: String,
        params: Vec<String>,
    },
    Delete {
        filter_name: String,
    },
}

/// One (target, action) pair within a parsed rule. A single rule line may
/// expand into several of these when it names more than one target (§4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetAction {
    pub tenant_id: String,
    pub container: Option<String>,
    pub action: Action,
    pub object_type: Option<String>,
    pub object_size: Option<(String, i64)>,
    pub execution_server: Option<String>,
}

/// The full parse of one DSL rule line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRule {
    /// Verbatim input line.
    pub original_text: String,
    /// The `WHEN <condition>` text, if any; empty ⇒ static rule (§4.3).
    pub condition_text: String,
    pub targets: Vec<TargetAction>,
    pub transient: bool,
}

impl ParsedRule {
    /// A rule is dynamic iff it carries a non-empty condition (§4.3).
    pub fn is_dynamic(&self) -> bool {
        !self.condition_text.is_empty()
    }
}

impl From<(String, i64)> for SizePredicate {
    fn from((operator, value): (String, i64)) -> Self {
        SizePredicate { operator, value }
    }
}

/// Consumes a rule string, returns its parsed AST (C2).
pub trait DslParser: Send + Sync {
    fn parse(&self, rule_text: &str) -> Result<ParsedRule, DslError>;
}
