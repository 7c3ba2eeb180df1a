//! Reference grammar:
//!
//! `FOR TENANT:<id>[:<container>] [WHEN <condition>] DO SET|DELETE <filter> [params...] [TRANSIENT]`
//!
//! Grounded in the original controller's
//! `condition_re = re.compile(r'.* (WHEN .*) DO .*', re.M | re.I)`: the
//! condition is whatever sits between `WHEN` and `DO`, and the literal
//! `TRANSIENT` token marks a fire-once dynamic rule.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use regex::Regex;

// Layer 3: Internal module imports
use super::{Action, DslParser, ParsedRule, TargetAction};
use crate::error::DslError;

const TRANSIENT_TOKEN: &str = "TRANSIENT";

/// Reference [`DslParser`] implementation.
pub struct SimpleDslParser {
    condition_re: Regex,
    target_re: Regex,
    action_re: Regex,
}

impl Default for SimpleDslParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleDslParser {
    pub fn new() -> Self {
        Self {
            // matches the `WHEN <condition>` span immediately before ` DO `
            condition_re: Regex::new(r"(?i)\s(WHEN\s.+?)\s+DO\s").expect("valid regex"),
            target_re: Regex::new(r"(?i)FOR\s+TENANT:([A-Za-z0-9_]+)(?::([A-Za-z0-9_]+))?")
                .expect("valid regex"),
            action_re: Regex::new(r"(?i)DO\s+(SET|DELETE)\s+([A-Za-z0-9_.]+)(.*)$")
                .expect("valid regex"),
        }
    }
}

impl DslParser for SimpleDslParser {
    fn parse(&self, rule_text: &str) -> Result<ParsedRule, DslError> {
        let trimmed = rule_text.trim();
        if trimmed.is_empty() {
            return Err(DslError::ParseError("empty rule".to_string()));
        }

        let target_caps = self
            .target_re
            .captures(trimmed)
            .ok_or_else(|| DslError::ParseError(format!("missing FOR TENANT clause: {trimmed}")))?;
        let tenant_id = target_caps[1].to_string();
        let container = target_caps.get(2).map(|m| m.as_str().to_string());

        let condition_text = self
            .condition_re
            .captures(&format!(" {trimmed} "))
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();

        let action_caps = self
            .action_re
            .captures(trimmed)
            .ok_or_else(|| DslError::ParseError(format!("missing DO clause: {trimmed}")))?;
        let verb = action_caps[1].to_uppercase();
        let filter_name = action_caps[2].to_string();
        let rest = action_caps[3].to_string();

        let transient = rest.to_uppercase().contains(TRANSIENT_TOKEN);
        let params: Vec<String> = rest
            .split_whitespace()
            .filter(|tok| !tok.eq_ignore_ascii_case(TRANSIENT_TOKEN))
            .map(|s| s.to_string())
            .collect();

        let action = match verb.as_str() {
            "SET" => Action::Set {
                filter_name,
                params,
            },
            "DELETE" => Action::Delete { filter_name },
            other => {
                return Err(DslError::ParseError(format!(
                    "unsupported action verb: {other}"
                )))
            }
        };

        let target = TargetAction {
            tenant_id,
            container,
            action,
            object_type: None,
            object_size: None,
            execution_server: None,
        };

        Ok(ParsedRule {
            original_text: trimmed.to_string(),
            condition_text,
            targets: vec![target],
            transient,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_static_set_rule() {
        let parser = SimpleDslParser::new();
        let rule = parser.parse("FOR TENANT:abc DO SET compression").unwrap();
        assert!(!rule.is_dynamic());
        assert_eq!(rule.targets.len(), 1);
        assert_eq!(rule.targets[0].tenant_id, "abc");
        assert_eq!(
            rule.targets[0].action,
            Action::Set {
                filter_name: "compression".to_string(),
                params: vec![],
            }
        );
    }

    #[test]
    fn parses_dynamic_transient_rule() {
        let parser = SimpleDslParser::new();
        let rule = parser
            .parse("FOR TENANT:abc WHEN metric.cpu > 80 DO SET compression TRANSIENT")
            .unwrap();
        assert!(rule.is_dynamic());
        assert!(rule.transient);
        assert_eq!(rule.condition_text, "WHEN metric.cpu > 80");
    }

    #[test]
    fn parses_container_scoped_target() {
        let parser = SimpleDslParser::new();
        let rule = parser
            .parse("FOR TENANT:abc:videos DO SET compression")
            .unwrap();
        assert_eq!(rule.targets[0].container, Some("videos".to_string()));
    }

    #[test]
    fn rejects_malformed_rule() {
        let parser = SimpleDslParser::new();
        assert!(parser.parse("this is not a rule").is_err());
    }

    #[test]
    fn rejects_empty_rule() {
        let parser = SimpleDslParser::new();
        assert!(parser.parse("   ").is_err());
    }
}
