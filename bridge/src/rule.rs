use std::fmt;

use regex::Regex;
use tracing::debug;

use crate::config::{RawRule, RuleLoaderSpec, TestCondition};
use crate::error::BridgeError;

/// A compiled rule: the routing unit between the resolve and load phases.
pub struct Rule {
    /// Routing token tying resolved paths back to this rule's load hook.
    /// Unique within one plugin instance.
    pub namespace: String,
    pub test: Regex,
    pub loaders: Vec<RuleLoaderSpec>,
    pub format: Option<String>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("namespace", &self.namespace)
            .field("test", &self.test.as_str())
            .field(
                "loaders",
                &self.loaders.iter().map(|l| l.name()).collect::<Vec<_>>(),
            )
            .field("format", &self.format)
            .finish()
    }
}

/// Compiles raw rules, handing each one a distinct namespace.
///
/// The counter lives here rather than in process-wide state, so unrelated
/// plugin instances built concurrently never share a sequence.
pub(crate) struct RuleCompiler {
    next_index: u32,
}

impl RuleCompiler {
    pub(crate) fn new() -> Self {
        Self { next_index: 1 }
    }

    pub(crate) fn compile(&mut self, raw: RawRule) -> Result<Rule, BridgeError> {
        let RawRule {
            test,
            use_,
            loader,
            format,
        } = raw;

        let test = match test {
            TestCondition::Pattern(regex) => regex,
            TestCondition::Literal(value) => {
                return Err(BridgeError::Config(format!(
                    "'test' must be a pattern; literal matchers such as '{value}' are not supported"
                )))
            }
        };

        let loaders = match (use_, loader) {
            (chain, None) if !chain.is_empty() => chain,
            (chain, Some(single)) if chain.is_empty() => vec![single],
            (_, Some(_)) => {
                return Err(BridgeError::Config(
                    "rule sets both 'use' and 'loader'; pick one form".to_string(),
                ))
            }
            (_, None) => {
                return Err(BridgeError::Config(
                    "rule declares no loaders".to_string(),
                ))
            }
        };

        let namespace = format!("rule-{}-{}", self.next_index, test);
        self.next_index += 1;
        debug!("generated namespace for the rule: {namespace}");

        Ok(Rule {
            namespace,
            test,
            loaders,
            format,
        })
    }
}
