// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::path::{Path, Segment};
use crate::resolvers::Resolver;
use crate::value::Value;
use crate::walker;

use std::rc::Rc;

use anyhow::Result;

/// Outcome of applying a rule to a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Keep the node under `key` (the current last path segment unless a rule
    /// renamed it; `None` at the document root).
    Continue(Option<Segment>, Value),
    /// Delete the node from its parent and do not visit its children.
    Remove,
}

impl Step {
    /// Continue under the path's current key.
    pub fn keep(path: &Path, value: Value) -> Step {
        Step::Continue(path.last().cloned(), value)
    }

    pub fn value(self) -> Option<Value> {
        match self {
            Step::Continue(_, value) => Some(value),
            Step::Remove => None,
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, Step::Remove)
    }
}

/// A rewrite over `(path, value)`.
///
/// A rule that does not recognize its input must return it unchanged under
/// the original key. `rules` is the rule set currently being applied; rules
/// that evaluate sub-templates walk them through it.
pub trait Rule {
    fn apply(&self, path: &Path, value: Value, rules: &RuleSet) -> Result<Step>;

    /// Returns a copy of this rule that looks values up through `resolver`,
    /// or `None` when the rule does not depend on the resolver chain and can
    /// be shared as is.
    fn rebind(&self, _resolver: &Rc<dyn Resolver>) -> Option<Rc<dyn Rule>> {
        None
    }
}

impl<F> Rule for F
where
    F: Fn(&Path, Value) -> Result<Step>,
{
    fn apply(&self, path: &Path, value: Value, _rules: &RuleSet) -> Result<Step> {
        self(path, value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Applied before descending into children.
    Early,
    /// Applied after children have been rewritten.
    Depth,
}

/// Ordered `Early` and `Depth` rule lists. Attachment order is application order.
#[derive(Clone, Default)]
pub struct RuleSet {
    early: Vec<Rc<dyn Rule>>,
    depth: Vec<Rc<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach_early<R: Rule + 'static>(&mut self, rule: R) {
        self.early.push(Rc::new(rule));
    }

    pub fn attach<R: Rule + 'static>(&mut self, rule: R) {
        self.depth.push(Rc::new(rule));
    }

    pub fn attach_shared(&mut self, phase: Phase, rule: Rc<dyn Rule>) {
        match phase {
            Phase::Early => self.early.push(rule),
            Phase::Depth => self.depth.push(rule),
        }
    }

    pub fn rules(&self, phase: Phase) -> &[Rc<dyn Rule>] {
        match phase {
            Phase::Early => &self.early,
            Phase::Depth => &self.depth,
        }
    }

    pub fn len(&self) -> usize {
        self.early.len() + self.depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds the rule set used inside a new scope: rules that read the
    /// resolver chain are rebound to `resolver`, all others are shared.
    pub fn derive(&self, resolver: &Rc<dyn Resolver>) -> RuleSet {
        let rebind = |rules: &[Rc<dyn Rule>]| -> Vec<Rc<dyn Rule>> {
            rules
                .iter()
                .map(|rule| rule.rebind(resolver).unwrap_or_else(|| rule.clone()))
                .collect()
        };
        RuleSet {
            early: rebind(&self.early),
            depth: rebind(&self.depth),
        }
    }

    /// Applies every rule of `phase` in order, threading each output into the
    /// next rule. Stops at the first `Remove`.
    pub fn apply_phase(&self, phase: Phase, path: &Path, value: Value) -> Result<Step> {
        let mut path = path.clone();
        let mut value = value;
        for rule in self.rules(phase) {
            match rule.apply(&path, value, self)? {
                Step::Remove => return Ok(Step::Remove),
                Step::Continue(key, next) => {
                    path = path.renamed(key);
                    value = next;
                }
            }
        }
        Ok(Step::keep(&path, value))
    }

    pub fn walk(&self, path: &Path, value: Value) -> Result<Step> {
        walker::walk(path, value, self)
    }

    pub fn process(&self, value: Value) -> Result<Value> {
        walker::process(value, self)
    }
}

/// One phase of a rule set exposed as a single rule, for nesting a rule set
/// inside another.
#[derive(Clone)]
pub struct Pipeline {
    rules: Rc<RuleSet>,
    phase: Phase,
}

impl Pipeline {
    pub fn new(rules: Rc<RuleSet>, phase: Phase) -> Self {
        Self { rules, phase }
    }
}

impl Rule for Pipeline {
    fn apply(&self, path: &Path, value: Value, _rules: &RuleSet) -> Result<Step> {
        self.rules.apply_phase(self.phase, path, value)
    }

    fn rebind(&self, resolver: &Rc<dyn Resolver>) -> Option<Rc<dyn Rule>> {
        Some(Rc::new(Pipeline {
            rules: Rc::new(self.rules.derive(resolver)),
            phase: self.phase,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Path {
        segments.iter().copied().collect()
    }

    #[test]
    fn later_rules_see_earlier_output() -> Result<()> {
        let mut rules = RuleSet::new();
        rules.attach(|p: &Path, v: Value| -> Result<Step> {
            Ok(match v {
                Value::String(s) if s.as_ref() == "a" => Step::keep(p, Value::from("b")),
                v => Step::keep(p, v),
            })
        });
        rules.attach(|p: &Path, v: Value| -> Result<Step> {
            Ok(match v {
                Value::String(s) if s.as_ref() == "b" => Step::keep(p, Value::from("c")),
                v => Step::keep(p, v),
            })
        });

        let step = rules.apply_phase(Phase::Depth, &path(&["x"]), Value::from("a"))?;
        assert_eq!(step, Step::Continue(Some("x".into()), Value::from("c")));
        Ok(())
    }

    #[test]
    fn later_rules_see_renamed_key() -> Result<()> {
        let mut rules = RuleSet::new();
        rules.attach_early(|_: &Path, v: Value| -> Result<Step> {
            Ok(Step::Continue(Some("renamed".into()), v))
        });
        rules.attach_early(|p: &Path, _: Value| -> Result<Step> {
            Ok(Step::keep(p, Value::from(p.to_string())))
        });

        let step = rules.apply_phase(Phase::Early, &path(&["x", "y"]), Value::Null)?;
        assert_eq!(
            step,
            Step::Continue(Some("renamed".into()), Value::from("[x, renamed]"))
        );
        Ok(())
    }

    #[test]
    fn remove_short_circuits() -> Result<()> {
        let mut rules = RuleSet::new();
        rules.attach(|_: &Path, _: Value| -> Result<Step> { Ok(Step::Remove) });
        rules.attach(|_: &Path, _: Value| -> Result<Step> {
            anyhow::bail!("must not run after remove")
        });

        assert!(rules
            .apply_phase(Phase::Depth, &path(&["x"]), Value::Null)?
            .is_remove());
        Ok(())
    }

    #[test]
    fn pipeline_applies_nested_set() -> Result<()> {
        let mut inner = RuleSet::new();
        inner.attach(|p: &Path, _: Value| -> Result<Step> { Ok(Step::keep(p, Value::from(1.0))) });

        let mut outer = RuleSet::new();
        outer.attach(Pipeline::new(Rc::new(inner), Phase::Depth));

        assert_eq!(outer.process(Value::from("x"))?, Value::from(1.0));
        Ok(())
    }
}
