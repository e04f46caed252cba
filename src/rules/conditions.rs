// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::path::{Path, Segment};
use crate::rule::{Rule, RuleSet, Step};
use crate::value::{Map, Value};

use anyhow::Result;

/// Rewrites literal booleans under `Conditions.<name>` into equality tests,
/// since condition definitions cannot be plain booleans.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReduceConditions;

fn equality(left: &str, right: &str) -> Value {
    let mut call = Map::new();
    call.insert(
        "Fn::Equals".into(),
        Value::from(vec![Value::from(left), Value::from(right)]),
    );
    Value::from(call)
}

impl Rule for ReduceConditions {
    fn apply(&self, path: &Path, value: Value, _rules: &RuleSet) -> Result<Step> {
        let in_conditions = matches!(
            (path.get(0), path.get(1)),
            (Some(Segment::Key(section)), Some(Segment::Key(_))) if section.as_ref() == "Conditions"
        );
        Ok(match value {
            Value::Bool(true) if in_conditions => Step::keep(path, equality("1", "1")),
            Value::Bool(false) if in_conditions => Step::keep(path, equality("0", "1")),
            value => Step::keep(path, value),
        })
    }
}
