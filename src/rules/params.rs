// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::utils::single_key;
use crate::path::Path;
use crate::rule::{Rule, RuleSet, Step};
use crate::value::{Map, Value};

use anyhow::Result;

pub const PARAM_REF_KEY: &str = "ParamRef";

/// Placeholder bound to a declared template parameter: `{"ParamRef": name}`.
pub fn param_ref(name: &str) -> Value {
    let mut placeholder = Map::new();
    placeholder.insert(PARAM_REF_KEY.into(), Value::from(name));
    Value::from(placeholder)
}

/// Turns `{"ParamRef": name}` placeholders back into `{"Ref": name}`, so
/// references to declared parameters survive expansion untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamRefRule;

impl Rule for ParamRefRule {
    fn apply(&self, path: &Path, value: Value, _rules: &RuleSet) -> Result<Step> {
        let name = match single_key(&value, PARAM_REF_KEY) {
            Some(name) => name.clone(),
            None => return Ok(Step::keep(path, value)),
        };
        let mut reference = Map::new();
        reference.insert("Ref".into(), name);
        Ok(Step::keep(path, Value::from(reference)))
    }
}
