// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::utils::{ensure_args_count, ensure_string, single_key};
use crate::path::{split_ref, Path};
use crate::resolvers::Resolver;
use crate::rule::{Rule, RuleSet, Step};
use crate::value::Value;

use std::rc::Rc;

use anyhow::Result;
use log::debug;

/// `{"Ref": "a.[b].c"}`: the value found at the reference, expanded through
/// the active rule set.
#[derive(Clone)]
pub struct RefRule {
    resolver: Rc<dyn Resolver>,
}

impl RefRule {
    pub fn new(resolver: Rc<dyn Resolver>) -> Self {
        Self { resolver }
    }
}

/// Looks `lookup` up and walks a hit at `path`. A miss, or a hit that is the
/// reference itself, leaves `value` alone.
fn resolve_at(
    resolver: &dyn Resolver,
    lookup: Vec<String>,
    path: &Path,
    value: Value,
    rules: &RuleSet,
) -> Result<Step> {
    match resolver.get(&lookup)? {
        Some(found) if found == value => Ok(Step::keep(path, value)),
        Some(found) => {
            debug!("{path}: resolved {}", lookup.join("."));
            rules.walk(path, found)
        }
        None => {
            debug!("{path}: {} not found", lookup.join("."));
            Ok(Step::keep(path, value))
        }
    }
}

impl Rule for RefRule {
    fn apply(&self, path: &Path, value: Value, rules: &RuleSet) -> Result<Step> {
        let lookup = match single_key(&value, "Ref").and_then(ensure_string) {
            Some(reference) => split_ref(reference),
            None => return Ok(Step::keep(path, value)),
        };
        resolve_at(self.resolver.as_ref(), lookup, path, value, rules)
    }

    fn rebind(&self, resolver: &Rc<dyn Resolver>) -> Option<Rc<dyn Rule>> {
        Some(Rc::new(Self::new(resolver.clone())))
    }
}

/// `{"Fn::GetAtt": [resource, attribute]}`: both halves are split like a
/// reference and looked up as one path.
#[derive(Clone)]
pub struct GetAttRule {
    resolver: Rc<dyn Resolver>,
}

impl GetAttRule {
    pub fn new(resolver: Rc<dyn Resolver>) -> Self {
        Self { resolver }
    }

    fn lookup(value: &Value) -> Option<Vec<String>> {
        let args = ensure_args_count(single_key(value, "Fn::GetAtt")?, 2)?;
        let mut lookup = split_ref(ensure_string(&args[0])?);
        lookup.extend(split_ref(ensure_string(&args[1])?));
        Some(lookup)
    }
}

impl Rule for GetAttRule {
    fn apply(&self, path: &Path, value: Value, rules: &RuleSet) -> Result<Step> {
        match Self::lookup(&value) {
            Some(lookup) => resolve_at(self.resolver.as_ref(), lookup, path, value, rules),
            None => Ok(Step::keep(path, value)),
        }
    }

    fn rebind(&self, resolver: &Rc<dyn Resolver>) -> Option<Rc<dyn Rule>> {
        Some(Rc::new(Self::new(resolver.clone())))
    }
}

/// `{"Fn::HasRef": "a.b"}`: whether the reference resolves.
#[derive(Clone)]
pub struct HasRefRule {
    resolver: Rc<dyn Resolver>,
}

impl HasRefRule {
    pub fn new(resolver: Rc<dyn Resolver>) -> Self {
        Self { resolver }
    }
}

impl Rule for HasRefRule {
    fn apply(&self, path: &Path, value: Value, _rules: &RuleSet) -> Result<Step> {
        let lookup = match single_key(&value, "Fn::HasRef").and_then(ensure_string) {
            Some(reference) => split_ref(reference),
            None => return Ok(Step::keep(path, value)),
        };
        let found = self.resolver.get(&lookup)?.is_some();
        Ok(Step::keep(path, Value::from(found)))
    }

    fn rebind(&self, resolver: &Rc<dyn Resolver>) -> Option<Rc<dyn Rule>> {
        Some(Rc::new(Self::new(resolver.clone())))
    }
}
