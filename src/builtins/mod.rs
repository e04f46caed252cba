// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Pure `{"Fn::Name": args}` functions.
//!
//! A function sees the already expanded argument of a single-key object and
//! returns `None` when the argument does not have the shape it expects, in
//! which case the node is left as literal data.

pub mod arrays;
pub mod booleans;
pub mod numbers;
pub mod objects;
pub mod strings;
pub mod utils;

use crate::path::Path;
use crate::rule::{Rule, RuleSet, Step};
use crate::value::Value;

use std::collections::BTreeMap;

use anyhow::Result;
use lazy_static::lazy_static;

pub type BuiltinFcn = fn(&Value) -> Option<Value>;

#[rustfmt::skip]
lazy_static! {
    pub static ref BUILTINS: BTreeMap<&'static str, BuiltinFcn> = {
	let mut m : BTreeMap<&'static str, BuiltinFcn>  = BTreeMap::new();

	numbers::register(&mut m);
	booleans::register(&mut m);
	arrays::register(&mut m);
	strings::register(&mut m);
	objects::register(&mut m);

	m
    };
}

/// Adapts a builtin to the [`Rule`] contract.
#[derive(Clone, Copy)]
pub struct FunctionRule {
    name: &'static str,
    fcn: BuiltinFcn,
}

impl FunctionRule {
    pub fn new(name: &'static str, fcn: BuiltinFcn) -> Self {
        Self { name, fcn }
    }

    pub fn lookup(name: &str) -> Option<Self> {
        BUILTINS
            .get_key_value(name)
            .map(|(name, fcn)| Self::new(name, *fcn))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Rule for FunctionRule {
    fn apply(&self, path: &Path, value: Value, _rules: &RuleSet) -> Result<Step> {
        let result = utils::single_key(&value, self.name).and_then(self.fcn);
        Ok(Step::keep(path, result.unwrap_or(value)))
    }
}

/// Attaches every builtin as a `Depth` rule, in name order.
pub fn attach_builtins(rules: &mut RuleSet) {
    for (name, fcn) in BUILTINS.iter() {
        rules.attach(FunctionRule::new(name, *fcn));
    }
}
