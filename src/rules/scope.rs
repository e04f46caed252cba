// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! `Fn::For` and `Fn::With`: forms that bind names for the duration of a body
//! template.
//!
//! Both run in the `Early` phase so they decide how their own arguments are
//! walked. Every argument, the body included, is walked through the enclosing
//! rule set first, and the form is removed if any of them is. The body is then
//! walked again from its raw form once per binding frame, with a rule set
//! derived for a fresh scope chain:
//!
//! ```text
//! OrderedFallback[ Alias(scope), scope ]
//!                               scope = ScopeStack[ enclosing chain, frame ]
//! ```

use crate::builtins::utils::single_key;
use crate::path::Path;
use crate::resolvers::{scoped_chain, MapResolver, Resolver, ScopeStack};
use crate::rule::{Rule, RuleSet, Step};
use crate::value::{Map, Value};

use std::rc::Rc;

use anyhow::Result;
use log::debug;

enum Args {
    /// Walked leading arguments followed by the unevaluated body.
    Collected(Vec<Value>),
    /// An argument was removed; the whole form goes with it.
    Removed,
    /// Not an argument list of the expected length.
    Mismatch,
}

fn collect_args(path: &Path, raw: &Value, count: usize, rules: &RuleSet) -> Result<Args> {
    let items = match raw {
        Value::Array(items) if items.len() == count => items,
        _ => return Ok(Args::Mismatch),
    };

    let mut args = Vec::with_capacity(count);
    let (body, leading) = match items.split_last() {
        Some(split) => split,
        None => return Ok(Args::Mismatch),
    };
    for arg in leading {
        match rules.walk(path, arg.clone())? {
            Step::Remove => return Ok(Args::Removed),
            Step::Continue(_, arg) => args.push(arg),
        }
    }
    // The walked body is discarded; only its removal matters here.
    if let Step::Remove = rules.walk(path, body.clone())? {
        return Ok(Args::Removed);
    }
    args.push(body.clone());
    Ok(Args::Collected(args))
}

/// The rule set for a body evaluated in `scope`.
fn scoped_rules(scope: &Rc<ScopeStack>, rules: &RuleSet) -> RuleSet {
    rules.derive(&scoped_chain(scope.clone()))
}

type Name = Option<Rc<str>>;

/// `name`, `[value]` or `[index, value]`; any name may be null.
fn binding_names(names: &Value) -> Option<(Name, Name)> {
    let name = |v: &Value| -> Option<Name> {
        match v {
            Value::String(s) => Some(Some(s.clone())),
            Value::Null => Some(None),
            _ => None,
        }
    };
    match names {
        Value::Array(names) => match names.as_slice() {
            [value] => Some((None, name(value)?)),
            [index, value] => Some((name(index)?, name(value)?)),
            _ => None,
        },
        single => Some((None, name(single)?)),
    }
}

/// `{"Fn::For": [names, values, body]}`: one body expansion per value.
/// Expansions that are removed are left out of the resulting array.
#[derive(Clone)]
pub struct ForRule {
    resolver: Rc<dyn Resolver>,
}

impl ForRule {
    pub fn new(resolver: Rc<dyn Resolver>) -> Self {
        Self { resolver }
    }
}

impl Rule for ForRule {
    fn apply(&self, path: &Path, value: Value, rules: &RuleSet) -> Result<Step> {
        let args = match single_key(&value, "Fn::For") {
            Some(raw) => collect_args(path, raw, 3, rules)?,
            None => Args::Mismatch,
        };
        let args = match args {
            Args::Collected(args) => args,
            Args::Removed => return Ok(Step::Remove),
            Args::Mismatch => return Ok(Step::keep(path, value)),
        };

        let (index_name, value_name) = match binding_names(&args[0]) {
            Some(names) => names,
            None => return Ok(Step::keep(path, value)),
        };
        let values = match &args[1] {
            Value::Array(values) => values.clone(),
            _ => return Ok(Step::keep(path, value)),
        };
        let body = &args[2];

        let scope = Rc::new(ScopeStack::with_base(self.resolver.clone()));
        let body_rules = scoped_rules(&scope, rules);

        debug!("{path}: iterating over {} values", values.len());
        let mut generated = Vec::with_capacity(values.len());
        for (idx, item) in values.iter().enumerate() {
            let mut frame = Map::new();
            if let Some(name) = &index_name {
                frame.insert(name.clone(), Value::from(idx));
            }
            if let Some(name) = &value_name {
                frame.insert(name.clone(), item.clone());
            }

            let frame = Rc::new(MapResolver::new(Value::from(frame)));
            let step = scope.scoped(frame, || body_rules.walk(&path.child(idx), body.clone()))?;
            if let Step::Continue(_, expanded) = step {
                generated.push(expanded);
            }
        }

        Ok(Step::keep(path, Value::from(generated)))
    }

    fn rebind(&self, resolver: &Rc<dyn Resolver>) -> Option<Rc<dyn Rule>> {
        Some(Rc::new(Self::new(resolver.clone())))
    }
}

/// `{"Fn::With": [bindings, body]}`: the body expanded once with the
/// bindings in scope.
#[derive(Clone)]
pub struct WithRule {
    resolver: Rc<dyn Resolver>,
}

impl WithRule {
    pub fn new(resolver: Rc<dyn Resolver>) -> Self {
        Self { resolver }
    }
}

impl Rule for WithRule {
    fn apply(&self, path: &Path, value: Value, rules: &RuleSet) -> Result<Step> {
        let args = match single_key(&value, "Fn::With") {
            Some(raw) => collect_args(path, raw, 2, rules)?,
            None => Args::Mismatch,
        };
        let args = match args {
            Args::Collected(args) => args,
            Args::Removed => return Ok(Step::Remove),
            Args::Mismatch => return Ok(Step::keep(path, value)),
        };
        if !matches!(args[0], Value::Object(_)) {
            return Ok(Step::keep(path, value));
        }

        let scope = Rc::new(ScopeStack::with_base(self.resolver.clone()));
        let body_rules = scoped_rules(&scope, rules);

        debug!("{path}: binding {}", args[0]);
        let frame = Rc::new(MapResolver::new(args[0].clone()));
        scope.scoped(frame, || body_rules.walk(path, args[1].clone()))
    }

    fn rebind(&self, resolver: &Rc<dyn Resolver>) -> Option<Rc<dyn Rule>> {
        Some(Rc::new(Self::new(resolver.clone())))
    }
}
