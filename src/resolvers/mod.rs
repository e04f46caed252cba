// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Layered variable resolution.
//!
//! Every source of values (parameters, loop bindings, remote stacks) is a
//! [`Resolver`]. Resolvers compose: [`OrderedFallback`] tries a list in order,
//! [`ScopeStack`] searches innermost scope first, [`AliasResolver`] expands
//! `[inner.path]` segments and [`LazyResolver`] expands values through a rule
//! set on first use.

pub mod alias;
pub mod fallback;
pub mod lazy;
pub mod scope;
pub mod stacks;

pub use alias::AliasResolver;
pub use fallback::OrderedFallback;
pub use lazy::LazyResolver;
pub use scope::ScopeStack;
pub use stacks::{
    StackClient, StackDescription, StackResolver, StackResource, StackSection, StaticStacks,
};

use crate::value::Value;

use std::rc::Rc;

use anyhow::Result;

/// Uniform lookup contract. `Ok(None)` is an ordinary miss.
pub trait Resolver {
    fn get(&self, path: &[String]) -> Result<Option<Value>>;
}

impl<F> Resolver for F
where
    F: Fn(&[String]) -> Result<Option<Value>>,
{
    fn get(&self, path: &[String]) -> Result<Option<Value>> {
        self(path)
    }
}

/// Resolves paths inside a fixed document. Only objects are descended; the
/// empty path yields the whole document.
#[derive(Debug, Clone)]
pub struct MapResolver {
    document: Value,
}

impl MapResolver {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }
}

impl Resolver for MapResolver {
    fn get(&self, path: &[String]) -> Result<Option<Value>> {
        Ok(self.document.get_path(path).cloned())
    }
}

/// Wraps a scope stack into the chain seen by rules: bracketed aliases are
/// expanded against the stack first, plain paths go straight to it.
pub fn scoped_chain(stack: Rc<ScopeStack>) -> Rc<dyn Resolver> {
    let mut chain = OrderedFallback::new();
    chain.attach(Rc::new(AliasResolver::new(stack.clone())));
    chain.attach(stack);
    Rc::new(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn path(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn map_resolver_descends_objects_only() -> Result<()> {
        let map = MapResolver::new(Value::from_json_str(
            r#"{"a": {"b": "c"}, "list": [{"x": 1}]}"#,
        )?);
        assert_eq!(map.get(&path(&["a", "b"]))?, Some(Value::from("c")));
        assert_eq!(map.get(&path(&["a", "missing"]))?, None);
        assert_eq!(map.get(&path(&["list", "0", "x"]))?, None);
        assert_eq!(map.get(&[])?, Some(map.document().clone()));
        Ok(())
    }

    #[test]
    fn closures_are_resolvers() -> Result<()> {
        let resolver = |p: &[String]| -> Result<Option<Value>> {
            Ok((p.len() == 1).then(|| Value::from(p[0].as_str())))
        };
        assert_eq!(resolver.get(&path(&["echo"]))?, Some(Value::from("echo")));
        assert_eq!(resolver.get(&path(&["a", "b"]))?, None);
        Ok(())
    }
}
