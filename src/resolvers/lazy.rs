// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::ExpandError;
use crate::path::{Path, Segment};
use crate::resolvers::Resolver;
use crate::rule::{RuleSet, Step};
use crate::value::Value;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use anyhow::Result;
use log::debug;

/// Expands values of a base resolver through a rule set on first use.
///
/// Outcomes are cached by dotted path, negatives included. A path is marked
/// not-found while its own value is being expanded, so a value that refers
/// back to itself sees a miss instead of recursing. The cache is never
/// invalidated.
pub struct LazyResolver {
    name: String,
    base: Rc<dyn Resolver>,
    rules: Weak<RuleSet>,
    cache: RefCell<HashMap<String, Option<Value>>>,
}

impl LazyResolver {
    /// `rules` is held weakly since the rule set usually reaches back to this
    /// resolver through its reference rules.
    pub fn new(name: impl Into<String>, base: Rc<dyn Resolver>, rules: Weak<RuleSet>) -> Self {
        Self {
            name: name.into(),
            base,
            rules,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn remember(&self, key: String, outcome: Option<Value>) -> Option<Value> {
        self.cache.borrow_mut().insert(key, outcome.clone());
        outcome
    }

    fn expand(&self, key: String, last: &str, raw: Value) -> Result<Option<Value>> {
        let rules = self
            .rules
            .upgrade()
            .ok_or_else(|| ExpandError::DetachedRules(self.name.clone()))?;

        // In progress: self-references resolve as not-found.
        self.remember(key.clone(), None);

        debug!("lazily expanding {} in {}", key, self.name);
        let at = Path::new(vec![Segment::from(last)]);
        let outcome = match rules.walk(&at, raw)? {
            Step::Continue(Some(Segment::Key(k)), value) if k.as_ref() == last => Some(value),
            // removed or renamed away
            _ => None,
        };
        Ok(self.remember(key, outcome))
    }
}

impl Resolver for LazyResolver {
    fn get(&self, path: &[String]) -> Result<Option<Value>> {
        let Some((last, head)) = path.split_last() else {
            return Ok(None);
        };

        let key = path.join(".");
        let cached = self.cache.borrow().get(&key).cloned();
        if let Some(outcome) = cached {
            return Ok(outcome);
        }

        if let Some(raw) = self.base.get(path)? {
            return self.expand(key, last, raw);
        }

        if head.is_empty() {
            return Ok(None);
        }

        // Reuse the expanded ancestor instead of expanding the descendant alone.
        match self.get(head)? {
            Some(parent) => match parent.get_path(std::slice::from_ref(last)) {
                Some(found) => Ok(self.remember(key, Some(found.clone()))),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }
}
