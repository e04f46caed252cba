// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::resolvers::Resolver;
use crate::value::Value;

use std::rc::Rc;

use anyhow::Result;

/// An ordered list of resolvers; the first one that finds a path wins.
#[derive(Clone, Default)]
pub struct OrderedFallback {
    fallbacks: Vec<Rc<dyn Resolver>>,
}

impl OrderedFallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `fallback` with the lowest priority.
    pub fn attach(&mut self, fallback: Rc<dyn Resolver>) {
        self.fallbacks.push(fallback);
    }

    /// Prepends `fallback` with the highest priority.
    pub fn override_with(&mut self, fallback: Rc<dyn Resolver>) {
        self.fallbacks.insert(0, fallback);
    }

    pub fn len(&self) -> usize {
        self.fallbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fallbacks.is_empty()
    }
}

impl Resolver for OrderedFallback {
    fn get(&self, path: &[String]) -> Result<Option<Value>> {
        for fallback in &self.fallbacks {
            if let Some(found) = fallback.get(path)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}
