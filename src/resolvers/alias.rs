// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::path::{is_alias, split_ref};
use crate::resolvers::Resolver;
use crate::value::Value;

use std::rc::Rc;

use anyhow::Result;
use log::debug;

/// Expands `[inner.path]` segments.
///
/// Each bracketed segment is looked up as `inner.path` and, if it names a
/// string, replaced by that string; the translated path is then looked up in
/// the base resolver. A path in which nothing was translated is a miss, which
/// keeps an alias resolver that sits in its own base chain from recursing.
pub struct AliasResolver {
    base: Rc<dyn Resolver>,
}

impl AliasResolver {
    pub fn new(base: Rc<dyn Resolver>) -> Self {
        Self { base }
    }

    /// Resolves the inside of a bracketed segment. Nested aliases are allowed
    /// and always shorter than the segment that contains them.
    fn dealias_segment(&self, segment: &str) -> Result<Option<String>> {
        let inner = split_ref(&segment[1..segment.len() - 1]);
        let found = if inner.iter().any(|s| is_alias(s)) {
            self.get(&inner)?
        } else {
            self.base.get(&inner)?
        };
        Ok(match found {
            Some(Value::String(s)) => Some(s.to_string()),
            _ => None,
        })
    }

    /// Returns the translated path and whether any segment was translated.
    pub fn dealias(&self, path: &[String]) -> Result<(Vec<String>, bool)> {
        let mut translated = Vec::with_capacity(path.len());
        let mut did_translate = false;
        for segment in path {
            if is_alias(segment) {
                if let Some(name) = self.dealias_segment(segment)? {
                    translated.push(name);
                    did_translate = true;
                    continue;
                }
            }
            translated.push(segment.clone());
        }
        Ok((translated, did_translate))
    }
}

impl Resolver for AliasResolver {
    fn get(&self, path: &[String]) -> Result<Option<Value>> {
        if !path.iter().any(|s| is_alias(s)) {
            return Ok(None);
        }

        let (translated, did_translate) = self.dealias(path)?;
        if !did_translate {
            return Ok(None);
        }
        debug!("alias {} -> {}", path.join("."), translated.join("."));
        self.base.get(&translated)
    }
}
