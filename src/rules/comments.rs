// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::path::Path;
use crate::rule::{Rule, RuleSet, Step};
use crate::value::Value;

use std::rc::Rc;

use anyhow::Result;

pub const COMMENT_KEY: &str = "$comment";

/// Strips `$comment` entries. An object that holds nothing but a comment is
/// removed altogether.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcludeComments;

impl Rule for ExcludeComments {
    fn apply(&self, path: &Path, value: Value, _rules: &RuleSet) -> Result<Step> {
        let mut value = value;
        if let Value::Object(fields) = &mut value {
            if fields.contains_key(COMMENT_KEY) {
                if fields.len() == 1 {
                    return Ok(Step::Remove);
                }
                Rc::make_mut(fields).remove(COMMENT_KEY);
            }
        }
        Ok(Step::keep(path, value))
    }
}
