// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::ExpandError;
use crate::path::{Path, Segment};
use crate::rule::{Phase, RuleSet, Step};
use crate::value::{Map, Value};

use anyhow::Result;

/// Rewrites `value` found at `path`.
///
/// `Early` rules run first and may remove the node before its children are
/// seen. Children are then walked (removed children are dropped, renamed
/// object entries are re-keyed) and finally `Depth` rules run on the rebuilt
/// node.
pub fn walk(path: &Path, value: Value, rules: &RuleSet) -> Result<Step> {
    let (path, value) = match rules.apply_phase(Phase::Early, path, value)? {
        Step::Remove => return Ok(Step::Remove),
        Step::Continue(key, value) => (path.renamed(key), value),
    };

    let value = match value {
        Value::Array(items) => {
            let mut walked = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                if let Step::Continue(_, item) = walk(&path.child(idx), item.clone(), rules)? {
                    walked.push(item);
                }
            }
            Value::from(walked)
        }
        Value::Object(fields) => {
            let mut walked = Map::new();
            for (key, field) in fields.iter() {
                let child = path.child(key.clone());
                match walk(&child, field.clone(), rules)? {
                    Step::Remove => (),
                    Step::Continue(Some(Segment::Key(key)), field) => {
                        walked.insert(key, field);
                    }
                    Step::Continue(other, _) => {
                        return Err(ExpandError::InvalidRename {
                            path: child.to_string(),
                            key: other.map(|k| k.to_string()).unwrap_or_default(),
                        }
                        .into())
                    }
                }
            }
            Value::from(walked)
        }
        scalar @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)) => scalar,
    };

    rules.apply_phase(Phase::Depth, &path, value)
}

/// Walks a whole document. A removed document becomes `Null`.
pub fn process(value: Value, rules: &RuleSet) -> Result<Value> {
    Ok(walk(&Path::root(), value, rules)?
        .value()
        .unwrap_or(Value::Null))
}
