// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins;
use crate::builtins::utils::{ensure_array, ensure_collection};
use crate::value::Value;

use std::collections::BTreeMap;

pub fn register(m: &mut BTreeMap<&'static str, builtins::BuiltinFcn>) {
    m.insert("Fn::Concat", concat);
    m.insert("Fn::Unique", unique);
}

fn concat(args: &Value) -> Option<Value> {
    let arrays = ensure_collection(args, ensure_array)?;
    let concatenated: Vec<Value> = arrays.into_iter().flatten().cloned().collect();
    Some(Value::from(concatenated))
}

fn unique(args: &Value) -> Option<Value> {
    let mut filtered: Vec<Value> = vec![];
    for item in ensure_array(args)? {
        if !filtered.contains(item) {
            filtered.push(item.clone());
        }
    }
    Some(Value::from(filtered))
}
