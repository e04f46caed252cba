// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins;
use crate::builtins::utils::{
    ensure_args_count, ensure_array, ensure_collection, ensure_numeric, ensure_object,
    ensure_string,
};
use crate::value::{Map, Value};

use std::collections::BTreeMap;

pub fn register(m: &mut BTreeMap<&'static str, builtins::BuiltinFcn>) {
    m.insert("Fn::FromEntries", from_entries);
    m.insert("Fn::HasKey", has_key);
    m.insert("Fn::Keys", keys);
    m.insert("Fn::Merge", merge);
    m.insert("Fn::MergeDeep", merge_deep);
    m.insert("Fn::ToEntries", to_entries);
}

fn merge(args: &Value) -> Option<Value> {
    let mut merged = Map::new();
    for object in ensure_collection(args, ensure_object)? {
        for (key, value) in object.iter() {
            merged.insert(key.clone(), value.clone());
        }
    }
    Some(Value::from(merged))
}

/// Merges `objects` left to right. While `depth` is positive, a key that
/// holds an object on both sides is merged one level further down instead of
/// being replaced.
fn deep_merge(depth: i64, objects: &[&Map]) -> Map {
    let mut merged = Map::new();
    for object in objects {
        for (key, value) in object.iter() {
            let combined = match (merged.get(key), value) {
                (Some(Value::Object(earlier)), Value::Object(later)) if depth > 0 => {
                    Value::from(deep_merge(depth - 1, &[earlier.as_ref(), later.as_ref()]))
                }
                _ => value.clone(),
            };
            merged.insert(key.clone(), combined);
        }
    }
    merged
}

fn merge_deep(args: &Value) -> Option<Value> {
    let args = ensure_args_count(args, 2)?;
    let depth = ensure_numeric(&args[0])?.trunc() as i64;
    let objects = ensure_collection(&args[1], ensure_object)?;
    Some(Value::from(deep_merge(depth, &objects)))
}

fn keys(args: &Value) -> Option<Value> {
    let object = ensure_object(args)?;
    let keys: Vec<Value> = object.keys().map(|k| Value::from(k.clone())).collect();
    Some(Value::from(keys))
}

fn to_entries(args: &Value) -> Option<Value> {
    let object = ensure_object(args)?;
    let entries: Vec<Value> = object
        .iter()
        .map(|(key, value)| {
            let mut entry = Map::new();
            entry.insert("key".into(), Value::from(key.clone()));
            entry.insert("value".into(), value.clone());
            Value::from(entry)
        })
        .collect();
    Some(Value::from(entries))
}

fn from_entries(args: &Value) -> Option<Value> {
    let mut object = Map::new();
    for entry in ensure_array(args)? {
        let entry = ensure_object(entry)?;
        let key = ensure_string(entry.get("key")?)?;
        let value = entry.get("value")?;
        object.insert(key.clone(), value.clone());
    }
    Some(Value::from(object))
}

fn has_key(args: &Value) -> Option<Value> {
    let args = ensure_args_count(args, 2)?;
    let key = ensure_string(&args[0])?;
    let object = ensure_object(&args[1])?;
    Some(Value::from(object.contains_key(key)))
}
