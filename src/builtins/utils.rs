// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::value::{Map, Value};

use std::rc::Rc;

/// Returns the argument of `{name: args}`. Objects with any other key, or
/// with more than one key, are not invocations of `name`.
pub fn single_key<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    match value {
        Value::Object(fields) if fields.len() == 1 => fields.get(name),
        _ => None,
    }
}

pub fn ensure_array(v: &Value) -> Option<&Vec<Value>> {
    v.as_array().ok()
}

/// The argument list, which must hold exactly `expected` items.
pub fn ensure_args_count(v: &Value, expected: usize) -> Option<&[Value]> {
    match ensure_array(v) {
        Some(args) if args.len() == expected => Some(args.as_slice()),
        _ => None,
    }
}

pub fn ensure_bool(v: &Value) -> Option<bool> {
    v.as_bool().ok().copied()
}

pub fn ensure_numeric(v: &Value) -> Option<f64> {
    v.as_number().ok()
}

pub fn ensure_string(v: &Value) -> Option<&Rc<str>> {
    v.as_string().ok()
}

pub fn ensure_object(v: &Value) -> Option<&Map> {
    v.as_object().ok()
}

/// Every element of the array `v`, converted by `f`. A single failed
/// conversion fails the whole collection.
pub fn ensure_collection<'a, T>(
    v: &'a Value,
    f: impl Fn(&'a Value) -> Option<T>,
) -> Option<Vec<T>> {
    ensure_array(v)?.iter().map(f).collect()
}
