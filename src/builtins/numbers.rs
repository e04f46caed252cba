// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins;
use crate::builtins::utils::{ensure_args_count, ensure_array, ensure_collection, ensure_numeric};
use crate::value::Value;

use std::collections::BTreeMap;

pub fn register(m: &mut BTreeMap<&'static str, builtins::BuiltinFcn>) {
    m.insert("Fn::Add", add);
    m.insert("Fn::Length", length);
    m.insert("Fn::Mod", modulo);
}

fn add(args: &Value) -> Option<Value> {
    let terms = ensure_collection(args, ensure_numeric)?;
    Some(Value::from(terms.iter().sum::<f64>()))
}

fn length(args: &Value) -> Option<Value> {
    Some(Value::from(ensure_array(args)?.len()))
}

/// Remainder of the truncated operands. Division by zero is not an
/// invocation.
fn modulo(args: &Value) -> Option<Value> {
    let args = ensure_args_count(args, 2)?;
    let dividend = ensure_numeric(&args[0])?.trunc() as i64;
    let divisor = ensure_numeric(&args[1])?.trunc() as i64;
    Some(Value::from(dividend.checked_rem(divisor)?))
}
