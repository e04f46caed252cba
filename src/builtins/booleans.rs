// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins;
use crate::builtins::utils::{ensure_args_count, ensure_bool, ensure_collection};
use crate::value::Value;

use std::collections::BTreeMap;

pub fn register(m: &mut BTreeMap<&'static str, builtins::BuiltinFcn>) {
    m.insert("Fn::And", and);
    m.insert("Fn::Equals", equals);
    m.insert("Fn::If", if_then_else);
    m.insert("Fn::Not", not);
    m.insert("Fn::Or", or);
}

// Conditions that are not literal booleans are left for the deployment
// service to evaluate.

fn if_then_else(args: &Value) -> Option<Value> {
    let args = ensure_args_count(args, 3)?;
    match ensure_bool(&args[0])? {
        true => Some(args[1].clone()),
        false => Some(args[2].clone()),
    }
}

fn conditions(args: &Value) -> Option<Vec<bool>> {
    let conditions = ensure_collection(args, ensure_bool)?;
    (conditions.len() >= 2).then_some(conditions)
}

fn and(args: &Value) -> Option<Value> {
    Some(Value::from(conditions(args)?.into_iter().all(|c| c)))
}

fn or(args: &Value) -> Option<Value> {
    Some(Value::from(conditions(args)?.into_iter().any(|c| c)))
}

fn not(args: &Value) -> Option<Value> {
    let args = ensure_args_count(args, 1)?;
    Some(Value::from(!ensure_bool(&args[0])?))
}

fn equals(args: &Value) -> Option<Value> {
    let args = ensure_args_count(args, 2)?;
    Some(Value::from(args[0] == args[1]))
}
