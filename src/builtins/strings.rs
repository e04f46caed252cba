// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins;
use crate::builtins::utils::{ensure_args_count, ensure_collection, ensure_string};
use crate::value::Value;

use std::collections::BTreeMap;

pub fn register(m: &mut BTreeMap<&'static str, builtins::BuiltinFcn>) {
    m.insert("Fn::Join", join);
    m.insert("Fn::Split", split);
}

/// Numbers are joined as integers.
fn piece(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.to_string()),
        Value::Number(n) => Some(format!("{}", n.trunc() as i64)),
        _ => None,
    }
}

fn join(args: &Value) -> Option<Value> {
    let args = ensure_args_count(args, 2)?;
    let glue = ensure_string(&args[0])?;
    let pieces = ensure_collection(&args[1], piece)?;
    Some(Value::from(pieces.join(&**glue)))
}

fn split(args: &Value) -> Option<Value> {
    let args = ensure_args_count(args, 2)?;
    let glue = ensure_string(&args[0])?;
    let joined = ensure_string(&args[1])?;
    let pieces: Vec<Value> = match glue.as_ref() {
        "" => joined.chars().map(|c| Value::from(c.to_string())).collect(),
        glue => joined.split(glue).map(Value::from).collect(),
    };
    Some(Value::from(pieces))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(s: &str) -> Value {
        Value::from_json_str(s).unwrap()
    }

    #[test]
    fn join_strings_and_numbers() {
        assert_eq!(join(&json(r#"[",", ["a", "b", "c"]]"#)), Some(Value::from("a,b,c")));
        assert_eq!(join(&json(r#"["-", ["a", 1, 2.7]]"#)), Some(Value::from("a-1-2")));
        assert_eq!(join(&json(r#"[",", []]"#)), Some(Value::from("")));
        assert_eq!(join(&json(r#"[",", ["a", true]]"#)), None);
        assert_eq!(join(&json(r#"[1, ["a"]]"#)), None);
    }

    #[test]
    fn split_on_glue() {
        assert_eq!(
            split(&json(r#"[",", "a,b,,c"]"#)),
            Some(json(r#"["a", "b", "", "c"]"#))
        );
        assert_eq!(split(&json(r#"["", "abc"]"#)), Some(json(r#"["a", "b", "c"]"#)));
        assert_eq!(split(&json(r#"[",", ""]"#)), Some(json(r#"[""]"#)));
        assert_eq!(split(&json(r#"[",", 1]"#)), None);
    }
}
