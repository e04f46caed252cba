// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use condense::*;

#[test]
fn serialize_number() -> Result<()> {
    // Check that integer values are serialized without fractional part
    assert_eq!(serde_json::to_string_pretty(&Value::from(1.0))?, "1");
    assert_eq!(serde_json::to_string_pretty(&Value::from(-1.0))?, "-1");
    assert_eq!(serde_json::to_string_pretty(&Value::from(0.5))?, "0.5");
    Ok(())
}

#[test]
fn objects_are_written_in_key_order() -> Result<()> {
    let v = Value::from_json_str(r#"{"b": 1, "a": [true, null, "x"]}"#)?;
    assert_eq!(serde_json::to_string(&v)?, r#"{"a":[true,null,"x"],"b":1}"#);
    Ok(())
}

#[test]
fn yaml_and_json_agree() -> Result<()> {
    let from_yaml = Value::from_yaml_str("Name: web\nPorts: [80, 443]\nTags:\n  Team: core\n")?;
    let from_json =
        Value::from_json_str(r#"{"Name": "web", "Ports": [80, 443], "Tags": {"Team": "core"}}"#)?;
    assert_eq!(from_yaml, from_json);
    Ok(())
}

#[test]
fn constructors() -> Result<()> {
    assert_eq!(Value::new_object(), Value::from_json_str("{}")?);
    assert_eq!(Value::new_array(), Value::from_json_str("[]")?);
    assert_eq!(Value::from(3usize), Value::from(3.0));
    assert_eq!(Value::from(-2i64), Value::from(-2.0));
    assert!(Value::new_object().is_empty_object());
    Ok(())
}

#[test]
fn index_misses_are_null() -> Result<()> {
    let v = Value::from_json_str(r#"{"a": {"b": [10, 20]}}"#)?;
    assert_eq!(v["a"]["b"][1], Value::from(20.0));
    assert_eq!(v["a"]["b"][5], Value::Null);
    assert_eq!(v["missing"]["deeper"], Value::Null);
    assert_eq!(v[0], Value::Null);
    Ok(())
}

#[test]
fn accessors() -> Result<()> {
    let mut v = Value::from_json_str(r#"{"s": "x", "n": 2, "b": true, "l": [1]}"#)?;
    assert_eq!(&**v["s"].as_string()?, "x");
    assert_eq!(v["n"].as_number()?, 2.0);
    assert!(*v["b"].as_bool()?);
    assert_eq!(v["l"].as_array()?.len(), 1);
    assert!(v["s"].as_number().is_err());
    assert!(v["l"].as_object().is_err());

    v.as_object_mut()?.insert("new".into(), Value::Null);
    assert!(v["new"].is_null());
    assert_eq!(v.as_object()?.len(), 5);
    Ok(())
}

#[test]
fn references_split_outside_brackets() {
    assert_eq!(split_ref("a.b.c"), vec!["a", "b", "c"]);
    assert_eq!(split_ref("Sizes.[Env.Name]"), vec!["Sizes", "[Env.Name]"]);
    assert_eq!(split_ref("Name"), vec!["Name"]);
}
