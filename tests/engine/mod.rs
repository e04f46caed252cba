// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::rc::Rc;

use anyhow::{bail, Result};
use condense::builtins::attach_builtins;
use condense::resolvers::*;
use condense::rules::*;
use condense::*;

fn json(s: &str) -> Value {
    Value::from_json_str(s).unwrap()
}

#[test]
fn custom_rules_join_the_walk() -> Result<()> {
    struct Upper;

    impl Rule for Upper {
        fn apply(&self, path: &Path, value: Value, _rules: &RuleSet) -> Result<Step> {
            let arg = match &value {
                Value::Object(fields) if fields.len() == 1 => fields.get("Fn::Upper").cloned(),
                _ => None,
            };
            match arg {
                Some(Value::String(s)) => Ok(Step::keep(path, Value::from(s.to_uppercase()))),
                _ => Ok(Step::keep(path, value)),
            }
        }
    }

    let mut rules = RuleSet::new();
    attach_builtins(&mut rules);
    rules.attach(Upper);

    let doc = json(
        r#"{
            "a": {"Fn::Upper": {"Fn::Join": ["-", ["x", "y"]]}},
            "b": {"Fn::Upper": 1}
        }"#,
    );
    assert_eq!(
        rules.process(doc)?,
        json(r#"{"a": "X-Y", "b": {"Fn::Upper": 1}}"#)
    );
    Ok(())
}

#[test]
fn closures_are_rules_and_resolvers() -> Result<()> {
    let lookups = |path: &[String]| -> Result<Option<Value>> {
        Ok(match path {
            [name] if name == "Region" => Some(Value::from("westus")),
            _ => None,
        })
    };

    let mut rules = RuleSet::new();
    rules.attach_early(|path: &Path, value: Value| -> Result<Step> {
        match &value {
            Value::String(s) if &**s == "drop" => Ok(Step::Remove),
            _ => Ok(Step::keep(path, value)),
        }
    });
    rules.attach(RefRule::new(Rc::new(lookups)));

    let doc = json(r#"{"list": ["a", "drop", {"Ref": "Region"}], "gone": "drop"}"#);
    assert_eq!(rules.process(doc)?, json(r#"{"list": ["a", "westus"]}"#));
    Ok(())
}

#[test]
fn scopes_shadow_and_restore() -> Result<()> {
    let base = Rc::new(MapResolver::new(json(r#"{"outer": "o", "masked": "outer-m"}"#)));
    let stack = Rc::new(ScopeStack::with_base(base));
    let chain = scoped_chain(stack.clone());
    let get = |name: &str| chain.get(&[name.to_string()]);

    stack.push(Rc::new(MapResolver::new(json(r#"{"masked": "inner"}"#))));
    assert_eq!(get("masked")?, Some(Value::from("inner")));
    assert_eq!(get("outer")?, Some(Value::from("o")));

    stack.pop();
    assert_eq!(get("masked")?, Some(Value::from("outer-m")));
    Ok(())
}

#[test]
fn scopes_are_popped_on_error() -> Result<()> {
    let stack = ScopeStack::new();
    let frame = Rc::new(MapResolver::new(json(r#"{"x": 1}"#)));
    let failed: Result<()> = stack.scoped(frame, || bail!("body failed"));
    assert!(failed.is_err());
    assert_eq!(stack.depth(), 0);
    Ok(())
}

#[test]
fn parameter_files_are_read() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("condense-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let json_file = dir.join("params.json");
    let yaml_file = dir.join("override.yaml");
    std::fs::write(&json_file, r#"{"Env": "dev", "Team": "core"}"#)?;
    std::fs::write(&yaml_file, "Env: prod\n")?;

    let mut engine = Engine::new();
    engine.add_parameters_from_file(&json_file)?;
    engine.add_parameters_from_file(&yaml_file)?;
    let expansion = engine.expand(&json(r#"[{"Ref": "Env"}, {"Ref": "Team"}]"#))?;
    std::fs::remove_dir_all(&dir)?;

    assert_eq!(expansion.template, json(r#"["prod", "core"]"#));

    let source = yaml_file.display().to_string();
    let credentials = expansion.credentials_for(&source).unwrap();
    assert_eq!(credentials.document["Env"], Value::from("prod"));
    assert_eq!(
        credentials.document["$comment"]["filename"],
        Value::from(source.as_str())
    );
    assert!(expansion.credentials_for("unknown").is_none());
    Ok(())
}

#[test]
fn missing_parameter_file_is_an_error() {
    let mut engine = Engine::new();
    assert!(engine
        .add_parameters_from_file("/nonexistent/condense/params.json")
        .is_err());
    assert!(engine.parameter_sources().is_empty());
}

#[test]
fn ambiguous_stacks_are_fatal() -> Result<()> {
    struct Twins;

    impl StackClient for Twins {
        fn describe_stacks(&self, stack: &str) -> Result<Vec<StackDescription>> {
            let twin = StackDescription {
                stack_name: stack.to_string(),
                ..Default::default()
            };
            Ok(vec![twin.clone(), twin])
        }

        fn describe_stack_resources(&self, _stack: &str) -> Result<Vec<StackResource>> {
            bail!("not reachable")
        }
    }

    let mut engine = Engine::new();
    engine.add_stack_client(Rc::new(Twins));

    let err = engine
        .expand(&json(r#"{"Ref": "network.Outputs.VpcId"}"#))
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("did not return exactly one Stack (got 2)"));

    // Failing resource lookups are misses.
    let expanded = engine.expand_template(&json(r#"{"Ref": "network.Resources.Vpc"}"#))?;
    assert_eq!(expanded, json(r#"{"Ref": "network.Resources.Vpc"}"#));
    Ok(())
}

#[test]
fn file_includes_use_the_configured_source() -> Result<()> {
    let mut files = MemoryFiles::new();
    files.add("parts/tags.json", r#"{"Team": {"Ref": "Team"}}"#);

    let mut engine = Engine::new();
    engine.set_file_source(Rc::new(files));
    engine.add_parameters("inline", json(r#"{"Team": "core"}"#))?;

    let expanded = engine.expand_template(&json(
        r#"{
            "Tags": {"Fn::IncludeFile": "parts/tags.json"},
            "Raw": {"Fn::IncludeFileRaw": "parts/tags.json"}
        }"#,
    ))?;
    assert_eq!(expanded["Tags"], json(r#"{"Team": "core"}"#));
    assert_eq!(
        expanded["Raw"],
        Value::from(r#"{"Team": {"Ref": "Team"}}"#)
    );
    Ok(())
}
