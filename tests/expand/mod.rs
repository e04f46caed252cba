// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{bail, Result};
use condense::resolvers::StaticStacks;
use condense::rules::{FileComponents, MemoryFiles};
use condense::*;
use serde::Deserialize;
use test_generator::test_resources;

#[derive(Deserialize, Debug)]
struct TestCase {
    note: String,
    template: Value,
    parameters: Option<Vec<Value>>,
    stacks: Option<Value>,
    files: Option<BTreeMap<String, String>>,
    reduce_conditions: Option<bool>,
    want_result: Option<Value>,
    want_parameters: Option<Value>,
    error: Option<String>,
    skip: Option<bool>,
}

#[derive(Deserialize, Debug)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn expand(case: &TestCase) -> Result<Expansion> {
    let mut engine = Engine::new();

    if let Some(parameters) = &case.parameters {
        for (idx, document) in parameters.iter().enumerate() {
            engine.add_parameters(&format!("params_{idx}"), document.clone())?;
        }
    }

    if let Some(stacks) = &case.stacks {
        engine.add_stack_client(Rc::new(StaticStacks::from_value(stacks)?));
    }

    if let Some(contents) = &case.files {
        let mut files = MemoryFiles::new();
        for (path, text) in contents {
            files.add(path, text.as_str());
        }
        let files = Rc::new(files);
        engine.set_file_source(files.clone());
        engine.set_component_source(Rc::new(FileComponents::new(
            files,
            vec!["components".to_string()],
        )));
    }

    if let Some(reduce) = case.reduce_conditions {
        engine.set_reduce_conditions(reduce);
    }

    engine.expand(&case.template)
}

fn check_value(what: &str, computed: &Value, expected: &Value) -> Result<()> {
    if computed != expected {
        bail!(
            "{what} mismatch\nleft  = {}\nright = {}\n",
            computed.to_json_str()?,
            expected.to_json_str()?
        );
    }
    Ok(())
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    std::eprintln!("running {file}");

    for case in test.cases {
        std::print!("case {} ", case.note);
        if case.skip == Some(true) {
            std::println!("skipped");
            continue;
        }

        match (&case.want_result, &case.error) {
            (Some(_), None) | (None, Some(_)) => (),
            _ => panic!("either want_result or error must be specified in test case."),
        }

        match (expand(&case), &case.want_result, &case.error) {
            (Ok(expansion), Some(want_result), _) => {
                check_value("template", &expansion.template, want_result)?;
                if let Some(want_parameters) = &case.want_parameters {
                    let parameters =
                        Value::from_json_str(&serde_json::to_string(&expansion.parameters)?)?;
                    check_value("parameters", &parameters, want_parameters)?;
                }
            }
            (Ok(expansion), None, _) => bail!(
                "expansion succeeded and did not produce any errors\n{}",
                expansion.template.to_json_str()?
            ),
            (Err(actual), _, Some(expected)) => {
                if !actual.to_string().contains(expected.as_str()) {
                    bail!("Error message\n`{actual}`\ndoes not contain `{expected}`");
                }
            }
            (Err(actual), _, None) => return Err(actual),
        }

        std::println!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{e}");
        }
    }
}

#[test_resources("tests/expand/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
