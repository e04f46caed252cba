// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Lookups of `[stack, "Outputs" | "Resources", item]` against deployed stacks.

use crate::error::ExpandError;
use crate::resolvers::Resolver;
use crate::value::{Map, Value};

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::Path as FsPath;
use std::rc::Rc;

use anyhow::{bail, Result};
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref STACK_NAME: Regex = Regex::new("^[a-zA-Z][-a-zA-Z0-9]*$").unwrap();
    static ref ITEM_NAME: Regex = Regex::new("^[a-zA-Z0-9]+$").unwrap();
}

const MAX_STACK_NAME: usize = 128;

fn is_valid_stack_name(name: &str) -> bool {
    name.len() < MAX_STACK_NAME && STACK_NAME.is_match(name)
}

fn is_valid_item_name(name: &str) -> bool {
    ITEM_NAME.is_match(name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackDescription {
    pub stack_name: String,
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackResource {
    pub logical_resource_id: String,
    pub physical_resource_id: String,
}

/// Access to the infrastructure service that owns deployed stacks.
///
/// Errors are treated by [`StackResolver`] as misses, since a path of the
/// right shape is not necessarily meant as a stack reference.
pub trait StackClient {
    fn describe_stacks(&self, stack: &str) -> Result<Vec<StackDescription>>;
    fn describe_stack_resources(&self, stack: &str) -> Result<Vec<StackResource>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackSection {
    Outputs,
    Resources,
}

impl StackSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackSection::Outputs => "Outputs",
            StackSection::Resources => "Resources",
        }
    }
}

/// Resolves one section of every stack the client knows about. Each stack
/// is described at most once.
pub struct StackResolver {
    client: Rc<dyn StackClient>,
    section: StackSection,
    cache: RefCell<HashMap<String, Value>>,
}

impl StackResolver {
    pub fn new(client: Rc<dyn StackClient>, section: StackSection) -> Self {
        Self {
            client,
            section,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn outputs(client: Rc<dyn StackClient>) -> Self {
        Self::new(client, StackSection::Outputs)
    }

    pub fn resources(client: Rc<dyn StackClient>) -> Self {
        Self::new(client, StackSection::Resources)
    }

    fn describe(&self, stack: &str) -> Result<Option<Value>> {
        let mut items = Map::new();
        match self.section {
            StackSection::Outputs => {
                let stacks = match self.client.describe_stacks(stack) {
                    Ok(stacks) => stacks,
                    Err(err) => {
                        warn!("describing stack {stack} failed: {err}");
                        return Ok(None);
                    }
                };
                if stacks.len() != 1 {
                    return Err(ExpandError::AmbiguousStack {
                        stack: stack.to_string(),
                        count: stacks.len(),
                    }
                    .into());
                }
                for (key, value) in &stacks[0].outputs {
                    items.insert(key.as_str().into(), Value::from(value.as_str()));
                }
            }
            StackSection::Resources => {
                let resources = match self.client.describe_stack_resources(stack) {
                    Ok(resources) => resources,
                    Err(err) => {
                        warn!("describing resources of stack {stack} failed: {err}");
                        return Ok(None);
                    }
                };
                for resource in resources {
                    items.insert(
                        resource.logical_resource_id.as_str().into(),
                        Value::from(resource.physical_resource_id),
                    );
                }
            }
        }

        debug!("described {} of stack {stack}", self.section.as_str());
        let items = Value::from(items);
        self.cache
            .borrow_mut()
            .insert(stack.to_string(), items.clone());
        Ok(Some(items))
    }
}

impl Resolver for StackResolver {
    fn get(&self, path: &[String]) -> Result<Option<Value>> {
        let [stack, section, item] = path else {
            return Ok(None);
        };
        if section != self.section.as_str()
            || !is_valid_stack_name(stack)
            || !is_valid_item_name(item)
        {
            return Ok(None);
        }

        let cached = self.cache.borrow().get(stack).cloned();
        let items = match cached {
            Some(items) => items,
            None => match self.describe(stack)? {
                Some(items) => items,
                None => return Ok(None),
            },
        };
        Ok(items.get_path(&[item]).cloned())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StaticStack {
    #[serde(default)]
    outputs: BTreeMap<String, String>,
    #[serde(default)]
    resources: BTreeMap<String, String>,
}

/// A [`StackClient`] over a fixed description of stacks:
///
/// ```json
/// {"network": {"Outputs": {"VpcId": "vpc-1"}, "Resources": {"Vpc": "vpc-1"}}}
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticStacks {
    stacks: BTreeMap<String, StaticStack>,
}

impl StaticStacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let stacks = serde_json::from_value(serde_json::to_value(value)?)?;
        Ok(Self { stacks })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_value(&Value::from_json_str(json)?)
    }

    pub fn from_file<P: AsRef<FsPath>>(path: P) -> Result<Self> {
        Self::from_value(&Value::from_file(path)?)
    }

    pub fn add_output(&mut self, stack: &str, key: &str, value: &str) {
        self.stacks
            .entry(stack.to_string())
            .or_default()
            .outputs
            .insert(key.to_string(), value.to_string());
    }

    pub fn add_resource(&mut self, stack: &str, logical_id: &str, physical_id: &str) {
        self.stacks
            .entry(stack.to_string())
            .or_default()
            .resources
            .insert(logical_id.to_string(), physical_id.to_string());
    }

    fn stack(&self, name: &str) -> Result<&StaticStack> {
        match self.stacks.get(name) {
            Some(stack) => Ok(stack),
            None => bail!("Stack with id {name} does not exist"),
        }
    }
}

impl StackClient for StaticStacks {
    fn describe_stacks(&self, stack: &str) -> Result<Vec<StackDescription>> {
        let found = self.stack(stack)?;
        Ok(vec![StackDescription {
            stack_name: stack.to_string(),
            outputs: found.outputs.clone(),
        }])
    }

    fn describe_stack_resources(&self, stack: &str) -> Result<Vec<StackResource>> {
        let found = self.stack(stack)?;
        Ok(found
            .resources
            .iter()
            .map(|(logical, physical)| StackResource {
                logical_resource_id: logical.clone(),
                physical_resource_id: physical.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolvers::tests::path;

    use std::cell::Cell;

    fn stacks() -> Rc<dyn StackClient> {
        Rc::new(
            StaticStacks::from_json_str(
                r#"{
                    "network": {
                        "Outputs": {"VpcId": "vpc-123"},
                        "Resources": {"Vpc": "vpc-123", "Subnet1": "subnet-9"}
                    }
                }"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn outputs_and_resources() -> Result<()> {
        let outputs = StackResolver::outputs(stacks());
        let resources = StackResolver::resources(stacks());

        assert_eq!(
            outputs.get(&path(&["network", "Outputs", "VpcId"]))?,
            Some(Value::from("vpc-123"))
        );
        assert_eq!(
            resources.get(&path(&["network", "Resources", "Subnet1"]))?,
            Some(Value::from("subnet-9"))
        );
        // each resolver answers only for its own section
        assert_eq!(outputs.get(&path(&["network", "Resources", "Vpc"]))?, None);
        Ok(())
    }

    #[test]
    fn malformed_paths_are_misses() -> Result<()> {
        let outputs = StackResolver::outputs(stacks());
        assert_eq!(outputs.get(&path(&["network", "Outputs"]))?, None);
        assert_eq!(outputs.get(&path(&["1network", "Outputs", "VpcId"]))?, None);
        assert_eq!(outputs.get(&path(&["network", "Outputs", "Vpc-Id"]))?, None);
        let long = "a".repeat(MAX_STACK_NAME);
        assert_eq!(outputs.get(&path(&[long.as_str(), "Outputs", "VpcId"]))?, None);
        Ok(())
    }

    #[test]
    fn client_errors_are_misses() -> Result<()> {
        let outputs = StackResolver::outputs(stacks());
        assert_eq!(outputs.get(&path(&["other", "Outputs", "VpcId"]))?, None);
        Ok(())
    }

    struct Counting {
        calls: Cell<usize>,
        stacks: Vec<StackDescription>,
    }

    impl StackClient for Counting {
        fn describe_stacks(&self, _stack: &str) -> Result<Vec<StackDescription>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.stacks.clone())
        }

        fn describe_stack_resources(&self, _stack: &str) -> Result<Vec<StackResource>> {
            Ok(vec![])
        }
    }

    #[test]
    fn stacks_are_described_once() -> Result<()> {
        let mut description = StackDescription {
            stack_name: "app".to_string(),
            ..Default::default()
        };
        description.outputs.insert("Url".to_string(), "https://x".to_string());
        let client = Rc::new(Counting {
            calls: Cell::new(0),
            stacks: vec![description],
        });

        let outputs = StackResolver::outputs(client.clone());
        assert!(outputs.get(&path(&["app", "Outputs", "Url"]))?.is_some());
        assert!(outputs.get(&path(&["app", "Outputs", "Other"]))?.is_none());
        assert_eq!(client.calls.get(), 1);
        Ok(())
    }

    #[test]
    fn ambiguous_stack_is_fatal() {
        let client = Rc::new(Counting {
            calls: Cell::new(0),
            stacks: vec![StackDescription::default(), StackDescription::default()],
        });
        let outputs = StackResolver::outputs(client);
        assert!(outputs.get(&path(&["app", "Outputs", "Url"])).is_err());
    }
}
