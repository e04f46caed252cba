// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::attach_builtins;
use crate::error::ExpandError;
use crate::resolvers::*;
use crate::rule::RuleSet;
use crate::rules::*;
use crate::value::*;

use std::path::Path;
use std::rc::{Rc, Weak};

use anyhow::Result;
use log::info;
use serde::Serialize;

/// A named parameters document.
#[derive(Debug, Clone)]
struct ParameterSource {
    name: String,
    document: Value,
}

/// A declared template parameter with the value supplied for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterValue {
    pub parameter_key: String,
    pub parameter_value: String,
    pub use_previous_value: bool,
}

impl ParameterValue {
    fn new(key: &str, value: &Value) -> Result<Self> {
        let parameter_value = match value {
            Value::String(s) => s.to_string(),
            other => serde_json::to_string(other)?,
        };
        Ok(Self {
            parameter_key: key.to_string(),
            parameter_value,
            use_previous_value: false,
        })
    }
}

/// A parameters source after expansion, tagged with the source it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub source: String,
    pub document: Value,
}

/// Everything an expansion produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    /// The expanded template.
    pub template: Value,
    /// Values for the parameters the template declares, in name order.
    pub parameters: Vec<ParameterValue>,
    /// Every parameters source, expanded, in the order it was added.
    pub credentials: Vec<Credentials>,
}

impl Expansion {
    pub fn credentials_for(&self, source: &str) -> Option<&Credentials> {
        self.credentials.iter().find(|c| c.source == source)
    }
}

/// Rules and parameter chain of one pass over the template.
struct Pass {
    rules: Rc<RuleSet>,
    parameters: Rc<OrderedFallback>,
}

/// The template expansion engine.
#[derive(Clone)]
pub struct Engine {
    sources: Vec<ParameterSource>,
    files: Rc<dyn FileSource>,
    components: Option<Rc<dyn ComponentSource>>,
    stacks: Vec<Rc<dyn StackClient>>,
    reduce_conditions: bool,
}

/// Create a default engine.
impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            sources: vec![],
            files: Rc::new(OsFiles::new()),
            components: None,
            stacks: vec![],
            reduce_conditions: true,
        }
    }

    /// Adds a parameters document: an object, or an array of objects each of
    /// which becomes a source named `name[i]`. Sources added later take
    /// priority over earlier ones.
    pub fn add_parameters(&mut self, name: &str, document: Value) -> Result<()> {
        let objects = match &document {
            Value::Object(_) => vec![document.clone()],
            Value::Array(items) if items.iter().all(|i| matches!(i, Value::Object(_))) => {
                items.to_vec()
            }
            _ => return Err(ExpandError::InvalidParameters(name.to_string()).into()),
        };

        let numbered = objects.len() > 1;
        for (idx, document) in objects.into_iter().enumerate() {
            let name = match numbered {
                true => format!("{name}[{idx}]"),
                false => name.to_string(),
            };
            info!("adding parameters from {name}");
            self.sources.push(ParameterSource { name, document });
        }
        Ok(())
    }

    pub fn add_parameters_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let document = Value::from_file(path)?;
        self.add_parameters(&path.display().to_string(), document)
    }

    /// Names of the parameter sources, in the order they were added.
    pub fn parameter_sources(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn set_file_source(&mut self, files: Rc<dyn FileSource>) {
        self.files = files;
    }

    pub fn set_component_source(&mut self, components: Rc<dyn ComponentSource>) {
        self.components = Some(components);
    }

    /// Resolves `[stack, "Outputs" | "Resources", item]` through `client`.
    pub fn add_stack_client(&mut self, client: Rc<dyn StackClient>) {
        self.stacks.push(client);
    }

    pub fn set_reduce_conditions(&mut self, b: bool) {
        self.reduce_conditions = b;
    }

    fn attach_rules(&self, rules: &mut RuleSet, chain: &Rc<dyn Resolver>, keep_params: bool) {
        rules.attach_early(ExcludeComments);
        rules.attach_early(ForRule::new(chain.clone()));
        rules.attach_early(WithRule::new(chain.clone()));

        attach_builtins(rules);
        rules.attach(GetAttRule::new(chain.clone()));
        rules.attach(RefRule::new(chain.clone()));
        rules.attach(HasRefRule::new(chain.clone()));
        rules.attach(IncludeFile::new(self.files.clone()));
        rules.attach(IncludeFileRaw::new(self.files.clone()));
        rules.attach(FindFile::new(self.files.clone()));
        if let Some(components) = &self.components {
            rules.attach(ComponentRule::new(components.clone()));
        }
        if self.reduce_conditions {
            rules.attach(ReduceConditions);
        }
        if keep_params {
            rules.attach(ParamRefRule);
        }
    }

    /// Builds the resolver chain and rule set of one pass.
    ///
    /// Parameter values are expanded lazily through the very rule set being
    /// built, which is why it is created cyclically. When `declared` is given,
    /// references to those parameters resolve to placeholders that are turned
    /// back into plain references.
    fn prepare(&self, declared: Option<&[String]>) -> Pass {
        let mut parameters = None;
        let rules = Rc::new_cyclic(|rules: &Weak<RuleSet>| {
            let mut params = OrderedFallback::new();
            for source in &self.sources {
                let document = Rc::new(MapResolver::new(source.document.clone()));
                let lazy = LazyResolver::new(source.name.as_str(), document, rules.clone());
                params.override_with(Rc::new(lazy));
            }
            let params = Rc::new(params);

            let mut base = OrderedFallback::new();
            base.attach(params.clone());
            for client in &self.stacks {
                base.attach(Rc::new(StackResolver::outputs(client.clone())));
                base.attach(Rc::new(StackResolver::resources(client.clone())));
            }

            let stack = Rc::new(ScopeStack::with_base(Rc::new(base)));
            if let Some(names) = declared {
                let mut placeholders = Map::new();
                for name in names {
                    placeholders.insert(name.as_str().into(), param_ref(name));
                }
                stack.push(Rc::new(MapResolver::new(Value::from(placeholders))));
            }

            let chain = scoped_chain(stack);
            let mut set = RuleSet::new();
            self.attach_rules(&mut set, &chain, declared.is_some());
            parameters = Some(params);
            set
        });

        Pass {
            rules,
            parameters: parameters.unwrap_or_else(|| Rc::new(OrderedFallback::new())),
        }
    }

    /// Expands `template` in two passes. The first pass finds the parameters
    /// the template declares; the second keeps references to them intact and
    /// expands everything else.
    pub fn expand(&self, template: &Value) -> Result<Expansion> {
        info!("first pass over template");
        let first = self.prepare(None);
        let declared: Vec<String> = match first.rules.process(template.clone())? {
            Value::Object(fields) => match fields.get("Parameters") {
                Some(Value::Object(declared)) => declared.keys().map(|k| k.to_string()).collect(),
                _ => vec![],
            },
            _ => vec![],
        };

        info!("second pass over template, {} declared parameters", declared.len());
        let second = self.prepare(Some(&declared));
        let expanded = second.rules.process(template.clone())?;

        let mut parameters = vec![];
        for name in &declared {
            if let Some(value) = second.parameters.get(std::slice::from_ref(name))? {
                parameters.push(ParameterValue::new(name, &value)?);
            }
        }

        let mut credentials = vec![];
        for source in &self.sources {
            let mut document = second.rules.process(source.document.clone())?;
            if let Value::Object(fields) = &mut document {
                let mut comment = Map::new();
                comment.insert("filename".into(), Value::from(source.name.as_str()));
                Rc::make_mut(fields).insert(COMMENT_KEY.into(), Value::from(comment));
            }
            credentials.push(Credentials {
                source: source.name.clone(),
                document,
            });
        }

        Ok(Expansion {
            template: expanded,
            parameters,
            credentials,
        })
    }

    /// Expands `template` and returns only the expanded template.
    pub fn expand_template(&self, template: &Value) -> Result<Value> {
        Ok(self.expand(template)?.template)
    }
}
