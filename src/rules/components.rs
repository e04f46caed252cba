// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::utils::{ensure_string, single_key};
use crate::path::Path;
use crate::rule::{Rule, RuleSet, Step};
use crate::rules::files::{decode_document, read_text, FileSource};
use crate::value::Value;

use std::rc::Rc;

use anyhow::Result;
use log::debug;

/// Locates reusable template fragments by name. `Ok(None)` means there is no
/// such component.
pub trait ComponentSource {
    fn find(&self, name: &str) -> Result<Option<Value>>;
}

impl<F> ComponentSource for F
where
    F: Fn(&str) -> Result<Option<Value>>,
{
    fn find(&self, name: &str) -> Result<Option<Value>> {
        self(name)
    }
}

const EXTENSIONS: &[&str] = if cfg!(feature = "yaml") {
    &["json", "yaml", "yml"]
} else {
    &["json"]
};

/// Components stored as `<dir>/<name>.json` (or `.yaml`/`.yml`) files. The
/// first directory holding the component wins.
pub struct FileComponents {
    files: Rc<dyn FileSource>,
    dirs: Vec<String>,
}

impl FileComponents {
    pub fn new(files: Rc<dyn FileSource>, dirs: Vec<String>) -> Self {
        Self { files, dirs }
    }
}

impl ComponentSource for FileComponents {
    fn find(&self, name: &str) -> Result<Option<Value>> {
        for dir in &self.dirs {
            for ext in EXTENSIONS {
                let candidate = format!("{}/{name}.{ext}", dir.trim_end_matches('/'));
                if !self.files.exists(&candidate) {
                    continue;
                }
                let text = read_text(self.files.as_ref(), &candidate)?;
                return Ok(Some(decode_document(&candidate, &text)?));
            }
        }
        Ok(None)
    }
}

/// `{"Fn::Component": "name"}`: the named fragment, expanded in place.
/// Unknown components are left alone.
#[derive(Clone)]
pub struct ComponentRule {
    source: Rc<dyn ComponentSource>,
}

impl ComponentRule {
    pub fn new(source: Rc<dyn ComponentSource>) -> Self {
        Self { source }
    }
}

impl Rule for ComponentRule {
    fn apply(&self, path: &Path, value: Value, rules: &RuleSet) -> Result<Step> {
        let name = match single_key(&value, "Fn::Component").and_then(ensure_string) {
            Some(name) => name.clone(),
            None => return Ok(Step::keep(path, value)),
        };

        match self.source.find(&name)? {
            Some(component) => {
                debug!("{path}: splicing component {name}");
                rules.walk(path, component)
            }
            None => Ok(Step::keep(path, value)),
        }
    }
}
