// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! `Fn::IncludeFile`, `Fn::IncludeFileRaw` and `Fn::FindFile`.
//!
//! Files that cannot be found, read or decoded abort the expansion.

use crate::builtins::utils::{ensure_args_count, ensure_collection, ensure_string, single_key};
use crate::error::ExpandError;
use crate::path::Path;
use crate::rule::{Rule, RuleSet, Step};
use crate::value::Value;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path as FsPath, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Result};
use log::debug;

/// Where included files come from.
pub trait FileSource {
    fn read(&self, path: &str) -> Result<Vec<u8>>;
    fn exists(&self, path: &str) -> bool;
}

/// The local file system. Relative paths are taken from `root` when one is
/// set and from the working directory otherwise.
#[derive(Debug, Clone, Default)]
pub struct OsFiles {
    root: Option<PathBuf>,
}

impl OsFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root<P: AsRef<FsPath>>(root: P) -> Self {
        Self {
            root: Some(root.as_ref().to_path_buf()),
        }
    }

    fn locate(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        }
    }
}

impl FileSource for OsFiles {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.locate(path))?)
    }

    fn exists(&self, path: &str) -> bool {
        self.locate(path).exists()
    }
}

/// Files held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<C: Into<Vec<u8>>>(&mut self, path: &str, contents: C) {
        self.files.insert(path.to_string(), contents.into());
    }
}

impl FileSource for MemoryFiles {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        match self.files.get(path) {
            Some(contents) => Ok(contents.clone()),
            None => bail!("no such file"),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}

pub(crate) fn read_text(files: &dyn FileSource, path: &str) -> Result<String> {
    let bytes = files.read(path).map_err(|e| ExpandError::IncludeFile {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(String::from_utf8(bytes).map_err(|e| ExpandError::DecodeFile {
        path: path.to_string(),
        reason: e.to_string(),
    })?)
}

/// Decodes an included document. YAML is accepted for `.yaml`/`.yml` files.
pub fn decode_document(path: &str, text: &str) -> Result<Value> {
    #[cfg(feature = "yaml")]
    let decoded = if path.ends_with(".yaml") || path.ends_with(".yml") {
        Value::from_yaml_str(text)
    } else {
        Value::from_json_str(text)
    };
    #[cfg(not(feature = "yaml"))]
    let decoded = Value::from_json_str(text);

    Ok(decoded.map_err(|e| ExpandError::DecodeFile {
        path: path.to_string(),
        reason: e.to_string(),
    })?)
}

/// `{"Fn::IncludeFile": "path"}`: the decoded file, expanded in place.
#[derive(Clone)]
pub struct IncludeFile {
    files: Rc<dyn FileSource>,
}

impl IncludeFile {
    pub fn new(files: Rc<dyn FileSource>) -> Self {
        Self { files }
    }
}

impl Rule for IncludeFile {
    fn apply(&self, path: &Path, value: Value, rules: &RuleSet) -> Result<Step> {
        let file = match single_key(&value, "Fn::IncludeFile").and_then(ensure_string) {
            Some(file) => file.clone(),
            None => return Ok(Step::keep(path, value)),
        };

        debug!("{path}: including {file}");
        let text = read_text(self.files.as_ref(), &file)?;
        rules.walk(path, decode_document(&file, &text)?)
    }
}

/// `{"Fn::IncludeFileRaw": "path"}`: the file contents as a string.
#[derive(Clone)]
pub struct IncludeFileRaw {
    files: Rc<dyn FileSource>,
}

impl IncludeFileRaw {
    pub fn new(files: Rc<dyn FileSource>) -> Self {
        Self { files }
    }
}

impl Rule for IncludeFileRaw {
    fn apply(&self, path: &Path, value: Value, _rules: &RuleSet) -> Result<Step> {
        let file = match single_key(&value, "Fn::IncludeFileRaw").and_then(ensure_string) {
            Some(file) => file.clone(),
            None => return Ok(Step::keep(path, value)),
        };

        debug!("{path}: including {file} verbatim");
        let text = read_text(self.files.as_ref(), &file)?;
        Ok(Step::keep(path, Value::from(text)))
    }
}

/// `{"Fn::FindFile": [[prefix, ...], "tail"]}`: the first `prefix/tail` that
/// exists.
#[derive(Clone)]
pub struct FindFile {
    files: Rc<dyn FileSource>,
}

impl FindFile {
    pub fn new(files: Rc<dyn FileSource>) -> Self {
        Self { files }
    }

    fn args(value: &Value) -> Option<(Vec<String>, String)> {
        let args = ensure_args_count(single_key(value, "Fn::FindFile")?, 2)?;
        let prefixes = ensure_collection(&args[0], |p| ensure_string(p).map(|p| p.to_string()))?;
        let tail = ensure_string(&args[1])?.to_string();
        Some((prefixes, tail))
    }
}

impl Rule for FindFile {
    fn apply(&self, path: &Path, value: Value, _rules: &RuleSet) -> Result<Step> {
        let (prefixes, tail) = match Self::args(&value) {
            Some(args) => args,
            None => return Ok(Step::keep(path, value)),
        };

        for prefix in &prefixes {
            let candidate = FsPath::new(prefix).join(&tail);
            let candidate = candidate.to_string_lossy();
            if self.files.exists(&candidate) {
                debug!("{path}: found {candidate}");
                return Ok(Step::keep(path, Value::from(candidate.to_string())));
            }
        }
        Err(ExpandError::FileNotFound { tail, prefixes }.into())
    }
}
