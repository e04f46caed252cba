// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Conditions that abort an expansion.
///
/// Everything else (unknown forms, wrong arguments, unresolved references)
/// is passthrough and never surfaces as an error.
#[derive(Debug, Clone, Error)]
pub enum ExpandError {
    /// An included file could not be opened or read.
    #[error("Error opening imported file '{path}': {reason}")]
    IncludeFile { path: String, reason: String },

    /// An included file was read but could not be decoded.
    #[error("Error loading imported file '{path}': {reason}")]
    DecodeFile { path: String, reason: String },

    /// None of the candidate locations holds the requested file.
    #[error("Unable to locate file '{tail}' in {prefixes:?}")]
    FileNotFound { tail: String, prefixes: Vec<String> },

    /// A remote stack query matched a number of stacks other than one.
    #[error("Description of [{stack}] did not return exactly one Stack (got {count})")]
    AmbiguousStack { stack: String, count: usize },

    /// A rule renamed an object entry to something that is not a key.
    #[error("Rule renamed object entry at {path} to non-key segment `{key}`")]
    InvalidRename { path: String, key: String },

    /// A lazily evaluated source outlived the rule set it was built for.
    #[error("internal error: rule set for lazy source `{0}` is no longer available")]
    DetachedRules(String),

    /// A parameters document is neither an object nor an array of objects.
    #[error("Parameters `{0}` do not decode into a map or array of maps")]
    InvalidParameters(String),
}
