// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

pub mod builtins;
mod engine;
mod error;
mod path;
pub mod resolvers;
mod rule;
pub mod rules;
mod value;
mod walker;

pub use engine::{Credentials, Engine, Expansion, ParameterValue};
pub use error::ExpandError;
pub use path::{split_ref, Path, Segment};
pub use resolvers::Resolver;
pub use rule::{Phase, Pipeline, Rule, RuleSet, Step};
pub use value::{Map, Value};
