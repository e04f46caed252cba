// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Rules beyond the pure builtins: those that read the resolver chain,
//! introduce scopes, touch files or reshape template sections.

pub mod comments;
pub mod components;
pub mod conditions;
pub mod files;
pub mod params;
pub mod reference;
pub mod scope;

pub use comments::{ExcludeComments, COMMENT_KEY};
pub use components::{ComponentRule, ComponentSource, FileComponents};
pub use conditions::ReduceConditions;
pub use files::{FileSource, FindFile, IncludeFile, IncludeFileRaw, MemoryFiles, OsFiles};
pub use params::{param_ref, ParamRefRule};
pub use reference::{GetAttRule, HasRefRule, RefRule};
pub use scope::{ForRule, WithRule};
