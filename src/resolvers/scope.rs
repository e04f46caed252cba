// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::resolvers::Resolver;
use crate::value::Value;

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

/// A stack of resolver frames searched from the innermost (last pushed) frame
/// outwards. Frames are pushed on scope entry and popped on scope exit.
#[derive(Default)]
pub struct ScopeStack {
    frames: RefCell<Vec<Rc<dyn Resolver>>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack whose outermost frame is `base`.
    pub fn with_base(base: Rc<dyn Resolver>) -> Self {
        Self {
            frames: RefCell::new(vec![base]),
        }
    }

    pub fn push(&self, frame: Rc<dyn Resolver>) {
        self.frames.borrow_mut().push(frame);
    }

    pub fn pop(&self) -> Option<Rc<dyn Resolver>> {
        self.frames.borrow_mut().pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Runs `f` with `frame` pushed, popping it again whether or not `f`
    /// succeeds.
    pub fn scoped<T>(&self, frame: Rc<dyn Resolver>, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.push(frame);
        let result = f();
        self.pop();
        result
    }
}

impl Resolver for ScopeStack {
    fn get(&self, path: &[String]) -> Result<Option<Value>> {
        // Frames may look back into this stack, so no borrow is held while
        // they run.
        let frames = self.frames.borrow().clone();
        for frame in frames.iter().rev() {
            if let Some(found) = frame.get(path)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}
