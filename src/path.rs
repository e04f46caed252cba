// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;
use std::rc::Rc;

/// One step of a [`Path`]: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(Rc<str>),
    Index(usize),
}

impl Segment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(k) => Some(k.as_ref()),
            Segment::Index(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Segment::Key(k) => write!(f, "{k}"),
            Segment::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(k: &str) -> Self {
        Segment::Key(k.into())
    }
}

impl From<Rc<str>> for Segment {
    fn from(k: Rc<str>) -> Self {
        Segment::Key(k)
    }
}

impl From<usize> for Segment {
    fn from(i: usize) -> Self {
        Segment::Index(i)
    }
}

/// Address of a node from the document root.
///
/// Paths are never mutated in place; descending or renaming yields a new path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn root() -> Path {
        Path::default()
    }

    pub fn new(segments: Vec<Segment>) -> Path {
        Path { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn get(&self, idx: usize) -> Option<&Segment> {
        self.segments.get(idx)
    }

    pub fn child<S: Into<Segment>>(&self, segment: S) -> Path {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment.into());
        Path { segments }
    }

    /// Replaces the last segment. The root path has nothing to rename.
    pub fn renamed(&self, key: Option<Segment>) -> Path {
        match (key, self.segments.split_last()) {
            (Some(key), Some((last, parent))) if *last != key => {
                let mut segments = parent.to_vec();
                segments.push(key);
                Path { segments }
            }
            _ => self.clone(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(|s| s.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl<S: Into<Segment>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Splits a dotted reference into lookup segments.
///
/// A component with an open `[` keeps absorbing following components until the
/// brackets balance, so `a.[b.c].d` yields `["a", "[b.c]", "d"]`. Unbalanced
/// trailing components are returned individually.
pub fn split_ref(reference: &str) -> Vec<String> {
    let mut segments = vec![];
    let mut pending: Vec<&str> = vec![];
    let mut nested = 0i32;

    for component in reference.split('.') {
        pending.push(component);
        for c in component.chars() {
            match c {
                '[' => nested += 1,
                ']' => nested -= 1,
                _ => (),
            }
        }
        if nested == 0 {
            segments.push(pending.join("."));
            pending.clear();
        }
    }
    segments.extend(pending.into_iter().map(str::to_string));
    segments
}

/// True when `segment` is a `[inner.path]` alias.
pub fn is_alias(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('[') && segment.ends_with(']')
}
