// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Node paths and the cursor decorators that keep track of them.
//!
//! A segment is the node name, suffixed with a 1-based `[n]` only when the node
//! is the n-th sibling of that name and n > 1. Paths are what the path based
//! reference modes write into `reference` attributes.

use std::collections::HashMap;
use std::fmt;

use super::{TreeReader, TreeWriter};
use crate::error::Error;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
    absolute: bool,
}

impl Path {
    pub fn root() -> Self {
        Path {
            segments: Vec::new(),
            absolute: true,
        }
    }

    /// Parses `/a/b[2]` or `../c`. A `[1]` suffix is dropped so both spellings of
    /// the first sibling compare equal.
    pub fn parse(text: &str) -> Self {
        let absolute = text.starts_with('/');
        let segments = text
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.strip_suffix("[1]").unwrap_or(s).to_string())
            .collect();
        Path { segments, absolute }
    }

    #[inline(always)]
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Relative path leading from `from` to `self`; both must be absolute.
    pub fn relative_to(&self, from: &Path) -> Path {
        let common = self
            .segments
            .iter()
            .zip(from.segments.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let mut segments: Vec<String> = std::iter::repeat("..".to_string())
            .take(from.segments.len() - common)
            .collect();
        segments.extend(self.segments[common..].iter().cloned());
        if segments.is_empty() {
            segments.push(".".to_string());
        }
        Path {
            segments,
            absolute: false,
        }
    }

    /// Resolves `other` against `self`. An absolute `other` is returned as is.
    pub fn apply(&self, other: &Path) -> Path {
        if other.absolute {
            return other.clone();
        }
        let mut segments = self.segments.clone();
        for segment in &other.segments {
            match segment.as_str() {
                "." => {}
                ".." => {
                    segments.pop();
                }
                _ => segments.push(segment.clone()),
            }
        }
        Path {
            segments,
            absolute: self.absolute,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str("/")?;
        }
        f.write_str(&self.segments.join("/"))
    }
}

/// Keeps the path of the current node while a tree is walked.
#[derive(Debug)]
pub struct PathTracker {
    segments: Vec<String>,
    // sibling counters per open level, one more entry than segments
    counts: Vec<HashMap<String, usize>>,
}

impl Default for PathTracker {
    fn default() -> Self {
        PathTracker {
            segments: Vec::new(),
            counts: vec![HashMap::new()],
        }
    }
}

impl PathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str) {
        let level = self.counts.len() - 1;
        let count = self.counts[level].entry(name.to_string()).or_insert(0);
        *count += 1;
        let segment = if *count > 1 {
            format!("{}[{}]", name, count)
        } else {
            name.to_string()
        };
        self.segments.push(segment);
        self.counts.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        if self.segments.pop().is_some() {
            self.counts.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn current(&self) -> Path {
        Path {
            segments: self.segments.clone(),
            absolute: true,
        }
    }
}

/// Writer decorator recording the path of the node being written.
pub struct PathTrackingWriter<'w> {
    inner: &'w mut dyn TreeWriter,
    tracker: PathTracker,
}

impl<'w> PathTrackingWriter<'w> {
    pub fn new(inner: &'w mut dyn TreeWriter) -> Self {
        PathTrackingWriter {
            inner,
            tracker: PathTracker::new(),
        }
    }

    pub fn path(&self) -> Path {
        self.tracker.current()
    }

    pub fn depth(&self) -> usize {
        self.tracker.depth()
    }
}

impl TreeWriter for PathTrackingWriter<'_> {
    fn begin_node(&mut self, name: &str) -> Result<(), Error> {
        self.inner.begin_node(name)?;
        self.tracker.push(name);
        Ok(())
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), Error> {
        self.inner.set_attribute(name, value)
    }

    fn set_value(&mut self, text: &str) -> Result<(), Error> {
        self.inner.set_value(text)
    }

    fn end_node(&mut self) -> Result<(), Error> {
        self.inner.end_node()?;
        self.tracker.pop();
        Ok(())
    }
}

/// Reader decorator recording the path of the current node.
pub struct PathTrackingReader<'r> {
    inner: &'r mut dyn TreeReader,
    tracker: PathTracker,
}

impl<'r> PathTrackingReader<'r> {
    /// The reader must be positioned on the root node.
    pub fn new(inner: &'r mut dyn TreeReader) -> Self {
        let mut tracker = PathTracker::new();
        tracker.push(inner.node_name());
        PathTrackingReader { inner, tracker }
    }

    pub fn path(&self) -> Path {
        self.tracker.current()
    }

    pub fn depth(&self) -> usize {
        self.tracker.depth()
    }
}

impl TreeReader for PathTrackingReader<'_> {
    fn node_name(&self) -> &str {
        self.inner.node_name()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.inner.attribute(name)
    }

    fn attribute_names(&self) -> Vec<String> {
        self.inner.attribute_names()
    }

    fn value(&self) -> &str {
        self.inner.value()
    }

    fn has_more_children(&self) -> bool {
        self.inner.has_more_children()
    }

    fn move_down(&mut self) -> Result<(), Error> {
        self.inner.move_down()?;
        let name = self.inner.node_name().to_string();
        self.tracker.push(&name);
        Ok(())
    }

    fn move_up(&mut self) -> Result<(), Error> {
        self.inner.move_up()?;
        self.tracker.pop();
        Ok(())
    }
}
