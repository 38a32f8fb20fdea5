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

//! Format-neutral cursor over a tree of named nodes.
//!
//! A node has a name, string attributes, optional text and ordered children.
//! Concrete formats (XML, JSON, ...) plug in by implementing [`TreeWriter`] and
//! [`TreeReader`]; the engine itself only ships the in-memory [`TreeNode`]
//! document and the path tracking decorators used for reference keys.

mod node;
pub mod path;

pub use node::{NodeReader, NodeWriter, TreeNode};
pub use path::{Path, PathTracker, PathTrackingReader, PathTrackingWriter};

use crate::error::Error;

/// Streaming writer. Attributes and text must be set before the first child of
/// a node is begun.
pub trait TreeWriter {
    fn begin_node(&mut self, name: &str) -> Result<(), Error>;

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), Error>;

    fn set_value(&mut self, text: &str) -> Result<(), Error>;

    fn end_node(&mut self) -> Result<(), Error>;
}

/// Pull cursor positioned on one node at a time, initially on the root.
pub trait TreeReader {
    fn node_name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    fn attribute_names(&self) -> Vec<String>;

    /// Text content of the current node, empty when it has none.
    fn value(&self) -> &str;

    fn has_more_children(&self) -> bool;

    /// Moves to the next unread child of the current node.
    fn move_down(&mut self) -> Result<(), Error>;

    /// Moves back to the parent, skipping any unread children.
    fn move_up(&mut self) -> Result<(), Error>;
}
