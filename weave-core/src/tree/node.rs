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

use std::fmt;

use indexmap::IndexMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{TreeReader, TreeWriter};
use crate::ensure;
use crate::error::Error;

/// In-memory tree document.
///
/// ```rust
/// use weave_core::tree::TreeNode;
///
/// let node = TreeNode::new("point")
///     .with_attribute("unit", "mm")
///     .with_child(TreeNode::new("x").with_value("3"));
/// assert_eq!(node.child("x").unwrap().value(), Some("3"));
/// assert_eq!(node.to_string(), "<point unit=\"mm\"><x>3</x></point>");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeNode {
    pub name: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "IndexMap::is_empty")
    )]
    pub attributes: IndexMap<String, String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub value: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(name: impl Into<String>) -> Self {
        TreeNode {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// First child called `name`.
    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TreeNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follows child names from this node, `None` as soon as one is missing.
    pub fn descendant(&self, names: &[&str]) -> Option<&TreeNode> {
        names.iter().try_fold(self, |node, name| node.child(name))
    }
}

/// Compact markup rendering, used in logs and test failure output.
impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (name, value) in &self.attributes {
            write!(f, " {}=\"{}\"", name, value)?;
        }
        if self.value.is_none() && self.children.is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        if let Some(value) = &self.value {
            f.write_str(value)?;
        }
        for child in &self.children {
            child.fmt(f)?;
        }
        write!(f, "</{}>", self.name)
    }
}

/// Builds a [`TreeNode`] document from writer calls.
#[derive(Debug, Default)]
pub struct NodeWriter {
    stack: Vec<TreeNode>,
    root: Option<TreeNode>,
}

impl NodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the finished document. Fails if a node is still open or nothing
    /// was written.
    pub fn finish(self) -> Result<TreeNode, Error> {
        ensure!(
            self.stack.is_empty(),
            Error::tree_port(format!("{} node(s) left open", self.stack.len()))
        );
        self.root
            .ok_or_else(|| Error::tree_port("no root node was written"))
    }

    fn current(&mut self) -> Result<&mut TreeNode, Error> {
        self.stack
            .last_mut()
            .ok_or_else(|| Error::tree_port("no open node"))
    }
}

impl TreeWriter for NodeWriter {
    fn begin_node(&mut self, name: &str) -> Result<(), Error> {
        ensure!(
            !self.stack.is_empty() || self.root.is_none(),
            Error::tree_port("a document has a single root node")
        );
        self.stack.push(TreeNode::new(name));
        Ok(())
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), Error> {
        let node = self.current()?;
        ensure!(
            node.children.is_empty(),
            Error::tree_port(format!(
                "attribute `{}` set on `{}` after its first child",
                name, node.name
            ))
        );
        node.attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_value(&mut self, text: &str) -> Result<(), Error> {
        let node = self.current()?;
        ensure!(
            node.children.is_empty(),
            Error::tree_port(format!("text set on `{}` after its first child", node.name))
        );
        node.value = Some(text.to_string());
        Ok(())
    }

    fn end_node(&mut self) -> Result<(), Error> {
        let node = self
            .stack
            .pop()
            .ok_or_else(|| Error::tree_port("end_node without an open node"))?;
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root = Some(node),
        }
        Ok(())
    }
}

/// Reads a borrowed [`TreeNode`] document.
#[derive(Debug)]
pub struct NodeReader<'a> {
    // node and index of its next unread child
    stack: Vec<(&'a TreeNode, usize)>,
}

impl<'a> NodeReader<'a> {
    pub fn new(root: &'a TreeNode) -> Self {
        NodeReader {
            stack: vec![(root, 0)],
        }
    }

    #[inline(always)]
    fn current(&self) -> &'a TreeNode {
        // the root is never popped
        self.stack[self.stack.len() - 1].0
    }

    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }
}

impl TreeReader for NodeReader<'_> {
    fn node_name(&self) -> &str {
        &self.current().name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.current().attribute(name)
    }

    fn attribute_names(&self) -> Vec<String> {
        self.current().attributes.keys().cloned().collect()
    }

    fn value(&self) -> &str {
        self.current().value().unwrap_or("")
    }

    fn has_more_children(&self) -> bool {
        let (node, next) = self.stack[self.stack.len() - 1];
        next < node.children.len()
    }

    fn move_down(&mut self) -> Result<(), Error> {
        let top = self.stack.len() - 1;
        let (node, next) = self.stack[top];
        let child = node.children.get(next).ok_or_else(|| {
            Error::tree_port(format!("node `{}` has no more children", node.name))
        })?;
        self.stack[top].1 = next + 1;
        self.stack.push((child, 0));
        Ok(())
    }

    fn move_up(&mut self) -> Result<(), Error> {
        ensure!(
            self.stack.len() > 1,
            Error::tree_port("cannot move above the root node")
        );
        self.stack.pop();
        Ok(())
    }
}
