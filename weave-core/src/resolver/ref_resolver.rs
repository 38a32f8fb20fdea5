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

//! Identity tables used while a graph is written or read.
//!
//! Both tables live for one top-level call only.

use std::collections::{HashMap, HashSet};

use crate::error::Error;
use crate::tree::Path;
use crate::types::TypeDescriptor;
use crate::value::{Object, ObjectData, ObjRef, Value};

/// Key under which an already written object can be referred to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefKey {
    Id(u32),
    Path(Path),
}

/// Reference writer for tracking shared objects during marshalling.
///
/// Objects are keyed by the address of their handle, so two equal but distinct
/// objects are never confused. The handles stay alive for the whole call, which
/// keeps addresses from being reused.
///
/// ```rust
/// use weave_core::resolver::ref_resolver::{RefKey, RefWriter};
/// use weave_core::value::ObjRef;
///
/// let mut refs = RefWriter::new();
/// let node = ObjRef::sequence("list", []);
///
/// assert!(refs.seen(&node).is_none());
/// assert_eq!(refs.record_id(&node), 1);
/// assert_eq!(refs.seen(&node), Some(&RefKey::Id(1)));
/// ```
#[derive(Debug, Default)]
pub struct RefWriter {
    /// Maps handle addresses to reference keys
    refs: HashMap<usize, RefKey>,
    /// Last id handed out, ids start at 1
    last_id: u32,
    /// Objects currently being written, for cycle detection without references
    active: HashSet<usize>,
}

impl RefWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, obj: &ObjRef) -> Option<&RefKey> {
        self.refs.get(&obj.addr())
    }

    /// Assigns the next sequential id to `obj`.
    pub fn record_id(&mut self, obj: &ObjRef) -> u32 {
        self.last_id += 1;
        self.refs.insert(obj.addr(), RefKey::Id(self.last_id));
        self.last_id
    }

    pub fn record_path(&mut self, obj: &ObjRef, path: Path) {
        self.refs.insert(obj.addr(), RefKey::Path(path));
    }

    /// Marks `obj` as being written. Returns `false` if it already is, which
    /// means the graph has a cycle through it.
    pub fn enter(&mut self, obj: &ObjRef) -> bool {
        self.active.insert(obj.addr())
    }

    pub fn leave(&mut self, obj: &ObjRef) {
        self.active.remove(&obj.addr());
    }
}

const FORWARD_REFERENCE: &str = "<forward-reference>";

/// Reference reader for resolving back-references during unmarshalling.
///
/// A reference to a key that is not known yet gets a placeholder handle; the
/// placeholders are swapped for their targets by [`RefReader::finish`] once the
/// whole tree has been read.
#[derive(Debug, Default)]
pub struct RefReader {
    values: HashMap<String, Value>,
    // placeholder address -> (placeholder, key)
    pending: HashMap<usize, (ObjRef, String)>,
}

impl RefReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key` unless the key is already taken.
    pub fn store(&mut self, key: String, value: Value) {
        self.values.entry(key).or_insert(value);
    }

    /// The value stored under `key`, or a placeholder to be patched later.
    pub fn resolve(&mut self, key: &str) -> Value {
        if let Some(value) = self.values.get(key) {
            return value.clone();
        }
        let placeholder = ObjRef::new(Object::new(
            TypeDescriptor::new(FORWARD_REFERENCE),
            ObjectData::Fields(Default::default()),
        ));
        log::trace!("forward reference to `{}`", key);
        self.pending
            .insert(placeholder.addr(), (placeholder.clone(), key.to_string()));
        Value::Object(placeholder)
    }

    /// Replaces every placeholder reachable from `root` by its target.
    ///
    /// Fails with `UnresolvedReference` if any forward reference never got a
    /// target.
    pub fn finish(self, root: Value) -> Result<Value, Error> {
        if self.pending.is_empty() {
            return Ok(root);
        }
        let mut targets: HashMap<usize, Value> = HashMap::with_capacity(self.pending.len());
        for (addr, (_, key)) in &self.pending {
            let target = self.values.get(key).ok_or_else(|| {
                Error::unresolved_reference(format!("reference `{}` does not resolve", key))
            })?;
            targets.insert(*addr, target.clone());
        }
        log::trace!("patching {} forward reference(s)", targets.len());

        let root_obj = match &root {
            Value::Object(obj) => obj.clone(),
            _ => return Ok(root),
        };
        let mut visited = HashSet::new();
        let mut stack = vec![root_obj];
        while let Some(obj) = stack.pop() {
            if !visited.insert(obj.addr()) {
                continue;
            }
            let mut object = obj.borrow_mut();
            for child in object.children_mut() {
                let target = match child {
                    Value::Object(placeholder) => targets.get(&placeholder.addr()).cloned(),
                    _ => None,
                };
                if let Some(target) = target {
                    *child = target;
                }
                if let Value::Object(next) = child {
                    if !visited.contains(&next.addr()) && !next.ptr_eq(&obj) {
                        stack.push(next.clone());
                    }
                }
            }
        }
        Ok(root)
    }
}
