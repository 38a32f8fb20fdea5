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

//! # Weave Core
//!
//! This is the core implementation of the Weave object graph serialization
//! engine. It turns graphs of dynamically typed objects into trees of named
//! nodes and back, whatever concrete format the tree is later rendered in.
//!
//! ## Architecture
//!
//! The core library is organized into several key modules:
//!
//! - **`weave`**: The engine, its builder and the public marshal/unmarshal API
//! - **`tree`**: Format-neutral tree cursors and the in-memory `TreeNode` document
//! - **`converter`**: Builtin converters for scalars, collections, maps and records
//! - **`mapper`**: The decorator chain that renames and reshapes the tree
//! - **`resolver`**: Class table, converter registry, reference tracking and the
//!   per call contexts
//! - **`security`**: The permission gate consulted before any reconstruction
//! - **`value`** / **`meta`**: The object model and the class definitions
//! - **`error`**: Error handling and result types
//!
//! ## Key Concepts
//!
//! ### Marshalling Strategies
//!
//! - **Tree**: No sharing. Shared objects are duplicated, cycles are an error.
//! - **Reference**: Shared and cyclic objects are written once and referred to
//!   afterwards, by id, absolute path or relative path (the default).
//!
//! ### Fail Closed Reconstruction
//!
//! Only classes registered with the engine can be constructed at all, and only
//! if the permission gate allows them. Out of the box the gate allows nulls,
//! primitives, collections and maps.
//!
//! ## Usage
//!
//! ```rust
//! use weave_core::meta::ClassDef;
//! use weave_core::value::{ObjRef, Value};
//! use weave_core::{MarshallingStrategy, Weave};
//!
//! let weave = Weave::builder()
//!     .register_class(ClassDef::record("demo.Node").field("next", "demo.Node"))
//!     .allow_types_by_wildcard(["demo.*"])
//!     .build()
//!     .unwrap();
//!
//! let node = ObjRef::record("demo.Node", [("next", Value::Null)]);
//! node.set("next", Value::Object(node.clone()));
//! let root = Value::Object(node);
//!
//! let tree = weave.to_tree(&root).unwrap();
//! assert_eq!(tree.to_string(), r#"<demo.Node><next reference=".."/></demo.Node>"#);
//! assert!(weave.to_tree_with(&root, MarshallingStrategy::Tree).is_err());
//!
//! let back = weave.from_tree(&tree).unwrap();
//! let back = back.as_object().unwrap();
//! assert!(back.get("next").unwrap().as_object().unwrap().ptr_eq(back));
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod mapper;
pub mod meta;
pub mod resolver;
pub mod security;
pub mod strategy;
pub mod tree;
pub mod types;
pub mod value;
pub mod weave;

pub use crate::error::Error;
pub use crate::strategy::{MarshallingStrategy, ReferenceMode};
pub use crate::tree::TreeNode;
pub use crate::types::TypeDescriptor;
pub use crate::value::{ObjRef, Value};
pub use crate::weave::{Weave, WeaveBuilder};
