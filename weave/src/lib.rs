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

//! # Weave
//!
//! Weave serializes object graphs into trees of named nodes with attributes and
//! text, and reconstructs them, independently of the format the tree is finally
//! written in. XML or JSON front ends plug in through the [`TreeWriter`] and
//! [`TreeReader`] cursors.
//!
//! ## Key Features
//!
//! - **Shared and cyclic references**: objects are identified by handle, written
//!   once and referred to by id or path afterwards
//! - **Fail closed**: reconstruction goes through a permission gate that denies
//!   every type no rule allows
//! - **Mapper chain**: class, field and attribute aliases, attributes, implicit
//!   collections and per field converters, without touching converters
//! - **Pluggable converters**: priority ordered, matched by exact type,
//!   assignability or predicate
//!
//! ## Quick Start
//!
//! ```rust
//! use weave::{ClassDef, ImplicitCollectionDef, ObjRef, Value, Weave};
//!
//! let weave = Weave::builder()
//!     .register_class(
//!         ClassDef::record("shop.Order")
//!             .field("id", "int")
//!             .field("lines", "list"),
//!     )
//!     .alias("order", "shop.Order")
//!     .use_attribute_for("shop.Order", "id")
//!     .add_implicit_collection(
//!         "shop.Order",
//!         ImplicitCollectionDef::new("lines").item_name("line").item_type("string"),
//!     )
//!     .allow_types(["shop.Order"])
//!     .build()
//!     .unwrap();
//!
//! let order = Value::Object(ObjRef::record(
//!     "shop.Order",
//!     [
//!         ("id", Value::from(7)),
//!         ("lines", Value::list([Value::str("tea"), Value::str("milk")])),
//!     ],
//! ));
//! let tree = weave.to_tree(&order).unwrap();
//! assert_eq!(
//!     tree.to_string(),
//!     r#"<order id="7"><line>tea</line><line>milk</line></order>"#
//! );
//! assert_eq!(weave.from_tree(&tree).unwrap(), order);
//! ```

pub use weave_core::{
    config::Config,
    converter::{Conversion, Converter, SingleValueConverter},
    error::Error,
    mapper::{ImplicitCollectionDef, Mapper},
    meta::{ClassDef, DefaultValue},
    resolver::context::{MarshalContext, UnmarshalContext},
    resolver::converter_resolver::{priority, Matcher},
    security::{
        AnyTypePermission, ExplicitTypePermission, NoTypePermission, NullPermission,
        PrimitiveTypePermission, ProxyTypePermission, RegexTypePermission, TypeHierarchyPermission,
        TypePermission, TypeProbe, WildcardTypePermission,
    },
    strategy::{MarshallingStrategy, ReferenceMode},
    tree::{NodeReader, NodeWriter, TreeNode, TreeReader, TreeWriter},
    types::{builtin, ClassKind, Provenance, TypeDescriptor},
    value::{EnumValue, ObjRef, Object, ObjectData, Value},
    weave::{Weave, WeaveBuilder},
};
