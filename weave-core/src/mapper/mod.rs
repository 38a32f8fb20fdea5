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

//! Name and structure transformations applied around conversion.
//!
//! Every [`Mapper`] capability has a default body that forwards to the wrapped
//! inner mapper, so a decorator only overrides what it changes. The innermost
//! [`DefaultMapper`] is the identity.

mod aliasing;
mod attribute;
mod default_impl;
mod implicit;
mod local;

pub use aliasing::{AttributeAliasingMapper, ClassAliasingMapper, FieldAliasingMapper};
pub use attribute::AttributeMapper;
pub use default_impl::DefaultImplementationsMapper;
pub use implicit::{ImplicitCollectionDef, ImplicitCollectionMapper};
pub use local::LocalConversionMapper;

use std::collections::HashSet;
use std::sync::Arc;

use crate::converter::{Conversion, SingleValueConverter};
use crate::resolver::type_resolver::ClassResolver;
use crate::types::TypeDescriptor;

pub trait Mapper: Send + Sync {
    /// The wrapped mapper, `None` for the innermost one.
    fn inner(&self) -> Option<&dyn Mapper>;

    /// Node name for values of type `ty`.
    fn encode_node(&self, ty: &TypeDescriptor) -> String {
        match self.inner() {
            Some(inner) => inner.encode_node(ty),
            None => ty.name().to_string(),
        }
    }

    fn decode_node(&self, name: &str) -> TypeDescriptor {
        match self.inner() {
            Some(inner) => inner.decode_node(name),
            None => TypeDescriptor::new(name),
        }
    }

    /// Node or attribute name of `field`, declared by `owner`.
    fn encode_member(&self, owner: &TypeDescriptor, field: &str) -> String {
        match self.inner() {
            Some(inner) => inner.encode_member(owner, field),
            None => field.to_string(),
        }
    }

    fn decode_member(&self, owner: &TypeDescriptor, name: &str) -> String {
        match self.inner() {
            Some(inner) => inner.decode_member(owner, name),
            None => name.to_string(),
        }
    }

    /// Name of the system attributes `class`, `id` and `reference`.
    fn encode_attribute(&self, name: &str) -> String {
        match self.inner() {
            Some(inner) => inner.encode_attribute(name),
            None => name.to_string(),
        }
    }

    fn decode_attribute(&self, name: &str) -> String {
        match self.inner() {
            Some(inner) => inner.decode_attribute(name),
            None => name.to_string(),
        }
    }

    fn should_serialize_member(&self, owner: &TypeDescriptor, field: &str) -> bool {
        self.inner()
            .map_or(true, |inner| inner.should_serialize_member(owner, field))
    }

    /// Concrete type to instantiate for a declared type.
    fn default_implementation(&self, ty: &TypeDescriptor) -> TypeDescriptor {
        match self.inner() {
            Some(inner) => inner.default_implementation(ty),
            None => ty.clone(),
        }
    }

    /// Values of immutable types are never reference tracked.
    fn is_immutable_value_type(&self, ty: &TypeDescriptor) -> bool {
        self.inner()
            .is_some_and(|inner| inner.is_immutable_value_type(ty))
    }

    /// A single value converter when `field` is to be written as an attribute.
    fn converter_from_item_type(
        &self,
        owner: &TypeDescriptor,
        field: &str,
        ty: &TypeDescriptor,
    ) -> Option<Arc<dyn SingleValueConverter>> {
        self.inner()
            .and_then(|inner| inner.converter_from_item_type(owner, field, ty))
    }

    /// Conversion used for `field` instead of the registry's.
    fn local_converter(&self, owner: &TypeDescriptor, field: &str) -> Option<Conversion> {
        self.inner()
            .and_then(|inner| inner.local_converter(owner, field))
    }

    /// Whether `field` is a collection whose items are written inline.
    fn implicit_collection(
        &self,
        owner: &TypeDescriptor,
        field: &str,
    ) -> Option<ImplicitCollectionDef> {
        self.inner()
            .and_then(|inner| inner.implicit_collection(owner, field))
    }

    /// The implicit collection field of `owner` a child node belongs to.
    fn implicit_collection_for_item(
        &self,
        owner: &TypeDescriptor,
        item_name: &str,
        item_type: Option<&TypeDescriptor>,
    ) -> Option<String> {
        self.inner()
            .and_then(|inner| inner.implicit_collection_for_item(owner, item_name, item_type))
    }
}

/// Innermost mapper: canonical names, value types immutable.
pub struct DefaultMapper {
    resolver: Arc<ClassResolver>,
    immutable: HashSet<String>,
}

impl DefaultMapper {
    pub fn new(resolver: Arc<ClassResolver>) -> Self {
        DefaultMapper {
            resolver,
            immutable: HashSet::new(),
        }
    }

    /// Marks a non value type as immutable.
    pub fn add_immutable_type(&mut self, ty: impl Into<TypeDescriptor>) {
        self.immutable.insert(ty.into().name().to_string());
    }
}

impl Mapper for DefaultMapper {
    fn inner(&self) -> Option<&dyn Mapper> {
        None
    }

    fn decode_node(&self, name: &str) -> TypeDescriptor {
        self.resolver.canonical(name)
    }

    fn is_immutable_value_type(&self, ty: &TypeDescriptor) -> bool {
        self.immutable.contains(ty.name())
            || self
                .resolver
                .kind_of(ty)
                .is_some_and(|kind| kind.is_value())
    }
}

/// The frozen chain, outermost decorator first.
pub struct MapperChain {
    head: Box<dyn Mapper>,
}

impl MapperChain {
    pub fn new(innermost: Box<dyn Mapper>) -> Self {
        MapperChain { head: innermost }
    }

    /// Puts a new outermost decorator around the chain.
    pub fn wrap<F>(self, decorate: F) -> Self
    where
        F: FnOnce(Box<dyn Mapper>) -> Box<dyn Mapper>,
    {
        MapperChain {
            head: decorate(self.head),
        }
    }

    #[inline(always)]
    pub fn head(&self) -> &dyn Mapper {
        self.head.as_ref()
    }

    /// Number of mappers in the chain.
    pub fn len(&self) -> usize {
        let mut len = 1;
        let mut current = self.head.inner();
        while let Some(mapper) = current {
            len += 1;
            current = mapper.inner();
        }
        len
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for MapperChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperChain")
            .field("len", &self.len())
            .finish()
    }
}
