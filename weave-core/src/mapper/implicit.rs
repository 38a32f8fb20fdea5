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

use std::sync::Arc;

use indexmap::IndexMap;

use super::Mapper;
use crate::resolver::type_resolver::ClassResolver;
use crate::types::{builtin, TypeDescriptor};

/// A collection field written as a flat run of item nodes inside its owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImplicitCollectionDef {
    pub field: String,
    /// Items must be assignable to this type, any type if `None`.
    pub item_type: Option<TypeDescriptor>,
    /// Fixed node name of the items, the item type's node name if `None`.
    pub item_name: Option<String>,
}

impl ImplicitCollectionDef {
    pub fn new(field: impl Into<String>) -> Self {
        ImplicitCollectionDef {
            field: field.into(),
            item_type: None,
            item_name: None,
        }
    }

    pub fn item_type(mut self, ty: impl Into<TypeDescriptor>) -> Self {
        self.item_type = Some(ty.into());
        self
    }

    pub fn item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = Some(name.into());
        self
    }
}

pub struct ImplicitCollectionMapper {
    inner: Box<dyn Mapper>,
    resolver: Arc<ClassResolver>,
    // (owner, field) in registration order
    defs: IndexMap<(String, String), ImplicitCollectionDef>,
}

impl ImplicitCollectionMapper {
    pub fn new(inner: Box<dyn Mapper>, resolver: Arc<ClassResolver>) -> Self {
        ImplicitCollectionMapper {
            inner,
            resolver,
            defs: IndexMap::new(),
        }
    }

    pub fn add(&mut self, owner: &TypeDescriptor, def: ImplicitCollectionDef) {
        self.defs
            .insert((owner.name().to_string(), def.field.clone()), def);
    }

    fn accepts(&self, def: &ImplicitCollectionDef, item_type: Option<&TypeDescriptor>) -> bool {
        match (item_type, &def.item_type) {
            (None, _) | (_, None) => true,
            (Some(ty), _) if ty.is(builtin::NULL) => true,
            (Some(ty), Some(expected)) => self.resolver.is_assignable(ty, expected),
        }
    }
}

impl Mapper for ImplicitCollectionMapper {
    fn inner(&self) -> Option<&dyn Mapper> {
        Some(self.inner.as_ref())
    }

    fn implicit_collection(
        &self,
        owner: &TypeDescriptor,
        field: &str,
    ) -> Option<ImplicitCollectionDef> {
        match self
            .defs
            .get(&(owner.name().to_string(), field.to_string()))
        {
            Some(def) => Some(def.clone()),
            None => self.inner.implicit_collection(owner, field),
        }
    }

    fn implicit_collection_for_item(
        &self,
        owner: &TypeDescriptor,
        item_name: &str,
        item_type: Option<&TypeDescriptor>,
    ) -> Option<String> {
        let own = || self.defs.iter().filter(|((o, _), _)| o.as_str() == owner.name());
        // a fixed item name is the stronger signal
        let by_name = own().find(|(_, def)| def.item_name.as_deref() == Some(item_name));
        let by_type = || {
            own().find(|(_, def)| def.item_name.is_none() && self.accepts(def, item_type))
        };
        match by_name.or_else(by_type) {
            Some((_, def)) => Some(def.field.clone()),
            None => self
                .inner
                .implicit_collection_for_item(owner, item_name, item_type),
        }
    }
}
