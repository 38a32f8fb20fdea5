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

use std::collections::HashMap;

use super::Mapper;
use crate::types::TypeDescriptor;

/// Node names for types.
pub struct ClassAliasingMapper {
    inner: Box<dyn Mapper>,
    type_to_alias: HashMap<String, String>,
    alias_to_type: HashMap<String, TypeDescriptor>,
}

impl ClassAliasingMapper {
    pub fn new(inner: Box<dyn Mapper>) -> Self {
        ClassAliasingMapper {
            inner,
            type_to_alias: HashMap::new(),
            alias_to_type: HashMap::new(),
        }
    }

    pub fn alias(&mut self, alias: &str, ty: TypeDescriptor) {
        self.type_to_alias
            .insert(ty.name().to_string(), alias.to_string());
        self.alias_to_type.insert(alias.to_string(), ty);
    }
}

impl Mapper for ClassAliasingMapper {
    fn inner(&self) -> Option<&dyn Mapper> {
        Some(self.inner.as_ref())
    }

    fn encode_node(&self, ty: &TypeDescriptor) -> String {
        match self.type_to_alias.get(ty.name()) {
            Some(alias) => alias.clone(),
            None => self.inner.encode_node(ty),
        }
    }

    fn decode_node(&self, name: &str) -> TypeDescriptor {
        match self.alias_to_type.get(name) {
            Some(ty) => ty.clone(),
            None => self.inner.decode_node(name),
        }
    }
}

type MemberKey = (String, String);

fn member_key(owner: &TypeDescriptor, name: &str) -> MemberKey {
    (owner.name().to_string(), name.to_string())
}

/// Member names per declaring class, plus omitted members.
pub struct FieldAliasingMapper {
    inner: Box<dyn Mapper>,
    field_to_alias: HashMap<MemberKey, String>,
    alias_to_field: HashMap<MemberKey, String>,
    omitted: HashMap<String, Vec<String>>,
}

impl FieldAliasingMapper {
    pub fn new(inner: Box<dyn Mapper>) -> Self {
        FieldAliasingMapper {
            inner,
            field_to_alias: HashMap::new(),
            alias_to_field: HashMap::new(),
            omitted: HashMap::new(),
        }
    }

    pub fn alias(&mut self, owner: &TypeDescriptor, field: &str, alias: &str) {
        self.field_to_alias
            .insert(member_key(owner, field), alias.to_string());
        self.alias_to_field
            .insert(member_key(owner, alias), field.to_string());
    }

    pub fn omit(&mut self, owner: &TypeDescriptor, field: &str) {
        self.omitted
            .entry(owner.name().to_string())
            .or_default()
            .push(field.to_string());
    }
}

impl Mapper for FieldAliasingMapper {
    fn inner(&self) -> Option<&dyn Mapper> {
        Some(self.inner.as_ref())
    }

    fn encode_member(&self, owner: &TypeDescriptor, field: &str) -> String {
        match self.field_to_alias.get(&member_key(owner, field)) {
            Some(alias) => alias.clone(),
            None => self.inner.encode_member(owner, field),
        }
    }

    fn decode_member(&self, owner: &TypeDescriptor, name: &str) -> String {
        match self.alias_to_field.get(&member_key(owner, name)) {
            Some(field) => field.clone(),
            None => self.inner.decode_member(owner, name),
        }
    }

    fn should_serialize_member(&self, owner: &TypeDescriptor, field: &str) -> bool {
        let omitted = self
            .omitted
            .get(owner.name())
            .is_some_and(|fields| fields.iter().any(|f| f == field));
        !omitted && self.inner.should_serialize_member(owner, field)
    }
}

/// Names of the system attributes.
pub struct AttributeAliasingMapper {
    inner: Box<dyn Mapper>,
    name_to_alias: HashMap<String, String>,
    alias_to_name: HashMap<String, String>,
}

impl AttributeAliasingMapper {
    pub fn new(inner: Box<dyn Mapper>) -> Self {
        AttributeAliasingMapper {
            inner,
            name_to_alias: HashMap::new(),
            alias_to_name: HashMap::new(),
        }
    }

    pub fn alias(&mut self, name: &str, alias: &str) {
        self.name_to_alias
            .insert(name.to_string(), alias.to_string());
        self.alias_to_name
            .insert(alias.to_string(), name.to_string());
    }
}

impl Mapper for AttributeAliasingMapper {
    fn inner(&self) -> Option<&dyn Mapper> {
        Some(self.inner.as_ref())
    }

    fn encode_attribute(&self, name: &str) -> String {
        match self.name_to_alias.get(name) {
            Some(alias) => alias.clone(),
            None => self.inner.encode_attribute(name),
        }
    }

    fn decode_attribute(&self, name: &str) -> String {
        match self.alias_to_name.get(name) {
            Some(original) => original.clone(),
            None => self.inner.decode_attribute(name),
        }
    }
}
