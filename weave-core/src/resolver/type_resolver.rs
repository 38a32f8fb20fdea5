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

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;

use crate::error::Error;
use crate::meta::{ClassDef, DefaultValue, FieldDef};
use crate::types::{builtin, ClassKind, Provenance, TypeDescriptor};
use crate::value::{Object, ObjectData, ObjRef, Value};

/// A field together with the class that declares it.
#[derive(Clone, Copy, Debug)]
pub struct FieldRef<'a> {
    pub owner: &'a TypeDescriptor,
    pub def: &'a FieldDef,
}

/// Table of every class the engine may construct.
///
/// Filled once while the engine is configured and read-only afterwards. Builtin
/// scalar, collection and map types are always present.
#[derive(Debug)]
pub struct ClassResolver {
    classes: HashMap<String, ClassDef>,
}

impl Default for ClassResolver {
    fn default() -> Self {
        let mut resolver = ClassResolver {
            classes: HashMap::new(),
        };
        resolver.register_builtins();
        resolver
    }
}

impl ClassResolver {
    fn register_builtins(&mut self) {
        let builtins = [
            ClassDef::abstract_type(builtin::OBJECT),
            ClassDef::value_type(builtin::NULL),
            ClassDef::value_type(builtin::BOOLEAN),
            ClassDef::abstract_type(builtin::NUMBER),
            ClassDef::value_type(builtin::INT).extends(builtin::NUMBER),
            ClassDef::value_type(builtin::FLOAT).extends(builtin::NUMBER),
            ClassDef::value_type(builtin::CHAR),
            ClassDef::value_type(builtin::STRING),
            ClassDef::value_type(builtin::TIMESTAMP),
            ClassDef::abstract_type(builtin::ENUM),
            ClassDef::value_type(builtin::CLASS).provenance(Provenance::TypeToken),
            ClassDef::abstract_type(builtin::COLLECTION),
            ClassDef::sequence(builtin::LIST),
            ClassDef::sequence(builtin::SET),
            // `ClassDef::mapping` extends `map`, the root map must not extend itself
            ClassDef::with_kind(builtin::MAP, ClassKind::Mapping),
        ];
        for def in builtins {
            self.classes.insert(def.descriptor().name().to_string(), def);
        }
    }

    /// Registers a class. Registering the same name twice is a configuration error.
    pub fn register(&mut self, def: ClassDef) -> Result<(), Error> {
        let name = def.descriptor().name().to_string();
        if self.classes.contains_key(&name) {
            return Err(Error::invalid_config(format!(
                "class `{}` is already registered",
                name
            )));
        }
        if def.kind() == ClassKind::Enum && def.variants().is_empty() {
            return Err(Error::invalid_config(format!(
                "enum `{}` declares no variants",
                name
            )));
        }
        log::trace!("registered class {} as {:?}", name, def.kind());
        self.classes.insert(name, def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    pub fn get_by_descriptor(&self, ty: &TypeDescriptor) -> Option<&ClassDef> {
        self.classes.get(ty.name())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// The registered descriptor for `name`, or a bare descriptor when unknown.
    pub fn canonical(&self, name: &str) -> TypeDescriptor {
        self.classes
            .get(name)
            .map_or_else(|| TypeDescriptor::new(name), |def| def.descriptor().clone())
    }

    pub fn kind_of(&self, ty: &TypeDescriptor) -> Option<ClassKind> {
        self.get_by_descriptor(ty).map(ClassDef::kind)
    }

    /// Reflexive, transitive assignability over declared supertypes. Every type is
    /// assignable to `object`.
    pub fn is_assignable(&self, from: &TypeDescriptor, to: &TypeDescriptor) -> bool {
        if from.name() == to.name() || to.is(builtin::OBJECT) {
            return true;
        }
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(from.name());
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            let Some(def) = self.classes.get(current) else {
                continue;
            };
            for supertype in def.supertypes() {
                if supertype.name() == to.name() {
                    return true;
                }
                queue.push_back(supertype.name());
            }
        }
        false
    }

    /// All fields of a record, supertype fields first.
    pub fn fields_of<'a>(&'a self, ty: &TypeDescriptor) -> Vec<FieldRef<'a>> {
        let mut fields = Vec::new();
        let mut visited = HashSet::new();
        self.collect_fields(ty.name(), &mut fields, &mut visited);
        fields
    }

    fn collect_fields<'a>(
        &'a self,
        name: &str,
        out: &mut Vec<FieldRef<'a>>,
        visited: &mut HashSet<String>,
    ) {
        if !visited.insert(name.to_string()) {
            return;
        }
        let Some(def) = self.classes.get(name) else {
            return;
        };
        for supertype in def.supertypes() {
            self.collect_fields(supertype.name(), out, visited);
        }
        for field in def.own_fields() {
            // a redeclared field shadows the inherited one
            out.retain(|f: &FieldRef<'a>| f.def.name() != field.name());
            out.push(FieldRef {
                owner: def.descriptor(),
                def: field,
            });
        }
    }

    pub fn field<'a>(&'a self, ty: &TypeDescriptor, name: &str) -> Option<FieldRef<'a>> {
        self.fields_of(ty)
            .into_iter()
            .find(|field| field.def.name() == name)
    }

    /// Instantiates a registered concrete class through its factory.
    ///
    /// This is the only place objects are created during unmarshalling; callers
    /// must pass the permission gate first.
    pub fn instantiate(&self, ty: &TypeDescriptor) -> Result<ObjRef, Error> {
        let def = self
            .get_by_descriptor(ty)
            .ok_or_else(|| Error::unconvertible_type(ty.clone()))?;
        if !def.kind().is_instantiable() {
            return Err(Error::malformed_tree(format!(
                "type `{}` is {:?} and cannot be instantiated",
                ty,
                def.kind()
            )));
        }
        let data = match def.get_factory() {
            Some(factory) => factory(),
            None => self.default_data(def),
        };
        Ok(ObjRef::new(Object::new(def.descriptor().clone(), data)))
    }

    fn default_data(&self, def: &ClassDef) -> ObjectData {
        match def.kind() {
            ClassKind::Sequence => ObjectData::Items(Vec::new()),
            ClassKind::Mapping => ObjectData::Entries(Vec::new()),
            _ => {
                let fields: IndexMap<String, Value> = self
                    .fields_of(def.descriptor())
                    .into_iter()
                    .map(|field| {
                        let value = match field.def.default_value() {
                            Some(DefaultValue::Bool(b)) => Value::Bool(*b),
                            Some(DefaultValue::Int(i)) => Value::Int(*i),
                            Some(DefaultValue::Float(f)) => Value::Float(*f),
                            Some(DefaultValue::Str(s)) => Value::Str(s.clone()),
                            None => Value::Null,
                        };
                        (field.def.name().to_string(), value)
                    })
                    .collect();
                ObjectData::Fields(fields)
            }
        }
    }
}
