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

//! Per call state of a marshal or unmarshal transaction.

use crate::converter::Conversion;
use crate::error::Error;
use crate::mapper::Mapper;
use crate::resolver::converter_resolver::ConverterRegistry;
use crate::resolver::ref_resolver::{RefKey, RefReader, RefWriter};
use crate::resolver::type_resolver::ClassResolver;
use crate::security::PermissionGate;
use crate::strategy::{MarshallingStrategy, ReferenceMode};
use crate::tree::{Path, PathTrackingReader, PathTrackingWriter, TreeReader, TreeWriter};
use crate::types::{builtin, system_attribute, ClassKind, TypeDescriptor};
use crate::value::{ObjRef, Value};
use crate::weave::Weave;

pub struct MarshalContext<'a> {
    pub writer: PathTrackingWriter<'a>,
    weave: &'a Weave,
    pub ref_writer: RefWriter,
    strategy: MarshallingStrategy,
    max_depth: u32,
    current_depth: u32,
}

impl<'a> MarshalContext<'a> {
    pub fn new(
        weave: &'a Weave,
        writer: &'a mut dyn TreeWriter,
        strategy: MarshallingStrategy,
    ) -> MarshalContext<'a> {
        MarshalContext {
            writer: PathTrackingWriter::new(writer),
            weave,
            ref_writer: RefWriter::new(),
            strategy,
            max_depth: weave.config().max_depth(),
            current_depth: 0,
        }
    }

    #[inline(always)]
    pub fn get_weave(&self) -> &'a Weave {
        self.weave
    }

    #[inline(always)]
    pub fn mapper(&self) -> &'a dyn Mapper {
        self.weave.mapper()
    }

    #[inline(always)]
    pub fn resolver(&self) -> &'a ClassResolver {
        self.weave.resolver()
    }

    #[inline(always)]
    pub fn registry(&self) -> &'a ConverterRegistry {
        self.weave.registry()
    }

    #[inline(always)]
    pub fn strategy(&self) -> MarshallingStrategy {
        self.strategy
    }

    pub fn path(&self) -> Path {
        self.writer.path()
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        if self.current_depth > self.max_depth {
            return Err(Error::depth_exceed(format!(
                "Maximum nesting depth ({}) exceeded at {}",
                self.max_depth,
                self.writer.path()
            )));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }

    /// Writes `value` into the current node with the registry's converter.
    pub fn convert_another(&mut self, value: &Value) -> Result<(), Error> {
        self.convert_with(value, None)
    }

    /// Writes `value` into the current node, with `local` overriding the
    /// registry when given.
    ///
    /// Objects go through the reference policy first: an object already written
    /// becomes a `reference` attribute instead of a second copy.
    pub fn convert_with(&mut self, value: &Value, local: Option<&Conversion>) -> Result<(), Error> {
        self.inc_depth()?;
        let tracked = match value {
            Value::Object(obj) if !self.mapper().is_immutable_value_type(&obj.class()) => {
                Some(obj)
            }
            _ => None,
        };
        if let Some(obj) = tracked {
            match self.strategy.reference_mode() {
                None => {
                    if !self.ref_writer.enter(obj) {
                        return Err(Error::cyclic_graph(self.writer.path().to_string()));
                    }
                }
                Some(mode) => {
                    if self.write_reference(obj, mode)? {
                        self.dec_depth();
                        return Ok(());
                    }
                }
            }
        }

        let conversion = match local {
            Some(conversion) => conversion,
            None => self
                .registry()
                .lookup(&value.type_descriptor(), self.resolver())?,
        };
        match conversion {
            Conversion::Composite(converter) => converter.marshal(value, self)?,
            Conversion::SingleValue(converter) => {
                let text = converter.to_text(value)?;
                self.writer.set_value(&text)?;
            }
        }

        if let (Some(obj), MarshallingStrategy::Tree) = (tracked, self.strategy) {
            self.ref_writer.leave(obj);
        }
        self.dec_depth();
        Ok(())
    }

    /// Writes a back-reference if `obj` was written before, otherwise records it.
    /// Returns whether a reference was written.
    fn write_reference(&mut self, obj: &ObjRef, mode: ReferenceMode) -> Result<bool, Error> {
        if let Some(key) = self.ref_writer.seen(obj) {
            let text = match key {
                RefKey::Id(id) => id.to_string(),
                RefKey::Path(target) => match mode {
                    ReferenceMode::AbsolutePath => target.to_string(),
                    _ => target.relative_to(&self.writer.path()).to_string(),
                },
            };
            let name = self.mapper().encode_attribute(system_attribute::REFERENCE);
            log::trace!("{} refers to {}", self.writer.path(), text);
            self.writer.set_attribute(&name, &text)?;
            return Ok(true);
        }
        match mode {
            ReferenceMode::Id => {
                let id = self.ref_writer.record_id(obj);
                let name = self.mapper().encode_attribute(system_attribute::ID);
                self.writer.set_attribute(&name, &id.to_string())?;
            }
            ReferenceMode::AbsolutePath | ReferenceMode::RelativePath => {
                let path = self.writer.path();
                self.ref_writer.record_path(obj, path);
            }
        }
        Ok(false)
    }

    /// Writes `value` as a child node named after its type.
    pub fn write_item(&mut self, value: &Value) -> Result<(), Error> {
        let name = self.mapper().encode_node(&value.type_descriptor());
        self.writer.begin_node(&name)?;
        self.convert_another(value)?;
        self.writer.end_node()
    }

    /// Writes `value` as a child node called `name`, marking its type with a
    /// `class` attribute when it is not the default for `declared`.
    pub fn write_member(
        &mut self,
        name: &str,
        declared: &TypeDescriptor,
        value: &Value,
        local: Option<&Conversion>,
    ) -> Result<(), Error> {
        self.writer.begin_node(name)?;
        let actual = value.type_descriptor();
        // a back-reference carries no type of its own
        let is_reference = match value {
            Value::Object(obj) => {
                self.strategy.tracks_references() && self.ref_writer.seen(obj).is_some()
            }
            _ => false,
        };
        if !is_reference && actual.name() != self.mapper().default_implementation(declared).name()
        {
            self.write_class_attribute(&actual)?;
        }
        self.convert_with(value, local)?;
        self.writer.end_node()
    }

    pub fn write_class_attribute(&mut self, ty: &TypeDescriptor) -> Result<(), Error> {
        let name = self.mapper().encode_attribute(system_attribute::CLASS);
        let value = self.mapper().encode_node(ty);
        self.writer.set_attribute(&name, &value)
    }
}

pub struct UnmarshalContext<'a> {
    pub reader: PathTrackingReader<'a>,
    weave: &'a Weave,
    pub ref_reader: RefReader,
    strategy: MarshallingStrategy,
    max_depth: u32,
    current_depth: u32,
}

impl<'a> UnmarshalContext<'a> {
    pub fn new(
        weave: &'a Weave,
        reader: &'a mut dyn TreeReader,
        strategy: MarshallingStrategy,
    ) -> UnmarshalContext<'a> {
        UnmarshalContext {
            reader: PathTrackingReader::new(reader),
            weave,
            ref_reader: RefReader::new(),
            strategy,
            max_depth: weave.config().max_depth(),
            current_depth: 0,
        }
    }

    #[inline(always)]
    pub fn get_weave(&self) -> &'a Weave {
        self.weave
    }

    #[inline(always)]
    pub fn mapper(&self) -> &'a dyn Mapper {
        self.weave.mapper()
    }

    #[inline(always)]
    pub fn resolver(&self) -> &'a ClassResolver {
        self.weave.resolver()
    }

    #[inline(always)]
    pub fn registry(&self) -> &'a ConverterRegistry {
        self.weave.registry()
    }

    #[inline(always)]
    pub fn gate(&self) -> &'a PermissionGate {
        self.weave.gate()
    }

    #[inline(always)]
    pub fn strategy(&self) -> MarshallingStrategy {
        self.strategy
    }

    pub fn path(&self) -> Path {
        self.reader.path()
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        if self.current_depth > self.max_depth {
            return Err(Error::depth_exceed(format!(
                "Maximum nesting depth ({}) exceeded at {}",
                self.max_depth,
                self.reader.path()
            )));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }

    /// Type of the current node: its `class` attribute, else the default
    /// implementation of `declared`, else the type named by the node.
    pub fn resolve_type(&self, declared: Option<&TypeDescriptor>) -> TypeDescriptor {
        let mapper = self.mapper();
        let class_attr = mapper.encode_attribute(system_attribute::CLASS);
        if let Some(name) = self.reader.attribute(&class_attr) {
            return mapper.decode_node(name);
        }
        match declared {
            Some(declared) => mapper.default_implementation(declared),
            None => mapper.decode_node(self.reader.node_name()),
        }
    }

    /// Like [`resolve_type`](Self::resolve_type), and checks the result is
    /// assignable to a registered `declared` type.
    pub fn required_type(&self, declared: &TypeDescriptor) -> Result<TypeDescriptor, Error> {
        let actual = self.resolve_type(Some(declared));
        let resolver = self.resolver();
        if actual.is(builtin::NULL)
            || !resolver.contains(declared.name())
            || resolver.is_assignable(&actual, declared)
        {
            return Ok(actual);
        }
        Err(Error::malformed_tree(format!(
            "type `{}` is not assignable to `{}`",
            actual, declared
        ))
        .at_path(&self.reader.path().to_string()))
    }

    /// Reads the current node as a value of type `ty`.
    pub fn convert_another(&mut self, ty: &TypeDescriptor) -> Result<Value, Error> {
        self.convert_with(ty, None)
    }

    /// Reads the current node as a value of type `ty`, with `local` overriding
    /// the registry when given.
    ///
    /// A `reference` attribute short-cuts to the referenced value. Otherwise the
    /// permission gate is consulted before any converter runs.
    pub fn convert_with(
        &mut self,
        ty: &TypeDescriptor,
        local: Option<&Conversion>,
    ) -> Result<Value, Error> {
        self.inc_depth()?;
        let reference_attr = self.mapper().encode_attribute(system_attribute::REFERENCE);
        if let Some(reference) = self.reader.attribute(&reference_attr) {
            let reference = reference.to_string();
            let value = self.resolve_reference(&reference)?;
            self.dec_depth();
            return Ok(value);
        }

        self.gate().check(ty, self.resolver())?;
        if self.resolver().kind_of(ty) == Some(ClassKind::Abstract) {
            return Err(Error::malformed_tree(format!(
                "type `{}` is abstract and has no default implementation",
                ty
            ))
            .at_path(&self.reader.path().to_string()));
        }
        let key = self.current_key();
        let conversion = match local {
            Some(conversion) => conversion,
            None => self.registry().lookup(ty, self.resolver())?,
        };
        let value = match conversion {
            Conversion::Composite(converter) => converter
                .unmarshal(ty, self)
                .map_err(|e| e.at_path(&self.reader.path().to_string()))?,
            Conversion::SingleValue(converter) => {
                let value = converter
                    .from_text(ty, self.reader.value())
                    .map_err(|e| e.at_path(&self.reader.path().to_string()))?;
                self.check_variant(&value)?;
                value
            }
        };

        if let (Some(key), Value::Object(_)) = (key, &value) {
            self.ref_reader.store(key, value.clone());
        }
        self.dec_depth();
        Ok(value)
    }

    fn resolve_reference(&mut self, reference: &str) -> Result<Value, Error> {
        let key = match self.strategy.reference_mode() {
            None => {
                return Err(Error::malformed_tree(format!(
                    "reference `{}` found while reading with the tree strategy",
                    reference
                ))
                .at_path(&self.reader.path().to_string()))
            }
            Some(ReferenceMode::Id) => reference.trim().to_string(),
            Some(ReferenceMode::AbsolutePath | ReferenceMode::RelativePath) => self
                .reader
                .path()
                .apply(&Path::parse(reference.trim()))
                .to_string(),
        };
        log::trace!("{} refers to {}", self.reader.path(), key);
        Ok(self.ref_reader.resolve(&key))
    }

    /// Key the current node can be referred to by, if the strategy has one.
    fn current_key(&self) -> Option<String> {
        match self.strategy.reference_mode()? {
            ReferenceMode::Id => {
                let id_attr = self.mapper().encode_attribute(system_attribute::ID);
                self.reader.attribute(&id_attr).map(|id| id.trim().to_string())
            }
            ReferenceMode::AbsolutePath | ReferenceMode::RelativePath => {
                Some(self.reader.path().to_string())
            }
        }
    }

    pub(crate) fn check_variant(&self, value: &Value) -> Result<(), Error> {
        if let Value::Enum(e) = value {
            let known = self
                .resolver()
                .get_by_descriptor(&e.class)
                .is_some_and(|def| def.has_variant(&e.variant));
            if !known {
                return Err(Error::malformed_tree(format!(
                    "`{}` is not a variant of enum `{}`",
                    e.variant, e.class
                ))
                .at_path(&self.reader.path().to_string()));
            }
        }
        Ok(())
    }

    /// Instantiates the object for the current node and records it, so that
    /// references from its own subtree resolve to it.
    pub fn instantiate(&mut self, ty: &TypeDescriptor) -> Result<ObjRef, Error> {
        let obj = self.construct(ty)?;
        if let Some(key) = self.current_key() {
            self.ref_reader.store(key, Value::Object(obj.clone()));
        }
        Ok(obj)
    }

    /// Instantiates an object that no node stands for.
    pub fn construct(&self, ty: &TypeDescriptor) -> Result<ObjRef, Error> {
        self.gate().check(ty, self.resolver())?;
        self.resolver().instantiate(ty)
    }

    /// Reads the next child node, typed by its name or `class` attribute.
    pub fn read_item(&mut self) -> Result<Value, Error> {
        self.reader.move_down()?;
        let ty = self.resolve_type(None);
        let value = self.convert_another(&ty)?;
        self.reader.move_up()?;
        Ok(value)
    }

    /// Reads the next child node as a member declared as `declared`.
    pub fn read_member(
        &mut self,
        declared: &TypeDescriptor,
        local: Option<&Conversion>,
    ) -> Result<Value, Error> {
        let ty = self.required_type(declared)?;
        self.convert_with(&ty, local)
    }

    /// Ends the call: patches forward references and hands back the root.
    pub fn finish(self, root: Value) -> Result<Value, Error> {
        self.ref_reader.finish(root)
    }
}
