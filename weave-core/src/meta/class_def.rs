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
use std::sync::Arc;

use crate::types::{builtin, ClassKind, Provenance, TypeDescriptor};
use crate::value::ObjectData;

/// Builds the initial state of a freshly instantiated object.
pub type Factory = Arc<dyn Fn() -> ObjectData + Send + Sync>;

#[derive(Clone, Debug)]
pub struct FieldDef {
    name: String,
    declared: TypeDescriptor,
    default: Option<DefaultValue>,
    transient: bool,
}

/// Scalar default assigned to a field when an object is instantiated.
///
/// Object defaults are not allowed: a shared default object would alias every
/// instance.
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FieldDef {
    pub fn new(name: impl Into<String>, declared: impl Into<TypeDescriptor>) -> Self {
        FieldDef {
            name: name.into(),
            declared: declared.into(),
            default: None,
            transient: false,
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn declared(&self) -> &TypeDescriptor {
        &self.declared
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    #[inline(always)]
    pub fn is_transient(&self) -> bool {
        self.transient
    }
}

/// Compile-time description of a reconstructable type.
///
/// This is what replaces reflective instantiation: the engine only ever builds
/// objects of classes registered here, through their factory.
///
/// ```rust
/// use weave_core::meta::ClassDef;
/// use weave_core::types::ClassKind;
///
/// let person = ClassDef::record("com.acme.Person")
///     .extends("com.acme.Party")
///     .field("name", "string")
///     .field("age", "int")
///     .transient_field("cache", "object");
/// assert_eq!(person.kind(), ClassKind::Record);
/// assert_eq!(person.own_fields().len(), 3);
/// ```
#[derive(Clone)]
pub struct ClassDef {
    descriptor: TypeDescriptor,
    kind: ClassKind,
    provenance: Provenance,
    supertypes: Vec<TypeDescriptor>,
    fields: Vec<FieldDef>,
    variants: Vec<String>,
    factory: Option<Factory>,
}

impl ClassDef {
    pub(crate) fn with_kind(descriptor: impl Into<TypeDescriptor>, kind: ClassKind) -> Self {
        ClassDef {
            descriptor: descriptor.into(),
            kind,
            provenance: Provenance::Declared,
            supertypes: Vec::new(),
            fields: Vec::new(),
            variants: Vec::new(),
            factory: None,
        }
    }

    pub fn record(descriptor: impl Into<TypeDescriptor>) -> Self {
        ClassDef::with_kind(descriptor, ClassKind::Record)
    }

    pub fn sequence(descriptor: impl Into<TypeDescriptor>) -> Self {
        ClassDef::with_kind(descriptor, ClassKind::Sequence).extends(builtin::COLLECTION)
    }

    pub fn mapping(descriptor: impl Into<TypeDescriptor>) -> Self {
        ClassDef::with_kind(descriptor, ClassKind::Mapping).extends(builtin::MAP)
    }

    pub fn abstract_type(descriptor: impl Into<TypeDescriptor>) -> Self {
        ClassDef::with_kind(descriptor, ClassKind::Abstract)
    }

    pub fn value_type(descriptor: impl Into<TypeDescriptor>) -> Self {
        ClassDef::with_kind(descriptor, ClassKind::Value)
    }

    pub fn enumeration<I, S>(descriptor: impl Into<TypeDescriptor>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut def = ClassDef::with_kind(descriptor, ClassKind::Enum).extends(builtin::ENUM);
        def.variants = variants.into_iter().map(Into::into).collect();
        def
    }

    /// A runtime generated proxy implementing `interfaces`.
    pub fn dynamic_proxy<I, T>(descriptor: impl Into<TypeDescriptor>, interfaces: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeDescriptor>,
    {
        let mut def = ClassDef::with_kind(descriptor, ClassKind::Record);
        def.provenance = Provenance::DynamicProxy;
        def.supertypes = interfaces.into_iter().map(Into::into).collect();
        def
    }

    /// A type synthesized at runtime (lambdas, generated accessors, ...).
    pub fn synthesized(descriptor: impl Into<TypeDescriptor>) -> Self {
        let mut def = ClassDef::with_kind(descriptor, ClassKind::Record);
        def.provenance = Provenance::Synthesized;
        def
    }

    pub fn extends(mut self, supertype: impl Into<TypeDescriptor>) -> Self {
        let supertype = supertype.into();
        if !self.supertypes.contains(&supertype) {
            self.supertypes.push(supertype);
        }
        self
    }

    pub fn field(mut self, name: impl Into<String>, declared: impl Into<TypeDescriptor>) -> Self {
        self.fields.push(FieldDef::new(name, declared));
        self
    }

    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        declared: impl Into<TypeDescriptor>,
        default: DefaultValue,
    ) -> Self {
        let mut field = FieldDef::new(name, declared);
        field.default = Some(default);
        self.fields.push(field);
        self
    }

    pub fn transient_field(
        mut self,
        name: impl Into<String>,
        declared: impl Into<TypeDescriptor>,
    ) -> Self {
        let mut field = FieldDef::new(name, declared);
        field.transient = true;
        self.fields.push(field);
        self
    }

    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Replaces the default factory derived from the class shape.
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> ObjectData + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    #[inline(always)]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    #[inline(always)]
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    #[inline(always)]
    pub fn get_provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn supertypes(&self) -> &[TypeDescriptor] {
        &self.supertypes
    }

    /// Fields declared by this class only, inherited ones excluded.
    pub fn own_fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn has_variant(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| v == variant)
    }

    pub fn get_factory(&self) -> Option<&Factory> {
        self.factory.as_ref()
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("descriptor", &self.descriptor)
            .field("kind", &self.kind)
            .field("provenance", &self.provenance)
            .field("supertypes", &self.supertypes)
            .field("fields", &self.fields)
            .field("variants", &self.variants)
            .field("custom_factory", &self.factory.is_some())
            .finish()
    }
}
