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

use crate::config::Config;
use crate::converter::{Conversion, Converter, SingleValueConverter};
use crate::ensure;
use crate::error::Error;
use crate::mapper::{
    AttributeAliasingMapper, AttributeMapper, ClassAliasingMapper, DefaultImplementationsMapper,
    DefaultMapper, FieldAliasingMapper, ImplicitCollectionDef, ImplicitCollectionMapper,
    LocalConversionMapper, Mapper, MapperChain,
};
use crate::meta::ClassDef;
use crate::resolver::context::{MarshalContext, UnmarshalContext};
use crate::resolver::converter_resolver::{ConverterRegistry, Matcher};
use crate::resolver::type_resolver::ClassResolver;
use crate::security::{
    ExplicitTypePermission, PermissionGate, RegexTypePermission, TypeHierarchyPermission,
    TypePermission, WildcardTypePermission,
};
use crate::strategy::MarshallingStrategy;
use crate::tree::{NodeReader, NodeWriter, TreeNode, TreeReader, TreeWriter};
use crate::types::{builtin, system_attribute, TypeDescriptor};
use crate::value::Value;

type Decorator = Box<dyn FnOnce(Box<dyn Mapper>) -> Box<dyn Mapper>>;

/// The object graph serialization engine.
///
/// A `Weave` is assembled once through [`WeaveBuilder`] and is immutable
/// afterwards. It is `Send + Sync`, so one engine can be shared behind an `Arc`
/// and used from any number of threads; every call owns its own context and
/// reference table.
///
/// # Examples
///
/// ```rust
/// use weave_core::meta::ClassDef;
/// use weave_core::value::{ObjRef, Value};
/// use weave_core::Weave;
///
/// let weave = Weave::builder()
///     .register_class(ClassDef::record("com.acme.Person").field("name", "string"))
///     .alias("person", "com.acme.Person")
///     .allow_types(["com.acme.Person"])
///     .build()
///     .unwrap();
///
/// let person = Value::Object(ObjRef::record("com.acme.Person", [("name", Value::str("Ada"))]));
/// let tree = weave.to_tree(&person).unwrap();
/// assert_eq!(tree.to_string(), "<person><name>Ada</name></person>");
/// assert_eq!(weave.from_tree(&tree).unwrap(), person);
/// ```
pub struct Weave {
    config: Config,
    resolver: Arc<ClassResolver>,
    registry: Arc<ConverterRegistry>,
    mapper: MapperChain,
    gate: PermissionGate,
}

impl Default for Weave {
    /// Builtin classes and converters, the default permission rules.
    fn default() -> Self {
        WeaveBuilder::new().assemble()
    }
}

impl Weave {
    pub fn builder() -> WeaveBuilder {
        WeaveBuilder::new()
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline(always)]
    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.head()
    }

    #[inline(always)]
    pub fn resolver(&self) -> &ClassResolver {
        &self.resolver
    }

    #[inline(always)]
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    #[inline(always)]
    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// Writes `value` as the root node of `writer`.
    pub fn marshal(
        &self,
        value: &Value,
        writer: &mut dyn TreeWriter,
        strategy: MarshallingStrategy,
    ) -> Result<(), Error> {
        let ty = value.type_descriptor();
        log::debug!("marshalling {} with the {} strategy", ty, strategy);
        let name = self.mapper().encode_node(&ty);
        let mut ctx = MarshalContext::new(self, writer, strategy);
        ctx.writer.begin_node(&name)?;
        ctx.convert_another(value)?;
        ctx.writer.end_node()
    }

    /// Reads the value rooted at the current node of `reader`.
    ///
    /// With a `target`, the root must be of a type assignable to it.
    pub fn unmarshal(
        &self,
        reader: &mut dyn TreeReader,
        target: Option<&TypeDescriptor>,
        strategy: MarshallingStrategy,
    ) -> Result<Value, Error> {
        let mut ctx = UnmarshalContext::new(self, reader, strategy);
        let ty = ctx.resolve_type(None);
        log::debug!("unmarshalling {} with the {} strategy", ty, strategy);
        if let Some(target) = target {
            ensure!(
                ty.is(builtin::NULL) || self.resolver.is_assignable(&ty, target),
                "root of type `{}` is not assignable to `{}`",
                ty,
                target
            );
        }
        let root = ctx.convert_another(&ty)?;
        ctx.finish(root)
    }

    /// Marshals into an in-memory tree with the configured strategy.
    pub fn to_tree(&self, value: &Value) -> Result<TreeNode, Error> {
        self.to_tree_with(value, self.config.strategy())
    }

    pub fn to_tree_with(
        &self,
        value: &Value,
        strategy: MarshallingStrategy,
    ) -> Result<TreeNode, Error> {
        let mut writer = NodeWriter::new();
        self.marshal(value, &mut writer, strategy)?;
        writer.finish()
    }

    /// Unmarshals an in-memory tree with the configured strategy.
    pub fn from_tree(&self, tree: &TreeNode) -> Result<Value, Error> {
        self.from_tree_with(tree, None, self.config.strategy())
    }

    pub fn from_tree_with(
        &self,
        tree: &TreeNode,
        target: Option<&TypeDescriptor>,
        strategy: MarshallingStrategy,
    ) -> Result<Value, Error> {
        let mut reader = NodeReader::new(tree);
        self.unmarshal(&mut reader, target, strategy)
    }
}

impl std::fmt::Debug for Weave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Weave")
            .field("config", &self.config)
            .field("converters", &self.registry.len())
            .field("mapper", &self.mapper)
            .field("gate", &self.gate)
            .finish()
    }
}

/// One-time configuration of a [`Weave`].
///
/// Methods consume and return the builder. Configuration mistakes (duplicate
/// classes or aliases, invalid patterns, unknown fields) are remembered and
/// reported by [`build`](WeaveBuilder::build); the first one wins.
pub struct WeaveBuilder {
    config: Config,
    resolver: ClassResolver,
    registry: ConverterRegistry,
    gate: PermissionGate,
    class_aliases: Vec<(String, TypeDescriptor)>,
    field_aliases: Vec<(TypeDescriptor, String, String)>,
    omitted_fields: Vec<(TypeDescriptor, String)>,
    attribute_aliases: Vec<(String, String)>,
    attribute_fields: Vec<(TypeDescriptor, String)>,
    attribute_types: Vec<TypeDescriptor>,
    local_converters: Vec<(TypeDescriptor, String, Conversion)>,
    implicit_collections: Vec<(TypeDescriptor, ImplicitCollectionDef)>,
    default_implementations: Vec<(TypeDescriptor, TypeDescriptor)>,
    immutable_types: Vec<TypeDescriptor>,
    decorators: Vec<Decorator>,
    error: Option<Error>,
}

impl Default for WeaveBuilder {
    fn default() -> Self {
        WeaveBuilder::new()
    }
}

impl WeaveBuilder {
    pub fn new() -> Self {
        WeaveBuilder {
            config: Config::default(),
            resolver: ClassResolver::default(),
            registry: ConverterRegistry::default(),
            gate: PermissionGate::default(),
            class_aliases: Vec::new(),
            field_aliases: Vec::new(),
            omitted_fields: Vec::new(),
            attribute_aliases: Vec::new(),
            attribute_fields: Vec::new(),
            attribute_types: Vec::new(),
            local_converters: Vec::new(),
            implicit_collections: Vec::new(),
            default_implementations: Vec::new(),
            immutable_types: Vec::new(),
            decorators: Vec::new(),
            error: None,
        }
    }

    fn fail(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn check(mut self, result: Result<(), Error>) -> Self {
        if let Err(err) = result {
            self.fail(err);
        }
        self
    }

    pub fn register_class(mut self, def: ClassDef) -> Self {
        let result = self.resolver.register(def);
        self.check(result)
    }

    pub fn register_converter<C: Converter + 'static>(
        mut self,
        matcher: Matcher,
        converter: C,
        priority: i32,
    ) -> Self {
        self.registry
            .register_converter(matcher, converter, priority);
        self
    }

    pub fn register_single_value_converter<C: SingleValueConverter + 'static>(
        mut self,
        matcher: Matcher,
        converter: C,
        priority: i32,
    ) -> Self {
        self.registry
            .register_single_value_converter(matcher, converter, priority);
        self
    }

    /// Writes nodes of type `ty` as `alias`, and reads `alias` back as `ty`.
    pub fn alias(mut self, alias: &str, ty: impl Into<TypeDescriptor>) -> Self {
        let ty = ty.into();
        if let Some((_, other)) = self.class_aliases.iter().find(|(a, _)| a == alias) {
            let err = Error::invalid_config(format!(
                "alias `{}` is already used for `{}`",
                alias, other
            ));
            self.fail(err);
            return self;
        }
        self.class_aliases.push((alias.to_string(), ty));
        self
    }

    /// Renames `field` of `owner` to `alias` in the tree.
    pub fn alias_field(
        mut self,
        owner: impl Into<TypeDescriptor>,
        field: &str,
        alias: &str,
    ) -> Self {
        let owner = owner.into();
        let taken = self
            .field_aliases
            .iter()
            .any(|(o, _, a)| o.name() == owner.name() && a == alias);
        if taken {
            let err = Error::invalid_config(format!(
                "alias `{}` is already used by a field of `{}`",
                alias, owner
            ));
            self.fail(err);
            return self;
        }
        self.field_aliases
            .push((owner, field.to_string(), alias.to_string()));
        self
    }

    /// Never writes `field` of `owner`, and skips it when reading.
    pub fn omit_field(mut self, owner: impl Into<TypeDescriptor>, field: &str) -> Self {
        self.omitted_fields.push((owner.into(), field.to_string()));
        self
    }

    /// Renames one of the system attributes `class`, `id` or `reference`.
    pub fn alias_attribute(mut self, name: &str, alias: &str) -> Self {
        if !system_attribute::ALL.contains(&name) {
            let err = Error::invalid_config(format!(
                "`{}` is not a system attribute, expected one of {:?}",
                name,
                system_attribute::ALL
            ));
            self.fail(err);
            return self;
        }
        self.attribute_aliases
            .push((name.to_string(), alias.to_string()));
        self
    }

    /// Writes `field` of `owner` as an attribute of the owner's node.
    pub fn use_attribute_for(mut self, owner: impl Into<TypeDescriptor>, field: &str) -> Self {
        self.attribute_fields.push((owner.into(), field.to_string()));
        self
    }

    /// Writes every field declared as `ty` as an attribute.
    pub fn use_attribute_for_type(mut self, ty: impl Into<TypeDescriptor>) -> Self {
        self.attribute_types.push(ty.into());
        self
    }

    /// Converts `field` of `owner` with `conversion` instead of the registry's.
    pub fn register_local_converter(
        mut self,
        owner: impl Into<TypeDescriptor>,
        field: &str,
        conversion: Conversion,
    ) -> Self {
        self.local_converters
            .push((owner.into(), field.to_string(), conversion));
        self
    }

    /// Writes the items of a collection field directly inside the owner node.
    pub fn add_implicit_collection(
        mut self,
        owner: impl Into<TypeDescriptor>,
        def: ImplicitCollectionDef,
    ) -> Self {
        self.implicit_collections.push((owner.into(), def));
        self
    }

    pub fn add_default_implementation(
        mut self,
        declared: impl Into<TypeDescriptor>,
        implementation: impl Into<TypeDescriptor>,
    ) -> Self {
        self.default_implementations
            .push((declared.into(), implementation.into()));
        self
    }

    /// Never reference tracks values of `ty`.
    pub fn add_immutable_type(mut self, ty: impl Into<TypeDescriptor>) -> Self {
        self.immutable_types.push(ty.into());
        self
    }

    /// Wraps the mapper chain in a custom decorator. Decorators added later end
    /// up further out.
    pub fn decorate_mapper<F>(mut self, decorate: F) -> Self
    where
        F: FnOnce(Box<dyn Mapper>) -> Box<dyn Mapper> + 'static,
    {
        self.decorators.push(Box::new(decorate));
        self
    }

    /// Allows the named types, sensitive ones included.
    pub fn allow_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gate.allow(ExplicitTypePermission::new(names));
        self
    }

    pub fn allow_types_by_wildcard<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match WildcardTypePermission::new(patterns) {
            Ok(rule) => self.gate.allow(rule),
            Err(err) => self.fail(err),
        }
        self
    }

    pub fn allow_types_by_regex<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match RegexTypePermission::new(patterns) {
            Ok(rule) => self.gate.allow(rule),
            Err(err) => self.fail(err),
        }
        self
    }

    /// Allows every type assignable to `base`.
    pub fn allow_type_hierarchy(mut self, base: impl Into<TypeDescriptor>) -> Self {
        self.gate.allow(TypeHierarchyPermission::new(base));
        self
    }

    pub fn add_permission<P: TypePermission + 'static>(mut self, rule: P) -> Self {
        self.gate.allow(rule);
        self
    }

    /// Denies the named types whatever the allow rules say.
    pub fn deny_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gate.deny(ExplicitTypePermission::new(names));
        self
    }

    pub fn deny_types_by_wildcard<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match WildcardTypePermission::new(patterns) {
            Ok(rule) => self.gate.deny(rule),
            Err(err) => self.fail(err),
        }
        self
    }

    pub fn deny_permission<P: TypePermission + 'static>(mut self, rule: P) -> Self {
        self.gate.deny(rule);
        self
    }

    /// Strategy used by `to_tree` and `from_tree`.
    pub fn strategy(mut self, strategy: MarshallingStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Freezes the configuration into an engine.
    pub fn build(mut self) -> Result<Weave, Error> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        ensure!(
            self.config.max_depth > 0,
            Error::invalid_config("max depth must be at least 1")
        );
        for (owner, def) in &self.implicit_collections {
            if self.resolver.field(owner, &def.field).is_none() {
                let err = Error::invalid_config(format!(
                    "implicit collection `{}` is not a field of `{}`",
                    def.field, owner
                ));
                return Err(err);
            }
        }
        Ok(self.assemble())
    }

    fn assemble(self) -> Weave {
        let resolver = Arc::new(self.resolver);
        let registry = Arc::new(self.registry);

        let mut default_mapper = DefaultMapper::new(resolver.clone());
        for ty in self.immutable_types {
            default_mapper.add_immutable_type(ty);
        }
        let class_aliases = self.class_aliases;
        let field_aliases = self.field_aliases;
        let omitted_fields = self.omitted_fields;
        let attribute_aliases = self.attribute_aliases;
        let implicit_collections = self.implicit_collections;
        let attribute_fields = self.attribute_fields;
        let attribute_types = self.attribute_types;
        let local_converters = self.local_converters;
        let default_implementations = self.default_implementations;
        let implicit_resolver = resolver.clone();
        let attribute_resolver = resolver.clone();
        let attribute_registry = registry.clone();

        let mut chain = MapperChain::new(Box::new(default_mapper))
            .wrap(|inner| {
                let mut mapper = DefaultImplementationsMapper::new(inner);
                for (declared, implementation) in default_implementations {
                    mapper.add(declared, implementation);
                }
                Box::new(mapper)
            })
            .wrap(|inner| {
                let mut mapper = ClassAliasingMapper::new(inner);
                for (alias, ty) in class_aliases {
                    mapper.alias(&alias, ty);
                }
                Box::new(mapper)
            })
            .wrap(|inner| {
                let mut mapper = FieldAliasingMapper::new(inner);
                for (owner, field, alias) in &field_aliases {
                    mapper.alias(owner, field, alias);
                }
                for (owner, field) in &omitted_fields {
                    mapper.omit(owner, field);
                }
                Box::new(mapper)
            })
            .wrap(|inner| {
                let mut mapper = AttributeAliasingMapper::new(inner);
                for (name, alias) in &attribute_aliases {
                    mapper.alias(name, alias);
                }
                Box::new(mapper)
            })
            .wrap(|inner| {
                let mut mapper = ImplicitCollectionMapper::new(inner, implicit_resolver);
                for (owner, def) in implicit_collections {
                    mapper.add(&owner, def);
                }
                Box::new(mapper)
            })
            .wrap(|inner| {
                let mut mapper = AttributeMapper::new(inner, attribute_registry, attribute_resolver);
                for (owner, field) in &attribute_fields {
                    mapper.add_field(owner, field);
                }
                for ty in &attribute_types {
                    mapper.add_type(ty);
                }
                Box::new(mapper)
            })
            .wrap(|inner| {
                let mut mapper = LocalConversionMapper::new(inner);
                for (owner, field, conversion) in local_converters {
                    mapper.add(&owner, &field, conversion);
                }
                Box::new(mapper)
            });
        for decorate in self.decorators {
            chain = chain.wrap(decorate);
        }
        log::debug!(
            "built weave engine: {} converters, {} mappers, {:?}",
            registry.len(),
            chain.len(),
            self.gate
        );

        Weave {
            config: self.config,
            resolver,
            registry,
            mapper: chain,
            gate: self.gate,
        }
    }
}
