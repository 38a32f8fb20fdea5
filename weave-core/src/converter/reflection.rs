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

//! Records field by field, driven by the registered class definitions.

use super::{unexpected_value, Converter};
use crate::bail;
use crate::error::Error;
use crate::mapper::{ImplicitCollectionDef, Mapper};
use crate::resolver::context::{MarshalContext, UnmarshalContext};
use crate::resolver::type_resolver::FieldRef;
use crate::strategy::{MarshallingStrategy, ReferenceMode};
use crate::tree::{TreeReader, TreeWriter};
use crate::types::{system_attribute, TypeDescriptor};
use crate::value::{ObjRef, Value};

/// Fallback converter for every registered record class.
///
/// Fields are written in declaration order, supertype fields first. Transient
/// fields and null fields without a default are skipped. A null field with a
/// default is written as an explicit null member. Fields selected by the
/// attribute mapper become attributes, implicit collections are flattened into their owner. Fields an
/// object carries beyond its class definition are not written.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReflectionConverter;

fn find_field<'a>(
    mapper: &dyn Mapper,
    fields: &[FieldRef<'a>],
    name: &str,
) -> Option<FieldRef<'a>> {
    fields
        .iter()
        .find(|f| mapper.decode_member(f.owner, name) == f.def.name())
        .copied()
}

/// Whether `attribute`, as written in the tree, names a system attribute in use
/// under `strategy`.
fn is_system_attribute(
    mapper: &dyn Mapper,
    strategy: MarshallingStrategy,
    attribute: &str,
) -> bool {
    let name = mapper.decode_attribute(attribute);
    let in_use = match name.as_str() {
        system_attribute::CLASS | system_attribute::REFERENCE => true,
        system_attribute::ID => strategy.reference_mode() == Some(ReferenceMode::Id),
        _ => false,
    };
    // an unaliased system name may be free for a field once the system name is aliased
    in_use && mapper.encode_attribute(&name) == attribute
}

fn write_implicit(
    ctx: &mut MarshalContext,
    def: &ImplicitCollectionDef,
    collection: &Value,
) -> Result<(), Error> {
    let items = match collection {
        Value::Object(obj) => obj
            .borrow()
            .items()
            .map(<[Value]>::to_vec)
            .ok_or_else(|| unexpected_value(collection))?,
        other => return Err(unexpected_value(other)),
    };
    let mapper = ctx.mapper();
    for item in &items {
        let actual = item.type_descriptor();
        match &def.item_name {
            Some(item_name) => {
                ctx.writer.begin_node(item_name)?;
                let implied = def
                    .item_type
                    .as_ref()
                    .map(|ty| mapper.default_implementation(ty));
                if implied.map_or(true, |ty| ty.name() != actual.name()) {
                    ctx.write_class_attribute(&actual)?;
                }
            }
            None => ctx.writer.begin_node(&mapper.encode_node(&actual))?,
        }
        ctx.convert_another(item)?;
        ctx.writer.end_node()?;
    }
    Ok(())
}

fn read_implicit_item(
    ctx: &mut UnmarshalContext,
    obj: &ObjRef,
    fields: &[FieldRef],
    name: &str,
    ty: &TypeDescriptor,
) -> Result<(), Error> {
    let mapper = ctx.mapper();
    let candidate = ctx.resolve_type(None);
    let mut owners: Vec<&TypeDescriptor> = Vec::new();
    for field in fields {
        if !owners.iter().any(|o| o.name() == field.owner.name()) {
            owners.push(field.owner);
        }
    }
    let found = owners.into_iter().find_map(|owner| {
        mapper
            .implicit_collection_for_item(owner, name, Some(&candidate))
            .and_then(|field| mapper.implicit_collection(owner, &field))
    });
    let Some(def) = found else {
        bail!("unknown field `{}` in `{}`", name, ty);
    };
    let Some(field) = fields.iter().find(|f| f.def.name() == def.field) else {
        bail!("implicit collection `{}` is not a field of `{}`", def.field, ty);
    };

    let class_attr = mapper.encode_attribute(system_attribute::CLASS);
    let item_type = match (&def.item_name, &def.item_type) {
        (Some(item_name), Some(item_type))
            if item_name == name && ctx.reader.attribute(&class_attr).is_none() =>
        {
            mapper.default_implementation(item_type)
        }
        _ => candidate,
    };
    let item = ctx.convert_another(&item_type)?;

    let collection = match obj.get(&def.field) {
        Some(Value::Object(collection)) => collection,
        _ => {
            let declared = mapper.default_implementation(field.def.declared());
            let collection = ctx.construct(&declared)?;
            obj.set(def.field.clone(), Value::Object(collection.clone()));
            collection
        }
    };
    if !collection.push(item) {
        bail!("implicit collection `{}` of `{}` does not hold items", def.field, ty);
    }
    Ok(())
}

impl Converter for ReflectionConverter {
    fn marshal(&self, value: &Value, ctx: &mut MarshalContext) -> Result<(), Error> {
        let obj = match value {
            Value::Object(obj) => obj,
            other => return Err(unexpected_value(other)),
        };
        let class = obj.class();
        let mapper = ctx.mapper();
        let fields = ctx.resolver().fields_of(&class);

        // snapshot, so no borrow is held while children are written
        let mut members = Vec::with_capacity(fields.len());
        {
            let object = obj.borrow();
            let values = object.fields().ok_or_else(|| unexpected_value(value))?;
            for field in fields {
                let name = field.def.name();
                if field.def.is_transient() || !mapper.should_serialize_member(field.owner, name) {
                    continue;
                }
                match values.get(name) {
                    Some(v) if !v.is_null() => members.push((field, v.clone())),
                    // left out, the reader would restore the default
                    _ if field.def.default_value().is_some() => {
                        members.push((field, Value::Null))
                    }
                    _ => {}
                }
            }
        }

        // attributes go before any child node
        let strategy = ctx.strategy();
        let mut elements = Vec::with_capacity(members.len());
        for (field, v) in members {
            let declared = field.def.declared();
            let name = mapper.encode_member(field.owner, field.def.name());
            let as_attribute = if v.type_descriptor().name()
                == mapper.default_implementation(declared).name()
            {
                mapper.converter_from_item_type(field.owner, field.def.name(), declared)
            } else {
                None
            };
            match as_attribute {
                Some(converter) => {
                    if is_system_attribute(mapper, strategy, &name) {
                        return Err(Error::invalid_config(format!(
                            "attribute `{}` of `{}` clashes with a system attribute",
                            name, class
                        )));
                    }
                    let text = converter.to_text(&v)?;
                    ctx.writer.set_attribute(&name, &text)?;
                }
                None => elements.push((field, name, v)),
            }
        }

        for (field, name, v) in elements {
            if v.is_null() {
                ctx.write_member(&name, field.def.declared(), &v, None)?;
                continue;
            }
            if let Some(def) = mapper.implicit_collection(field.owner, field.def.name()) {
                write_implicit(ctx, &def, &v)?;
                continue;
            }
            let local = mapper.local_converter(field.owner, field.def.name());
            ctx.write_member(&name, field.def.declared(), &v, local.as_ref())?;
        }
        Ok(())
    }

    fn unmarshal(&self, ty: &TypeDescriptor, ctx: &mut UnmarshalContext) -> Result<Value, Error> {
        let obj = ctx.instantiate(ty)?;
        let mapper = ctx.mapper();
        let fields = ctx.resolver().fields_of(ty);

        let strategy = ctx.strategy();
        for attribute in ctx.reader.attribute_names() {
            if is_system_attribute(mapper, strategy, &attribute) {
                continue;
            }
            let Some(field) = find_field(mapper, &fields, &attribute) else {
                log::debug!("ignoring unknown attribute `{}` of `{}`", attribute, ty);
                continue;
            };
            let declared = field.def.declared();
            let Some(converter) =
                mapper.converter_from_item_type(field.owner, field.def.name(), declared)
            else {
                bail!(
                    "field `{}` of `{}` is not written as an attribute",
                    field.def.name(),
                    ty
                );
            };
            ctx.gate().check(declared, ctx.resolver())?;
            let text = ctx.reader.attribute(&attribute).unwrap_or_default();
            let value = converter.from_text(declared, text)?;
            ctx.check_variant(&value)?;
            obj.set(field.def.name(), value);
        }

        while ctx.reader.has_more_children() {
            ctx.reader.move_down()?;
            let name = ctx.reader.node_name().to_string();
            let member = find_field(mapper, &fields, &name)
                .filter(|f| mapper.implicit_collection(f.owner, f.def.name()).is_none());
            match member {
                Some(field)
                    if field.def.is_transient()
                        || !mapper.should_serialize_member(field.owner, field.def.name()) =>
                {
                    log::debug!("skipping omitted field `{}` of `{}`", field.def.name(), ty);
                }
                Some(field) => {
                    let local = mapper.local_converter(field.owner, field.def.name());
                    let value = ctx.read_member(field.def.declared(), local.as_ref())?;
                    obj.set(field.def.name(), value);
                }
                None => read_implicit_item(ctx, &obj, &fields, &name, ty)?,
            }
            ctx.reader.move_up()?;
        }
        Ok(Value::Object(obj))
    }
}
