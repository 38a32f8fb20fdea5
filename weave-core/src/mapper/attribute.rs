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

use std::collections::HashSet;
use std::sync::Arc;

use super::Mapper;
use crate::converter::SingleValueConverter;
use crate::resolver::converter_resolver::ConverterRegistry;
use crate::resolver::type_resolver::ClassResolver;
use crate::types::TypeDescriptor;

/// Selects fields written as attributes of their owner node, by field or by
/// declared type. Only types with a single value converter qualify.
pub struct AttributeMapper {
    inner: Box<dyn Mapper>,
    registry: Arc<ConverterRegistry>,
    resolver: Arc<ClassResolver>,
    fields: HashSet<(String, String)>,
    types: HashSet<String>,
}

impl AttributeMapper {
    pub fn new(
        inner: Box<dyn Mapper>,
        registry: Arc<ConverterRegistry>,
        resolver: Arc<ClassResolver>,
    ) -> Self {
        AttributeMapper {
            inner,
            registry,
            resolver,
            fields: HashSet::new(),
            types: HashSet::new(),
        }
    }

    pub fn add_field(&mut self, owner: &TypeDescriptor, field: &str) {
        self.fields
            .insert((owner.name().to_string(), field.to_string()));
    }

    pub fn add_type(&mut self, ty: &TypeDescriptor) {
        self.types.insert(ty.name().to_string());
    }
}

impl Mapper for AttributeMapper {
    fn inner(&self) -> Option<&dyn Mapper> {
        Some(self.inner.as_ref())
    }

    fn converter_from_item_type(
        &self,
        owner: &TypeDescriptor,
        field: &str,
        ty: &TypeDescriptor,
    ) -> Option<Arc<dyn SingleValueConverter>> {
        let selected = self
            .fields
            .contains(&(owner.name().to_string(), field.to_string()))
            || self.types.contains(ty.name());
        if selected {
            self.registry.lookup_single_value(ty, &self.resolver)
        } else {
            self.inner.converter_from_item_type(owner, field, ty)
        }
    }
}
