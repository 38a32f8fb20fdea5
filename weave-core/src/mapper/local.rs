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
use std::sync::Arc;

use super::Mapper;
use crate::converter::{Conversion, SingleValueConverter};
use crate::types::TypeDescriptor;

/// Per field conversions that take precedence over the registry.
pub struct LocalConversionMapper {
    inner: Box<dyn Mapper>,
    locals: HashMap<(String, String), Conversion>,
}

impl LocalConversionMapper {
    pub fn new(inner: Box<dyn Mapper>) -> Self {
        LocalConversionMapper {
            inner,
            locals: HashMap::new(),
        }
    }

    pub fn add(&mut self, owner: &TypeDescriptor, field: &str, conversion: Conversion) {
        self.locals
            .insert((owner.name().to_string(), field.to_string()), conversion);
    }

    fn get(&self, owner: &TypeDescriptor, field: &str) -> Option<&Conversion> {
        self.locals
            .get(&(owner.name().to_string(), field.to_string()))
    }
}

impl Mapper for LocalConversionMapper {
    fn inner(&self) -> Option<&dyn Mapper> {
        Some(self.inner.as_ref())
    }

    fn local_converter(&self, owner: &TypeDescriptor, field: &str) -> Option<Conversion> {
        match self.get(owner, field) {
            Some(conversion) => Some(conversion.clone()),
            None => self.inner.local_converter(owner, field),
        }
    }

    /// An attribute field keeps its local single value converter.
    fn converter_from_item_type(
        &self,
        owner: &TypeDescriptor,
        field: &str,
        ty: &TypeDescriptor,
    ) -> Option<Arc<dyn SingleValueConverter>> {
        let inherited = self.inner.converter_from_item_type(owner, field, ty)?;
        match self.get(owner, field).and_then(Conversion::as_single_value) {
            Some(local) => Some(local.clone()),
            None => Some(inherited),
        }
    }
}
