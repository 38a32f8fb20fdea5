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
use crate::types::{builtin, TypeDescriptor};

/// Concrete types used for abstract declared types.
pub struct DefaultImplementationsMapper {
    inner: Box<dyn Mapper>,
    defaults: HashMap<String, TypeDescriptor>,
}

impl DefaultImplementationsMapper {
    /// Starts with `collection` implemented by `list`.
    pub fn new(inner: Box<dyn Mapper>) -> Self {
        let mut mapper = DefaultImplementationsMapper {
            inner,
            defaults: HashMap::new(),
        };
        mapper.add(
            TypeDescriptor::new(builtin::COLLECTION),
            TypeDescriptor::new(builtin::LIST),
        );
        mapper
    }

    pub fn add(&mut self, declared: TypeDescriptor, implementation: TypeDescriptor) {
        self.defaults
            .insert(declared.name().to_string(), implementation);
    }
}

impl Mapper for DefaultImplementationsMapper {
    fn inner(&self) -> Option<&dyn Mapper> {
        Some(self.inner.as_ref())
    }

    fn default_implementation(&self, ty: &TypeDescriptor) -> TypeDescriptor {
        match self.defaults.get(ty.name()) {
            Some(implementation) => implementation.clone(),
            None => self.inner.default_implementation(ty),
        }
    }
}
