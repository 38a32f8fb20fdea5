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

use super::{unexpected_value, SingleValueConverter};
use crate::error::Error;
use crate::types::TypeDescriptor;
use crate::value::{EnumValue, Value};

/// Enum constants are written as their variant name.
///
/// The variant is checked against the registered class when the value is read
/// back, from a node or from an attribute.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnumConverter;

impl SingleValueConverter for EnumConverter {
    fn to_text(&self, value: &Value) -> Result<String, Error> {
        match value {
            Value::Enum(e) => Ok(e.variant.clone()),
            other => Err(unexpected_value(other)),
        }
    }

    fn from_text(&self, ty: &TypeDescriptor, text: &str) -> Result<Value, Error> {
        let variant = text.trim();
        if variant.is_empty() {
            return Err(Error::malformed_tree(format!(
                "empty variant for enum `{}`",
                ty
            )));
        }
        Ok(Value::Enum(EnumValue::new(ty.clone(), variant)))
    }
}
