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

use super::{unexpected_value, Converter};
use crate::error::Error;
use crate::resolver::context::{MarshalContext, UnmarshalContext};
use crate::tree::TreeReader;
use crate::types::TypeDescriptor;
use crate::value::{ObjectData, Value};

/// Sequences as one child node per item, each named after the item's type.
///
/// ```text
/// <list>
///   <string>a</string>
///   <int>1</int>
/// </list>
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CollectionConverter;

impl Converter for CollectionConverter {
    fn marshal(&self, value: &Value, ctx: &mut MarshalContext) -> Result<(), Error> {
        let items = match value {
            Value::Object(obj) => match &obj.borrow().data {
                ObjectData::Items(items) => items.clone(),
                _ => return Err(unexpected_value(value)),
            },
            other => return Err(unexpected_value(other)),
        };
        for item in &items {
            ctx.write_item(item)?;
        }
        Ok(())
    }

    fn unmarshal(&self, ty: &TypeDescriptor, ctx: &mut UnmarshalContext) -> Result<Value, Error> {
        let obj = ctx.instantiate(ty)?;
        while ctx.reader.has_more_children() {
            let item = ctx.read_item()?;
            if !obj.push(item) {
                return Err(Error::malformed_tree(format!(
                    "type `{}` does not hold items",
                    ty
                )));
            }
        }
        Ok(Value::Object(obj))
    }
}
