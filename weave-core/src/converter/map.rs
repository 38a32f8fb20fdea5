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
use crate::ensure;
use crate::error::Error;
use crate::resolver::context::{MarshalContext, UnmarshalContext};
use crate::tree::{TreeReader, TreeWriter};
use crate::types::{TypeDescriptor, MAP_ENTRY};
use crate::value::{ObjectData, Value};

/// Maps as `entry` nodes holding a key node and a value node.
///
/// ```text
/// <map>
///   <entry>
///     <string>one</string>
///     <int>1</int>
///   </entry>
/// </map>
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct MapConverter;

impl Converter for MapConverter {
    fn marshal(&self, value: &Value, ctx: &mut MarshalContext) -> Result<(), Error> {
        let entries = match value {
            Value::Object(obj) => match &obj.borrow().data {
                ObjectData::Entries(entries) => entries.clone(),
                _ => return Err(unexpected_value(value)),
            },
            other => return Err(unexpected_value(other)),
        };
        for (key, value) in &entries {
            ctx.writer.begin_node(MAP_ENTRY)?;
            ctx.write_item(key)?;
            ctx.write_item(value)?;
            ctx.writer.end_node()?;
        }
        Ok(())
    }

    fn unmarshal(&self, ty: &TypeDescriptor, ctx: &mut UnmarshalContext) -> Result<Value, Error> {
        let obj = ctx.instantiate(ty)?;
        while ctx.reader.has_more_children() {
            ctx.reader.move_down()?;
            ensure!(
                ctx.reader.node_name() == MAP_ENTRY,
                "expected `{}` but found `{}`",
                MAP_ENTRY,
                ctx.reader.node_name()
            );
            ensure!(ctx.reader.has_more_children(), "map entry without a key");
            let key = ctx.read_item()?;
            ensure!(ctx.reader.has_more_children(), "map entry without a value");
            let value = ctx.read_item()?;
            ensure!(
                !ctx.reader.has_more_children(),
                "map entry with more than a key and a value"
            );
            ctx.reader.move_up()?;
            if !obj.insert_entry(key, value) {
                return Err(Error::malformed_tree(format!(
                    "type `{}` does not hold entries",
                    ty
                )));
            }
        }
        Ok(Value::Object(obj))
    }
}
