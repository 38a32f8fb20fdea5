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

use super::Converter;
use crate::error::Error;
use crate::resolver::context::{MarshalContext, UnmarshalContext};
use crate::types::TypeDescriptor;
use crate::value::Value;

/// Writes an empty node for `Value::Null`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullConverter;

impl Converter for NullConverter {
    fn marshal(&self, _value: &Value, _ctx: &mut MarshalContext) -> Result<(), Error> {
        Ok(())
    }

    fn unmarshal(&self, _ty: &TypeDescriptor, _ctx: &mut UnmarshalContext) -> Result<Value, Error> {
        Ok(Value::Null)
    }
}
