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

use chrono::{DateTime, SecondsFormat, Utc};

use super::{unexpected_value, SingleValueConverter};
use crate::error::Error;
use crate::types::TypeDescriptor;
use crate::value::Value;

/// RFC 3339 in UTC, with as many fractional digits as needed.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimestampConverter;

impl SingleValueConverter for TimestampConverter {
    fn to_text(&self, value: &Value) -> Result<String, Error> {
        match value {
            Value::Timestamp(ts) => Ok(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            other => Err(unexpected_value(other)),
        }
    }

    fn from_text(&self, _ty: &TypeDescriptor, text: &str) -> Result<Value, Error> {
        DateTime::parse_from_rfc3339(text.trim())
            .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
            .map_err(|e| Error::malformed_tree(format!("invalid timestamp `{}`: {}", text, e)))
    }
}
