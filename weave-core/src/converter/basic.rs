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
use crate::value::Value;

#[derive(Clone, Copy, Debug, Default)]
pub struct BooleanConverter;

impl SingleValueConverter for BooleanConverter {
    fn to_text(&self, value: &Value) -> Result<String, Error> {
        match value {
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(unexpected_value(other)),
        }
    }

    fn from_text(&self, _ty: &TypeDescriptor, text: &str) -> Result<Value, Error> {
        match text.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            other => Err(Error::malformed_tree(format!("invalid boolean `{}`", other))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IntConverter;

impl SingleValueConverter for IntConverter {
    fn to_text(&self, value: &Value) -> Result<String, Error> {
        match value {
            Value::Int(i) => Ok(i.to_string()),
            other => Err(unexpected_value(other)),
        }
    }

    fn from_text(&self, _ty: &TypeDescriptor, text: &str) -> Result<Value, Error> {
        text.trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| Error::malformed_tree(format!("invalid int `{}`: {}", text, e)))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FloatConverter;

impl SingleValueConverter for FloatConverter {
    fn to_text(&self, value: &Value) -> Result<String, Error> {
        match value {
            Value::Float(f) => Ok(f.to_string()),
            other => Err(unexpected_value(other)),
        }
    }

    fn from_text(&self, _ty: &TypeDescriptor, text: &str) -> Result<Value, Error> {
        text.trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| Error::malformed_tree(format!("invalid float `{}`: {}", text, e)))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CharConverter;

impl SingleValueConverter for CharConverter {
    fn to_text(&self, value: &Value) -> Result<String, Error> {
        match value {
            Value::Char(c) => Ok(c.to_string()),
            other => Err(unexpected_value(other)),
        }
    }

    fn from_text(&self, _ty: &TypeDescriptor, text: &str) -> Result<Value, Error> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Value::Char(c)),
            _ => Err(Error::malformed_tree(format!(
                "invalid char `{}`: expected exactly one character",
                text
            ))),
        }
    }
}

/// Text is kept verbatim, surrounding whitespace included.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringConverter;

impl SingleValueConverter for StringConverter {
    fn to_text(&self, value: &Value) -> Result<String, Error> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(unexpected_value(other)),
        }
    }

    fn from_text(&self, _ty: &TypeDescriptor, text: &str) -> Result<Value, Error> {
        Ok(Value::Str(text.to_string()))
    }
}

/// Type tokens are written as the type name.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassConverter;

impl SingleValueConverter for ClassConverter {
    fn to_text(&self, value: &Value) -> Result<String, Error> {
        match value {
            Value::Type(ty) => Ok(ty.name().to_string()),
            other => Err(unexpected_value(other)),
        }
    }

    fn from_text(&self, _ty: &TypeDescriptor, text: &str) -> Result<Value, Error> {
        let name = text.trim();
        if name.is_empty() {
            return Err(Error::malformed_tree("empty class name"));
        }
        Ok(Value::Type(TypeDescriptor::new(name)))
    }
}
