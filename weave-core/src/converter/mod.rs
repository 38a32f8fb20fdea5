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

//! Converters turn one value into one subtree and back.
//!
//! A [`Converter`] owns the node it is called on: it may add attributes, text
//! and children, and must leave the cursor on that same node. A
//! [`SingleValueConverter`] only maps a scalar to text, which the engine places
//! either as node text or as an attribute.

use std::sync::Arc;

use crate::error::Error;
use crate::resolver::context::{MarshalContext, UnmarshalContext};
use crate::types::TypeDescriptor;
use crate::value::Value;

mod basic;
pub mod collection;
mod datetime;
pub mod enum_;
pub mod map;
pub mod null;
pub mod reflection;

pub use basic::{
    BooleanConverter, CharConverter, ClassConverter, FloatConverter, IntConverter,
    StringConverter,
};
pub use collection::CollectionConverter;
pub use datetime::TimestampConverter;
pub use enum_::EnumConverter;
pub use map::MapConverter;
pub use null::NullConverter;
pub use reflection::ReflectionConverter;

/// Converts a value to a subtree and back.
pub trait Converter: Send + Sync {
    /// Writes `value` into the node the writer is positioned on.
    fn marshal(&self, value: &Value, ctx: &mut MarshalContext) -> Result<(), Error>;

    /// Reads a value of type `ty` from the node the reader is positioned on.
    fn unmarshal(&self, ty: &TypeDescriptor, ctx: &mut UnmarshalContext) -> Result<Value, Error>;
}

/// Converts a scalar to its text form and back.
pub trait SingleValueConverter: Send + Sync {
    fn to_text(&self, value: &Value) -> Result<String, Error>;

    fn from_text(&self, ty: &TypeDescriptor, text: &str) -> Result<Value, Error>;
}

/// What a registry entry resolves to.
#[derive(Clone)]
pub enum Conversion {
    Composite(Arc<dyn Converter>),
    SingleValue(Arc<dyn SingleValueConverter>),
}

impl Conversion {
    pub fn composite<C: Converter + 'static>(converter: C) -> Self {
        Conversion::Composite(Arc::new(converter))
    }

    pub fn single_value<C: SingleValueConverter + 'static>(converter: C) -> Self {
        Conversion::SingleValue(Arc::new(converter))
    }

    pub fn as_single_value(&self) -> Option<&Arc<dyn SingleValueConverter>> {
        match self {
            Conversion::SingleValue(converter) => Some(converter),
            Conversion::Composite(_) => None,
        }
    }

    pub fn is_single_value(&self) -> bool {
        matches!(self, Conversion::SingleValue(_))
    }
}

impl std::fmt::Debug for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conversion::Composite(_) => f.write_str("Conversion::Composite"),
            Conversion::SingleValue(_) => f.write_str("Conversion::SingleValue"),
        }
    }
}

/// Error for a converter handed a value it does not handle.
#[cold]
pub(crate) fn unexpected_value(value: &Value) -> Error {
    Error::unconvertible_type(value.type_descriptor())
}
