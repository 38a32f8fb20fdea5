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

use std::fmt;
use std::sync::Arc;

/// Names of the types every [`ClassResolver`](crate::resolver::type_resolver::ClassResolver)
/// knows about without registration.
pub mod builtin {
    pub const OBJECT: &str = "object";
    pub const NULL: &str = "null";
    pub const BOOLEAN: &str = "boolean";
    pub const NUMBER: &str = "number";
    pub const INT: &str = "int";
    pub const FLOAT: &str = "float";
    pub const CHAR: &str = "char";
    pub const STRING: &str = "string";
    pub const TIMESTAMP: &str = "timestamp";
    pub const ENUM: &str = "enum";
    pub const CLASS: &str = "class";
    pub const COLLECTION: &str = "collection";
    pub const LIST: &str = "list";
    pub const SET: &str = "set";
    pub const MAP: &str = "map";

    /// Scalar value types allowed by `PrimitiveTypePermission`.
    pub const PRIMITIVES: [&str; 6] = [BOOLEAN, INT, FLOAT, CHAR, STRING, TIMESTAMP];
}

/// Attribute names the engine writes into the tree before mapper aliasing.
pub mod system_attribute {
    pub const CLASS: &str = "class";
    pub const ID: &str = "id";
    pub const REFERENCE: &str = "reference";

    pub const ALL: [&str; 3] = [CLASS, ID, REFERENCE];
}

/// Node name used for every entry of a map.
pub const MAP_ENTRY: &str = "entry";

/// Identifies a reconstructable type: its fully-qualified name plus generic arity.
///
/// Descriptors are cheap to clone and compare by name and arity only.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeDescriptor {
    name: Arc<str>,
    arity: u8,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        TypeDescriptor {
            name: name.into(),
            arity: 0,
        }
    }

    pub fn generic(name: impl Into<Arc<str>>, arity: u8) -> Self {
        TypeDescriptor {
            name: name.into(),
            arity,
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn arity(&self) -> u8 {
        self.arity
    }

    /// Everything before the last `.`, if any.
    pub fn package(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(package, _)| package)
    }

    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(&*self.name, |(_, simple)| simple)
    }

    pub fn is(&self, name: &str) -> bool {
        &*self.name == name
    }

    pub fn null() -> Self {
        TypeDescriptor::new(builtin::NULL)
    }

    pub fn object() -> Self {
        TypeDescriptor::new(builtin::OBJECT)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.arity > 0 {
            f.write_str("<")?;
            for i in 0..self.arity {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str("_")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self)
    }
}

impl From<&str> for TypeDescriptor {
    fn from(name: &str) -> Self {
        TypeDescriptor::new(name)
    }
}

impl From<String> for TypeDescriptor {
    fn from(name: String) -> Self {
        TypeDescriptor::new(name)
    }
}

/// Structural shape of a class, which decides how it is converted and whether it
/// can be instantiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Immutable scalar, never reference tracked.
    Value,
    Enum,
    /// Named fields.
    Record,
    /// Ordered items.
    Sequence,
    /// Key/value entries.
    Mapping,
    /// Cannot be instantiated; needs a default implementation.
    Abstract,
}

impl ClassKind {
    pub fn is_instantiable(self) -> bool {
        matches!(
            self,
            ClassKind::Record | ClassKind::Sequence | ClassKind::Mapping
        )
    }

    pub fn is_value(self) -> bool {
        matches!(self, ClassKind::Value | ClassKind::Enum)
    }
}

/// Where a class came from. Anything other than `Declared` is sensitive and only
/// explicit permissions may allow it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Provenance {
    #[default]
    Declared,
    DynamicProxy,
    Synthesized,
    TypeToken,
}

impl Provenance {
    #[inline(always)]
    pub fn is_sensitive(self) -> bool {
        self != Provenance::Declared
    }
}
