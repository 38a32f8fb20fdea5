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

//! The in-memory object graph the engine marshals.
//!
//! Scalars are plain values. Objects live behind an [`ObjRef`] handle, and a
//! handle's address is the object's identity: two handles to the same allocation are
//! the same object, two allocations with equal fields are not.
//!
//! ```rust
//! use weave_core::value::{ObjRef, Value};
//!
//! let node = ObjRef::record("com.acme.Node", [("id", Value::Int(7))]);
//! node.set("next", Value::Object(node.clone()));
//!
//! let next = node.get("next").unwrap();
//! assert!(next.as_object().unwrap().ptr_eq(&node));
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::types::{builtin, TypeDescriptor};

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
    Timestamp(DateTime<Utc>),
    Enum(EnumValue),
    /// A type token, the equivalent of a class object.
    Type(TypeDescriptor),
    Object(ObjRef),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub class: TypeDescriptor,
    pub variant: String,
}

impl EnumValue {
    pub fn new(class: impl Into<TypeDescriptor>, variant: impl Into<String>) -> Self {
        EnumValue {
            class: class.into(),
            variant: variant.into(),
        }
    }
}

impl Value {
    /// The runtime type the converter registry is asked about.
    pub fn type_descriptor(&self) -> TypeDescriptor {
        match self {
            Value::Null => TypeDescriptor::new(builtin::NULL),
            Value::Bool(_) => TypeDescriptor::new(builtin::BOOLEAN),
            Value::Int(_) => TypeDescriptor::new(builtin::INT),
            Value::Float(_) => TypeDescriptor::new(builtin::FLOAT),
            Value::Char(_) => TypeDescriptor::new(builtin::CHAR),
            Value::Str(_) => TypeDescriptor::new(builtin::STRING),
            Value::Timestamp(_) => TypeDescriptor::new(builtin::TIMESTAMP),
            Value::Enum(e) => e.class.clone(),
            Value::Type(_) => TypeDescriptor::new(builtin::CLASS),
            Value::Object(obj) => obj.class(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Creates a fresh list object holding `items`.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Value {
        Value::Object(ObjRef::sequence(builtin::LIST, items))
    }

    /// Creates a fresh map object holding `entries`.
    pub fn map<I: IntoIterator<Item = (Value, Value)>>(entries: I) -> Value {
        Value::Object(ObjRef::mapping(builtin::MAP, entries))
    }

    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<ObjRef> for Value {
    fn from(v: ObjRef) -> Self {
        Value::Object(v)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

/// Field-wise structural equality that tolerates cycles.
///
/// Two objects are equal when their classes and contents are equal. A pair that is
/// already being compared further up the stack is assumed equal, which makes two
/// isomorphic cyclic graphs compare equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut visiting = HashSet::new();
        structural_eq(self, other, &mut visiting)
    }
}

fn structural_eq(a: &Value, b: &Value, visiting: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Char(x), Value::Char(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Timestamp(x), Value::Timestamp(y)) => x == y,
        (Value::Enum(x), Value::Enum(y)) => x == y,
        (Value::Type(x), Value::Type(y)) => x.name() == y.name(),
        (Value::Object(x), Value::Object(y)) => {
            if x.ptr_eq(y) || !visiting.insert((x.addr(), y.addr())) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            if x.class.name() != y.class.name() {
                return false;
            }
            match (&x.data, &y.data) {
                (ObjectData::Fields(fx), ObjectData::Fields(fy)) => {
                    // absent and null fields are the same thing
                    let names: HashSet<&String> = fx
                        .iter()
                        .chain(fy.iter())
                        .filter(|(_, v)| !v.is_null())
                        .map(|(k, _)| k)
                        .collect();
                    names.into_iter().all(|name| {
                        let vx = fx.get(name).unwrap_or(&Value::Null);
                        let vy = fy.get(name).unwrap_or(&Value::Null);
                        structural_eq(vx, vy, visiting)
                    })
                }
                (ObjectData::Items(ix), ObjectData::Items(iy)) => {
                    ix.len() == iy.len()
                        && ix
                            .iter()
                            .zip(iy.iter())
                            .all(|(vx, vy)| structural_eq(vx, vy, visiting))
                }
                (ObjectData::Entries(ex), ObjectData::Entries(ey)) => {
                    ex.len() == ey.len()
                        && ex.iter().zip(ey.iter()).all(|((kx, vx), (ky, vy))| {
                            structural_eq(kx, ky, visiting) && structural_eq(vx, vy, visiting)
                        })
                }
                _ => false,
            }
        }
        _ => false,
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Int(v) => write!(f, "Int({v})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Char(v) => write!(f, "Char({v:?})"),
            Value::Str(v) => write!(f, "Str({v:?})"),
            Value::Timestamp(v) => write!(f, "Timestamp({})", v.to_rfc3339()),
            Value::Enum(v) => write!(f, "Enum({}::{})", v.class, v.variant),
            Value::Type(v) => write!(f, "Type({v})"),
            Value::Object(obj) => obj.fmt(f),
        }
    }
}

#[derive(Clone, Debug)]
pub enum ObjectData {
    Fields(IndexMap<String, Value>),
    Items(Vec<Value>),
    Entries(Vec<(Value, Value)>),
}

#[derive(Clone, Debug)]
pub struct Object {
    pub class: TypeDescriptor,
    pub data: ObjectData,
}

impl Object {
    pub fn new(class: TypeDescriptor, data: ObjectData) -> Self {
        Object { class, data }
    }

    pub fn fields(&self) -> Option<&IndexMap<String, Value>> {
        match &self.data {
            ObjectData::Fields(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&[Value]> {
        match &self.data {
            ObjectData::Items(items) => Some(items),
            _ => None,
        }
    }

    pub fn entries(&self) -> Option<&[(Value, Value)]> {
        match &self.data {
            ObjectData::Entries(entries) => Some(entries),
            _ => None,
        }
    }

    /// Children in traversal order, used to walk a graph.
    pub fn children_mut(&mut self) -> Box<dyn Iterator<Item = &mut Value> + '_> {
        match &mut self.data {
            ObjectData::Fields(fields) => Box::new(fields.values_mut()),
            ObjectData::Items(items) => Box::new(items.iter_mut()),
            ObjectData::Entries(entries) => {
                Box::new(entries.iter_mut().flat_map(|(k, v)| [k, v]))
            }
        }
    }
}

/// Shared handle to an [`Object`]. Cloning the handle shares the object.
#[derive(Clone)]
pub struct ObjRef(Rc<RefCell<Object>>);

impl ObjRef {
    pub fn new(object: Object) -> Self {
        ObjRef(Rc::new(RefCell::new(object)))
    }

    pub fn record<C, I, K>(class: C, fields: I) -> Self
    where
        C: Into<TypeDescriptor>,
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        ObjRef::new(Object::new(class.into(), ObjectData::Fields(fields)))
    }

    pub fn sequence<C, I>(class: C, items: I) -> Self
    where
        C: Into<TypeDescriptor>,
        I: IntoIterator<Item = Value>,
    {
        ObjRef::new(Object::new(
            class.into(),
            ObjectData::Items(items.into_iter().collect()),
        ))
    }

    pub fn mapping<C, I>(class: C, entries: I) -> Self
    where
        C: Into<TypeDescriptor>,
        I: IntoIterator<Item = (Value, Value)>,
    {
        ObjRef::new(Object::new(
            class.into(),
            ObjectData::Entries(entries.into_iter().collect()),
        ))
    }

    /// Address of the shared allocation, the object's identity.
    #[inline(always)]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    #[inline(always)]
    pub fn ptr_eq(&self, other: &ObjRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.0.borrow_mut()
    }

    pub fn class(&self) -> TypeDescriptor {
        self.0.borrow().class.clone()
    }

    /// Reads a named field; `None` when the object is not a record or lacks the field.
    pub fn get(&self, field: &str) -> Option<Value> {
        self.borrow().fields()?.get(field).cloned()
    }

    /// Sets a named field. Non-record objects are left untouched and `false` is returned.
    pub fn set(&self, field: impl Into<String>, value: Value) -> bool {
        match &mut self.borrow_mut().data {
            ObjectData::Fields(fields) => {
                fields.insert(field.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Appends to a sequence object. Other objects are left untouched.
    pub fn push(&self, item: Value) -> bool {
        match &mut self.borrow_mut().data {
            ObjectData::Items(items) => {
                items.push(item);
                true
            }
            _ => false,
        }
    }

    /// Appends to a mapping object. Other objects are left untouched.
    pub fn insert_entry(&self, key: Value, value: Value) -> bool {
        match &mut self.borrow_mut().data {
            ObjectData::Entries(entries) => {
                entries.push((key, value));
                true
            }
            _ => false,
        }
    }

    pub fn item(&self, index: usize) -> Option<Value> {
        self.borrow().items()?.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        match &self.borrow().data {
            ObjectData::Fields(fields) => fields.len(),
            ObjectData::Items(items) => items.len(),
            ObjectData::Entries(entries) => entries.len(),
        }
    }
}

// Only the class and address, so cyclic graphs can be printed.
impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(obj) => write!(f, "ObjRef({} @ {:#x})", obj.class, self.addr()),
            Err(_) => write!(f, "ObjRef(<borrowed> @ {:#x})", self.addr()),
        }
    }
}
