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

//! Priority ordered table from runtime types to conversions.

use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

use crate::converter::{
    BooleanConverter, CharConverter, ClassConverter, CollectionConverter, Conversion,
    Converter, EnumConverter, FloatConverter, IntConverter, MapConverter, NullConverter,
    ReflectionConverter, SingleValueConverter, StringConverter, TimestampConverter,
};
use crate::error::Error;
use crate::resolver::type_resolver::ClassResolver;
use crate::types::{builtin, ClassKind, TypeDescriptor};

/// Named priorities. Higher priorities are consulted first.
pub mod priority {
    pub const VERY_HIGH: i32 = 10000;
    pub const NORMAL: i32 = 0;
    pub const LOW: i32 = -10;
    pub const VERY_LOW: i32 = -20;
}

pub type TypePredicate = Arc<dyn Fn(&TypeDescriptor, &ClassResolver) -> bool + Send + Sync>;

/// How an entry decides whether it handles a type.
#[derive(Clone)]
pub enum Matcher {
    Exact(TypeDescriptor),
    /// The type itself or any subtype.
    Assignable(TypeDescriptor),
    Predicate(TypePredicate),
}

impl Matcher {
    pub fn exact(ty: impl Into<TypeDescriptor>) -> Self {
        Matcher::Exact(ty.into())
    }

    pub fn assignable(ty: impl Into<TypeDescriptor>) -> Self {
        Matcher::Assignable(ty.into())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&TypeDescriptor, &ClassResolver) -> bool + Send + Sync + 'static,
    {
        Matcher::Predicate(Arc::new(f))
    }

    /// Preference among entries of equal priority, lower wins.
    #[inline(always)]
    fn rank(&self) -> u8 {
        match self {
            Matcher::Exact(_) => 0,
            Matcher::Assignable(_) => 1,
            Matcher::Predicate(_) => 2,
        }
    }

    pub fn matches(&self, ty: &TypeDescriptor, resolver: &ClassResolver) -> bool {
        match self {
            Matcher::Exact(target) => target.name() == ty.name(),
            Matcher::Assignable(target) => resolver.is_assignable(ty, target),
            Matcher::Predicate(f) => f(ty, resolver),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Exact(ty) => write!(f, "Exact({})", ty),
            Matcher::Assignable(ty) => write!(f, "Assignable({})", ty),
            Matcher::Predicate(_) => f.write_str("Predicate"),
        }
    }
}

#[derive(Debug)]
struct ConverterEntry {
    priority: i32,
    matcher: Matcher,
    conversion: Conversion,
    sequence: usize,
}

impl ConverterEntry {
    #[inline(always)]
    fn sort_key(&self) -> (Reverse<i32>, u8, usize) {
        (Reverse(self.priority), self.matcher.rank(), self.sequence)
    }
}

/// Converter lookup table.
///
/// Entries are kept sorted by descending priority, then exact before
/// assignable before predicate matchers, then registration order, so the first
/// matching entry is always the answer.
#[derive(Debug)]
pub struct ConverterRegistry {
    entries: Vec<ConverterEntry>,
    next_sequence: usize,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut registry = ConverterRegistry::empty();
        registry.register_builtins();
        registry
    }
}

impl ConverterRegistry {
    /// A registry without the builtin converters.
    pub fn empty() -> Self {
        ConverterRegistry {
            entries: Vec::new(),
            next_sequence: 0,
        }
    }

    fn register_builtins(&mut self) {
        use priority::*;

        self.register(
            Matcher::exact(builtin::NULL),
            Conversion::composite(NullConverter),
            VERY_HIGH,
        );
        self.register_single_value_converter(Matcher::exact(builtin::BOOLEAN), BooleanConverter, NORMAL);
        self.register_single_value_converter(Matcher::exact(builtin::INT), IntConverter, NORMAL);
        self.register_single_value_converter(Matcher::exact(builtin::FLOAT), FloatConverter, NORMAL);
        self.register_single_value_converter(Matcher::exact(builtin::CHAR), CharConverter, NORMAL);
        self.register_single_value_converter(Matcher::exact(builtin::STRING), StringConverter, NORMAL);
        self.register_single_value_converter(
            Matcher::exact(builtin::TIMESTAMP),
            TimestampConverter,
            NORMAL,
        );
        self.register_single_value_converter(Matcher::exact(builtin::CLASS), ClassConverter, NORMAL);
        self.register(
            Matcher::assignable(builtin::ENUM),
            Conversion::single_value(EnumConverter),
            NORMAL,
        );
        self.register(
            Matcher::assignable(builtin::COLLECTION),
            Conversion::composite(CollectionConverter),
            NORMAL,
        );
        self.register(
            Matcher::assignable(builtin::MAP),
            Conversion::composite(MapConverter),
            NORMAL,
        );
        self.register(
            Matcher::predicate(|ty, resolver| resolver.kind_of(ty) == Some(ClassKind::Record)),
            Conversion::composite(ReflectionConverter),
            VERY_LOW,
        );
    }

    pub fn register(&mut self, matcher: Matcher, conversion: Conversion, priority: i32) {
        let entry = ConverterEntry {
            priority,
            matcher,
            conversion,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        log::trace!(
            "registered {:?} for {:?} at priority {}",
            entry.conversion,
            entry.matcher,
            priority
        );
        let key = entry.sort_key();
        let at = self.entries.partition_point(|e| e.sort_key() < key);
        self.entries.insert(at, entry);
    }

    pub fn register_converter<C: Converter + 'static>(
        &mut self,
        matcher: Matcher,
        converter: C,
        priority: i32,
    ) {
        self.register(matcher, Conversion::composite(converter), priority);
    }

    pub fn register_single_value_converter<C: SingleValueConverter + 'static>(
        &mut self,
        matcher: Matcher,
        converter: C,
        priority: i32,
    ) {
        self.register(matcher, Conversion::single_value(converter), priority);
    }

    /// The conversion of the first matching entry.
    pub fn lookup(&self, ty: &TypeDescriptor, resolver: &ClassResolver) -> Result<&Conversion, Error> {
        match self.entries.iter().find(|e| e.matcher.matches(ty, resolver)) {
            Some(entry) => {
                log::trace!(
                    "type {} converted by {:?} (priority {})",
                    ty,
                    entry.matcher,
                    entry.priority
                );
                Ok(&entry.conversion)
            }
            None => Err(Error::unconvertible_type(ty.clone())),
        }
    }

    /// The single value converter for `ty`, if the first matching entry is one.
    pub fn lookup_single_value(
        &self,
        ty: &TypeDescriptor,
        resolver: &ClassResolver,
    ) -> Option<Arc<dyn SingleValueConverter>> {
        self.lookup(ty, resolver)
            .ok()
            .and_then(|conversion| conversion.as_single_value().cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
