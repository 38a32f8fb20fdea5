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

//! Permission gate consulted before any type is reconstructed.
//!
//! The gate fails closed: a type is reconstructed only if no deny rule matches
//! it and at least one allow rule allows it. Sensitive types (dynamic proxies,
//! synthesized types, type tokens) are only allowed by rules that opt in
//! through [`TypePermission::allows_sensitive`].

mod permissions;

pub use permissions::{
    AnyTypePermission, ExplicitTypePermission, NoTypePermission, NullPermission,
    PrimitiveTypePermission, ProxyTypePermission, RegexTypePermission, TypeHierarchyPermission,
    WildcardTypePermission,
};

use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::meta::ClassDef;
use crate::resolver::type_resolver::ClassResolver;
use crate::types::{builtin, ClassKind, Provenance, TypeDescriptor};

/// What a permission rule gets to look at.
#[derive(Clone, Copy)]
pub struct TypeProbe<'a> {
    descriptor: &'a TypeDescriptor,
    class: Option<&'a ClassDef>,
    resolver: &'a ClassResolver,
}

impl<'a> TypeProbe<'a> {
    pub fn new(descriptor: &'a TypeDescriptor, resolver: &'a ClassResolver) -> Self {
        TypeProbe {
            descriptor,
            class: resolver.get_by_descriptor(descriptor),
            resolver,
        }
    }

    #[inline(always)]
    pub fn descriptor(&self) -> &'a TypeDescriptor {
        self.descriptor
    }

    #[inline(always)]
    pub fn name(&self) -> &'a str {
        self.descriptor.name()
    }

    /// `None` for types the class resolver does not know.
    pub fn class_def(&self) -> Option<&'a ClassDef> {
        self.class
    }

    pub fn kind(&self) -> Option<ClassKind> {
        self.class.map(ClassDef::kind)
    }

    pub fn provenance(&self) -> Provenance {
        self.class.map(ClassDef::get_provenance).unwrap_or_default()
    }

    pub fn is_sensitive(&self) -> bool {
        self.provenance().is_sensitive()
    }

    pub fn is_assignable_to(&self, base: &TypeDescriptor) -> bool {
        self.resolver.is_assignable(self.descriptor, base)
    }
}

impl fmt::Debug for TypeProbe<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeProbe")
            .field("descriptor", self.descriptor)
            .field("provenance", &self.provenance())
            .finish()
    }
}

/// A rule of the permission gate.
///
/// As an allow rule it lets the types it matches through; as a deny rule it
/// blocks them.
pub trait TypePermission: Send + Sync {
    fn allows(&self, probe: &TypeProbe) -> bool;

    /// Whether an allow rule may let sensitive types through.
    fn allows_sensitive(&self) -> bool {
        false
    }
}

impl<F> TypePermission for F
where
    F: Fn(&TypeProbe) -> bool + Send + Sync,
{
    fn allows(&self, probe: &TypeProbe) -> bool {
        self(probe)
    }
}

#[derive(Clone)]
pub struct PermissionGate {
    allow: Vec<Arc<dyn TypePermission>>,
    deny: Vec<Arc<dyn TypePermission>>,
}

impl Default for PermissionGate {
    /// Nulls, primitives, collections and maps.
    fn default() -> Self {
        let mut gate = PermissionGate::empty();
        gate.allow(NullPermission);
        gate.allow(PrimitiveTypePermission);
        gate.allow(TypeHierarchyPermission::new(builtin::COLLECTION));
        gate.allow(TypeHierarchyPermission::new(builtin::MAP));
        gate
    }
}

impl PermissionGate {
    /// A gate that allows nothing.
    pub fn empty() -> Self {
        PermissionGate {
            allow: Vec::new(),
            deny: Vec::new(),
        }
    }

    pub fn allow<P: TypePermission + 'static>(&mut self, rule: P) {
        self.allow.push(Arc::new(rule));
    }

    pub fn deny<P: TypePermission + 'static>(&mut self, rule: P) {
        self.deny.push(Arc::new(rule));
    }

    pub fn allows(&self, ty: &TypeDescriptor, resolver: &ClassResolver) -> bool {
        let probe = TypeProbe::new(ty, resolver);
        if self.deny.iter().any(|rule| rule.allows(&probe)) {
            return false;
        }
        let sensitive = probe.is_sensitive();
        self.allow
            .iter()
            .any(|rule| (!sensitive || rule.allows_sensitive()) && rule.allows(&probe))
    }

    /// Fails with `ForbiddenType` unless `ty` is allowed.
    pub fn check(&self, ty: &TypeDescriptor, resolver: &ClassResolver) -> Result<(), Error> {
        if self.allows(ty, resolver) {
            return Ok(());
        }
        log::warn!("refusing to reconstruct type `{}`", ty);
        Err(Error::forbidden_type(ty.clone()))
    }
}

impl fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionGate")
            .field("allow_rules", &self.allow.len())
            .field("deny_rules", &self.deny.len())
            .finish()
    }
}
