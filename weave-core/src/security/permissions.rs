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

use std::collections::HashSet;

use regex::Regex;

use super::{TypePermission, TypeProbe};
use crate::error::Error;
use crate::types::{builtin, Provenance, TypeDescriptor};

/// Allows every type that is not sensitive.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyTypePermission;

impl TypePermission for AnyTypePermission {
    fn allows(&self, _probe: &TypeProbe) -> bool {
        true
    }
}

/// Allows nothing. As a deny rule it blocks everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTypePermission;

impl TypePermission for NoTypePermission {
    fn allows(&self, _probe: &TypeProbe) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullPermission;

impl TypePermission for NullPermission {
    fn allows(&self, probe: &TypeProbe) -> bool {
        probe.descriptor().is(builtin::NULL)
    }
}

/// Builtin scalar value types.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrimitiveTypePermission;

impl TypePermission for PrimitiveTypePermission {
    fn allows(&self, probe: &TypeProbe) -> bool {
        builtin::PRIMITIVES.contains(&probe.name())
    }
}

/// Exact type names. The one general purpose rule that may allow sensitive
/// types, since each of them has to be named.
#[derive(Clone, Debug, Default)]
pub struct ExplicitTypePermission {
    names: HashSet<String>,
}

impl ExplicitTypePermission {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExplicitTypePermission {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl TypePermission for ExplicitTypePermission {
    fn allows(&self, probe: &TypeProbe) -> bool {
        self.names.contains(probe.name())
    }

    fn allows_sensitive(&self) -> bool {
        true
    }
}

/// Glob patterns over type names: `?` is one character, `*` any run of
/// characters without a `.`, `**` any run of characters.
///
/// ```rust
/// use weave_core::security::WildcardTypePermission;
///
/// let rule = WildcardTypePermission::new(["com.acme.*", "org.shop.**"]).unwrap();
/// assert!(rule.matches("com.acme.Order"));
/// assert!(!rule.matches("com.acme.billing.Invoice"));
/// assert!(rule.matches("org.shop.billing.Invoice"));
/// ```
#[derive(Clone, Debug)]
pub struct WildcardTypePermission {
    patterns: Vec<Regex>,
}

impl WildcardTypePermission {
    pub fn new<I, S>(patterns: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|glob| compile(&glob_to_regex(glob.as_ref())))
            .collect::<Result<_, _>>()?;
        Ok(WildcardTypePermission { patterns })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(name))
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            }
            '*' => out.push_str("[^.]*"),
            '?' => out.push('.'),
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    out
}

fn compile(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|e| {
        Error::invalid_config(format!("invalid type pattern `{}`: {}", pattern, e))
    })
}

/// Regular expressions matched against the whole type name.
#[derive(Clone, Debug)]
pub struct RegexTypePermission {
    patterns: Vec<Regex>,
}

impl RegexTypePermission {
    pub fn new<I, S>(patterns: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| compile(&format!("^(?:{})$", p.as_ref())))
            .collect::<Result<_, _>>()?;
        Ok(RegexTypePermission { patterns })
    }
}

impl TypePermission for RegexTypePermission {
    fn allows(&self, probe: &TypeProbe) -> bool {
        self.patterns.iter().any(|re| re.is_match(probe.name()))
    }
}

impl TypePermission for WildcardTypePermission {
    fn allows(&self, probe: &TypeProbe) -> bool {
        self.matches(probe.name())
    }
}

/// A base type and everything assignable to it.
#[derive(Clone, Debug)]
pub struct TypeHierarchyPermission {
    base: TypeDescriptor,
}

impl TypeHierarchyPermission {
    pub fn new(base: impl Into<TypeDescriptor>) -> Self {
        TypeHierarchyPermission { base: base.into() }
    }
}

impl TypePermission for TypeHierarchyPermission {
    fn allows(&self, probe: &TypeProbe) -> bool {
        probe.is_assignable_to(&self.base)
    }
}

/// Dynamic proxy types, and nothing else.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProxyTypePermission;

impl TypePermission for ProxyTypePermission {
    fn allows(&self, probe: &TypeProbe) -> bool {
        probe.provenance() == Provenance::DynamicProxy
    }

    fn allows_sensitive(&self) -> bool {
        true
    }
}
