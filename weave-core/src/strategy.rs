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

//! Reference handling policies selectable per call.

use std::fmt;

/// How an object that was already written is referred to the second time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReferenceMode {
    /// Sequential ids starting at 1, declared with an `id` attribute.
    Id,
    /// Path from the root, such as `/order/items/item[2]`.
    AbsolutePath,
    /// Path from the referencing node, such as `../..`.
    #[default]
    RelativePath,
}

/// Reference policy of one marshal or unmarshal call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarshallingStrategy {
    /// No sharing: shared objects are written once per occurrence and cycles fail
    /// with [`Error::CyclicGraph`](crate::error::Error::CyclicGraph).
    Tree,
    /// Objects written once, later occurrences become back-references.
    Reference(ReferenceMode),
}

impl Default for MarshallingStrategy {
    fn default() -> Self {
        MarshallingStrategy::Reference(ReferenceMode::RelativePath)
    }
}

impl MarshallingStrategy {
    pub fn id() -> Self {
        MarshallingStrategy::Reference(ReferenceMode::Id)
    }

    pub fn absolute_path() -> Self {
        MarshallingStrategy::Reference(ReferenceMode::AbsolutePath)
    }

    pub fn relative_path() -> Self {
        MarshallingStrategy::Reference(ReferenceMode::RelativePath)
    }

    #[inline(always)]
    pub fn reference_mode(self) -> Option<ReferenceMode> {
        match self {
            MarshallingStrategy::Tree => None,
            MarshallingStrategy::Reference(mode) => Some(mode),
        }
    }

    #[inline(always)]
    pub fn tracks_references(self) -> bool {
        self.reference_mode().is_some()
    }
}

impl fmt::Display for MarshallingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarshallingStrategy::Tree => f.write_str("tree"),
            MarshallingStrategy::Reference(ReferenceMode::Id) => f.write_str("id-reference"),
            MarshallingStrategy::Reference(ReferenceMode::AbsolutePath) => {
                f.write_str("absolute-path-reference")
            }
            MarshallingStrategy::Reference(ReferenceMode::RelativePath) => {
                f.write_str("relative-path-reference")
            }
        }
    }
}
