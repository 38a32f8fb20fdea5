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

use crate::strategy::MarshallingStrategy;

/// Configuration for a [`Weave`](crate::weave::Weave) engine.
///
/// Frozen when the engine is built and shared with every
/// `MarshalContext`/`UnmarshalContext` the engine creates.
#[derive(Clone, Debug)]
pub struct Config {
    /// Strategy used by `to_tree`/`from_tree` and whenever no strategy is given.
    pub strategy: MarshallingStrategy,
    /// Maximum nesting depth of nodes, in both directions.
    pub max_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strategy: MarshallingStrategy::default(),
            max_depth: 1024,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn strategy(&self) -> MarshallingStrategy {
        self.strategy
    }

    /// Get maximum nesting depth.
    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
