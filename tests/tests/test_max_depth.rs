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

use tests::*;
use weave::{Error, MarshallingStrategy, TreeNode, Value, Weave};

fn nested_lists(depth: usize) -> Value {
    let mut value = Value::list([]);
    for _ in 1..depth {
        value = Value::list([value]);
    }
    value
}

fn nested_nodes(depth: usize) -> TreeNode {
    let mut node = TreeNode::new("list");
    for _ in 1..depth {
        node = TreeNode::new("list").with_child(node);
    }
    node
}

#[test]
fn marshal_depth_limit() {
    init_logger();
    let weave = Weave::builder().max_depth(8).build().unwrap();
    assert!(weave.to_tree(&nested_lists(8)).is_ok());

    let err = weave.to_tree(&nested_lists(9)).unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)), "{}", err);
    let err = weave
        .to_tree_with(&nested_lists(9), MarshallingStrategy::Tree)
        .unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)), "{}", err);
}

#[test]
fn unmarshal_depth_limit() {
    let weave = Weave::builder().max_depth(8).build().unwrap();
    assert!(weave.from_tree(&nested_nodes(8)).is_ok());

    let err = weave.from_tree(&nested_nodes(9)).unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)), "{}", err);
}

#[test]
fn default_limit_allows_deep_graphs() {
    let weave = Weave::default();
    assert_eq!(weave.config().max_depth(), 1024);
    let value = nested_lists(100);
    let tree = weave.to_tree(&value).unwrap();
    assert_eq!(weave.from_tree(&tree).unwrap(), value);
}

#[test]
fn zero_depth_is_rejected() {
    let err = Weave::builder().max_depth(0).build().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}
