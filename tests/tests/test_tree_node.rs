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

//! The in-memory tree as a serde document.

use serde_json::json;
use tests::*;
use weave::{MarshallingStrategy, TreeNode, Value};

#[test]
fn tree_node_as_json() {
    let node = TreeNode::new("point")
        .with_attribute("unit", "mm")
        .with_child(TreeNode::new("x").with_value("3"));
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(
        json,
        json!({
            "name": "point",
            "attributes": { "unit": "mm" },
            "children": [{ "name": "x", "value": "3" }]
        })
    );
    let back: TreeNode = serde_json::from_value(json).unwrap();
    assert_eq!(back, node);
}

#[test]
fn graphs_survive_a_json_hop() {
    init_logger();
    let weave = acme_weave();
    let grace = person("Grace", 45);
    grace.set("friend", Value::Object(grace.clone()));
    let value = Value::Object(team(&grace, vec![Value::Object(grace.clone())]));

    for strategy in [
        MarshallingStrategy::Tree,
        MarshallingStrategy::id(),
        MarshallingStrategy::relative_path(),
    ] {
        let input = if strategy == MarshallingStrategy::Tree {
            Value::Object(team(&person("Ann", 30), vec![]))
        } else {
            value.clone()
        };
        let tree = to_tree(&weave, &input, strategy);
        let text = serde_json::to_string(&tree).unwrap();
        let parsed: TreeNode = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, tree);
        let back = weave.from_tree_with(&parsed, None, strategy).unwrap();
        assert_eq!(back, input, "{}", strategy);
    }
}
