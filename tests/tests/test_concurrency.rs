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

//! One engine shared by many threads.

use std::sync::Arc;
use std::thread;

use tests::*;
use weave::{MarshallingStrategy, TreeNode, Value, Weave};

#[test]
fn engine_is_shared_across_threads() {
    init_logger();
    let weave = Arc::new(acme().alias("person", PERSON).build().unwrap());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let weave = Arc::clone(&weave);
            thread::spawn(move || {
                let grace = person(&format!("Grace {}", i), 40 + i);
                grace.set("friend", Value::Object(grace.clone()));
                let value = Value::Object(team(&grace, vec![Value::Object(grace.clone())]));
                for strategy in [
                    MarshallingStrategy::id(),
                    MarshallingStrategy::absolute_path(),
                    MarshallingStrategy::relative_path(),
                ] {
                    let back = round_trip(&weave, &value, strategy);
                    assert_eq!(back, value);
                }
                to_tree(&weave, &value, MarshallingStrategy::relative_path())
            })
        })
        .collect();

    let trees: Vec<TreeNode> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, tree) in trees.iter().enumerate() {
        let name = tree.descendant(&["lead", "name"]).unwrap();
        assert_eq!(name.value(), Some(format!("Grace {}", i).as_str()));
    }
}

#[test]
fn trees_move_between_threads() {
    let weave: Arc<Weave> = Arc::new(acme_weave());
    let tree = {
        let weave = Arc::clone(&weave);
        thread::spawn(move || {
            let value = Value::Object(person("Ann", 30));
            weave.to_tree(&value).unwrap()
        })
        .join()
        .unwrap()
    };
    let back = weave.from_tree(&tree).unwrap();
    assert_eq!(back, Value::Object(person("Ann", 30)));
}
