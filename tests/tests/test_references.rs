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

//! Shared and cyclic references under every strategy.

use rstest::rstest;
use tests::*;
use weave::{ClassDef, MarshallingStrategy, ObjRef, TreeNode, Value, Weave};

fn reference_strategies() -> [MarshallingStrategy; 3] {
    [
        MarshallingStrategy::id(),
        MarshallingStrategy::absolute_path(),
        MarshallingStrategy::relative_path(),
    ]
}

fn field(value: &Value, name: &str) -> ObjRef {
    value
        .as_object()
        .unwrap()
        .get(name)
        .unwrap()
        .as_object()
        .unwrap()
        .clone()
}

#[test]
fn shared_objects_stay_shared() {
    init_logger();
    let weave = acme_weave();
    for strategy in reference_strategies() {
        let grace = person("Grace", 45);
        let value = Value::Object(team(
            &grace,
            vec![Value::Object(grace.clone()), Value::Object(person("Alan", 41))],
        ));
        let back = round_trip(&weave, &value, strategy);
        assert_eq!(back, value);

        let lead = field(&back, "lead");
        let members = field(&back, "members");
        let first = members.item(0).unwrap();
        assert!(first.as_object().unwrap().ptr_eq(&lead), "{}", strategy);
        let second = members.item(1).unwrap();
        assert!(!second.as_object().unwrap().ptr_eq(&lead), "{}", strategy);
    }
}

#[test]
fn tree_strategy_duplicates_shared_objects() {
    let weave = acme_weave();
    let grace = person("Grace", 45);
    let value = Value::Object(team(&grace, vec![Value::Object(grace.clone())]));
    let tree = to_tree(&weave, &value, MarshallingStrategy::Tree);
    let copy = tree.descendant(&["members", PERSON]).unwrap();
    assert!(copy.attributes.is_empty());
    assert_eq!(copy.child("name").unwrap().value(), Some("Grace"));

    let back = weave
        .from_tree_with(&tree, None, MarshallingStrategy::Tree)
        .unwrap();
    assert_eq!(back, value);
    let lead = field(&back, "lead");
    let member = field(&back, "members").item(0).unwrap();
    assert!(!member.as_object().unwrap().ptr_eq(&lead));
}

#[rstest]
#[case::id(MarshallingStrategy::id(), "1")]
#[case::absolute(MarshallingStrategy::absolute_path(), "/com.acme.Person")]
#[case::relative(MarshallingStrategy::relative_path(), "..")]
fn self_reference_points_at_the_root(#[case] strategy: MarshallingStrategy, #[case] expected: &str) {
    let weave = acme_weave();
    let narcissus = person("Narcissus", 20);
    narcissus.set("friend", Value::Object(narcissus.clone()));
    let value = Value::Object(narcissus);

    let tree = to_tree(&weave, &value, strategy);
    let friend = tree.child("friend").unwrap();
    assert_eq!(friend.attribute("reference"), Some(expected));
    assert!(friend.children.is_empty());

    let back = weave.from_tree_with(&tree, None, strategy).unwrap();
    assert!(field(&back, "friend").ptr_eq(back.as_object().unwrap()));
}

#[test]
fn cycle_through_a_list_terminates() {
    let weave = acme_weave();
    for strategy in reference_strategies() {
        let a = person("A", 1);
        let b = person("B", 2);
        a.set("friend", Value::Object(b.clone()));
        b.set("friend", Value::Object(a.clone()));
        a.set("tags", Value::list([Value::Object(b.clone())]));
        let value = Value::Object(a);

        let back = round_trip(&weave, &value, strategy);
        let a = back.as_object().unwrap();
        let b = field(&back, "friend");
        assert!(b.get("friend").unwrap().as_object().unwrap().ptr_eq(a));
        let tagged = field(&back, "tags").item(0).unwrap();
        assert!(tagged.as_object().unwrap().ptr_eq(&b));
    }
}

#[test]
fn tree_strategy_rejects_cycles() {
    let weave = acme_weave();
    let a = person("A", 1);
    let b = person("B", 2);
    a.set("friend", Value::Object(b.clone()));
    b.set("friend", Value::Object(a.clone()));
    let err = weave
        .to_tree_with(&Value::Object(a), MarshallingStrategy::Tree)
        .unwrap_err();
    assert!(err.is_cyclic());
    assert!(err.to_string().contains("/com.acme.Person/friend/friend"));
}

#[test]
fn tree_strategy_rejects_reference_tokens() {
    let weave = acme_weave();
    let tree = TreeNode::new(PERSON).with_child(TreeNode::new("friend").with_attribute("reference", ".."));
    let err = weave
        .from_tree_with(&tree, None, MarshallingStrategy::Tree)
        .unwrap_err();
    assert!(err.is_malformed());
    assert!(err.to_string().contains("tree strategy"));
}

#[test]
fn id_mode_numbers_objects_in_document_order() {
    let weave = acme_weave();
    let grace = person("Grace", 45);
    let value = Value::Object(team(&grace, vec![Value::Object(grace.clone())]));
    let tree = to_tree(&weave, &value, MarshallingStrategy::id());
    assert_eq!(tree.attribute("id"), Some("1"));
    assert_eq!(tree.child("lead").unwrap().attribute("id"), Some("2"));
    assert_eq!(tree.child("members").unwrap().attribute("id"), Some("3"));
    let member = tree.descendant(&["members", PERSON]).unwrap();
    assert_eq!(member.attribute("reference"), Some("2"));
    assert_eq!(member.attribute("id"), None);
}

#[test]
fn relative_paths_use_sibling_indexes() {
    let weave = acme_weave();
    let alan = person("Alan", 41);
    let value = Value::list([
        Value::Object(person("Grace", 45)),
        Value::Object(alan.clone()),
        Value::Object(alan),
    ]);
    let tree = weave.to_tree(&value).unwrap();
    let third = &tree.children[2];
    assert_eq!(third.attribute("reference"), Some("../com.acme.Person[2]"));

    let absolute = to_tree(&weave, &value, MarshallingStrategy::absolute_path());
    assert_eq!(
        absolute.children[2].attribute("reference"),
        Some("/list/com.acme.Person[2]")
    );
}

/// `{id: 7, tags: ["a", "b"], self: <self>}`
#[test]
fn self_referencing_record_with_tags() {
    let weave = Weave::builder()
        .register_class(
            ClassDef::record("demo.Thing")
                .field("id", "int")
                .field("tags", "list")
                .field("self", "demo.Thing"),
        )
        .allow_types(["demo.Thing"])
        .build()
        .unwrap();
    let thing = ObjRef::record(
        "demo.Thing",
        [
            ("id", Value::Int(7)),
            ("tags", Value::list([Value::str("a"), Value::str("b")])),
        ],
    );
    thing.set("self", Value::Object(thing.clone()));
    let value = Value::Object(thing);

    let tree = weave.to_tree(&value).unwrap();
    assert_eq!(
        tree.to_string(),
        "<demo.Thing><id>7</id><tags><string>a</string><string>b</string></tags>\
         <self reference=\"..\"/></demo.Thing>"
    );

    let back = weave.from_tree(&tree).unwrap();
    assert_eq!(back, value);
    assert!(field(&back, "self").ptr_eq(back.as_object().unwrap()));
}

#[test]
fn immutable_types_are_never_referenced() {
    let weave = acme().add_immutable_type(PERSON).build().unwrap();
    let grace = person("Grace", 45);
    let value = Value::list([Value::Object(grace.clone()), Value::Object(grace)]);
    let tree = weave.to_tree(&value).unwrap();
    assert!(tree.children.iter().all(|c| c.attribute("reference").is_none()));
    assert_eq!(weave.from_tree(&tree).unwrap(), value);
}
