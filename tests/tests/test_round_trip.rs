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

use chrono::{TimeZone, Utc};
use rstest::rstest;
use tests::*;
use weave::{
    ClassDef, EnumValue, MarshallingStrategy, ObjRef, ReferenceMode, TreeNode, Value, Weave,
};

#[rstest]
#[case::null(Value::Null, "<null/>")]
#[case::boolean(Value::Bool(true), "<boolean>true</boolean>")]
#[case::int(Value::Int(-42), "<int>-42</int>")]
#[case::float(Value::Float(2.5), "<float>2.5</float>")]
#[case::char(Value::Char('x'), "<char>x</char>")]
#[case::string(Value::str("hello world"), "<string>hello world</string>")]
fn scalar_roots(#[case] value: Value, #[case] expected: &str) {
    init_logger();
    let weave = Weave::default();
    let tree = weave.to_tree(&value).unwrap();
    assert_eq!(tree.to_string(), expected);
    assert_eq!(weave.from_tree(&tree).unwrap(), value);
}

#[test]
fn timestamp_is_rfc3339() {
    let weave = Weave::default();
    let at = Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).unwrap();
    let tree = weave.to_tree(&Value::Timestamp(at)).unwrap();
    assert_eq!(tree.value(), Some("2024-02-29T12:30:00Z"));
    assert_eq!(weave.from_tree(&tree).unwrap(), Value::Timestamp(at));
}

#[test]
fn empty_string_survives() {
    let weave = Weave::default();
    let value = Value::str("");
    let tree = weave.to_tree(&value).unwrap();
    assert_eq!(weave.from_tree(&tree).unwrap(), value);
}

#[test]
fn mixed_list_names_items_after_their_type() {
    let weave = Weave::default();
    let list = Value::list([
        Value::str("a"),
        Value::Int(1),
        Value::Null,
        Value::list([Value::Bool(false)]),
    ]);
    let tree = weave.to_tree(&list).unwrap();
    assert_eq!(
        tree.to_string(),
        "<list><string>a</string><int>1</int><null/><list><boolean>false</boolean></list></list>"
    );
    assert_eq!(weave.from_tree(&tree).unwrap(), list);
}

#[test]
fn map_entries_keep_their_order() {
    let weave = Weave::default();
    let map = Value::map([
        (Value::str("one"), Value::Int(1)),
        (Value::str("two"), Value::list([Value::Int(2)])),
    ]);
    let tree = weave.to_tree(&map).unwrap();
    let entries: Vec<&TreeNode> = tree.children_named("entry").collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].child("string").unwrap().value(), Some("one"));
    assert_eq!(entries[1].child("list").unwrap().children.len(), 1);
    assert_eq!(weave.from_tree(&tree).unwrap(), map);
}

#[rstest]
fn records_with_inherited_fields(
    #[values(
        MarshallingStrategy::Tree,
        MarshallingStrategy::id(),
        MarshallingStrategy::absolute_path(),
        MarshallingStrategy::relative_path()
    )]
    strategy: MarshallingStrategy,
) {
    init_logger();
    let weave = acme_weave();
    let ada = employee("Ada", 36, 1000.5);
    ada.set("tags", Value::list([Value::str("math")]));
    let value = Value::Object(ada);
    assert_eq!(round_trip(&weave, &value, strategy), value);
}

#[test]
fn inherited_fields_come_first_and_nulls_are_skipped() {
    let weave = acme_weave();
    let tree = weave
        .to_tree(&Value::Object(employee("Ada", 36, 1000.5)))
        .unwrap();
    let names: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["name", "age", "salary"]);
}

#[test]
fn transient_fields_are_not_written() {
    let weave = acme_weave();
    let ada = employee("Ada", 36, 1.0);
    ada.set("session", Value::str("s3cr3t"));
    let tree = weave.to_tree(&Value::Object(ada)).unwrap();
    assert!(tree.child("session").is_none());

    let back = weave.from_tree(&tree).unwrap();
    assert_eq!(back.as_object().unwrap().get("session"), Some(Value::Null));
}

#[test]
fn subtype_in_field_gets_class_attribute() {
    let weave = acme_weave();
    let lead = employee("Grace", 45, 2000.0);
    let value = Value::Object(team(&lead, vec![Value::Object(person("Alan", 41))]));
    let tree = weave.to_tree(&value).unwrap();

    let lead_node = tree.child("lead").unwrap();
    assert_eq!(lead_node.attribute("class"), Some("com.acme.Employee"));
    let members = tree.child("members").unwrap();
    assert!(members.attributes.is_empty());
    assert_eq!(members.children[0].name, "com.acme.Person");

    let back = weave.from_tree(&tree).unwrap();
    assert_eq!(back, value);
    let lead = back.as_object().unwrap().get("lead").unwrap();
    assert_eq!(lead.as_object().unwrap().class().name(), EMPLOYEE);
}

#[test]
fn enums_are_written_as_variant_names() {
    let weave = acme_weave();
    let value = Value::Object(ObjRef::record(
        TEAM,
        [("color", Value::Enum(EnumValue::new(COLOR, "GREEN")))],
    ));
    let tree = weave.to_tree(&value).unwrap();
    assert_eq!(tree.child("color").unwrap().value(), Some("GREEN"));
    assert_eq!(weave.from_tree(&tree).unwrap(), value);
}

#[test]
fn unknown_enum_variant_is_malformed() {
    let weave = acme_weave();
    let tree = TreeNode::new(TEAM).with_child(TreeNode::new("color").with_value("PURPLE"));
    let err = weave.from_tree(&tree).unwrap_err();
    assert!(err.is_malformed());
    assert!(err.to_string().contains("PURPLE"));
    assert!(err.to_string().contains("/com.acme.Team/color"));
}

#[test]
fn unknown_field_is_malformed() {
    let weave = acme_weave();
    let tree = TreeNode::new(PERSON).with_child(TreeNode::new("nmae").with_value("Ada"));
    let err = weave.from_tree(&tree).unwrap_err();
    assert!(err.is_malformed());
    assert!(err.to_string().contains("unknown field `nmae`"));
}

#[test]
fn bad_scalar_text_is_malformed() {
    let weave = acme_weave();
    let tree = TreeNode::new(PERSON).with_child(TreeNode::new("age").with_value("old"));
    let err = weave.from_tree(&tree).unwrap_err();
    assert!(err.is_malformed());
    assert!(err.to_string().contains("(at /com.acme.Person/age)"));
}

#[test]
fn abstract_type_without_implementation_is_malformed() {
    let weave = acme_weave();
    let tree = TreeNode::new(PARTY).with_child(TreeNode::new("name").with_value("Ada"));
    assert!(weave.from_tree(&tree).unwrap_err().is_malformed());
}

#[test]
fn unknown_attributes_are_ignored() {
    let weave = acme_weave();
    let tree = TreeNode::new(PERSON)
        .with_attribute("xmlns", "urn:acme")
        .with_child(TreeNode::new("name").with_value("Ada"));
    let back = weave.from_tree(&tree).unwrap();
    assert_eq!(
        back.as_object().unwrap().get("name"),
        Some(Value::str("Ada"))
    );
}

#[test]
fn field_defaults_apply_to_missing_nodes() {
    let weave = Weave::builder()
        .register_class(ClassDef::record("demo.Config").field_with_default(
            "retries",
            "int",
            weave::DefaultValue::Int(3),
        ))
        .allow_types(["demo.Config"])
        .build()
        .unwrap();
    let back = weave.from_tree(&TreeNode::new("demo.Config")).unwrap();
    assert_eq!(back.as_object().unwrap().get("retries"), Some(Value::Int(3)));
}

#[test]
fn null_field_with_default_is_written_explicitly() {
    let weave = Weave::builder()
        .register_class(ClassDef::record("demo.Config").field_with_default(
            "retries",
            "int",
            weave::DefaultValue::Int(3),
        ))
        .allow_types(["demo.Config"])
        .build()
        .unwrap();
    let config = Value::Object(ObjRef::record("demo.Config", [("retries", Value::Null)]));
    let tree = weave.to_tree(&config).unwrap();
    let retries = tree.child("retries").unwrap();
    assert_eq!(retries.attribute("class"), Some("null"));
    assert!(retries.children.is_empty());

    let back = weave.from_tree(&tree).unwrap();
    assert_eq!(back.as_object().unwrap().get("retries"), Some(Value::Null));
    assert_eq!(back, config);

    let config = Value::Object(ObjRef::record("demo.Config", [("retries", Value::Int(5))]));
    assert_eq!(weave.from_tree(&weave.to_tree(&config).unwrap()).unwrap(), config);
}

#[test]
fn reference_mode_is_reported_by_the_strategy() {
    assert_eq!(
        MarshallingStrategy::default().reference_mode(),
        Some(ReferenceMode::RelativePath)
    );
    assert_eq!(MarshallingStrategy::Tree.reference_mode(), None);
}
