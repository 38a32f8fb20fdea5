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

//! The permission gate fails closed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rstest::rstest;
use tests::*;
use weave::{
    ClassDef, Error, ObjectData, ProxyTypePermission, TreeNode, TypeProbe, Value, Weave,
    WildcardTypePermission,
};

const PAYLOAD: &str = "evil.Payload";

/// A builder with `evil.Payload` registered, and a counter of its instantiations.
fn with_payload() -> (weave::WeaveBuilder, Arc<AtomicUsize>) {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let builder = acme().register_class(ClassDef::record(PAYLOAD).field("cmd", "string").factory(
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ObjectData::Fields(Default::default())
        },
    ));
    (builder, built)
}

fn payload_tree() -> TreeNode {
    TreeNode::new(PAYLOAD).with_child(TreeNode::new("cmd").with_value("rm -rf /"))
}

#[test]
fn unpermitted_root_constructs_nothing() {
    init_logger();
    let (builder, built) = with_payload();
    let weave = builder.build().unwrap();
    let err = weave.from_tree(&payload_tree()).unwrap_err();
    assert!(err.is_forbidden());
    assert_eq!(err.type_descriptor().unwrap().name(), PAYLOAD);
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[test]
fn unpermitted_nested_item_aborts_the_whole_call() {
    let (builder, built) = with_payload();
    let weave = builder.build().unwrap();
    let tree = TreeNode::new("list")
        .with_child(TreeNode::new("string").with_value("harmless"))
        .with_child(payload_tree());
    let err = weave.from_tree(&tree).unwrap_err();
    assert!(matches!(err, Error::ForbiddenType(_)));
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[test]
fn unpermitted_class_attribute_is_refused() {
    let (builder, built) = with_payload();
    let weave = builder.build().unwrap();
    let tree = TreeNode::new(PERSON).with_child(
        TreeNode::new("tags")
            .with_child(TreeNode::new("item").with_attribute("class", PAYLOAD)),
    );
    assert!(weave.from_tree(&tree).unwrap_err().is_forbidden());
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[test]
fn permitted_type_is_constructed_once() {
    let (builder, built) = with_payload();
    let weave = builder.allow_types([PAYLOAD]).build().unwrap();
    let back = weave.from_tree(&payload_tree()).unwrap();
    assert_eq!(
        back.as_object().unwrap().get("cmd"),
        Some(Value::str("rm -rf /"))
    );
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn unregistered_types_are_refused_before_lookup() {
    let weave = Weave::default();
    let err = weave
        .from_tree(&TreeNode::new("java.lang.ProcessBuilder"))
        .unwrap_err();
    assert!(err.is_forbidden());

    let weave = Weave::builder()
        .allow_types_by_wildcard(["**"])
        .build()
        .unwrap();
    let err = weave
        .from_tree(&TreeNode::new("java.lang.ProcessBuilder"))
        .unwrap_err();
    assert!(err.is_unconvertible());
}

#[test]
fn deny_rules_veto_allow_rules() {
    let weave = acme().deny_types([EMPLOYEE]).build().unwrap();
    let tree = weave
        .to_tree(&Value::Object(employee("Ada", 36, 1.0)))
        .unwrap();
    assert!(weave.from_tree(&tree).unwrap_err().is_forbidden());

    let tree = weave.to_tree(&Value::Object(person("Ada", 36))).unwrap();
    assert!(weave.from_tree(&tree).is_ok());

    let weave = acme()
        .deny_types_by_wildcard(["com.acme.Emp*"])
        .build()
        .unwrap();
    let tree = weave
        .to_tree(&Value::Object(employee("Ada", 36, 1.0)))
        .unwrap();
    assert!(weave.from_tree(&tree).unwrap_err().is_forbidden());
}

#[test]
fn marshalling_is_not_gated() {
    let (builder, _) = with_payload();
    let weave = builder.build().unwrap();
    let payload = weave::ObjRef::record(PAYLOAD, [("cmd", Value::str("ls"))]);
    assert!(weave.to_tree(&Value::Object(payload)).is_ok());
}

#[test]
fn dynamic_proxies_need_an_explicit_rule() {
    let proxy = ClassDef::dynamic_proxy("$Proxy7", [PARTY]);
    let tree = TreeNode::new("$Proxy7");

    let weave = acme()
        .register_class(proxy.clone())
        .allow_types_by_wildcard(["**"])
        .build()
        .unwrap();
    assert!(weave.from_tree(&tree).unwrap_err().is_forbidden());

    let weave = acme()
        .register_class(proxy.clone())
        .add_permission(ProxyTypePermission)
        .build()
        .unwrap();
    assert!(weave.from_tree(&tree).is_ok());

    let weave = acme()
        .register_class(proxy)
        .allow_types(["$Proxy7"])
        .build()
        .unwrap();
    assert!(weave.from_tree(&tree).is_ok());
}

#[test]
fn type_tokens_are_sensitive() {
    let token = Value::Type(ty(PERSON));
    let weave = acme_weave();
    let tree = weave.to_tree(&token).unwrap();
    assert_eq!(tree.to_string(), "<class>com.acme.Person</class>");
    assert!(weave.from_tree(&tree).unwrap_err().is_forbidden());

    let weave = acme().allow_types(["class"]).build().unwrap();
    assert_eq!(weave.from_tree(&tree).unwrap(), token);
}

fn in_net_acme(probe: &TypeProbe) -> bool {
    probe.name().starts_with("net.acme.")
}

#[test]
fn functions_are_permissions() {
    let weave = acme()
        .register_class(ClassDef::record("net.acme.Ping"))
        .add_permission(in_net_acme)
        .build()
        .unwrap();
    assert!(weave.from_tree(&TreeNode::new("net.acme.Ping")).is_ok());
}

#[test]
fn regex_permission() {
    let weave = Weave::builder()
        .register_class(ClassDef::record("org.shop.Order"))
        .register_class(ClassDef::record("org.shop.Refund"))
        .allow_types_by_regex([r"org\.shop\.(Order|Invoice)"])
        .build()
        .unwrap();
    assert!(weave.from_tree(&TreeNode::new("org.shop.Order")).is_ok());
    assert!(weave
        .from_tree(&TreeNode::new("org.shop.Refund"))
        .unwrap_err()
        .is_forbidden());
}

#[test]
fn invalid_regex_fails_the_build() {
    let err = Weave::builder()
        .allow_types_by_regex(["org.(shop"])
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[rstest]
#[case("com.acme.*", "com.acme.Person", true)]
#[case("com.acme.*", "com.acme.sub.Person", false)]
#[case("com.acme.**", "com.acme.sub.Person", true)]
#[case("com.acme.P?rson", "com.acme.Person", true)]
#[case("com.acme.P?rson", "com.acme.Prson", false)]
#[case("**.Person", "com.acme.Person", true)]
#[case("*", "Person", true)]
#[case("*", "com.Person", false)]
#[case("com.acme.Person", "comXacme.Person", false)]
fn wildcard_patterns(#[case] pattern: &str, #[case] name: &str, #[case] expected: bool) {
    let rule = WildcardTypePermission::new([pattern]).unwrap();
    assert_eq!(rule.matches(name), expected);
}
