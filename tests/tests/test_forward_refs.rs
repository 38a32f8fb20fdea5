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

//! Forward references in trees written by hand or by other producers.

use rstest::rstest;
use tests::*;
use weave::{MarshallingStrategy, TreeNode, Value};

fn ann() -> TreeNode {
    TreeNode::new(PERSON).with_child(TreeNode::new("name").with_value("Ann"))
}

#[rstest]
#[case::id(
    MarshallingStrategy::id(),
    "2",
    TreeNode::new("members").with_child(ann().with_attribute("id", "2"))
)]
#[case::absolute(
    MarshallingStrategy::absolute_path(),
    "/com.acme.Team/members/com.acme.Person",
    TreeNode::new("members").with_child(ann())
)]
#[case::relative(
    MarshallingStrategy::relative_path(),
    "../members/com.acme.Person",
    TreeNode::new("members").with_child(ann())
)]
fn forward_references_are_patched(
    #[case] strategy: MarshallingStrategy,
    #[case] reference: &str,
    #[case] members: TreeNode,
) {
    init_logger();
    let tree = TreeNode::new(TEAM)
        .with_child(
            TreeNode::new("lead")
                .with_attribute("class", PERSON)
                .with_attribute("reference", reference),
        )
        .with_child(members);

    let weave = acme_weave();
    let back = weave.from_tree_with(&tree, None, strategy).unwrap();
    let team = back.as_object().unwrap();
    let lead = team.get("lead").unwrap();
    let lead = lead.as_object().unwrap();
    assert_eq!(lead.class().name(), PERSON);
    assert_eq!(lead.get("name"), Some(Value::str("Ann")));

    let members = team.get("members").unwrap();
    let member = members.as_object().unwrap().item(0).unwrap();
    assert!(member.as_object().unwrap().ptr_eq(lead));
}

#[test]
fn dangling_reference_is_reported() {
    let tree = TreeNode::new(TEAM).with_child(
        TreeNode::new("lead")
            .with_attribute("class", PERSON)
            .with_attribute("reference", "9"),
    );
    let err = acme_weave()
        .from_tree_with(&tree, None, MarshallingStrategy::id())
        .unwrap_err();
    assert!(err.is_unresolved(), "{}", err);
    assert!(err.to_string().contains("`9`"));
}

#[test]
fn dangling_path_is_reported() {
    let tree = TreeNode::new(TEAM).with_child(
        TreeNode::new("lead")
            .with_attribute("class", PERSON)
            .with_attribute("reference", "../nowhere"),
    );
    let err = acme_weave().from_tree(&tree).unwrap_err();
    assert!(err.is_unresolved(), "{}", err);
    assert!(err.to_string().contains("/com.acme.Team/nowhere"));
}

#[test]
fn forward_reference_inside_a_list() {
    // the first item points at the second
    let tree = TreeNode::new("list")
        .with_child(TreeNode::new(PERSON).with_attribute("reference", "3"))
        .with_child(ann().with_attribute("id", "3"));
    let back = acme_weave()
        .from_tree_with(&tree, None, MarshallingStrategy::id())
        .unwrap();
    let list = back.as_object().unwrap();
    let first = list.item(0).unwrap();
    let second = list.item(1).unwrap();
    assert!(first.as_object().unwrap().ptr_eq(second.as_object().unwrap()));
}
