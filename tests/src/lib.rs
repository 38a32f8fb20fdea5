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

//! Shared fixtures for the integration tests.

use weave::{
    ClassDef, MarshallingStrategy, ObjRef, TreeNode, TypeDescriptor, Value, Weave, WeaveBuilder,
};

pub const PERSON: &str = "com.acme.Person";
pub const EMPLOYEE: &str = "com.acme.Employee";
pub const PARTY: &str = "com.acme.Party";
pub const TEAM: &str = "com.acme.Team";
pub const COLOR: &str = "com.acme.Color";

/// Routes `log` output through the test harness. Safe to call from every test.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A builder knowing the `com.acme` fixture classes, all of them allowed.
pub fn acme() -> WeaveBuilder {
    Weave::builder()
        .register_class(ClassDef::abstract_type(PARTY).field("name", "string"))
        .register_class(
            ClassDef::record(PERSON)
                .extends(PARTY)
                .field("age", "int")
                .field("friend", PERSON)
                .field("tags", "list"),
        )
        .register_class(
            ClassDef::record(EMPLOYEE)
                .extends(PERSON)
                .field("salary", "float")
                .transient_field("session", "string"),
        )
        .register_class(
            ClassDef::record(TEAM)
                .field("lead", PARTY)
                .field("members", "list")
                .field("color", COLOR),
        )
        .register_class(ClassDef::enumeration(COLOR, ["RED", "GREEN", "BLUE"]))
        .allow_types_by_wildcard(["com.acme.*"])
}

pub fn acme_weave() -> Weave {
    acme().build().unwrap()
}

pub fn person(name: &str, age: i64) -> ObjRef {
    ObjRef::record(
        PERSON,
        [("name", Value::str(name)), ("age", Value::Int(age))],
    )
}

pub fn employee(name: &str, age: i64, salary: f64) -> ObjRef {
    ObjRef::record(
        EMPLOYEE,
        [
            ("name", Value::str(name)),
            ("age", Value::Int(age)),
            ("salary", Value::Float(salary)),
        ],
    )
}

pub fn team(lead: &ObjRef, members: Vec<Value>) -> ObjRef {
    ObjRef::record(
        TEAM,
        [
            ("lead", Value::Object(lead.clone())),
            ("members", Value::list(members)),
        ],
    )
}

/// Marshals `value` and reads it back with the same strategy.
pub fn round_trip(weave: &Weave, value: &Value, strategy: MarshallingStrategy) -> Value {
    let tree = weave.to_tree_with(value, strategy).unwrap();
    log::debug!("{}", tree);
    weave.from_tree_with(&tree, None, strategy).unwrap()
}

pub fn to_tree(weave: &Weave, value: &Value, strategy: MarshallingStrategy) -> TreeNode {
    weave.to_tree_with(value, strategy).unwrap()
}

pub fn ty(name: &str) -> TypeDescriptor {
    TypeDescriptor::new(name)
}
