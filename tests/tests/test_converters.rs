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

//! Converter lookup order and user supplied converters.

use anyhow::anyhow;
use tests::*;
use weave::{
    builtin, priority, ClassDef, Converter, Error, MarshalContext, Matcher, ObjRef,
    SingleValueConverter, TreeNode, TreeReader, TreeWriter, TypeDescriptor, UnmarshalContext,
    Value, Weave,
};

/// Writes ints with a tag, to tell converters apart in the output.
struct Tagged(&'static str);

impl SingleValueConverter for Tagged {
    fn to_text(&self, value: &Value) -> Result<String, Error> {
        match value {
            Value::Int(i) => Ok(format!("{}:{}", self.0, i)),
            Value::Float(f) => Ok(format!("{}:{}", self.0, f)),
            _ => Err(Error::unconvertible_type(value.type_descriptor())),
        }
    }

    fn from_text(&self, _ty: &TypeDescriptor, text: &str) -> Result<Value, Error> {
        let digits = text
            .strip_prefix(self.0)
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| anyhow!("`{}` is not tagged with `{}`", text, self.0))?;
        digits
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| Error::from(anyhow!(e)))
    }
}

#[test]
fn higher_priority_wins_regardless_of_registration_order() {
    init_logger();
    let weave = Weave::builder()
        .register_single_value_converter(Matcher::exact(builtin::INT), Tagged("five"), 5)
        .register_single_value_converter(Matcher::exact(builtin::INT), Tagged("ten"), 10)
        .build()
        .unwrap();
    let tree = weave.to_tree(&Value::Int(1)).unwrap();
    assert_eq!(tree.value(), Some("ten:1"));
    assert_eq!(weave.from_tree(&tree).unwrap(), Value::Int(1));

    let weave = Weave::builder()
        .register_single_value_converter(Matcher::exact(builtin::INT), Tagged("ten"), 10)
        .register_single_value_converter(Matcher::exact(builtin::INT), Tagged("five"), 5)
        .build()
        .unwrap();
    assert_eq!(
        weave.to_tree(&Value::Int(1)).unwrap().value(),
        Some("ten:1")
    );
}

#[test]
fn exact_int_beats_assignable_number() {
    let weave = Weave::builder()
        .register_single_value_converter(Matcher::exact(builtin::INT), Tagged("int"), 1)
        .register_single_value_converter(Matcher::assignable(builtin::NUMBER), Tagged("number"), 0)
        .build()
        .unwrap();
    assert_eq!(
        weave.to_tree(&Value::Int(3)).unwrap().value(),
        Some("int:3")
    );
    // same priority as the builtin float converter, exact matchers go first
    assert_eq!(
        weave.to_tree(&Value::Float(0.5)).unwrap().value(),
        Some("0.5")
    );
}

#[test]
fn assignable_matcher_covers_subtypes() {
    let weave = Weave::builder()
        .register_single_value_converter(
            Matcher::assignable(builtin::NUMBER),
            Tagged("number"),
            priority::VERY_HIGH,
        )
        .build()
        .unwrap();
    assert_eq!(
        weave.to_tree(&Value::Float(0.5)).unwrap().value(),
        Some("number:0.5")
    );
}

#[test]
fn equal_priority_keeps_registration_order() {
    let weave = Weave::builder()
        .register_single_value_converter(Matcher::exact(builtin::INT), Tagged("first"), 3)
        .register_single_value_converter(Matcher::exact(builtin::INT), Tagged("second"), 3)
        .build()
        .unwrap();
    assert_eq!(
        weave.to_tree(&Value::Int(1)).unwrap().value(),
        Some("first:1")
    );
}

#[test]
fn user_converter_errors_are_kept() {
    let weave = Weave::builder()
        .register_single_value_converter(Matcher::exact(builtin::INT), Tagged("ten"), 10)
        .build()
        .unwrap();
    let err = weave
        .from_tree(&TreeNode::new("int").with_value("eleven:11"))
        .unwrap_err();
    assert!(matches!(err, Error::Custom(_)));
    assert!(err.to_string().contains("not tagged with `ten`"));
}

#[test]
fn unregistered_class_cannot_be_marshalled() {
    let weave = Weave::default();
    let ghost = Value::Object(ObjRef::record("com.acme.Ghost", [("boo", Value::Int(1))]));
    let err = weave.to_tree(&ghost).unwrap_err();
    assert!(err.is_unconvertible());
    assert_eq!(err.type_descriptor().unwrap().name(), "com.acme.Ghost");
}

#[test]
fn predicate_matcher() {
    let weave = acme()
        .register_single_value_converter(
            Matcher::predicate(|ty, _| ty.name().ends_with("Id")),
            Tagged("id"),
            priority::NORMAL,
        )
        .register_class(ClassDef::value_type("com.acme.OrderId"))
        .build()
        .unwrap();
    let registry = weave.registry();
    let conversion = registry
        .lookup(&ty("com.acme.OrderId"), weave.resolver())
        .unwrap();
    assert!(conversion.is_single_value());
    assert!(registry.lookup(&ty(PERSON), weave.resolver()).is_ok());
}

const POINT: &str = "geo.Point";

/// Points as two attributes on their own node.
struct PointConverter;

impl Converter for PointConverter {
    fn marshal(&self, value: &Value, ctx: &mut MarshalContext) -> Result<(), Error> {
        let point = value
            .as_object()
            .ok_or_else(|| Error::unconvertible_type(value.type_descriptor()))?;
        for axis in ["x", "y"] {
            let coordinate = point.get(axis).and_then(|v| v.as_int()).unwrap_or(0);
            ctx.writer.set_attribute(axis, &coordinate.to_string())?;
        }
        Ok(())
    }

    fn unmarshal(&self, ty: &TypeDescriptor, ctx: &mut UnmarshalContext) -> Result<Value, Error> {
        let point = ctx.instantiate(ty)?;
        for axis in ["x", "y"] {
            let text = ctx
                .reader
                .attribute(axis)
                .ok_or_else(|| Error::malformed_tree(format!("point without `{}`", axis)))?;
            let coordinate = text
                .parse::<i64>()
                .map_err(|e| Error::malformed_tree(e.to_string()))?;
            point.set(axis, Value::Int(coordinate));
        }
        Ok(Value::Object(point))
    }
}

#[test]
fn custom_composite_converter() {
    let weave = Weave::builder()
        .register_class(ClassDef::record(POINT).field("x", "int").field("y", "int"))
        .register_converter(Matcher::exact(POINT), PointConverter, priority::NORMAL)
        .allow_types([POINT])
        .build()
        .unwrap();
    let point = ObjRef::record(POINT, [("x", Value::Int(3)), ("y", Value::Int(-4))]);
    let value = Value::list([Value::Object(point.clone()), Value::Object(point)]);

    let tree = weave.to_tree(&value).unwrap();
    assert_eq!(
        tree.to_string(),
        r#"<list><geo.Point x="3" y="-4"/><geo.Point reference="../geo.Point"/></list>"#
    );

    let back = weave.from_tree(&tree).unwrap();
    assert_eq!(back, value);
    let items = back.as_object().unwrap();
    let first = items.item(0).unwrap();
    let second = items.item(1).unwrap();
    assert!(first.as_object().unwrap().ptr_eq(second.as_object().unwrap()));

    let broken = TreeNode::new(POINT).with_attribute("x", "1");
    let err = weave.from_tree(&broken).unwrap_err();
    assert!(err.to_string().contains("point without `y`"));
}
