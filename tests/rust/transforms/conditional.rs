//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zivec.
//! The Zivec project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Zivec Transform Tests - Conditional
//!
//! ```bash
//! cargo test --test conditional
//! ```

use zivec::{
    record, ZiConditionOp, ZiConditionSpec, ZiConditionalCopyValue, ZiConditionalReplaceValue,
    ZiError, ZiSchema, ZiTransform, ZiValue,
};

/// Negative values are clamped to zero; others pass unchanged.
#[test]
fn test_conditional_replace_value() {
    let schema = ZiSchema::builder().add_column_integer("column").build().unwrap();
    let transform = ZiTransform::bound(
        ZiConditionalReplaceValue::new(
            "column",
            0,
            ZiConditionSpec::column("column", ZiConditionOp::LessThan, 0),
        )
        .into(),
        &schema,
    )
    .unwrap();

    let inputs = [10, 1, 0, -1, -10];
    let expected = [10, 1, 0, 0, 0];
    for (input, want) in inputs.iter().zip(expected) {
        assert_eq!(
            transform.map(&record![*input]).unwrap(),
            vec![ZiValue::Integer(want)]
        );
    }
}

/// The condition column may differ from the replaced column.
#[test]
fn test_replace_driven_by_other_column() {
    let schema = ZiSchema::builder()
        .add_column_string("label")
        .add_column_double("score")
        .build()
        .unwrap();
    let transform = ZiTransform::bound(
        ZiConditionalReplaceValue::new(
            "label",
            "low",
            ZiConditionSpec::column("score", ZiConditionOp::LessOrEqual, 0.5),
        )
        .into(),
        &schema,
    )
    .unwrap();
    assert_eq!(transform.map(&record!["x", 0.25]).unwrap(), record!["low", 0.25]);
    assert_eq!(transform.map(&record!["x", 0.75]).unwrap(), record!["x", 0.75]);
}

/// Empty third column is filled from the second.
#[test]
fn test_conditional_copy_value() {
    let schema = ZiSchema::builder()
        .add_column_string("first")
        .add_column_string("second")
        .add_column_string("third")
        .build()
        .unwrap();
    let transform = ZiTransform::bound(
        ZiConditionalCopyValue::new(
            "third",
            "second",
            ZiConditionSpec::column("third", ZiConditionOp::Equal, ""),
        )
        .into(),
        &schema,
    )
    .unwrap();

    assert_eq!(
        transform.map(&record!["a", "b", ""]).unwrap(),
        record!["a", "b", "b"]
    );
    assert_eq!(
        transform.map(&record!["a", "b", "c"]).unwrap(),
        record!["a", "b", "c"]
    );
}

#[test]
fn test_incomparable_literal_fails_to_bind() {
    let schema = ZiSchema::builder().add_column_integer("column").build().unwrap();
    let result = ZiTransform::bound(
        ZiConditionalReplaceValue::new(
            "column",
            0,
            ZiConditionSpec::column("column", ZiConditionOp::LessThan, "not a number"),
        )
        .into(),
        &schema,
    );
    assert!(matches!(result, Err(ZiError::Validation { .. })));
}

/// A replacement outside the column's constraints is rejected at bind time.
#[test]
fn test_replacement_must_fit_column() {
    let schema = ZiSchema::builder()
        .add_column_integer_bounded("n", 1, 10)
        .build()
        .unwrap();
    let always = || ZiConditionSpec::column("n", ZiConditionOp::GreaterThan, 0);

    let text = ZiTransform::bound(ZiConditionalReplaceValue::new("n", "oops", always()).into(), &schema);
    assert!(matches!(text, Err(ZiError::Validation { .. })));

    let out_of_range = ZiTransform::bound(ZiConditionalReplaceValue::new("n", 11, always()).into(), &schema);
    assert!(matches!(out_of_range, Err(ZiError::Validation { .. })));

    let null = ZiTransform::bound(
        ZiConditionalReplaceValue::new("n", ZiValue::Null, always()).into(),
        &schema,
    );
    assert!(matches!(null, Err(ZiError::Validation { .. })));
}

/// Copies only bind when every source value is valid in the target.
#[test]
fn test_copy_requires_compatible_columns() {
    let schema = ZiSchema::builder()
        .add_column_integer_bounded("small", 0, 5)
        .add_column_integer("wide")
        .add_column_string("label")
        .build()
        .unwrap();
    let always = || ZiConditionSpec::negate(ZiConditionSpec::is_null("wide"));

    let text_into_int = ZiTransform::bound(
        ZiConditionalCopyValue::new("wide", "label", always()).into(),
        &schema,
    );
    assert!(matches!(text_into_int, Err(ZiError::Schema { .. })));

    let wide_into_small = ZiTransform::bound(
        ZiConditionalCopyValue::new("small", "wide", always()).into(),
        &schema,
    );
    assert!(matches!(wide_into_small, Err(ZiError::Schema { .. })));

    let small_into_wide = ZiTransform::bound(
        ZiConditionalCopyValue::new("wide", "small", always()).into(),
        &schema,
    )
    .unwrap();
    assert_eq!(
        small_into_wide.map(&record![3, 100, "x"]).unwrap(),
        record![3, 3, "x"]
    );

    let int_into_text = ZiTransform::bound(
        ZiConditionalCopyValue::new("label", "wide", always()).into(),
        &schema,
    )
    .unwrap();
    assert_eq!(int_into_text.map(&record![3, 100, "x"]).unwrap(), record![3, 100, 100]);
}
