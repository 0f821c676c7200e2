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

//! # Zivec Filter Tests
//!
//! This module contains tests for conditions and the filters built on them.
//!
//! ## Test Categories
//!
//! - **Column conditions**: relational operators, sets, nulls and NaN
//! - **Composition**: Not, And, Or, Xor
//! - **Sequences**: Any/All lifting and the length filter
//! - **Lifecycle**: unbound evaluation and serde
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test filter
//! ```

use zivec::{
    record, ZiCondition, ZiConditionOp, ZiConditionSpec, ZiError, ZiFilter, ZiFilterSpec,
    ZiSchema, ZiSequenceConditionMode, ZiValue,
};

fn schema() -> ZiSchema {
    ZiSchema::builder()
        .add_column_integer_bounded("n", 0, 10)
        .add_column_double("x")
        .add_column_categorical("c", ["red", "green", "blue"])
        .build()
        .unwrap()
}

fn condition(spec: ZiConditionSpec) -> ZiCondition {
    ZiCondition::bound(spec, &schema()).unwrap()
}

#[test]
fn test_relational_operators() {
    let row = record![5, 0.5, "red"];
    let cases = [
        (ZiConditionOp::LessThan, 6, true),
        (ZiConditionOp::LessThan, 5, false),
        (ZiConditionOp::LessOrEqual, 5, true),
        (ZiConditionOp::GreaterThan, 4, true),
        (ZiConditionOp::GreaterOrEqual, 6, false),
        (ZiConditionOp::Equal, 5, true),
        (ZiConditionOp::NotEqual, 5, false),
    ];
    for (op, literal, expected) in cases {
        let cond = condition(ZiConditionSpec::column("n", op, literal));
        assert_eq!(cond.test(&row).unwrap(), expected, "{op:?} {literal}");
    }
}

/// Text cells in numeric columns compare by their parsed value.
#[test]
fn test_comparison_coerces_cells() {
    let cond = condition(ZiConditionSpec::column("n", ZiConditionOp::GreaterThan, 3));
    assert!(cond.test(&record!["7", 0.0, "red"]).unwrap());
}

/// Tests that null cells make every column condition false.
#[test]
fn test_null_cells_never_match() {
    let row = vec![ZiValue::Null, ZiValue::Double(0.0), ZiValue::from("red")];
    for op in [ZiConditionOp::Equal, ZiConditionOp::NotEqual, ZiConditionOp::LessThan] {
        assert!(!condition(ZiConditionSpec::column("n", op, 0)).test(&row).unwrap());
    }
    assert!(!condition(ZiConditionSpec::not_in_set("n", [1])).test(&row).unwrap());
    assert!(condition(ZiConditionSpec::is_null("n")).test(&row).unwrap());
}

/// NaN is unordered: only NotEqual holds.
#[test]
fn test_nan_is_unordered() {
    let row = record![1, f64::NAN, "red"];
    let holds = |op| {
        condition(ZiConditionSpec::column("x", op, 0.5))
            .test(&row)
            .unwrap()
    };
    assert!(!holds(ZiConditionOp::LessThan));
    assert!(!holds(ZiConditionOp::GreaterOrEqual));
    assert!(!holds(ZiConditionOp::Equal));
    assert!(holds(ZiConditionOp::NotEqual));
}

#[test]
fn test_set_membership() {
    let in_set = condition(ZiConditionSpec::in_set("c", ["red", "blue"]));
    let not_in_set = condition(ZiConditionSpec::not_in_set("c", ["red", "blue"]));
    assert!(in_set.test(&record![1, 0.0, "blue"]).unwrap());
    assert!(!in_set.test(&record![1, 0.0, "green"]).unwrap());
    assert!(not_in_set.test(&record![1, 0.0, "green"]).unwrap());
}

#[test]
fn test_invalid_value_condition() {
    let cond = condition(ZiConditionSpec::invalid_value("c"));
    assert!(!cond.test(&record![1, 0.0, "red"]).unwrap());
    assert!(cond.test(&record![1, 0.0, "purple"]).unwrap());
}

/// Tests Not, And, Or and Xor truth tables.
#[test]
fn test_boolean_composition() {
    let small = || ZiConditionSpec::column("n", ZiConditionOp::LessThan, 5);
    let red = || ZiConditionSpec::in_set("c", ["red"]);

    let and = condition(ZiConditionSpec::and(vec![small(), red()]));
    let or = condition(ZiConditionSpec::or(vec![small(), red()]));
    let xor = condition(ZiConditionSpec::xor(small(), red()));
    let not = condition(ZiConditionSpec::negate(small()));

    let rows = [
        (record![1, 0.0, "red"], true, true, false),
        (record![1, 0.0, "blue"], false, true, true),
        (record![9, 0.0, "red"], false, true, true),
        (record![9, 0.0, "blue"], false, false, false),
    ];
    for (row, want_and, want_or, want_xor) in rows {
        assert_eq!(and.test(&row).unwrap(), want_and);
        assert_eq!(or.test(&row).unwrap(), want_or);
        assert_eq!(xor.test(&row).unwrap(), want_xor);
    }
    assert!(not.test(&record![9, 0.0, "red"]).unwrap());
}

#[test]
fn test_empty_composite_rejected() {
    let result = ZiCondition::bound(ZiConditionSpec::and(Vec::new()), &schema());
    assert!(matches!(result, Err(ZiError::Validation { .. })));
    let result = ZiCondition::bound(ZiConditionSpec::or(Vec::new()), &schema());
    assert!(matches!(result, Err(ZiError::Validation { .. })));
}

#[test]
fn test_unknown_column_rejected() {
    let result = ZiCondition::bound(ZiConditionSpec::is_null("missing"), &schema());
    assert!(matches!(result, Err(ZiError::ColumnNotFound { .. })));
}

/// Tests lifting a record condition to sequences.
#[test]
fn test_sequence_modes() {
    let cond = condition(ZiConditionSpec::column("n", ZiConditionOp::Equal, 1));
    let sequence = vec![record![1, 0.0, "red"], record![2, 0.0, "red"]];

    assert!(cond.test_sequence(&sequence, ZiSequenceConditionMode::Any).unwrap());
    assert!(!cond.test_sequence(&sequence, ZiSequenceConditionMode::All).unwrap());
    assert!(!cond.test_sequence(&[], ZiSequenceConditionMode::Any).unwrap());
    assert!(cond.test_sequence(&[], ZiSequenceConditionMode::All).unwrap());
}

#[test]
fn test_unbound_condition_is_state_error() {
    let cond = ZiCondition::new(ZiConditionSpec::is_null("n"));
    assert!(!cond.is_bound());
    assert!(matches!(
        cond.test(&record![1, 0.0, "red"]),
        Err(ZiError::State { .. })
    ));
}

/// Tests that a condition filter removes matching records.
#[test]
fn test_condition_filter() {
    let filter = ZiFilter::bound(
        ZiFilterSpec::condition(ZiConditionSpec::column("x", ZiConditionOp::GreaterThan, 1.0)),
        &schema(),
    )
    .unwrap();
    assert!(filter.remove_example(&record![1, 2.0, "red"]).unwrap());
    assert!(!filter.remove_example(&record![1, 0.5, "red"]).unwrap());

    let sequence = vec![
        record![1, 0.5, "red"],
        record![1, 2.0, "red"],
        record![1, 0.25, "red"],
    ];
    assert!(filter.remove_sequence(&sequence).unwrap());
    assert!(!filter.remove_sequence(&[record![1, 0.5, "red"]]).unwrap());
}

#[test]
fn test_invalid_values_filter() {
    let filter = ZiFilter::bound(ZiFilterSpec::invalid_values(["n", "c"]), &schema()).unwrap();
    assert!(!filter.remove_example(&record![10, 0.0, "green"]).unwrap());
    assert!(filter.remove_example(&record![11, 0.0, "green"]).unwrap());
    assert!(filter.remove_example(&record![1, 0.0, "GREEN"]).unwrap());
}

/// Tests that record width is checked before filtering.
#[test]
fn test_filter_checks_width() {
    let filter = ZiFilter::bound(ZiFilterSpec::invalid_values(["n"]), &schema()).unwrap();
    assert!(matches!(
        filter.remove_example(&record![1]),
        Err(ZiError::Schema { .. })
    ));
}

#[test]
fn test_sequence_length_filter() {
    let filter = ZiFilter::bound(ZiFilterSpec::sequence_length(Some(2), Some(3)), &schema()).unwrap();
    let row = record![1, 0.0, "red"];
    assert!(filter.remove_sequence(&[row.clone()]).unwrap());
    assert!(!filter.remove_sequence(&[row.clone(), row.clone()]).unwrap());
    assert!(filter.remove_sequence(&vec![row; 4]).unwrap());

    let inverted = ZiFilter::bound(ZiFilterSpec::sequence_length(Some(3), Some(2)), &schema());
    assert!(matches!(inverted, Err(ZiError::Validation { .. })));
}

/// Tests that serialized filters come back unbound with the same spec.
#[test]
fn test_filter_serde_yields_unbound() {
    let filter = ZiFilter::bound(
        ZiFilterSpec::condition(ZiConditionSpec::xor(
            ZiConditionSpec::is_null("n"),
            ZiConditionSpec::in_set("c", ["red"]),
        )),
        &schema(),
    )
    .unwrap();

    let json = serde_json::to_string(&filter).unwrap();
    let restored: ZiFilter = serde_json::from_str(&json).unwrap();
    assert!(!restored.is_bound());
    assert_eq!(restored.spec(), filter.spec());

    let rebound = ZiFilter::bound(restored.into_spec(), &schema()).unwrap();
    assert!(rebound.remove_example(&vec![ZiValue::Null, 0.0.into(), "blue".into()]).unwrap());
}
