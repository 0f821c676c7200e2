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

//! # Zivec Transform Tests - Sequence Windows
//!
//! ```bash
//! cargo test --test window
//! ```

use zivec::{
    ZiColumnType, ZiError, ZiReduceOp, ZiReduceSequenceByWindow, ZiReducer, ZiSchema, ZiTimeUnit,
    ZiTransform, ZiValue, ZiWindow,
};

fn event_schema() -> ZiSchema {
    ZiSchema::builder()
        .add_column_time("t", "UTC")
        .add_column_long("v")
        .add_column_string("s")
        .build()
        .unwrap()
}

fn event(at: i64, v: i64, s: &str) -> Vec<ZiValue> {
    vec![ZiValue::Time(at), ZiValue::Long(v), ZiValue::from(s)]
}

fn minute_windows() -> ZiTransform {
    ZiTransform::bound(
        ZiReduceSequenceByWindow::new(
            ZiWindow::time("t", 1, ZiTimeUnit::Minutes),
            ZiReducer::new(ZiReduceOp::TakeFirst)
                .with_op("v", ZiReduceOp::Sum)
                .with_op("s", ZiReduceOp::CountUnique),
        )
        .into(),
        &event_schema(),
    )
    .unwrap()
}

/// Tests output naming and types of reduced columns.
#[test]
fn test_reduced_schema() {
    let transform = minute_windows();
    let out = transform.output_schema().unwrap();
    assert_eq!(out.column_names(), vec!["t", "sum(v)", "count_unique(s)"]);
    assert_eq!(out.column_type(0), ZiColumnType::Time);
    assert_eq!(out.column_type(1), ZiColumnType::Long);
    assert_eq!(out.column_type(2), ZiColumnType::Long);
}

/// Tests epoch-aligned minute windows; empty minutes produce nothing.
#[test]
fn test_time_windows() {
    let sequence = vec![
        event(0, 1, "a"),
        event(30_000, 2, "b"),
        event(59_999, 3, "a"),
        event(60_000, 10, "c"),
        event(185_000, 100, "d"),
    ];
    let reduced = minute_windows().map_sequence(&sequence).unwrap();
    assert_eq!(
        reduced,
        vec![
            vec![ZiValue::Time(0), ZiValue::Long(6), ZiValue::Long(2)],
            vec![ZiValue::Time(60_000), ZiValue::Long(10), ZiValue::Long(1)],
            vec![ZiValue::Time(185_000), ZiValue::Long(100), ZiValue::Long(1)],
        ]
    );
}

/// Tests that instants before the epoch fall into their own window.
#[test]
fn test_time_windows_before_epoch() {
    let sequence = vec![event(-1, 5, "a"), event(0, 7, "a")];
    let reduced = minute_windows().map_sequence(&sequence).unwrap();
    assert_eq!(reduced.len(), 2);
    assert_eq!(reduced[0][0], ZiValue::Time(-1));
    assert_eq!(reduced[1][1], ZiValue::Long(7));
}

/// Tests count windows with a short final window.
#[test]
fn test_count_windows() {
    let transform = ZiTransform::bound(
        ZiReduceSequenceByWindow::new(
            ZiWindow::count(2),
            ZiReducer::new(ZiReduceOp::TakeLast)
                .with_op("v", ZiReduceOp::Mean)
                .with_op("t", ZiReduceOp::Count),
        )
        .into(),
        &event_schema(),
    )
    .unwrap();

    let out = transform.output_schema().unwrap();
    assert_eq!(out.column_names(), vec!["count(t)", "mean(v)", "s"]);

    let sequence = vec![
        event(0, 1, "a"),
        event(1, 2, "b"),
        event(2, 4, "c"),
    ];
    let reduced = transform.map_sequence(&sequence).unwrap();
    assert_eq!(
        reduced,
        vec![
            vec![ZiValue::Long(2), ZiValue::Double(1.5), ZiValue::from("b")],
            vec![ZiValue::Long(1), ZiValue::Double(4.0), ZiValue::from("c")],
        ]
    );
}

#[test]
fn test_empty_sequence_reduces_to_nothing() {
    assert!(minute_windows().map_sequence(&[]).unwrap().is_empty());
}

#[test]
fn test_window_refuses_single_records() {
    assert!(matches!(
        minute_windows().map(&event(0, 1, "a")),
        Err(ZiError::Transform { .. })
    ));
}

#[test]
fn test_invalid_windows_fail_to_bind() {
    let zero = ZiTransform::bound(
        ZiReduceSequenceByWindow::new(ZiWindow::count(0), ZiReducer::new(ZiReduceOp::TakeFirst))
            .into(),
        &event_schema(),
    );
    assert!(matches!(zero, Err(ZiError::Validation { .. })));

    let not_time = ZiTransform::bound(
        ZiReduceSequenceByWindow::new(
            ZiWindow::time("v", 1, ZiTimeUnit::Seconds),
            ZiReducer::new(ZiReduceOp::TakeFirst),
        )
        .into(),
        &event_schema(),
    );
    assert!(matches!(not_time, Err(ZiError::Schema { .. })));

    let unknown = ZiTransform::bound(
        ZiReduceSequenceByWindow::new(
            ZiWindow::count(2),
            ZiReducer::new(ZiReduceOp::TakeFirst).with_op("missing", ZiReduceOp::Sum),
        )
        .into(),
        &event_schema(),
    );
    assert!(matches!(unknown, Err(ZiError::ColumnNotFound { .. })));
}

/// Tests that summing a text column is rejected at bind time.
#[test]
fn test_sum_of_text_column_rejected() {
    let result = ZiTransform::bound(
        ZiReduceSequenceByWindow::new(ZiWindow::count(2), ZiReducer::new(ZiReduceOp::Sum)).into(),
        &event_schema(),
    );
    assert!(matches!(result, Err(ZiError::Schema { .. })));
}
