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

//! # Zivec Transform Tests - Time
//!
//! This module contains tests for parsing wall-clock text into time values
//! and deriving calendar columns from them.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test time
//! ```

use zivec::{
    record, ZiColumnMetaData, ZiColumnType, ZiDeriveColumnsFromTime, ZiError, ZiSchema,
    ZiStringToTime, ZiTimeField, ZiTransform, ZiValue,
};

const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tests parsing UTC wall-clock text into epoch milliseconds.
#[test]
fn test_string_to_time_utc() {
    let schema = ZiSchema::builder().add_column_string("column").build().unwrap();
    let transform =
        ZiTransform::bound(ZiStringToTime::new("column", FORMAT, "UTC").into(), &schema).unwrap();

    let out = transform.output_schema().unwrap();
    assert_eq!(out.column_type(0), ZiColumnType::Time);
    assert_eq!(out.meta(0), &ZiColumnMetaData::time("UTC"));

    assert_eq!(
        transform.map(&record!["2016-01-01 12:30:45"]).unwrap(),
        vec![ZiValue::Time(1_451_651_445_000)]
    );
    assert_eq!(
        transform.map(&record!["2015-06-30 23:59:59"]).unwrap(),
        vec![ZiValue::Time(1_435_708_799_000)]
    );
}

/// Tests that the same wall clock in another zone lands on a shifted instant.
#[test]
fn test_string_to_time_zoned() {
    let schema = ZiSchema::builder().add_column_string("column").build().unwrap();
    let transform = ZiTransform::bound(
        ZiStringToTime::new("column", FORMAT, "America/New_York").into(),
        &schema,
    )
    .unwrap();
    assert_eq!(
        transform.map(&record!["2016-01-01 07:30:45"]).unwrap(),
        vec![ZiValue::Time(1_451_651_445_000)]
    );
}

#[test]
fn test_string_to_time_rejects_garbage() {
    let schema = ZiSchema::builder().add_column_string("column").build().unwrap();
    let transform =
        ZiTransform::bound(ZiStringToTime::new("column", FORMAT, "UTC").into(), &schema).unwrap();
    assert!(matches!(
        transform.map(&record!["yesterday"]),
        Err(ZiError::TypeConversion { .. })
    ));
}

#[test]
fn test_unknown_zone_fails_to_bind() {
    let schema = ZiSchema::builder().add_column_string("column").build().unwrap();
    let result = ZiTransform::bound(
        ZiStringToTime::new("column", FORMAT, "Mars/Olympus_Mons").into(),
        &schema,
    );
    assert!(result.is_err());
}

/// Tests deriving columns after a column other than the source.
///
/// Hour, day and second land as bounded Integer columns and the formatted
/// column as text, all after `otherColumn`.
#[test]
fn test_derive_columns_from_time() {
    let schema = ZiSchema::builder()
        .add_column_time("column", "UTC")
        .add_column_string("otherColumn")
        .build()
        .unwrap();
    let transform = ZiTransform::bound(
        ZiDeriveColumnsFromTime::new("column")
            .insert_after("otherColumn")
            .add_integer("hour", ZiTimeField::HourOfDay)
            .add_integer("day", ZiTimeField::DayOfMonth)
            .add_integer("second", ZiTimeField::SecondOfMinute)
            .add_formatted("humanReadable", FORMAT, "UTC")
            .into(),
        &schema,
    )
    .unwrap();

    let out = transform.output_schema().unwrap();
    assert_eq!(out.num_columns(), 6);
    assert_eq!(
        out.column_names(),
        vec!["column", "otherColumn", "hour", "day", "second", "humanReadable"]
    );
    assert_eq!(out.meta(2), &ZiColumnMetaData::integer(Some(0), Some(23)));
    assert_eq!(out.column_type(5), ZiColumnType::String);

    let row = vec![ZiValue::Time(1_451_651_445_000), ZiValue::from("x")];
    let mapped = transform.map(&row).unwrap();
    assert_eq!(
        mapped,
        vec![
            ZiValue::Time(1_451_651_445_000),
            ZiValue::from("x"),
            ZiValue::Integer(12),
            ZiValue::Integer(1),
            ZiValue::Integer(45),
            ZiValue::from("2016-01-01 12:30:45"),
        ]
    );
}

#[test]
fn test_derive_requires_time_column() {
    let schema = ZiSchema::builder().add_column_long("column").build().unwrap();
    let result = ZiTransform::bound(
        ZiDeriveColumnsFromTime::new("column")
            .add_integer("hour", ZiTimeField::HourOfDay)
            .into(),
        &schema,
    );
    assert!(matches!(result, Err(ZiError::Schema { .. })));
}
