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

//! # Zivec Core Tests - Schema
//!
//! This module contains tests for schema construction, column lookup and
//! record validation.
//!
//! ## Test Categories
//!
//! - **Construction**: builder, duplicate names, bad metadata
//! - **Lookup**: names, indices, types
//! - **Validation**: record shape and per-column constraints
//! - **Serialization**: schemas survive JSON and are re-validated on load
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test schema
//! ```

use zivec::{record, ZiColumn, ZiColumnMetaData, ZiColumnType, ZiError, ZiSchema, ZiValue};

fn sample() -> ZiSchema {
    ZiSchema::builder()
        .add_column_string("name")
        .add_column_integer_bounded("age", 0, 150)
        .add_column_categorical("color", ["red", "green", "blue"])
        .add_column_time("seen", "UTC")
        .build()
        .unwrap()
}

/// Tests builder ordering and lookups.
#[test]
fn test_builder_and_lookup() {
    let schema = sample();
    assert_eq!(schema.num_columns(), 4);
    assert_eq!(schema.index_of("color").unwrap(), 2);
    assert_eq!(schema.name(3), "seen");
    assert_eq!(
        schema.column_types(),
        vec![
            ZiColumnType::String,
            ZiColumnType::Integer,
            ZiColumnType::Categorical,
            ZiColumnType::Time
        ]
    );
    assert!(schema.has_column("age"));
    assert!(matches!(
        schema.index_of("missing"),
        Err(ZiError::ColumnNotFound { .. })
    ));
}

/// Tests that duplicate names and inconsistent metadata are rejected.
#[test]
fn test_invalid_schemas() {
    let duplicate = ZiSchema::builder()
        .add_column_integer("a")
        .add_column_double("a")
        .build();
    assert!(matches!(duplicate, Err(ZiError::Schema { .. })));

    let inverted = ZiSchema::new(vec![ZiColumn::new(
        "n",
        ZiColumnMetaData::integer(Some(5), Some(1)),
    )]);
    assert!(matches!(inverted, Err(ZiError::Schema { .. })));

    let bad_zone = ZiSchema::builder().add_column_time("t", "Mars/Olympus").build();
    assert!(bad_zone.is_err());
}

/// Tests record validation against column metadata.
#[test]
fn test_validate_record() {
    let schema = sample();
    assert!(schema.is_valid_record(&record!["ann", 30, "red", 0i64]));
    assert!(!schema.is_valid_record(&record!["ann", 200, "red", 0i64]));
    assert!(!schema.is_valid_record(&record!["ann", 30, "purple", 0i64]));

    let mut with_null = record!["ann", 30, "red", 0i64];
    with_null[0] = ZiValue::Null;
    assert!(matches!(
        schema.validate_record(&with_null),
        Err(ZiError::ConstraintViolation { .. })
    ));

    assert!(matches!(
        schema.validate_record(&record!["ann"]),
        Err(ZiError::Schema { .. })
    ));
}

/// Tests JSON round-trip and validation on load.
#[test]
fn test_schema_json() {
    let schema = sample();
    let json = serde_json::to_string(&schema).unwrap();
    let back: ZiSchema = serde_json::from_str(&json).unwrap();
    assert_eq!(back, schema);

    let duplicate = r#"[
        {"name": "a", "meta": {"type": "Boolean"}},
        {"name": "a", "meta": {"type": "Bytes"}}
    ]"#;
    assert!(serde_json::from_str::<ZiSchema>(duplicate).is_err());
}
