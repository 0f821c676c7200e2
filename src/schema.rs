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

//! # Zivec Schema Module
//!
//! A [`ZiSchema`] is the ordered, name-unique list of columns that governs the
//! shape of every record. Schemas are built once and never mutated; transforms
//! that change the column set return a new schema.
//!
//! ```rust
//! use zivec::ZiSchema;
//!
//! let schema = ZiSchema::builder()
//!     .add_column_string("name")
//!     .add_column_integer_bounded("age", 0, 150)
//!     .add_column_categorical("tier", ["free", "pro"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.index_of("age").unwrap(), 1);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::metadata::{ZiColumnMetaData, ZiColumnType};
use crate::record::ZiRecord;

/// A named column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiColumn {
    pub name: String,
    pub meta: ZiColumnMetaData,
}

impl ZiColumn {
    pub fn new(name: impl Into<String>, meta: ZiColumnMetaData) -> Self {
        Self {
            name: name.into(),
            meta,
        }
    }
}

/// Immutable ordered column list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ZiColumn>", into = "Vec<ZiColumn>")]
pub struct ZiSchema {
    columns: Vec<ZiColumn>,
}

impl ZiSchema {
    pub fn builder() -> ZiSchemaBuilder {
        ZiSchemaBuilder::new()
    }

    /// Creates a schema after checking name uniqueness and metadata
    /// consistency.
    pub fn new(columns: Vec<ZiColumn>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ZiError::schema(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
            column.meta.validate().map_err(|err| {
                ZiError::schema(format!("column '{}': {err}", column.name))
            })?;
        }
        Ok(Self { columns })
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Position of the named column.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|column| column.name == name)
            .ok_or_else(|| ZiError::column_not_found(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }

    pub fn columns(&self) -> &[ZiColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&ZiColumn> {
        self.columns.get(index)
    }

    /// Name at `index`. Panics when out of range, like slice indexing.
    pub fn name(&self, index: usize) -> &str {
        &self.columns[index].name
    }

    /// Metadata at `index`. Panics when out of range, like slice indexing.
    pub fn meta(&self, index: usize) -> &ZiColumnMetaData {
        &self.columns[index].meta
    }

    pub fn meta_by_name(&self, name: &str) -> Result<&ZiColumnMetaData> {
        Ok(self.meta(self.index_of(name)?))
    }

    pub fn column_type(&self, index: usize) -> ZiColumnType {
        self.meta(index).column_type()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    pub fn column_types(&self) -> Vec<ZiColumnType> {
        self.columns
            .iter()
            .map(|column| column.meta.column_type())
            .collect()
    }

    /// Checks that a record has the schema's shape and that every cell
    /// satisfies its column metadata.
    pub fn validate_record(&self, record: &ZiRecord) -> Result<()> {
        if record.len() != self.columns.len() {
            return Err(ZiError::schema(format!(
                "record has {} values but schema has {} columns",
                record.len(),
                self.columns.len()
            )));
        }
        for (column, value) in self.columns.iter().zip(record) {
            if !column.meta.is_valid(value) {
                return Err(ZiError::constraint(
                    &column.name,
                    value.to_text(),
                    format!("not a valid {} value", column.meta.column_type()),
                ));
            }
        }
        Ok(())
    }

    pub fn is_valid_record(&self, record: &ZiRecord) -> bool {
        self.validate_record(record).is_ok()
    }
}

impl TryFrom<Vec<ZiColumn>> for ZiSchema {
    type Error = ZiError;

    fn try_from(columns: Vec<ZiColumn>) -> Result<Self> {
        ZiSchema::new(columns)
    }
}

impl From<ZiSchema> for Vec<ZiColumn> {
    fn from(schema: ZiSchema) -> Self {
        schema.columns
    }
}

/// Accumulates columns; [`ZiSchemaBuilder::build`] performs all validation.
#[derive(Clone, Debug, Default)]
pub struct ZiSchemaBuilder {
    columns: Vec<ZiColumn>,
}

impl ZiSchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(mut self, name: impl Into<String>, meta: ZiColumnMetaData) -> Self {
        self.columns.push(ZiColumn::new(name, meta));
        self
    }

    pub fn add_column_string(self, name: impl Into<String>) -> Self {
        self.add_column(name, ZiColumnMetaData::string())
    }

    pub fn add_columns_string(mut self, names: &[&str]) -> Self {
        for name in names {
            self = self.add_column_string(*name);
        }
        self
    }

    pub fn add_column_integer(self, name: impl Into<String>) -> Self {
        self.add_column(name, ZiColumnMetaData::integer(None, None))
    }

    pub fn add_column_integer_bounded(self, name: impl Into<String>, min: i32, max: i32) -> Self {
        self.add_column(name, ZiColumnMetaData::integer(Some(min), Some(max)))
    }

    pub fn add_column_long(self, name: impl Into<String>) -> Self {
        self.add_column(name, ZiColumnMetaData::long(None, None))
    }

    pub fn add_column_long_bounded(self, name: impl Into<String>, min: i64, max: i64) -> Self {
        self.add_column(name, ZiColumnMetaData::long(Some(min), Some(max)))
    }

    pub fn add_column_double(self, name: impl Into<String>) -> Self {
        self.add_column(name, ZiColumnMetaData::double(None, None))
    }

    pub fn add_column_double_bounded(self, name: impl Into<String>, min: f64, max: f64) -> Self {
        self.add_column(name, ZiColumnMetaData::double(Some(min), Some(max)))
    }

    pub fn add_column_categorical<I, S>(self, name: impl Into<String>, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_column(name, ZiColumnMetaData::categorical(states))
    }

    pub fn add_column_time(self, name: impl Into<String>, zone: impl Into<String>) -> Self {
        self.add_column(name, ZiColumnMetaData::time(zone))
    }

    pub fn add_column_boolean(self, name: impl Into<String>) -> Self {
        self.add_column(name, ZiColumnMetaData::Boolean)
    }

    pub fn add_column_bytes(self, name: impl Into<String>) -> Self {
        self.add_column(name, ZiColumnMetaData::Bytes)
    }

    pub fn build(self) -> Result<ZiSchema> {
        ZiSchema::new(self.columns)
    }
}
