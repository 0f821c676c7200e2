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

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::metadata::{ZiColumnMetaData, ZiColumnType, ZiPlaceholder};
use crate::record::{cell, ZiRecord};
use crate::schema::ZiSchema;
use crate::transforms::{typed_column, with_cell, ZiTransformOp};
use crate::value::ZiValue;

fn unfit(who: &str, value: &ZiValue, column: &str) -> ZiError {
    ZiError::validation(format!(
        "{who}: replacement '{value}' is not valid for column '{column}'"
    ))
}

/// Fills null or empty cells of an Integer column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiReplaceEmptyInteger {
    pub column: String,
    pub value: i32,
}

impl ZiReplaceEmptyInteger {
    pub fn new(column: impl Into<String>, value: i32) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

impl ZiTransformOp for ZiReplaceEmptyInteger {
    type Bound = usize;

    fn name(&self) -> &'static str {
        "replace_empty_integer"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        self.bind(input)?;
        Ok(input.clone())
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        let index = typed_column(input, &self.column, &[ZiColumnType::Integer], self.name())?;
        let value = ZiValue::Integer(self.value);
        if !input.meta(index).is_valid(&value) {
            return Err(unfit(self.name(), &value, &self.column));
        }
        Ok(index)
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        if cell(record, index)?.is_empty() {
            Ok(with_cell(record, index, ZiValue::Integer(self.value)))
        } else {
            Ok(record.clone())
        }
    }
}

/// Replaces every cell that fails its column metadata with the value the
/// placeholder policy resolves to for that column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiReplaceInvalidWithValue {
    pub column: String,
    pub placeholder: ZiPlaceholder,
}

impl ZiReplaceInvalidWithValue {
    pub fn new(column: impl Into<String>, placeholder: ZiPlaceholder) -> Self {
        Self {
            column: column.into(),
            placeholder,
        }
    }
}

/// Column, its metadata and the resolved replacement.
#[derive(Clone, Debug)]
pub struct ZiBoundReplacement {
    pub index: usize,
    pub meta: ZiColumnMetaData,
    pub value: ZiValue,
}

impl ZiTransformOp for ZiReplaceInvalidWithValue {
    type Bound = ZiBoundReplacement;

    fn name(&self) -> &'static str {
        "replace_invalid_with_value"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        self.bind(input)?;
        Ok(input.clone())
    }

    fn bind(&self, input: &ZiSchema) -> Result<ZiBoundReplacement> {
        let index = input.index_of(&self.column)?;
        let meta = input.meta(index).clone();
        let value = meta.placeholder(&self.placeholder)?;
        if !meta.is_valid(&value) {
            return Err(unfit(self.name(), &value, &self.column));
        }
        Ok(ZiBoundReplacement { index, meta, value })
    }

    fn map(&self, bound: &ZiBoundReplacement, record: &ZiRecord) -> Result<ZiRecord> {
        if bound.meta.is_valid(cell(record, bound.index)?) {
            Ok(record.clone())
        } else {
            Ok(with_cell(record, bound.index, bound.value.clone()))
        }
    }
}
