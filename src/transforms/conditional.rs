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

use crate::condition::{ZiCompiledCondition, ZiConditionSpec};
use crate::errors::{Result, ZiError};
use crate::record::{cell, ZiRecord};
use crate::schema::ZiSchema;
use crate::transforms::{with_cell, ZiTransformOp};
use crate::value::ZiValue;

/// Target column and compiled condition of a conditional replace.
#[derive(Clone, Debug)]
pub struct ZiBoundReplace {
    pub index: usize,
    pub condition: ZiCompiledCondition,
}

/// Column pair and compiled condition of a conditional copy.
#[derive(Clone, Debug)]
pub struct ZiBoundCopy {
    pub to: usize,
    pub from: usize,
    pub condition: ZiCompiledCondition,
}

/// Writes `new_value` into `column` whenever the condition holds.
///
/// The value must be valid for the column, so replaced records still satisfy
/// the unchanged schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiConditionalReplaceValue {
    pub column: String,
    pub new_value: ZiValue,
    pub condition: ZiConditionSpec,
}

impl ZiConditionalReplaceValue {
    pub fn new(column: impl Into<String>, new_value: impl Into<ZiValue>, condition: ZiConditionSpec) -> Self {
        Self {
            column: column.into(),
            new_value: new_value.into(),
            condition,
        }
    }
}

impl ZiTransformOp for ZiConditionalReplaceValue {
    type Bound = ZiBoundReplace;

    fn name(&self) -> &'static str {
        "conditional_replace_value"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        self.bind(input)?;
        Ok(input.clone())
    }

    fn bind(&self, input: &ZiSchema) -> Result<ZiBoundReplace> {
        let index = input.index_of(&self.column)?;
        let meta = input.meta(index);
        if !meta.is_valid(&self.new_value) {
            return Err(ZiError::validation(format!(
                "{}: value '{}' is not valid for {} column '{}'",
                self.name(),
                self.new_value,
                meta.column_type(),
                self.column
            )));
        }
        Ok(ZiBoundReplace {
            index,
            condition: self.condition.compile(input)?,
        })
    }

    fn map(&self, bound: &ZiBoundReplace, record: &ZiRecord) -> Result<ZiRecord> {
        if bound.condition.test(record)? {
            Ok(with_cell(record, bound.index, self.new_value.clone()))
        } else {
            Ok(record.clone())
        }
    }
}

/// Copies `from_column` into `to_column` whenever the condition holds.
///
/// Every value valid in the source column must also be valid in the target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiConditionalCopyValue {
    pub to_column: String,
    pub from_column: String,
    pub condition: ZiConditionSpec,
}

impl ZiConditionalCopyValue {
    pub fn new(
        to_column: impl Into<String>,
        from_column: impl Into<String>,
        condition: ZiConditionSpec,
    ) -> Self {
        Self {
            to_column: to_column.into(),
            from_column: from_column.into(),
            condition,
        }
    }
}

impl ZiTransformOp for ZiConditionalCopyValue {
    type Bound = ZiBoundCopy;

    fn name(&self) -> &'static str {
        "conditional_copy_value"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        self.bind(input)?;
        Ok(input.clone())
    }

    fn bind(&self, input: &ZiSchema) -> Result<ZiBoundCopy> {
        let to = input.index_of(&self.to_column)?;
        let from = input.index_of(&self.from_column)?;
        if !input.meta(to).contains(input.meta(from)) {
            return Err(ZiError::schema(format!(
                "{}: values of {} column '{}' do not fit {} column '{}'",
                self.name(),
                input.column_type(from),
                self.from_column,
                input.column_type(to),
                self.to_column
            )));
        }
        Ok(ZiBoundCopy {
            to,
            from,
            condition: self.condition.compile(input)?,
        })
    }

    fn map(&self, bound: &ZiBoundCopy, record: &ZiRecord) -> Result<ZiRecord> {
        if !bound.condition.test(record)? {
            return Ok(record.clone());
        }
        let copied = cell(record, bound.from)?.clone();
        Ok(with_cell(record, bound.to, copied))
    }
}
