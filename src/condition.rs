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

//! # Zivec Condition Module
//!
//! Conditions are boolean predicates over a single record. They are used by
//! filters (drop the record when the condition holds) and by conditional
//! transforms (replace or copy a value when the condition holds).
//!
//! A [`ZiConditionSpec`] names columns; binding it against a schema produces
//! a [`ZiCompiledCondition`] holding column positions and comparison values
//! already converted into each column's type.
//!
//! ## Comparison semantics
//!
//! - Integer, Long and Time columns compare as `i64`, except against a
//!   fractional or out-of-range literal, where both sides compare as `f64`
//! - Double columns compare as `f64`; NaN satisfies only `NotEqual`
//! - String and Categorical columns compare lexicographically as text
//! - Boolean columns compare as `bool` (`false < true`)
//! - Null cells never satisfy a column comparison or set membership; use
//!   [`ZiConditionSpec::IsNull`] to test for them

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::binding::{ZiBindState, ZiBindable};
use crate::errors::{Result, ZiError};
use crate::metadata::{ZiColumnMetaData, ZiColumnType};
use crate::record::{cell, ZiRecord};
use crate::schema::ZiSchema;
use crate::value::ZiValue;

/// Relational operators for column conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiConditionOp {
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Equal,
    NotEqual,
}

impl ZiConditionOp {
    /// Applies the operator to the ordering of `cell` relative to the
    /// condition value. `None` means the two were incomparable.
    pub fn holds(self, ordering: Option<Ordering>) -> bool {
        match ordering {
            None => self == ZiConditionOp::NotEqual,
            Some(ordering) => match self {
                ZiConditionOp::LessThan => ordering == Ordering::Less,
                ZiConditionOp::LessOrEqual => ordering != Ordering::Greater,
                ZiConditionOp::GreaterThan => ordering == Ordering::Greater,
                ZiConditionOp::GreaterOrEqual => ordering != Ordering::Less,
                ZiConditionOp::Equal => ordering == Ordering::Equal,
                ZiConditionOp::NotEqual => ordering != Ordering::Equal,
            },
        }
    }
}

/// How a record-level condition is lifted to a whole sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZiSequenceConditionMode {
    /// Holds when at least one record satisfies the condition.
    #[default]
    Any,
    /// Holds when every record satisfies the condition.
    All,
}

/// Serializable condition parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ZiConditionSpec {
    Column {
        column: String,
        op: ZiConditionOp,
        value: ZiValue,
    },
    InSet {
        column: String,
        values: Vec<ZiValue>,
    },
    NotInSet {
        column: String,
        values: Vec<ZiValue>,
    },
    /// Holds when the cell fails its column metadata.
    InvalidValue { column: String },
    IsNull { column: String },
    Not { condition: Box<ZiConditionSpec> },
    And { conditions: Vec<ZiConditionSpec> },
    Or { conditions: Vec<ZiConditionSpec> },
    Xor {
        left: Box<ZiConditionSpec>,
        right: Box<ZiConditionSpec>,
    },
}

impl ZiConditionSpec {
    pub fn column(column: impl Into<String>, op: ZiConditionOp, value: impl Into<ZiValue>) -> Self {
        ZiConditionSpec::Column {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn in_set<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ZiValue>,
    {
        ZiConditionSpec::InSet {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn not_in_set<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ZiValue>,
    {
        ZiConditionSpec::NotInSet {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn invalid_value(column: impl Into<String>) -> Self {
        ZiConditionSpec::InvalidValue {
            column: column.into(),
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        ZiConditionSpec::IsNull {
            column: column.into(),
        }
    }

    pub fn negate(condition: ZiConditionSpec) -> Self {
        ZiConditionSpec::Not {
            condition: Box::new(condition),
        }
    }

    pub fn and(conditions: Vec<ZiConditionSpec>) -> Self {
        ZiConditionSpec::And { conditions }
    }

    pub fn or(conditions: Vec<ZiConditionSpec>) -> Self {
        ZiConditionSpec::Or { conditions }
    }

    pub fn xor(left: ZiConditionSpec, right: ZiConditionSpec) -> Self {
        ZiConditionSpec::Xor {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Compiles the condition against `schema`.
    pub fn compile(&self, schema: &ZiSchema) -> Result<ZiCompiledCondition> {
        Ok(match self {
            ZiConditionSpec::Column { column, op, value } => {
                let index = schema.index_of(column)?;
                let kind = compare_kind(schema.column_type(index), value);
                ZiCompiledCondition::Compare {
                    index,
                    kind,
                    op: *op,
                    value: canonical(kind, value).map_err(|_| bad_literal(column, kind, value))?,
                }
            }
            ZiConditionSpec::InSet { column, values } | ZiConditionSpec::NotInSet { column, values } => {
                let index = schema.index_of(column)?;
                let kind = schema.column_type(index);
                let values = values
                    .iter()
                    .map(|value| {
                        let kind = compare_kind(kind, value);
                        canonical(kind, value)
                            .map(|value| (kind, value))
                            .map_err(|_| bad_literal(column, kind, value))
                    })
                    .collect::<Result<Vec<_>>>()?;
                ZiCompiledCondition::Membership {
                    index,
                    values,
                    negate: matches!(self, ZiConditionSpec::NotInSet { .. }),
                }
            }
            ZiConditionSpec::InvalidValue { column } => {
                let index = schema.index_of(column)?;
                ZiCompiledCondition::Invalid {
                    index,
                    meta: schema.meta(index).clone(),
                }
            }
            ZiConditionSpec::IsNull { column } => ZiCompiledCondition::Null {
                index: schema.index_of(column)?,
            },
            ZiConditionSpec::Not { condition } => {
                ZiCompiledCondition::Not(Box::new(condition.compile(schema)?))
            }
            ZiConditionSpec::And { conditions } | ZiConditionSpec::Or { conditions } => {
                if conditions.is_empty() {
                    return Err(ZiError::validation(format!(
                        "{} condition needs at least one operand",
                        self.name()
                    )));
                }
                let compiled = conditions
                    .iter()
                    .map(|condition| condition.compile(schema))
                    .collect::<Result<Vec<_>>>()?;
                if matches!(self, ZiConditionSpec::And { .. }) {
                    ZiCompiledCondition::And(compiled)
                } else {
                    ZiCompiledCondition::Or(compiled)
                }
            }
            ZiConditionSpec::Xor { left, right } => ZiCompiledCondition::Xor(
                Box::new(left.compile(schema)?),
                Box::new(right.compile(schema)?),
            ),
        })
    }
}

impl ZiBindable for ZiConditionSpec {
    type Resolved = ZiCompiledCondition;

    fn name(&self) -> &'static str {
        match self {
            ZiConditionSpec::Column { .. } => "condition.column",
            ZiConditionSpec::InSet { .. } => "condition.in_set",
            ZiConditionSpec::NotInSet { .. } => "condition.not_in_set",
            ZiConditionSpec::InvalidValue { .. } => "condition.invalid_value",
            ZiConditionSpec::IsNull { .. } => "condition.is_null",
            ZiConditionSpec::Not { .. } => "condition.not",
            ZiConditionSpec::And { .. } => "condition.and",
            ZiConditionSpec::Or { .. } => "condition.or",
            ZiConditionSpec::Xor { .. } => "condition.xor",
        }
    }

    fn bind(&self, schema: &ZiSchema) -> Result<ZiCompiledCondition> {
        self.compile(schema)
    }
}

/// Condition resolved against a schema.
#[derive(Clone, Debug, PartialEq)]
pub enum ZiCompiledCondition {
    Compare {
        index: usize,
        kind: ZiColumnType,
        op: ZiConditionOp,
        value: ZiValue,
    },
    /// Each member carries the type its comparison runs in.
    Membership {
        index: usize,
        values: Vec<(ZiColumnType, ZiValue)>,
        negate: bool,
    },
    Invalid {
        index: usize,
        meta: ZiColumnMetaData,
    },
    Null {
        index: usize,
    },
    Not(Box<ZiCompiledCondition>),
    And(Vec<ZiCompiledCondition>),
    Or(Vec<ZiCompiledCondition>),
    Xor(Box<ZiCompiledCondition>, Box<ZiCompiledCondition>),
}

impl ZiCompiledCondition {
    /// Evaluates the condition on one record.
    pub fn test(&self, record: &ZiRecord) -> Result<bool> {
        match self {
            ZiCompiledCondition::Compare {
                index,
                kind,
                op,
                value,
            } => {
                let current = cell(record, *index)?;
                if current.is_null() {
                    return Ok(false);
                }
                let current = canonical(*kind, current)?;
                Ok(op.holds(current.partial_cmp(value)))
            }
            ZiCompiledCondition::Membership {
                index,
                values,
                negate,
            } => {
                let current = cell(record, *index)?;
                if current.is_null() {
                    return Ok(false);
                }
                let mut found = false;
                for (kind, value) in values {
                    if canonical(*kind, current)? == *value {
                        found = true;
                        break;
                    }
                }
                Ok(found != *negate)
            }
            ZiCompiledCondition::Invalid { index, meta } => {
                Ok(!meta.is_valid(cell(record, *index)?))
            }
            ZiCompiledCondition::Null { index } => Ok(cell(record, *index)?.is_null()),
            ZiCompiledCondition::Not(inner) => Ok(!inner.test(record)?),
            ZiCompiledCondition::And(conditions) => {
                for condition in conditions {
                    if !condition.test(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ZiCompiledCondition::Or(conditions) => {
                for condition in conditions {
                    if condition.test(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ZiCompiledCondition::Xor(left, right) => Ok(left.test(record)? != right.test(record)?),
        }
    }

    /// Evaluates the condition over a sequence.
    pub fn test_sequence(&self, sequence: &[ZiRecord], mode: ZiSequenceConditionMode) -> Result<bool> {
        match mode {
            ZiSequenceConditionMode::Any => {
                for record in sequence {
                    if self.test(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ZiSequenceConditionMode::All => {
                for record in sequence {
                    if !self.test(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

/// A condition in its Unbound/Bound lifecycle.
pub type ZiCondition = ZiBindState<ZiConditionSpec>;

impl ZiBindState<ZiConditionSpec> {
    pub fn test(&self, record: &ZiRecord) -> Result<bool> {
        self.resolved()?.test(record)
    }

    pub fn test_sequence(&self, sequence: &[ZiRecord], mode: ZiSequenceConditionMode) -> Result<bool> {
        self.resolved()?.test_sequence(sequence, mode)
    }
}

/// Converts a value into the representation its column compares in.
pub(crate) fn canonical(kind: ZiColumnType, value: &ZiValue) -> Result<ZiValue> {
    Ok(match kind {
        ZiColumnType::Integer | ZiColumnType::Long => ZiValue::Long(value.to_long()?),
        ZiColumnType::Time => ZiValue::Long(value.to_time()?),
        ZiColumnType::Double => ZiValue::Double(value.to_double()?),
        ZiColumnType::Boolean => ZiValue::Boolean(value.to_bool()?),
        ZiColumnType::String | ZiColumnType::Categorical | ZiColumnType::Bytes => {
            ZiValue::Text(value.to_text())
        }
    })
}

/// Integral columns compare in `f64` against literals that have no exact
/// `i64` form.
fn compare_kind(kind: ZiColumnType, value: &ZiValue) -> ZiColumnType {
    let integral = matches!(kind, ZiColumnType::Integer | ZiColumnType::Long);
    match value.to_double() {
        Ok(number) if integral && (number.fract() != 0.0 || value.to_long().is_err()) => {
            ZiColumnType::Double
        }
        _ => kind,
    }
}

fn bad_literal(column: &str, kind: ZiColumnType, value: &ZiValue) -> ZiError {
    ZiError::validation(format!(
        "condition value '{value}' is not comparable with {kind} column '{column}'"
    ))
}
