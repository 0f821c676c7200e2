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
use crate::metadata::{ZiColumnMetaData, ZiColumnType};
use crate::record::{cell, ZiRecord};
use crate::schema::{ZiColumn, ZiSchema};
use crate::transforms::{splice_columns, typed_column, with_cell, ZiTransformOp};
use crate::value::ZiValue;

/// What to emit when a value has no matching categorical state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZiUnknownPolicy {
    /// Fail with a constraint violation.
    #[default]
    Fail,
    /// Emit the incoming value rendered as text. The output column is then
    /// a String column, since it may hold values outside the states.
    PassThrough,
}

/// A categorical column resolved together with its states.
#[derive(Clone, Debug)]
pub struct ZiBoundStates {
    pub index: usize,
    pub states: Vec<String>,
}

impl ZiBoundStates {
    fn resolve(input: &ZiSchema, column: &str, who: &str) -> Result<Self> {
        let index = typed_column(input, column, &[ZiColumnType::Categorical], who)?;
        Ok(Self {
            index,
            states: states_of(input, index)?.to_vec(),
        })
    }
}

fn states_of<'a>(schema: &'a ZiSchema, index: usize) -> Result<&'a [String]> {
    schema.meta(index).states().ok_or_else(|| {
        ZiError::schema(format!("column '{}' is not categorical", schema.name(index)))
    })
}

fn state_position(states: &[String], column: &str, value: &ZiValue) -> Result<usize> {
    let text = value.to_text();
    states.iter().position(|state| *state == text).ok_or_else(|| {
        ZiError::constraint(column, text, format!("not one of the states {states:?}"))
    })
}

fn state_count(states: &[String]) -> Result<i32> {
    i32::try_from(states.len())
        .map_err(|_| ZiError::validation("categorical column has too many states"))
}

/// Metadata of a decoded column.
fn decoded_meta(states: &[String], policy: ZiUnknownPolicy) -> Result<ZiColumnMetaData> {
    let categorical = ZiColumnMetaData::categorical(states.iter().cloned());
    categorical.validate()?;
    Ok(match policy {
        ZiUnknownPolicy::Fail => categorical,
        ZiUnknownPolicy::PassThrough => ZiColumnMetaData::string(),
    })
}

fn unknown(policy: ZiUnknownPolicy, column: &str, value: &ZiValue, states: &[String]) -> Result<ZiValue> {
    match policy {
        ZiUnknownPolicy::Fail => Err(ZiError::constraint(
            column,
            value.to_text(),
            format!("no categorical state among {states:?}"),
        )),
        ZiUnknownPolicy::PassThrough => Ok(ZiValue::Text(value.to_text())),
    }
}

/// Categorical state → Integer index in `[0, n-1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiCategoricalToInteger {
    pub column: String,
}

impl ZiCategoricalToInteger {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl ZiTransformOp for ZiCategoricalToInteger {
    type Bound = ZiBoundStates;

    fn name(&self) -> &'static str {
        "categorical_to_integer"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        let index = typed_column(input, &self.column, &[ZiColumnType::Categorical], self.name())?;
        let count = state_count(states_of(input, index)?)?;
        splice_columns(
            input,
            index,
            vec![ZiColumn::new(
                &self.column,
                ZiColumnMetaData::integer(Some(0), Some(count - 1)),
            )],
        )
    }

    fn bind(&self, input: &ZiSchema) -> Result<ZiBoundStates> {
        ZiBoundStates::resolve(input, &self.column, self.name())
    }

    fn map(&self, bound: &ZiBoundStates, record: &ZiRecord) -> Result<ZiRecord> {
        let position = state_position(&bound.states, &self.column, cell(record, bound.index)?)?;
        let encoded = i32::try_from(position)
            .map_err(|_| ZiError::transform(self.name(), "state index exceeds i32"))?;
        Ok(with_cell(record, bound.index, ZiValue::Integer(encoded)))
    }
}

/// Categorical state → one Integer `{0,1}` column per state, named
/// `column[state]`, replacing the source column in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiCategoricalToOneHot {
    pub column: String,
}

impl ZiCategoricalToOneHot {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl ZiTransformOp for ZiCategoricalToOneHot {
    type Bound = ZiBoundStates;

    fn name(&self) -> &'static str {
        "categorical_to_one_hot"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        let index = typed_column(input, &self.column, &[ZiColumnType::Categorical], self.name())?;
        let expanded = states_of(input, index)?
            .iter()
            .map(|state| {
                ZiColumn::new(
                    format!("{}[{state}]", self.column),
                    ZiColumnMetaData::integer(Some(0), Some(1)),
                )
            })
            .collect();
        splice_columns(input, index, expanded)
    }

    fn bind(&self, input: &ZiSchema) -> Result<ZiBoundStates> {
        ZiBoundStates::resolve(input, &self.column, self.name())
    }

    fn map(&self, bound: &ZiBoundStates, record: &ZiRecord) -> Result<ZiRecord> {
        let ZiBoundStates { index, states } = bound;
        let hot = state_position(states, &self.column, cell(record, *index)?)?;

        let mut out = Vec::with_capacity(record.len() + states.len() - 1);
        out.extend_from_slice(&record[..*index]);
        out.extend((0..states.len()).map(|i| ZiValue::Integer(i32::from(i == hot))));
        out.extend_from_slice(&record[*index + 1..]);
        Ok(out)
    }
}

/// Integer index → categorical state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiIntegerToCategorical {
    pub column: String,
    pub states: Vec<String>,
    #[serde(default)]
    pub on_unknown: ZiUnknownPolicy,
}

impl ZiIntegerToCategorical {
    pub fn new<I, S>(column: impl Into<String>, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            states: states.into_iter().map(Into::into).collect(),
            on_unknown: ZiUnknownPolicy::Fail,
        }
    }

    pub fn on_unknown(mut self, policy: ZiUnknownPolicy) -> Self {
        self.on_unknown = policy;
        self
    }
}

impl ZiTransformOp for ZiIntegerToCategorical {
    type Bound = usize;

    fn name(&self) -> &'static str {
        "integer_to_categorical"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        let index = self.bind(input)?;
        splice_columns(
            input,
            index,
            vec![ZiColumn::new(&self.column, decoded_meta(&self.states, self.on_unknown)?)],
        )
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        typed_column(
            input,
            &self.column,
            &[ZiColumnType::Integer, ZiColumnType::Long],
            self.name(),
        )
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        let value = cell(record, index)?;
        let state = value
            .to_long()
            .ok()
            .and_then(|position| usize::try_from(position).ok())
            .and_then(|position| self.states.get(position));
        let decoded = match state {
            Some(state) => ZiValue::Text(state.clone()),
            None => unknown(self.on_unknown, &self.column, value, &self.states)?,
        };
        Ok(with_cell(record, index, decoded))
    }
}

/// Free text → categorical state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiStringToCategorical {
    pub column: String,
    pub states: Vec<String>,
    #[serde(default)]
    pub on_unknown: ZiUnknownPolicy,
}

impl ZiStringToCategorical {
    pub fn new<I, S>(column: impl Into<String>, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            states: states.into_iter().map(Into::into).collect(),
            on_unknown: ZiUnknownPolicy::Fail,
        }
    }

    pub fn on_unknown(mut self, policy: ZiUnknownPolicy) -> Self {
        self.on_unknown = policy;
        self
    }
}

impl ZiTransformOp for ZiStringToCategorical {
    type Bound = usize;

    fn name(&self) -> &'static str {
        "string_to_categorical"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        let index = self.bind(input)?;
        splice_columns(
            input,
            index,
            vec![ZiColumn::new(&self.column, decoded_meta(&self.states, self.on_unknown)?)],
        )
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        typed_column(
            input,
            &self.column,
            &[ZiColumnType::String, ZiColumnType::Categorical],
            self.name(),
        )
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        let value = cell(record, index)?;
        let text = value.to_text();
        let mapped = if self.states.contains(&text) {
            ZiValue::Text(text)
        } else {
            unknown(self.on_unknown, &self.column, value, &self.states)?
        };
        Ok(with_cell(record, index, mapped))
    }
}
