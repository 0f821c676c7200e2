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

//! # Zivec Filter Module
//!
//! Filters decide whether a record or a sequence is removed from the stream.
//! A filter answers "remove?", so a condition-backed filter drops exactly the
//! records its condition holds for.
//!
//! A sequence is removed when any of its records would be removed, except for
//! [`ZiFilterSpec::SequenceLength`], which judges the sequence as a whole and
//! never removes individual records.

use serde::{Deserialize, Serialize};

use crate::binding::{ZiBindState, ZiBindable};
use crate::condition::{ZiCompiledCondition, ZiConditionSpec};
use crate::errors::{Result, ZiError};
use crate::metadata::ZiColumnMetaData;
use crate::record::{cell, check_width, ZiRecord};
use crate::schema::ZiSchema;

/// Serializable filter parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ZiFilterSpec {
    /// Removes records for which the condition holds.
    Condition { condition: ZiConditionSpec },
    /// Removes records with an invalid value in any listed column. An empty
    /// list checks every column.
    InvalidValues {
        #[serde(default)]
        columns: Vec<String>,
    },
    /// Removes sequences whose length falls outside the inclusive bounds.
    SequenceLength {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },
}

impl ZiFilterSpec {
    pub fn condition(condition: ZiConditionSpec) -> Self {
        ZiFilterSpec::Condition { condition }
    }

    pub fn invalid_values<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ZiFilterSpec::InvalidValues {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn sequence_length(min: Option<usize>, max: Option<usize>) -> Self {
        ZiFilterSpec::SequenceLength { min, max }
    }
}

impl ZiBindable for ZiFilterSpec {
    type Resolved = ZiCompiledFilter;

    fn name(&self) -> &'static str {
        match self {
            ZiFilterSpec::Condition { .. } => "filter.condition",
            ZiFilterSpec::InvalidValues { .. } => "filter.invalid_values",
            ZiFilterSpec::SequenceLength { .. } => "filter.sequence_length",
        }
    }

    fn bind(&self, schema: &ZiSchema) -> Result<ZiCompiledFilter> {
        let rule = match self {
            ZiFilterSpec::Condition { condition } => {
                ZiFilterRule::Condition(condition.compile(schema)?)
            }
            ZiFilterSpec::InvalidValues { columns } => {
                let checks = if columns.is_empty() {
                    schema
                        .columns()
                        .iter()
                        .enumerate()
                        .map(|(index, column)| (index, column.meta.clone()))
                        .collect()
                } else {
                    columns
                        .iter()
                        .map(|name| {
                            let index = schema.index_of(name)?;
                            Ok((index, schema.meta(index).clone()))
                        })
                        .collect::<Result<Vec<_>>>()?
                };
                ZiFilterRule::InvalidValues(checks)
            }
            ZiFilterSpec::SequenceLength { min, max } => {
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(ZiError::validation(format!(
                            "sequence length filter has min {lo} greater than max {hi}"
                        )));
                    }
                }
                ZiFilterRule::SequenceLength {
                    min: *min,
                    max: *max,
                }
            }
        };
        Ok(ZiCompiledFilter {
            width: schema.num_columns(),
            rule,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
enum ZiFilterRule {
    Condition(ZiCompiledCondition),
    InvalidValues(Vec<(usize, ZiColumnMetaData)>),
    SequenceLength {
        min: Option<usize>,
        max: Option<usize>,
    },
}

/// Filter resolved against a schema.
#[derive(Clone, Debug, PartialEq)]
pub struct ZiCompiledFilter {
    width: usize,
    rule: ZiFilterRule,
}

impl ZiCompiledFilter {
    pub fn remove_example(&self, record: &ZiRecord) -> Result<bool> {
        check_width(record, self.width, "filter")?;
        match &self.rule {
            ZiFilterRule::Condition(condition) => condition.test(record),
            ZiFilterRule::InvalidValues(checks) => {
                for (index, meta) in checks {
                    if !meta.is_valid(cell(record, *index)?) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ZiFilterRule::SequenceLength { .. } => Ok(false),
        }
    }

    pub fn remove_sequence(&self, sequence: &[ZiRecord]) -> Result<bool> {
        if let ZiFilterRule::SequenceLength { min, max } = &self.rule {
            let length = sequence.len();
            return Ok(min.map_or(false, |lo| length < lo) || max.map_or(false, |hi| length > hi));
        }
        for record in sequence {
            if self.remove_example(record)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// A filter in its Unbound/Bound lifecycle.
pub type ZiFilter = ZiBindState<ZiFilterSpec>;

impl ZiBindState<ZiFilterSpec> {
    /// True when the record should be dropped.
    pub fn remove_example(&self, record: &ZiRecord) -> Result<bool> {
        self.resolved()?.remove_example(record)
    }

    /// True when the sequence should be dropped.
    pub fn remove_sequence(&self, sequence: &[ZiRecord]) -> Result<bool> {
        self.resolved()?.remove_sequence(sequence)
    }
}
