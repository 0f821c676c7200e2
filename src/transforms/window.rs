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

//! Sequence reduction over tumbling windows.
//!
//! A window groups consecutive records of a sequence; every non-empty window
//! collapses into a single output record. Columns are reduced independently
//! with the reducer's per-column operation, falling back to its default.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::condition::canonical;
use crate::errors::{Result, ZiError};
use crate::metadata::{ZiColumnMetaData, ZiColumnType};
use crate::record::{cell, ZiRecord, ZiSequence};
use crate::schema::{ZiColumn, ZiSchema};
use crate::transforms::time::ZiTimeUnit;
use crate::transforms::{typed_column, ZiTransformOp};
use crate::value::ZiValue;

/// Per-column reduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiReduceOp {
    TakeFirst,
    TakeLast,
    Min,
    Max,
    Sum,
    Mean,
    /// Number of records in the window, nulls included.
    Count,
    /// Number of distinct values in the window.
    CountUnique,
}

impl ZiReduceOp {
    /// Prefix of the output column name; `None` keeps the input name.
    fn label(self) -> Option<&'static str> {
        match self {
            ZiReduceOp::TakeFirst | ZiReduceOp::TakeLast => None,
            ZiReduceOp::Min => Some("min"),
            ZiReduceOp::Max => Some("max"),
            ZiReduceOp::Sum => Some("sum"),
            ZiReduceOp::Mean => Some("mean"),
            ZiReduceOp::Count => Some("count"),
            ZiReduceOp::CountUnique => Some("count_unique"),
        }
    }

    fn reduced_column(self, column: &ZiColumn) -> Result<ZiColumn> {
        let kind = column.meta.column_type();
        let meta = match self {
            ZiReduceOp::TakeFirst | ZiReduceOp::TakeLast => return Ok(column.clone()),
            ZiReduceOp::Min | ZiReduceOp::Max => {
                if !kind.is_numeric() && kind != ZiColumnType::Time {
                    return Err(self.unsupported(column));
                }
                column.meta.clone()
            }
            ZiReduceOp::Sum => match kind {
                ZiColumnType::Double => ZiColumnMetaData::double(None, None),
                ZiColumnType::Integer | ZiColumnType::Long => ZiColumnMetaData::long(None, None),
                _ => return Err(self.unsupported(column)),
            },
            ZiReduceOp::Mean => {
                if !kind.is_numeric() {
                    return Err(self.unsupported(column));
                }
                ZiColumnMetaData::double(None, None)
            }
            ZiReduceOp::Count | ZiReduceOp::CountUnique => ZiColumnMetaData::long(Some(0), None),
        };
        let name = match self.label() {
            Some(label) => format!("{label}({})", column.name),
            None => column.name.clone(),
        };
        Ok(ZiColumn::new(name, meta))
    }

    fn unsupported(self, column: &ZiColumn) -> ZiError {
        ZiError::schema(format!(
            "reduce_sequence_by_window: {self:?} cannot reduce {} column '{}'",
            column.meta.column_type(),
            column.name
        ))
    }

    fn reduce(self, kind: ZiColumnType, values: &[&ZiValue]) -> Result<ZiValue> {
        let present = || values.iter().copied().filter(|value| !value.is_null());
        Ok(match self {
            ZiReduceOp::TakeFirst => values.first().map_or(ZiValue::Null, |v| (*v).clone()),
            ZiReduceOp::TakeLast => values.last().map_or(ZiValue::Null, |v| (*v).clone()),
            ZiReduceOp::Min | ZiReduceOp::Max => {
                let wanted = if self == ZiReduceOp::Min {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
                let mut best: Option<(&ZiValue, ZiValue)> = None;
                for value in present() {
                    let key = canonical(kind, value)?;
                    let replace = match &best {
                        None => true,
                        Some((_, current)) => key.partial_cmp(current) == Some(wanted),
                    };
                    if replace {
                        best = Some((value, key));
                    }
                }
                best.map_or(ZiValue::Null, |(value, _)| value.clone())
            }
            ZiReduceOp::Sum if kind == ZiColumnType::Double => {
                let mut total = 0.0;
                for value in present() {
                    total += value.to_double()?;
                }
                ZiValue::Double(finite(self, total)?)
            }
            ZiReduceOp::Sum => {
                let mut total: i64 = 0;
                for value in present() {
                    total = total.checked_add(value.to_long()?).ok_or_else(|| {
                        ZiError::transform("reduce_sequence_by_window", "sum overflows a long")
                    })?;
                }
                ZiValue::Long(total)
            }
            ZiReduceOp::Mean => {
                // Running mean; a plain sum can overflow where the mean does not.
                let mut mean = 0.0;
                let mut count = 0usize;
                for value in present() {
                    count += 1;
                    mean += (value.to_double()? - mean) / count as f64;
                }
                if count == 0 {
                    ZiValue::Null
                } else {
                    ZiValue::Double(finite(self, mean)?)
                }
            }
            ZiReduceOp::Count => ZiValue::Long(values.len() as i64),
            ZiReduceOp::CountUnique => {
                let distinct: HashSet<(&'static str, String)> = values
                    .iter()
                    .map(|value| (value.type_name(), value.to_text()))
                    .collect();
                ZiValue::Long(distinct.len() as i64)
            }
        })
    }
}

fn finite(op: ZiReduceOp, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ZiError::transform(
            "reduce_sequence_by_window",
            format!("{op:?} has no finite result"),
        ))
    }
}

/// Column reductions with a fallback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiReducer {
    pub default_op: ZiReduceOp,
    #[serde(default)]
    pub column_ops: BTreeMap<String, ZiReduceOp>,
}

impl ZiReducer {
    pub fn new(default_op: ZiReduceOp) -> Self {
        Self {
            default_op,
            column_ops: BTreeMap::new(),
        }
    }

    pub fn with_op(mut self, column: impl Into<String>, op: ZiReduceOp) -> Self {
        self.column_ops.insert(column.into(), op);
        self
    }

    pub fn op_for(&self, column: &str) -> ZiReduceOp {
        self.column_ops
            .get(column)
            .copied()
            .unwrap_or(self.default_op)
    }
}

/// Tumbling window shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ZiWindow {
    /// Windows aligned to multiples of `size` since the epoch, keyed on a
    /// Time column.
    Time {
        column: String,
        size: i64,
        unit: ZiTimeUnit,
    },
    /// Every `size` consecutive records; the last window may be short.
    Count { size: usize },
}

impl ZiWindow {
    pub fn time(column: impl Into<String>, size: i64, unit: ZiTimeUnit) -> Self {
        ZiWindow::Time {
            column: column.into(),
            size,
            unit,
        }
    }

    pub fn count(size: usize) -> Self {
        ZiWindow::Count { size }
    }

    fn resolve(&self, input: &ZiSchema) -> Result<ZiBoundWindowShape> {
        match self {
            ZiWindow::Time { column, size, unit } => {
                let index =
                    typed_column(input, column, &[ZiColumnType::Time], "reduce_sequence_by_window")?;
                if *size <= 0 {
                    return Err(ZiError::validation(format!(
                        "time window size must be positive, got {size}"
                    )));
                }
                Ok(ZiBoundWindowShape::Time {
                    index,
                    width: unit.to_millis(*size)?,
                })
            }
            ZiWindow::Count { size } => {
                if *size == 0 {
                    return Err(ZiError::validation("count window size must be positive"));
                }
                Ok(ZiBoundWindowShape::Count { size: *size })
            }
        }
    }
}

/// A window with its key column and width resolved.
#[derive(Clone, Copy, Debug)]
pub enum ZiBoundWindowShape {
    Time { index: usize, width: i64 },
    Count { size: usize },
}

impl ZiBoundWindowShape {
    fn split<'a>(self, sequence: &'a [ZiRecord]) -> Result<Vec<Vec<&'a ZiRecord>>> {
        match self {
            ZiBoundWindowShape::Count { size } => Ok(sequence
                .chunks(size)
                .map(|chunk| chunk.iter().collect())
                .collect()),
            ZiBoundWindowShape::Time { index, width } => {
                let mut grouped: BTreeMap<i64, Vec<&ZiRecord>> = BTreeMap::new();
                for record in sequence {
                    let at = cell(record, index)?.to_time()?;
                    grouped.entry(at.div_euclid(width)).or_default().push(record);
                }
                Ok(grouped.into_values().collect())
            }
        }
    }
}

/// Window shape plus the operation and input type of every column.
#[derive(Clone, Debug)]
pub struct ZiBoundWindow {
    pub shape: ZiBoundWindowShape,
    pub columns: Vec<(ZiReduceOp, ZiColumnType)>,
}

/// Collapses each window of a sequence into one record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiReduceSequenceByWindow {
    pub window: ZiWindow,
    pub reducer: ZiReducer,
}

impl ZiReduceSequenceByWindow {
    pub fn new(window: ZiWindow, reducer: ZiReducer) -> Self {
        Self { window, reducer }
    }

}

impl ZiTransformOp for ZiReduceSequenceByWindow {
    type Bound = ZiBoundWindow;

    fn name(&self) -> &'static str {
        "reduce_sequence_by_window"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        self.bind(input)?;
        let columns = input
            .columns()
            .iter()
            .map(|column| self.reducer.op_for(&column.name).reduced_column(column))
            .collect::<Result<Vec<_>>>()?;
        ZiSchema::new(columns)
    }

    fn bind(&self, input: &ZiSchema) -> Result<ZiBoundWindow> {
        let shape = self.window.resolve(input)?;
        for column in self.reducer.column_ops.keys() {
            input.index_of(column)?;
        }
        let columns = input
            .columns()
            .iter()
            .map(|column| (self.reducer.op_for(&column.name), column.meta.column_type()))
            .collect();
        Ok(ZiBoundWindow { shape, columns })
    }

    fn map(&self, _bound: &ZiBoundWindow, _record: &ZiRecord) -> Result<ZiRecord> {
        Err(ZiError::transform(
            self.name(),
            "operates on sequences only; use map_sequence",
        ))
    }

    fn map_sequence(&self, bound: &ZiBoundWindow, sequence: &[ZiRecord]) -> Result<ZiSequence> {
        let windows = bound.shape.split(sequence)?;
        log::trace!(
            "{}: {} records in {} windows",
            self.name(),
            sequence.len(),
            windows.len()
        );

        windows
            .iter()
            .map(|window| {
                bound
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(index, (op, kind))| {
                        let values = window
                            .iter()
                            .map(|record| cell(record, index))
                            .collect::<Result<Vec<_>>>()?;
                        op.reduce(*kind, &values)
                    })
                    .collect::<Result<ZiRecord>>()
            })
            .collect()
    }
}
