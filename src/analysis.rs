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

//! # Zivec Analysis Module
//!
//! Per-column summaries of a record set, typed by the schema. Numeric and
//! Time columns get moments and extremes; Categorical and Boolean columns get
//! state counts; String and Bytes columns get length statistics.
//!
//! Values that fail their column metadata (including nulls) are counted as
//! invalid and left out of every other statistic. The summaries feed the
//! normalizer helpers, which turn a column's statistics into ready-to-use
//! transform parameters.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::metadata::ZiColumnType;
use crate::record::{check_width, ZiRecord};
use crate::schema::ZiSchema;
use crate::transforms::{ZiMinMaxNormalizer, ZiStandardizeNormalizer, ZiSubtractMeanNormalizer};
use crate::value::ZiValue;

/// Population statistics of the valid cells of a numeric or time column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiNumericAnalysis {
    pub count: usize,
    pub invalid: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiTextAnalysis {
    pub count: usize,
    pub invalid: usize,
    pub empty: usize,
    pub min_length: usize,
    pub max_length: usize,
    pub avg_length: f64,
    pub unique: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ZiColumnAnalysis {
    Numeric(ZiNumericAnalysis),
    Categorical {
        invalid: usize,
        counts: BTreeMap<String, usize>,
    },
    Text(ZiTextAnalysis),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiColumnSummary {
    pub name: String,
    pub analysis: ZiColumnAnalysis,
}

/// Column summaries in schema order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiDataAnalysis {
    pub records: usize,
    pub columns: Vec<ZiColumnSummary>,
}

impl ZiDataAnalysis {
    pub fn analyze(schema: &ZiSchema, records: &[ZiRecord]) -> Result<Self> {
        for record in records {
            check_width(record, schema.num_columns(), "analysis")?;
        }

        let columns = schema
            .columns()
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let (valid, invalid): (Vec<&ZiValue>, Vec<&ZiValue>) = records
                    .iter()
                    .map(|record| &record[index])
                    .partition(|value| column.meta.is_valid(value));
                let analysis = match column.meta.column_type() {
                    ZiColumnType::Integer
                    | ZiColumnType::Long
                    | ZiColumnType::Double
                    | ZiColumnType::Time => numeric(column.meta.column_type(), &valid, invalid.len())?,
                    ZiColumnType::Categorical | ZiColumnType::Boolean => {
                        let mut counts = BTreeMap::new();
                        if let Some(states) = column.meta.states() {
                            for state in states {
                                counts.insert(state.clone(), 0);
                            }
                        }
                        for value in &valid {
                            let key = match column.meta.column_type() {
                                ZiColumnType::Boolean => value.to_bool()?.to_string(),
                                _ => value.to_text(),
                            };
                            *counts.entry(key).or_insert(0) += 1;
                        }
                        ZiColumnAnalysis::Categorical {
                            invalid: invalid.len(),
                            counts,
                        }
                    }
                    ZiColumnType::String | ZiColumnType::Bytes => text(&valid, invalid.len()),
                };
                Ok(ZiColumnSummary {
                    name: column.name.clone(),
                    analysis,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "analyzed {} records over {} columns",
            records.len(),
            schema.num_columns()
        );
        Ok(Self {
            records: records.len(),
            columns,
        })
    }

    pub fn column(&self, name: &str) -> Result<&ZiColumnAnalysis> {
        self.columns
            .iter()
            .find(|summary| summary.name == name)
            .map(|summary| &summary.analysis)
            .ok_or_else(|| ZiError::column_not_found(name))
    }

    pub fn numeric(&self, name: &str) -> Result<&ZiNumericAnalysis> {
        match self.column(name)? {
            ZiColumnAnalysis::Numeric(stats) if stats.count > 0 => Ok(stats),
            ZiColumnAnalysis::Numeric(_) => Err(ZiError::validation(format!(
                "column '{name}' has no valid values"
            ))),
            _ => Err(ZiError::schema(format!("column '{name}' is not numeric"))),
        }
    }

    /// Rescales the observed range of `column` onto `[0, 1]`.
    pub fn min_max_normalizer(&self, column: &str) -> Result<ZiMinMaxNormalizer> {
        let stats = self.numeric(column)?;
        if stats.min >= stats.max {
            return Err(ZiError::validation(format!(
                "column '{column}' is constant; cannot min-max normalize"
            )));
        }
        Ok(ZiMinMaxNormalizer::min_max(column, stats.min, stats.max))
    }

    pub fn standardize_normalizer(&self, column: &str) -> Result<ZiStandardizeNormalizer> {
        let stats = self.numeric(column)?;
        if stats.std_dev <= 0.0 {
            return Err(ZiError::validation(format!(
                "column '{column}' has zero deviation; cannot standardize"
            )));
        }
        Ok(ZiStandardizeNormalizer::new(column, stats.mean, stats.std_dev))
    }

    pub fn subtract_mean_normalizer(&self, column: &str) -> Result<ZiSubtractMeanNormalizer> {
        let stats = self.numeric(column)?;
        Ok(ZiSubtractMeanNormalizer::new(column, stats.mean))
    }
}

/// Time cells are read as epoch milliseconds.
fn numeric(kind: ZiColumnType, values: &[&ZiValue], invalid: usize) -> Result<ZiColumnAnalysis> {
    let mut sorted = values
        .iter()
        .map(|value| match kind {
            ZiColumnType::Time => value.to_time().map(|millis| millis as f64),
            _ => value.to_double(),
        })
        .collect::<Result<Vec<f64>>>()?;
    if sorted.is_empty() {
        return Ok(ZiColumnAnalysis::Numeric(ZiNumericAnalysis {
            invalid,
            ..ZiNumericAnalysis::default()
        }));
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;

    Ok(ZiColumnAnalysis::Numeric(ZiNumericAnalysis {
        count,
        invalid,
        min: sorted[0],
        max: sorted[count - 1],
        mean,
        std_dev: variance.sqrt(),
        median: sorted[count / 2],
    }))
}

fn text(values: &[&ZiValue], invalid: usize) -> ZiColumnAnalysis {
    let texts: Vec<String> = values.iter().map(|value| value.to_text()).collect();
    let lengths: Vec<usize> = texts.iter().map(|text| text.chars().count()).collect();
    let count = texts.len();

    ZiColumnAnalysis::Text(ZiTextAnalysis {
        count,
        invalid,
        empty: texts.iter().filter(|text| text.is_empty()).count(),
        min_length: lengths.iter().copied().min().unwrap_or(0),
        max_length: lengths.iter().copied().max().unwrap_or(0),
        avg_length: if count == 0 {
            0.0
        } else {
            lengths.iter().sum::<usize>() as f64 / count as f64
        },
        unique: texts.iter().collect::<HashSet<_>>().len(),
    })
}
