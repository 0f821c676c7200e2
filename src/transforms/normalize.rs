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
use crate::metadata::ZiColumnMetaData;
use crate::record::{cell, ZiRecord};
use crate::schema::{ZiColumn, ZiSchema};
use crate::transforms::{splice_columns, typed_column, with_cell, ZiTransformOp, NUMERIC};
use crate::value::ZiValue;

/// Shared shape of every normalizer: a numeric column rewritten in place as
/// a Double column bounded by the image of the input bounds under `scale`.
///
/// `scale` must be monotonic; `increasing` gives its direction. A side whose
/// image is not finite is left open.
fn normalized_schema(
    input: &ZiSchema,
    column: &str,
    who: &str,
    increasing: bool,
    scale: impl Fn(f64) -> f64,
) -> Result<ZiSchema> {
    let index = typed_column(input, column, NUMERIC, who)?;
    let (min, max) = numeric_bounds(input.meta(index));
    let image = |bound: Option<f64>| bound.map(&scale).filter(|value| value.is_finite());
    let (min, max) = if increasing {
        (image(min), image(max))
    } else {
        (image(max), image(min))
    };
    splice_columns(input, index, vec![ZiColumn::new(column, ZiColumnMetaData::double(min, max))])
}

fn numeric_bounds(meta: &ZiColumnMetaData) -> (Option<f64>, Option<f64>) {
    match meta {
        ZiColumnMetaData::Integer { min, max } => (min.map(f64::from), max.map(f64::from)),
        ZiColumnMetaData::Long { min, max } => (min.map(|v| v as f64), max.map(|v| v as f64)),
        ZiColumnMetaData::Double { min, max, .. } => (*min, *max),
        _ => (None, None),
    }
}

fn normalize_cell(
    who: &str,
    index: usize,
    record: &ZiRecord,
    scale: impl Fn(f64) -> f64,
) -> Result<ZiRecord> {
    let value = cell(record, index)?.to_double()?;
    let scaled = scale(value);
    if !scaled.is_finite() {
        return Err(ZiError::transform(
            who,
            format!("{value} has no finite normalized value"),
        ));
    }
    Ok(with_cell(record, index, ZiValue::Double(scaled)))
}

fn require_finite(who: &str, name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ZiError::validation(format!("{who}: {name} must be finite, got {value}")))
    }
}

/// Linear rescale of `[min, max]` onto `[new_min, new_max]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiMinMaxNormalizer {
    pub column: String,
    pub min: f64,
    pub max: f64,
    pub new_min: f64,
    pub new_max: f64,
}

impl ZiMinMaxNormalizer {
    /// Rescales onto `[0, 1]`.
    pub fn min_max(column: impl Into<String>, min: f64, max: f64) -> Self {
        Self::new(column, min, max, 0.0, 1.0)
    }

    pub fn new(column: impl Into<String>, min: f64, max: f64, new_min: f64, new_max: f64) -> Self {
        Self {
            column: column.into(),
            min,
            max,
            new_min,
            new_max,
        }
    }

    fn scale(&self, x: f64) -> f64 {
        (x - self.min) * (self.new_max - self.new_min) / (self.max - self.min) + self.new_min
    }

    fn check(&self) -> Result<()> {
        for (name, value) in [
            ("min", self.min),
            ("max", self.max),
            ("new_min", self.new_min),
            ("new_max", self.new_max),
        ] {
            require_finite(self.name(), name, value)?;
        }
        if self.min >= self.max || self.new_min > self.new_max {
            return Err(ZiError::validation(format!(
                "{}: ranges [{}, {}] -> [{}, {}] are not increasing",
                self.name(),
                self.min,
                self.max,
                self.new_min,
                self.new_max
            )));
        }
        Ok(())
    }
}

impl ZiTransformOp for ZiMinMaxNormalizer {
    type Bound = usize;

    fn name(&self) -> &'static str {
        "min_max_normalizer"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        self.check()?;
        normalized_schema(input, &self.column, self.name(), true, |x| self.scale(x))
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        typed_column(input, &self.column, NUMERIC, self.name())
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        normalize_cell(self.name(), index, record, |x| self.scale(x))
    }
}

/// `(x - mean) / stdev`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiStandardizeNormalizer {
    pub column: String,
    pub mean: f64,
    pub stdev: f64,
}

impl ZiStandardizeNormalizer {
    pub fn new(column: impl Into<String>, mean: f64, stdev: f64) -> Self {
        Self {
            column: column.into(),
            mean,
            stdev,
        }
    }
}

impl ZiTransformOp for ZiStandardizeNormalizer {
    type Bound = usize;

    fn name(&self) -> &'static str {
        "standardize_normalizer"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        require_finite(self.name(), "mean", self.mean)?;
        require_finite(self.name(), "stdev", self.stdev)?;
        if self.stdev <= 0.0 {
            return Err(ZiError::validation(format!(
                "{}: stdev must be positive, got {}",
                self.name(),
                self.stdev
            )));
        }
        normalized_schema(input, &self.column, self.name(), true, |x| (x - self.mean) / self.stdev)
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        typed_column(input, &self.column, NUMERIC, self.name())
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        normalize_cell(self.name(), index, record, |x| (x - self.mean) / self.stdev)
    }
}

/// `x - mean`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiSubtractMeanNormalizer {
    pub column: String,
    pub mean: f64,
}

impl ZiSubtractMeanNormalizer {
    pub fn new(column: impl Into<String>, mean: f64) -> Self {
        Self {
            column: column.into(),
            mean,
        }
    }
}

impl ZiTransformOp for ZiSubtractMeanNormalizer {
    type Bound = usize;

    fn name(&self) -> &'static str {
        "subtract_mean_normalizer"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        require_finite(self.name(), "mean", self.mean)?;
        normalized_schema(input, &self.column, self.name(), true, |x| x - self.mean)
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        typed_column(input, &self.column, NUMERIC, self.name())
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        normalize_cell(self.name(), index, record, |x| x - self.mean)
    }
}

/// `scaling_factor * log2((x - min) / (mean - min) + 1)`, which is `0` at
/// `min`. Values at or below `min - (mean - min)` have no logarithm and fail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiLog2Normalizer {
    pub column: String,
    pub mean: f64,
    pub min: f64,
    pub scaling_factor: f64,
}

impl ZiLog2Normalizer {
    pub fn new(column: impl Into<String>, mean: f64, min: f64, scaling_factor: f64) -> Self {
        Self {
            column: column.into(),
            mean,
            min,
            scaling_factor,
        }
    }

    fn scale(&self, x: f64) -> f64 {
        self.scaling_factor * ((x - self.min) / (self.mean - self.min) + 1.0).log2()
    }
}

impl ZiTransformOp for ZiLog2Normalizer {
    type Bound = usize;

    fn name(&self) -> &'static str {
        "log2_normalizer"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        require_finite(self.name(), "mean", self.mean)?;
        require_finite(self.name(), "min", self.min)?;
        require_finite(self.name(), "scaling_factor", self.scaling_factor)?;
        if self.mean <= self.min {
            return Err(ZiError::validation(format!(
                "{}: mean {} must exceed min {}",
                self.name(),
                self.mean,
                self.min
            )));
        }
        let increasing = self.scaling_factor >= 0.0;
        normalized_schema(input, &self.column, self.name(), increasing, |x| self.scale(x))
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        typed_column(input, &self.column, NUMERIC, self.name())
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        normalize_cell(self.name(), index, record, |x| self.scale(x))
    }
}
