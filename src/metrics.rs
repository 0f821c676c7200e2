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

//! # Zivec Metrics Module
//!
//! Counters a transform process collects while it runs. Batch and reader
//! execution tally one outcome per input unit; [`ZiExecutionStats::merge`]
//! folds counters from separate runs together.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Counters collected while a transform process runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiExecutionStats {
    pub input_records: usize,
    pub output_records: usize,
    pub filtered_records: usize,
    /// Records dropped because they failed final-schema validation.
    pub invalid_records: usize,
    /// Records dropped from otherwise kept sequences by output validation.
    #[serde(default)]
    pub invalid_sequence_records: usize,
    /// Filtered counts keyed by `"<step>:<filter name>"`.
    pub filtered_by_step: BTreeMap<String, usize>,
}

impl ZiExecutionStats {
    pub fn record_output(&mut self) {
        self.input_records += 1;
        self.output_records += 1;
    }

    pub fn record_filtered(&mut self, step: usize, filter: &str) {
        self.input_records += 1;
        self.filtered_records += 1;
        *self
            .filtered_by_step
            .entry(format!("{step}:{filter}"))
            .or_insert(0) += 1;
    }

    pub fn record_invalid(&mut self) {
        self.input_records += 1;
        self.invalid_records += 1;
    }

    pub fn record_dropped_from_sequence(&mut self, count: usize) {
        self.invalid_sequence_records += count;
    }

    /// Folds `other` into `self`.
    pub fn merge(&mut self, other: &ZiExecutionStats) {
        self.input_records += other.input_records;
        self.output_records += other.output_records;
        self.filtered_records += other.filtered_records;
        self.invalid_records += other.invalid_records;
        self.invalid_sequence_records += other.invalid_sequence_records;
        for (key, count) in &other.filtered_by_step {
            *self.filtered_by_step.entry(key.clone()).or_insert(0) += count;
        }
    }

    /// Fraction of inputs that reached the output; `1.0` for no input.
    pub fn pass_rate(&self) -> f64 {
        if self.input_records == 0 {
            1.0
        } else {
            self.output_records as f64 / self.input_records as f64
        }
    }

    pub fn as_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
