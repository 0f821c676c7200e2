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

//! # Zivec Process Module
//!
//! A [`ZiTransformProcess`] is an ordered list of transforms and filters bound
//! once, at build time, against the schema each step actually receives. After
//! building, every step is bound and the schema after each step is known, so
//! execution only moves records.
//!
//! ```text
//! initial schema -> step 0 -> schema 0 -> step 1 -> schema 1 -> ... -> final schema
//! ```
//!
//! Processes serialize to JSON or YAML as their initial schema, step specs and
//! execution config. Loading rebinds every step.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::filter::{ZiFilter, ZiFilterSpec};
use crate::metrics::ZiExecutionStats;
use crate::reader::{ZiRecordReader, ZiSequenceReader};
use crate::record::{check_width, ZiRecord, ZiRecordBatch, ZiSequence};
use crate::schema::ZiSchema;
use crate::transforms::{ZiTransform, ZiTransformSpec};

/// One stage of a process.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ZiProcessStep {
    Transform(ZiTransform),
    Filter(ZiFilter),
}

impl ZiProcessStep {
    pub fn name(&self) -> &'static str {
        match self {
            ZiProcessStep::Transform(transform) => transform.name(),
            ZiProcessStep::Filter(filter) => filter.name(),
        }
    }

    /// Binds the step and returns the schema it hands to the next one.
    fn bind(&mut self, schema: &ZiSchema) -> Result<ZiSchema> {
        match self {
            ZiProcessStep::Transform(transform) => {
                transform.set_input_schema(schema)?;
                Ok(transform.output_schema()?.clone())
            }
            ZiProcessStep::Filter(filter) => {
                filter.set_input_schema(schema)?;
                Ok(schema.clone())
            }
        }
    }
}

/// Execution switches carried inside a serialized process.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiExecutionConfig {
    /// Map batch records on the rayon pool. Needs the `parallel` feature;
    /// ignored otherwise.
    pub parallel: bool,
    /// Check every output record against the final schema.
    pub validate_output: bool,
    /// With `validate_output`, drop failing records instead of erroring.
    pub skip_invalid_records: bool,
}

impl ZiExecutionConfig {
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_validate_output(mut self, validate_output: bool) -> Self {
        self.validate_output = validate_output;
        self
    }

    pub fn with_skip_invalid_records(mut self, skip_invalid_records: bool) -> Self {
        self.skip_invalid_records = skip_invalid_records;
        self
    }
}

enum ZiOutcome<T> {
    Kept(T),
    Filtered { step: usize, filter: &'static str },
    Invalid,
}

impl<T> ZiOutcome<T> {
    fn tally(self, stats: &mut ZiExecutionStats, out: &mut Vec<T>) {
        match self {
            ZiOutcome::Kept(item) => {
                stats.record_output();
                out.push(item);
            }
            ZiOutcome::Filtered { step, filter } => stats.record_filtered(step, filter),
            ZiOutcome::Invalid => stats.record_invalid(),
        }
    }
}

/// Accumulates steps before binding them.
#[derive(Clone, Debug)]
pub struct ZiTransformProcessBuilder {
    initial_schema: ZiSchema,
    steps: Vec<ZiProcessStep>,
    config: ZiExecutionConfig,
}

impl ZiTransformProcessBuilder {
    pub fn transform(mut self, spec: impl Into<ZiTransformSpec>) -> Self {
        self.steps
            .push(ZiProcessStep::Transform(ZiTransform::new(spec.into())));
        self
    }

    pub fn filter(mut self, spec: ZiFilterSpec) -> Self {
        self.steps.push(ZiProcessStep::Filter(ZiFilter::new(spec)));
        self
    }

    pub fn config(mut self, config: ZiExecutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ZiTransformProcess> {
        ZiTransformProcess::bind(self.initial_schema, self.steps, self.config)
    }
}

/// A bound, ordered list of transforms and filters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "ZiProcessDocument", into = "ZiProcessDocument")]
pub struct ZiTransformProcess {
    initial_schema: ZiSchema,
    steps: Vec<ZiProcessStep>,
    /// `schemas[i]` is the schema after step `i`.
    schemas: Vec<ZiSchema>,
    config: ZiExecutionConfig,
}

impl ZiTransformProcess {
    pub fn builder(initial_schema: ZiSchema) -> ZiTransformProcessBuilder {
        ZiTransformProcessBuilder {
            initial_schema,
            steps: Vec::new(),
            config: ZiExecutionConfig::default(),
        }
    }

    fn bind(
        initial_schema: ZiSchema,
        mut steps: Vec<ZiProcessStep>,
        config: ZiExecutionConfig,
    ) -> Result<Self> {
        if steps.is_empty() {
            return Err(ZiError::pipeline("process", "no steps configured"));
        }

        let mut schemas = Vec::with_capacity(steps.len());
        let mut current = initial_schema.clone();
        for (position, step) in steps.iter_mut().enumerate() {
            current = step.bind(&current).map_err(|err| {
                log::warn!("step {position} ('{}') failed to bind: {err}", step.name());
                err
            })?;
            schemas.push(current.clone());
        }

        log::info!(
            "built transform process with {} steps: {} -> {} columns",
            steps.len(),
            initial_schema.num_columns(),
            current.num_columns()
        );
        Ok(Self {
            initial_schema,
            steps,
            schemas,
            config,
        })
    }

    pub fn initial_schema(&self) -> &ZiSchema {
        &self.initial_schema
    }

    pub fn final_schema(&self) -> &ZiSchema {
        self.schemas.last().unwrap_or(&self.initial_schema)
    }

    /// Schema produced by step `step` (zero-based).
    pub fn schema_after(&self, step: usize) -> Result<&ZiSchema> {
        self.schemas.get(step).ok_or_else(|| {
            ZiError::pipeline(
                "process",
                format!("no step {step}; process has {} steps", self.steps.len()),
            )
        })
    }

    pub fn steps(&self) -> &[ZiProcessStep] {
        &self.steps
    }

    pub fn config(&self) -> &ZiExecutionConfig {
        &self.config
    }

    /// Runs one record through every step. `None` when a filter removed it or,
    /// with `skip_invalid_records`, when it failed output validation.
    pub fn execute(&self, record: &ZiRecord) -> Result<Option<ZiRecord>> {
        Ok(match self.run_record(record)? {
            ZiOutcome::Kept(record) => Some(record),
            _ => None,
        })
    }

    /// Runs a whole sequence. Sequence filters judge the sequence at their
    /// position; invalid output records are dropped individually.
    pub fn execute_sequence(&self, sequence: &[ZiRecord]) -> Result<Option<ZiSequence>> {
        Ok(match self.run_sequence(sequence)?.0 {
            ZiOutcome::Kept(sequence) => Some(sequence),
            _ => None,
        })
    }

    /// Runs independent records; output keeps input order.
    pub fn execute_batch(&self, batch: &[ZiRecord]) -> Result<ZiRecordBatch> {
        Ok(self.execute_batch_with_stats(batch)?.0)
    }

    pub fn execute_batch_with_stats(
        &self,
        batch: &[ZiRecord],
    ) -> Result<(ZiRecordBatch, ZiExecutionStats)> {
        let mut stats = ZiExecutionStats::default();
        let mut out = Vec::with_capacity(batch.len());
        for outcome in self.run_all(batch)? {
            outcome.tally(&mut stats, &mut out);
        }
        self.log_summary("records", &stats);
        Ok((out, stats))
    }

    /// Drains `reader` through the process.
    pub fn execute_reader<R>(&self, reader: &mut R) -> Result<(ZiRecordBatch, ZiExecutionStats)>
    where
        R: ZiRecordReader + ?Sized,
    {
        let mut stats = ZiExecutionStats::default();
        let mut out = Vec::new();
        while let Some(record) = reader.next_record()? {
            self.run_record(&record)?.tally(&mut stats, &mut out);
        }
        self.log_summary("records", &stats);
        Ok((out, stats))
    }

    /// Drains a sequence reader. Stats count whole sequences, plus the
    /// records dropped from kept sequences by output validation.
    pub fn execute_sequence_reader<R>(
        &self,
        reader: &mut R,
    ) -> Result<(Vec<ZiSequence>, ZiExecutionStats)>
    where
        R: ZiSequenceReader + ?Sized,
    {
        let mut stats = ZiExecutionStats::default();
        let mut out = Vec::new();
        while let Some(sequence) = reader.next_sequence()? {
            let (outcome, dropped) = self.run_sequence(&sequence)?;
            stats.record_dropped_from_sequence(dropped);
            outcome.tally(&mut stats, &mut out);
        }
        self.log_summary("sequences", &stats);
        Ok((out, stats))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Written from the JSON tree, so enum cells are plain maps, not YAML tags.
    pub fn to_yaml(&self) -> Result<String> {
        let tree = serde_json::to_value(self)?;
        Ok(serde_yaml::to_string(&tree)?)
    }

    /// Loads and rebinds a process. Binding failures keep their error kind.
    pub fn from_json(text: &str) -> Result<Self> {
        let document: ZiProcessDocument = serde_json::from_str(text)?;
        Self::try_from(document)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let tree: serde_json::Value = serde_yaml::from_str(text)?;
        let document: ZiProcessDocument = serde_json::from_value(tree)?;
        Self::try_from(document)
    }

    fn run_all(&self, batch: &[ZiRecord]) -> Result<Vec<ZiOutcome<ZiRecord>>> {
        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                use rayon::prelude::*;
                return batch
                    .par_iter()
                    .map(|record| self.run_record(record))
                    .collect();
            }
        }
        batch.iter().map(|record| self.run_record(record)).collect()
    }

    fn run_record(&self, record: &ZiRecord) -> Result<ZiOutcome<ZiRecord>> {
        check_width(record, self.initial_schema.num_columns(), "process")?;
        let mut current = record.clone();
        for (position, step) in self.steps.iter().enumerate() {
            match step {
                ZiProcessStep::Transform(transform) => {
                    if transform.spec().is_sequence_only() {
                        return Err(ZiError::pipeline(
                            transform.name(),
                            "sequence-only transform cannot run on single records",
                        ));
                    }
                    current = transform.map(&current)?;
                }
                ZiProcessStep::Filter(filter) => {
                    if filter.remove_example(&current)? {
                        log::trace!("step {position} ('{}') removed a record", filter.name());
                        return Ok(ZiOutcome::Filtered {
                            step: position,
                            filter: filter.name(),
                        });
                    }
                }
            }
        }
        self.check_output(current)
    }

    /// Also returns how many records output validation dropped.
    fn run_sequence(&self, sequence: &[ZiRecord]) -> Result<(ZiOutcome<ZiSequence>, usize)> {
        for record in sequence {
            check_width(record, self.initial_schema.num_columns(), "process")?;
        }
        let mut current = sequence.to_vec();
        for (position, step) in self.steps.iter().enumerate() {
            match step {
                ZiProcessStep::Transform(transform) => current = transform.map_sequence(&current)?,
                ZiProcessStep::Filter(filter) => {
                    if filter.remove_sequence(&current)? {
                        log::trace!("step {position} ('{}') removed a sequence", filter.name());
                        let outcome = ZiOutcome::Filtered {
                            step: position,
                            filter: filter.name(),
                        };
                        return Ok((outcome, 0));
                    }
                }
            }
        }
        if !self.config.validate_output {
            return Ok((ZiOutcome::Kept(current), 0));
        }
        let mut kept = Vec::with_capacity(current.len());
        let mut dropped = 0;
        for record in current {
            match self.check_output(record)? {
                ZiOutcome::Kept(record) => kept.push(record),
                _ => dropped += 1,
            }
        }
        Ok((ZiOutcome::Kept(kept), dropped))
    }

    fn check_output(&self, record: ZiRecord) -> Result<ZiOutcome<ZiRecord>> {
        if !self.config.validate_output {
            return Ok(ZiOutcome::Kept(record));
        }
        match self.final_schema().validate_record(&record) {
            Ok(()) => Ok(ZiOutcome::Kept(record)),
            Err(err) => {
                log::warn!("output record failed validation: {err}");
                if self.config.skip_invalid_records {
                    Ok(ZiOutcome::Invalid)
                } else {
                    Err(err)
                }
            }
        }
    }

    fn log_summary(&self, unit: &str, stats: &ZiExecutionStats) {
        log::info!(
            "processed {} {unit}: {} kept, {} filtered, {} invalid",
            stats.input_records,
            stats.output_records,
            stats.filtered_records,
            stats.invalid_records
        );
        if stats.invalid_sequence_records > 0 {
            log::info!(
                "dropped {} invalid records from kept sequences",
                stats.invalid_sequence_records
            );
        }
    }
}

/// Serialized form of a process.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ZiProcessDocument {
    initial_schema: ZiSchema,
    steps: Vec<ZiProcessStep>,
    #[serde(default)]
    config: ZiExecutionConfig,
}

impl From<ZiTransformProcess> for ZiProcessDocument {
    fn from(process: ZiTransformProcess) -> Self {
        Self {
            initial_schema: process.initial_schema,
            steps: process.steps,
            config: process.config,
        }
    }
}

impl TryFrom<ZiProcessDocument> for ZiTransformProcess {
    type Error = ZiError;

    fn try_from(document: ZiProcessDocument) -> Result<Self> {
        ZiTransformProcess::bind(document.initial_schema, document.steps, document.config)
    }
}
