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

//! # Zivec Core Library
//!
//! Zivec is a schema-typed record transformation engine. Records are rows of
//! typed cells described by a [`ZiSchema`]; transforms, conditions and
//! filters are declared from parameters, bound to the schema they will see,
//! and then applied to records and sequences.
//!
//! ## Module Overview
//!
//! - **value / metadata / schema / record**: the data model
//! - **binding**: the Unbound/Bound lifecycle shared by every operation
//! - **condition**: boolean predicates over one record
//! - **filter**: record and sequence removal
//! - **transforms**: column-level transform families
//! - **process**: ordered, bound transform processes and their serialization
//! - **reader**: record and sequence sources
//! - **metrics**: execution counters
//! - **analysis**: per-column statistics and normalizer helpers
//!
//! ## Feature Flags
//!
//! - `parallel`: Map independent batch records on the rayon pool
//! - `full`: Enables all features
//!
//! ## Quick Start
//!
//! ```rust
//! use zivec::{record, ZiCategoricalToInteger, ZiSchema, ZiTransformProcess};
//!
//! let schema = ZiSchema::builder()
//!     .add_column_categorical("color", ["red", "green"])
//!     .add_column_double("score")
//!     .build()?;
//!
//! let process = ZiTransformProcess::builder(schema)
//!     .transform(ZiCategoricalToInteger::new("color"))
//!     .build()?;
//!
//! let out = process.execute(&record!["green", 0.5])?;
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, ZiError>`. Using an operation before it
//! is bound is a [`ZiError::State`]; everything else is reported where it is
//! detected, at bind time whenever the schema alone is enough.

pub mod analysis;
pub mod binding;
pub mod condition;
pub mod errors;
pub mod filter;
pub mod metadata;
pub mod metrics;
pub mod process;
pub mod reader;
pub mod record;
pub mod schema;
pub mod transforms;
pub mod value;

pub use analysis::{
    ZiColumnAnalysis, ZiColumnSummary, ZiDataAnalysis, ZiNumericAnalysis, ZiTextAnalysis,
};
pub use binding::{ZiBindState, ZiBindable};
pub use condition::{
    ZiCompiledCondition, ZiCondition, ZiConditionOp, ZiConditionSpec, ZiSequenceConditionMode,
};
pub use errors::{Result, ZiError};
pub use filter::{ZiCompiledFilter, ZiFilter, ZiFilterSpec};
pub use metadata::{ZiColumnMetaData, ZiColumnType, ZiPattern, ZiPlaceholder};
pub use metrics::ZiExecutionStats;
pub use process::{ZiExecutionConfig, ZiProcessStep, ZiTransformProcess, ZiTransformProcessBuilder};
pub use reader::{
    ZiCollectionRecordReader, ZiCollectionSequenceReader, ZiJsonLinesRecordReader,
    ZiRecordReader, ZiSequenceReader,
};
pub use record::{ZiRecord, ZiRecordBatch, ZiSequence};
pub use schema::{ZiColumn, ZiSchema, ZiSchemaBuilder};
pub use transforms::*;
pub use value::ZiValue;
