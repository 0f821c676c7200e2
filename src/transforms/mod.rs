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

//! # Transforms Module
//!
//! This module contains every column-level transform available in Zivec.
//! A transform has two faces that must always agree:
//!
//! - a schema face, [`ZiTransformOp::output_schema`], computed purely from
//!   column metadata
//! - a record face, [`ZiTransformOp::map`], producing records shaped like
//!   that schema
//!
//! ## Transform Families
//!
//! - **categorical**: categorical encoding (integer index, one-hot, decoding)
//! - **column**: column set changes (remove, rename, reorder, duplicate)
//! - **conditional**: condition-driven value replacement and copying
//! - **math**: scalar and column-wise arithmetic for Integer, Long, Double and Time
//! - **normalize**: min/max, standardize, subtract-mean and log2 normalizers
//! - **replace**: empty and invalid value substitution
//! - **string**: string rewriting and list-to-categorical-set expansion
//! - **time**: string parsing to time and time field derivation
//! - **window**: sequence reduction over tumbling windows
//!
//! ## Usage
//!
//! Transforms are described by [`ZiTransformSpec`], a closed serializable
//! enum, and executed through [`ZiTransform`], which enforces that
//! `set_input_schema` happens before any record is mapped.

pub mod categorical;
pub mod column;
pub mod conditional;
pub mod math;
pub mod normalize;
pub mod replace;
pub mod string;
pub mod time;
pub mod window;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::binding::{ZiBindState, ZiBindable};
use crate::errors::{Result, ZiError};
use crate::metadata::ZiColumnType;
use crate::record::{check_width, ZiRecord, ZiSequence};
use crate::schema::{ZiColumn, ZiSchema};
use crate::value::ZiValue;

pub use categorical::{
    ZiCategoricalToInteger, ZiCategoricalToOneHot, ZiIntegerToCategorical, ZiStringToCategorical,
    ZiUnknownPolicy,
};
pub use column::{ZiDuplicateColumns, ZiRemoveColumns, ZiRenameColumns, ZiReorderColumns};
pub use conditional::{ZiConditionalCopyValue, ZiConditionalReplaceValue};
pub use math::{
    ZiColumnsMathOp, ZiDoubleColumnsMathOp, ZiDoubleMathOp, ZiIntegerColumnsMathOp, ZiIntegerMathOp,
    ZiLongColumnsMathOp, ZiLongMathOp, ZiMathNumber, ZiMathOp, ZiScalarMathOp, ZiTimeMathOp,
};
pub use normalize::{
    ZiLog2Normalizer, ZiMinMaxNormalizer, ZiStandardizeNormalizer, ZiSubtractMeanNormalizer,
};
pub use replace::{ZiReplaceEmptyInteger, ZiReplaceInvalidWithValue};
pub use string::{
    ZiMapAllStringsExceptList, ZiRemoveWhiteSpace, ZiReplaceEmptyString, ZiStringListToCategoricalSet,
    ZiStringMap,
};
pub use time::{
    ZiDeriveColumnsFromTime, ZiDerivedColumn, ZiDerivedField, ZiStringToTime, ZiTimeField, ZiTimeUnit,
};
pub use window::{ZiReduceOp, ZiReduceSequenceByWindow, ZiReducer, ZiWindow};

/// Behaviour shared by every transform family.
pub trait ZiTransformOp: fmt::Debug {
    /// What `bind` resolves: column positions plus anything compiled once
    /// from the schema (conditions, zones, replacement values).
    type Bound: Clone + fmt::Debug;

    /// Stable name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Output schema for `input`. Never touches records.
    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema>;

    /// Resolves everything `map` needs. Runs after `output_schema` succeeded.
    fn bind(&self, input: &ZiSchema) -> Result<Self::Bound>;

    /// Maps one record already checked against the bound input width.
    fn map(&self, bound: &Self::Bound, record: &ZiRecord) -> Result<ZiRecord>;

    /// Maps a sequence; record-wise unless the transform aggregates.
    fn map_sequence(&self, bound: &Self::Bound, sequence: &[ZiRecord]) -> Result<ZiSequence> {
        sequence.iter().map(|record| self.map(bound, record)).collect()
    }
}

/// Everything a transform resolved at bind time.
#[derive(Clone, Debug)]
pub struct ZiTransformBinding {
    input: ZiSchema,
    output: ZiSchema,
    bound: ZiBoundTransform,
}

impl ZiTransformBinding {
    pub fn input(&self) -> &ZiSchema {
        &self.input
    }

    pub fn output(&self) -> &ZiSchema {
        &self.output
    }

    pub fn bound(&self) -> &ZiBoundTransform {
        &self.bound
    }
}

macro_rules! transform_spec {
    ($($variant:ident($leaf:ty)),+ $(,)?) => {
        /// Closed set of transform parameters.
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type")]
        pub enum ZiTransformSpec {
            $($variant($leaf),)+
        }

        /// Bound state of a [`ZiTransformSpec`], one variant per transform.
        #[derive(Clone, Debug)]
        pub enum ZiBoundTransform {
            $($variant(<$leaf as ZiTransformOp>::Bound),)+
        }

        impl ZiTransformSpec {
            /// Output schema for `input`, without binding.
            pub fn transform(&self, input: &ZiSchema) -> Result<ZiSchema> {
                match self {
                    $(ZiTransformSpec::$variant(leaf) => leaf.output_schema(input),)+
                }
            }

            fn bind_leaf(&self, input: &ZiSchema) -> Result<ZiBoundTransform> {
                Ok(match self {
                    $(ZiTransformSpec::$variant(leaf) => ZiBoundTransform::$variant(leaf.bind(input)?),)+
                })
            }

            fn map_bound(&self, bound: &ZiBoundTransform, record: &ZiRecord) -> Result<ZiRecord> {
                match (self, bound) {
                    $((ZiTransformSpec::$variant(leaf), ZiBoundTransform::$variant(bound)) => {
                        leaf.map(bound, record)
                    })+
                    _ => Err(mismatched(self)),
                }
            }

            fn map_sequence_bound(
                &self,
                bound: &ZiBoundTransform,
                sequence: &[ZiRecord],
            ) -> Result<ZiSequence> {
                match (self, bound) {
                    $((ZiTransformSpec::$variant(leaf), ZiBoundTransform::$variant(bound)) => {
                        leaf.map_sequence(bound, sequence)
                    })+
                    _ => Err(mismatched(self)),
                }
            }
        }

        impl ZiBindable for ZiTransformSpec {
            type Resolved = ZiTransformBinding;

            fn name(&self) -> &'static str {
                match self {
                    $(ZiTransformSpec::$variant(leaf) => leaf.name(),)+
                }
            }

            fn bind(&self, schema: &ZiSchema) -> Result<ZiTransformBinding> {
                let output = self.transform(schema)?;
                let bound = self.bind_leaf(schema)?;
                Ok(ZiTransformBinding {
                    input: schema.clone(),
                    output,
                    bound,
                })
            }
        }

        $(
            impl From<$leaf> for ZiTransformSpec {
                fn from(leaf: $leaf) -> Self {
                    ZiTransformSpec::$variant(leaf)
                }
            }
        )+
    };
}

transform_spec! {
    CategoricalToInteger(ZiCategoricalToInteger),
    CategoricalToOneHot(ZiCategoricalToOneHot),
    IntegerToCategorical(ZiIntegerToCategorical),
    StringToCategorical(ZiStringToCategorical),
    RemoveColumns(ZiRemoveColumns),
    RenameColumns(ZiRenameColumns),
    ReorderColumns(ZiReorderColumns),
    DuplicateColumns(ZiDuplicateColumns),
    ConditionalReplaceValue(ZiConditionalReplaceValue),
    ConditionalCopyValue(ZiConditionalCopyValue),
    IntegerMathOp(ZiIntegerMathOp),
    LongMathOp(ZiLongMathOp),
    DoubleMathOp(ZiDoubleMathOp),
    IntegerColumnsMathOp(ZiIntegerColumnsMathOp),
    LongColumnsMathOp(ZiLongColumnsMathOp),
    DoubleColumnsMathOp(ZiDoubleColumnsMathOp),
    TimeMathOp(ZiTimeMathOp),
    MinMaxNormalizer(ZiMinMaxNormalizer),
    StandardizeNormalizer(ZiStandardizeNormalizer),
    SubtractMeanNormalizer(ZiSubtractMeanNormalizer),
    Log2Normalizer(ZiLog2Normalizer),
    ReplaceEmptyInteger(ZiReplaceEmptyInteger),
    ReplaceInvalidWithValue(ZiReplaceInvalidWithValue),
    MapAllStringsExceptList(ZiMapAllStringsExceptList),
    RemoveWhiteSpace(ZiRemoveWhiteSpace),
    ReplaceEmptyString(ZiReplaceEmptyString),
    StringMap(ZiStringMap),
    StringListToCategoricalSet(ZiStringListToCategoricalSet),
    StringToTime(ZiStringToTime),
    DeriveColumnsFromTime(ZiDeriveColumnsFromTime),
    ReduceSequenceByWindow(ZiReduceSequenceByWindow),
}

impl ZiTransformSpec {
    /// True for transforms that only make sense on whole sequences.
    pub fn is_sequence_only(&self) -> bool {
        matches!(self, ZiTransformSpec::ReduceSequenceByWindow(_))
    }
}

fn mismatched(spec: &ZiTransformSpec) -> ZiError {
    ZiError::state(format!("'{}' holds a binding of another transform", spec.name()))
}

/// A transform in its Unbound/Bound lifecycle.
pub type ZiTransform = ZiBindState<ZiTransformSpec>;

impl ZiBindState<ZiTransformSpec> {
    /// Output schema for `input`. Pure; binding is not required.
    pub fn transform(&self, input: &ZiSchema) -> Result<ZiSchema> {
        self.spec().transform(input)
    }

    pub fn map(&self, record: &ZiRecord) -> Result<ZiRecord> {
        let binding = self.resolved()?;
        check_width(record, binding.input().num_columns(), self.name())?;
        self.spec().map_bound(binding.bound(), record)
    }

    pub fn map_sequence(&self, sequence: &[ZiRecord]) -> Result<ZiSequence> {
        let binding = self.resolved()?;
        for record in sequence {
            check_width(record, binding.input().num_columns(), self.name())?;
        }
        self.spec().map_sequence_bound(binding.bound(), sequence)
    }

    pub fn input_schema(&self) -> Result<&ZiSchema> {
        Ok(self.resolved()?.input())
    }

    pub fn output_schema(&self) -> Result<&ZiSchema> {
        Ok(self.resolved()?.output())
    }
}

/// Fails with a schema error unless column `index` has one of `allowed` types.
pub(crate) fn require_type(
    schema: &ZiSchema,
    index: usize,
    allowed: &[ZiColumnType],
    who: &str,
) -> Result<()> {
    let actual = schema.column_type(index);
    if allowed.contains(&actual) {
        return Ok(());
    }
    let expected = allowed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ");
    Err(ZiError::schema(format!(
        "{who}: column '{}' is {actual}, expected {expected}",
        schema.name(index)
    )))
}

/// Resolves `column` and checks its type in one step.
pub(crate) fn typed_column(
    schema: &ZiSchema,
    column: &str,
    allowed: &[ZiColumnType],
    who: &str,
) -> Result<usize> {
    let index = schema.index_of(column)?;
    require_type(schema, index, allowed, who)?;
    Ok(index)
}

/// Replaces column `index` with `replacement` (possibly several columns).
pub(crate) fn splice_columns(
    input: &ZiSchema,
    index: usize,
    replacement: Vec<ZiColumn>,
) -> Result<ZiSchema> {
    let mut columns = Vec::with_capacity(input.num_columns() + replacement.len());
    columns.extend_from_slice(&input.columns()[..index]);
    columns.extend(replacement);
    columns.extend_from_slice(&input.columns()[index + 1..]);
    ZiSchema::new(columns)
}

/// Inserts `added` directly after column `index`.
pub(crate) fn insert_columns_after(
    input: &ZiSchema,
    index: usize,
    added: Vec<ZiColumn>,
) -> Result<ZiSchema> {
    let mut columns = Vec::with_capacity(input.num_columns() + added.len());
    columns.extend_from_slice(&input.columns()[..=index]);
    columns.extend(added);
    columns.extend_from_slice(&input.columns()[index + 1..]);
    ZiSchema::new(columns)
}

/// Copy of `record` with cell `index` replaced.
pub(crate) fn with_cell(record: &ZiRecord, index: usize, value: ZiValue) -> ZiRecord {
    let mut out = record.clone();
    out[index] = value;
    out
}

pub(crate) const NUMERIC: &[ZiColumnType] =
    &[ZiColumnType::Integer, ZiColumnType::Long, ZiColumnType::Double];
