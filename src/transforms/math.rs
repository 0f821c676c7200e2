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

//! Scalar and column-wise arithmetic.
//!
//! Scalar operations rewrite a column in place and carry its bounds through
//! the operator, so the output metadata stays tight:
//!
//! | op | output bounds |
//! |---|---|
//! | Add, Subtract | both sides mapped |
//! | Multiply, Divide | both sides mapped, swapped when the scalar is negative |
//! | ReverseSubtract | both sides mapped and swapped |
//! | ReverseDivide | mapped only when the range excludes zero |
//! | Modulus | `[0, abs(k)-1]` for non-negative input, else symmetric |
//! | ScalarMin / ScalarMax | the scalar caps the open side |
//!
//! An absent bound stays absent. Integer arithmetic is checked: overflow and
//! division by zero are transform errors rather than wrapped values. Double
//! arithmetic must stay finite; a NaN or infinite result is a transform error
//! and a non-finite scalar fails at bind time.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::metadata::{ZiColumnMetaData, ZiColumnType};
use crate::record::{cell, ZiRecord};
use crate::schema::{ZiColumn, ZiSchema};
use crate::transforms::time::ZiTimeUnit;
use crate::transforms::{splice_columns, typed_column, with_cell, ZiTransformOp};
use crate::value::ZiValue;

/// Arithmetic operators. `value op scalar`, or `scalar op value` for the
/// reverse forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiMathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    ReverseSubtract,
    ReverseDivide,
    ScalarMin,
    ScalarMax,
}

impl ZiMathOp {
    /// Operators that fold over any number of columns.
    pub fn is_associative(self) -> bool {
        matches!(
            self,
            ZiMathOp::Add | ZiMathOp::Multiply | ZiMathOp::ScalarMin | ZiMathOp::ScalarMax
        )
    }
}

/// Numeric types that arithmetic transforms operate on.
pub trait ZiMathNumber: Copy + PartialOrd + fmt::Debug {
    const COLUMN_TYPE: ZiColumnType;
    const SCALAR_NAME: &'static str;
    const COLUMNS_NAME: &'static str;

    fn zero() -> Self;

    /// `None` on overflow, division by zero or a non-finite result.
    fn combine(op: ZiMathOp, value: Self, operand: Self) -> Option<Self>;

    /// Whether the value can act as a scalar operand.
    fn is_usable_scalar(self) -> bool {
        true
    }

    /// Largest magnitude a remainder by `divisor` can take.
    fn remainder_limit(divisor: Self) -> Option<Self>;

    fn negate(self) -> Option<Self>;

    fn read(value: &ZiValue) -> Result<Self>;

    fn write(self) -> ZiValue;

    fn bounds(meta: &ZiColumnMetaData) -> (Option<Self>, Option<Self>);

    fn meta(min: Option<Self>, max: Option<Self>) -> ZiColumnMetaData;
}

macro_rules! integer_math {
    ($t:ty, $column_type:ident, $variant:ident, $read:ident, $scalar:literal, $columns:literal) => {
        impl ZiMathNumber for $t {
            const COLUMN_TYPE: ZiColumnType = ZiColumnType::$column_type;
            const SCALAR_NAME: &'static str = $scalar;
            const COLUMNS_NAME: &'static str = $columns;

            fn zero() -> Self {
                0
            }

            fn combine(op: ZiMathOp, value: Self, operand: Self) -> Option<Self> {
                match op {
                    ZiMathOp::Add => value.checked_add(operand),
                    ZiMathOp::Subtract => value.checked_sub(operand),
                    ZiMathOp::Multiply => value.checked_mul(operand),
                    ZiMathOp::Divide => value.checked_div(operand),
                    ZiMathOp::Modulus => value.checked_rem(operand),
                    ZiMathOp::ReverseSubtract => operand.checked_sub(value),
                    ZiMathOp::ReverseDivide => operand.checked_div(value),
                    ZiMathOp::ScalarMin => Some(value.min(operand)),
                    ZiMathOp::ScalarMax => Some(value.max(operand)),
                }
            }

            fn remainder_limit(divisor: Self) -> Option<Self> {
                divisor.checked_abs().and_then(|magnitude| magnitude.checked_sub(1))
                    .filter(|limit| *limit >= 0)
            }

            fn negate(self) -> Option<Self> {
                self.checked_neg()
            }

            fn read(value: &ZiValue) -> Result<Self> {
                value.$read()
            }

            fn write(self) -> ZiValue {
                ZiValue::$variant(self)
            }

            fn bounds(meta: &ZiColumnMetaData) -> (Option<Self>, Option<Self>) {
                match meta {
                    ZiColumnMetaData::$column_type { min, max } => (*min, *max),
                    _ => (None, None),
                }
            }

            fn meta(min: Option<Self>, max: Option<Self>) -> ZiColumnMetaData {
                ZiColumnMetaData::$column_type { min, max }
            }
        }
    };
}

integer_math!(i32, Integer, Integer, to_int, "integer_math_op", "integer_columns_math_op");
integer_math!(i64, Long, Long, to_long, "long_math_op", "long_columns_math_op");

impl ZiMathNumber for f64 {
    const COLUMN_TYPE: ZiColumnType = ZiColumnType::Double;
    const SCALAR_NAME: &'static str = "double_math_op";
    const COLUMNS_NAME: &'static str = "double_columns_math_op";

    fn zero() -> Self {
        0.0
    }

    fn combine(op: ZiMathOp, value: Self, operand: Self) -> Option<Self> {
        let result = match op {
            ZiMathOp::Add => value + operand,
            ZiMathOp::Subtract => value - operand,
            ZiMathOp::Multiply => value * operand,
            ZiMathOp::Divide => value / operand,
            ZiMathOp::Modulus => value % operand,
            ZiMathOp::ReverseSubtract => operand - value,
            ZiMathOp::ReverseDivide => operand / value,
            ZiMathOp::ScalarMin => value.min(operand),
            ZiMathOp::ScalarMax => value.max(operand),
        };
        result.is_finite().then_some(result)
    }

    fn is_usable_scalar(self) -> bool {
        self.is_finite()
    }

    fn remainder_limit(divisor: Self) -> Option<Self> {
        (divisor != 0.0 && divisor.is_finite()).then(|| divisor.abs())
    }

    fn negate(self) -> Option<Self> {
        Some(-self)
    }

    fn read(value: &ZiValue) -> Result<Self> {
        value.to_double()
    }

    fn write(self) -> ZiValue {
        ZiValue::Double(self)
    }

    fn bounds(meta: &ZiColumnMetaData) -> (Option<Self>, Option<Self>) {
        match meta {
            ZiColumnMetaData::Double { min, max, .. } => (*min, *max),
            _ => (None, None),
        }
    }

    fn meta(min: Option<Self>, max: Option<Self>) -> ZiColumnMetaData {
        ZiColumnMetaData::double(min, max)
    }
}

/// Output bounds of `value op scalar` for inputs in `[min, max]`.
pub fn propagate_bounds<T: ZiMathNumber>(
    op: ZiMathOp,
    scalar: T,
    min: Option<T>,
    max: Option<T>,
) -> (Option<T>, Option<T>) {
    let apply = |value: T| T::combine(op, value, scalar);
    let zero = T::zero();
    match op {
        ZiMathOp::Add | ZiMathOp::Subtract => (min.and_then(apply), max.and_then(apply)),
        ZiMathOp::Divide if scalar == zero => (None, None),
        ZiMathOp::Multiply | ZiMathOp::Divide if scalar < zero => {
            (max.and_then(apply), min.and_then(apply))
        }
        ZiMathOp::Multiply | ZiMathOp::Divide => (min.and_then(apply), max.and_then(apply)),
        ZiMathOp::ReverseSubtract => (max.and_then(apply), min.and_then(apply)),
        ZiMathOp::ReverseDivide => match (min, max) {
            (Some(lo), Some(hi)) if lo > zero || hi < zero => match (apply(lo), apply(hi)) {
                (Some(a), Some(b)) if a <= b => (Some(a), Some(b)),
                (Some(a), Some(b)) => (Some(b), Some(a)),
                _ => (None, None),
            },
            _ => (None, None),
        },
        ZiMathOp::Modulus => match T::remainder_limit(scalar) {
            Some(limit) if min.map_or(false, |lo| lo >= zero) => (Some(zero), Some(limit)),
            Some(limit) => (limit.negate(), Some(limit)),
            None => (None, None),
        },
        ZiMathOp::ScalarMin => (min.and_then(apply), max.and_then(apply).or(Some(scalar))),
        ZiMathOp::ScalarMax => (min.and_then(apply).or(Some(scalar)), max.and_then(apply)),
    }
}

fn arithmetic_error<T: fmt::Debug>(who: &str, op: ZiMathOp, value: T, operand: T) -> ZiError {
    ZiError::transform(
        who,
        format!("{value:?} {op:?} {operand:?} has no representable result"),
    )
}

/// `column = column op scalar`, in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiScalarMathOp<T> {
    pub column: String,
    pub op: ZiMathOp,
    pub scalar: T,
}

pub type ZiIntegerMathOp = ZiScalarMathOp<i32>;
pub type ZiLongMathOp = ZiScalarMathOp<i64>;
pub type ZiDoubleMathOp = ZiScalarMathOp<f64>;

impl<T> ZiScalarMathOp<T> {
    pub fn new(column: impl Into<String>, op: ZiMathOp, scalar: T) -> Self {
        Self {
            column: column.into(),
            op,
            scalar,
        }
    }
}

impl<T: ZiMathNumber> ZiTransformOp for ZiScalarMathOp<T> {
    type Bound = usize;

    fn name(&self) -> &'static str {
        T::SCALAR_NAME
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        let index = self.bind(input)?;
        let (min, max) = T::bounds(input.meta(index));
        let (min, max) = propagate_bounds(self.op, self.scalar, min, max);
        splice_columns(input, index, vec![ZiColumn::new(&self.column, T::meta(min, max))])
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        if !self.scalar.is_usable_scalar() {
            return Err(ZiError::validation(format!(
                "{}: scalar {:?} is not finite",
                self.name(),
                self.scalar
            )));
        }
        typed_column(input, &self.column, &[T::COLUMN_TYPE], self.name())
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        let value = T::read(cell(record, index)?)?;
        let result = T::combine(self.op, value, self.scalar)
            .ok_or_else(|| arithmetic_error(self.name(), self.op, value, self.scalar))?;
        Ok(with_cell(record, index, result.write()))
    }
}

/// Appends `new_column = c1 op c2 [op c3 ...]` as an unbounded column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiColumnsMathOp<T> {
    pub new_column: String,
    pub op: ZiMathOp,
    pub columns: Vec<String>,
    #[serde(skip)]
    kind: PhantomData<T>,
}

pub type ZiIntegerColumnsMathOp = ZiColumnsMathOp<i32>;
pub type ZiLongColumnsMathOp = ZiColumnsMathOp<i64>;
pub type ZiDoubleColumnsMathOp = ZiColumnsMathOp<f64>;

impl<T> ZiColumnsMathOp<T> {
    pub fn new<I, S>(new_column: impl Into<String>, op: ZiMathOp, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            new_column: new_column.into(),
            op,
            columns: columns.into_iter().map(Into::into).collect(),
            kind: PhantomData,
        }
    }
}

impl<T: ZiMathNumber> ZiTransformOp for ZiColumnsMathOp<T> {
    /// Operand positions, in fold order.
    type Bound = Vec<usize>;

    fn name(&self) -> &'static str {
        T::COLUMNS_NAME
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        self.bind(input)?;
        let mut columns = input.columns().to_vec();
        columns.push(ZiColumn::new(&self.new_column, T::meta(None, None)));
        ZiSchema::new(columns)
    }

    fn bind(&self, input: &ZiSchema) -> Result<Vec<usize>> {
        let count = self.columns.len();
        let arity_ok = if self.op.is_associative() {
            count >= 2
        } else {
            count == 2
        };
        if !arity_ok {
            return Err(ZiError::validation(format!(
                "{}: {:?} cannot combine {count} columns",
                self.name(),
                self.op
            )));
        }
        self.columns
            .iter()
            .map(|column| typed_column(input, column, &[T::COLUMN_TYPE], self.name()))
            .collect()
    }

    fn map(&self, indices: &Vec<usize>, record: &ZiRecord) -> Result<ZiRecord> {
        let mut operands = indices.iter().map(|index| T::read(cell(record, *index)?));
        let mut accumulator = match operands.next() {
            Some(first) => first?,
            None => return Err(ZiError::state("columns math bound no columns")),
        };
        for operand in operands {
            let operand = operand?;
            accumulator = T::combine(self.op, accumulator, operand)
                .ok_or_else(|| arithmetic_error(self.name(), self.op, accumulator, operand))?;
        }
        let mut out = record.clone();
        out.push(accumulator.write());
        Ok(out)
    }
}

/// Shifts or clamps a time column by a fixed duration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiTimeMathOp {
    pub column: String,
    pub op: ZiMathOp,
    pub amount: i64,
    pub unit: ZiTimeUnit,
}

impl ZiTimeMathOp {
    pub fn new(column: impl Into<String>, op: ZiMathOp, amount: i64, unit: ZiTimeUnit) -> Self {
        Self {
            column: column.into(),
            op,
            amount,
            unit,
        }
    }

    fn delta(&self) -> Result<i64> {
        match self.op {
            ZiMathOp::Add | ZiMathOp::Subtract | ZiMathOp::ScalarMin | ZiMathOp::ScalarMax => {
                self.unit.to_millis(self.amount)
            }
            other => Err(ZiError::validation(format!(
                "time_math_op does not support {other:?}"
            ))),
        }
    }
}

/// Time column position and the shift in milliseconds.
#[derive(Clone, Copy, Debug)]
pub struct ZiBoundTimeShift {
    pub index: usize,
    pub delta: i64,
}

impl ZiTransformOp for ZiTimeMathOp {
    type Bound = ZiBoundTimeShift;

    fn name(&self) -> &'static str {
        "time_math_op"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        let ZiBoundTimeShift { index, delta } = self.bind(input)?;
        let meta = match input.meta(index) {
            ZiColumnMetaData::Time { zone, min, max } => {
                let (min, max) = propagate_bounds(self.op, delta, *min, *max);
                ZiColumnMetaData::Time {
                    zone: zone.clone(),
                    min,
                    max,
                }
            }
            other => other.clone(),
        };
        splice_columns(input, index, vec![ZiColumn::new(&self.column, meta)])
    }

    fn bind(&self, input: &ZiSchema) -> Result<ZiBoundTimeShift> {
        let index = typed_column(input, &self.column, &[ZiColumnType::Time], self.name())?;
        Ok(ZiBoundTimeShift {
            index,
            delta: self.delta()?,
        })
    }

    fn map(&self, bound: &ZiBoundTimeShift, record: &ZiRecord) -> Result<ZiRecord> {
        let ZiBoundTimeShift { index, delta } = *bound;
        let value = cell(record, index)?.to_time()?;
        let shifted = i64::combine(self.op, value, delta)
            .ok_or_else(|| arithmetic_error(self.name(), self.op, value, delta))?;
        Ok(with_cell(record, index, ZiValue::Time(shifted)))
    }
}
