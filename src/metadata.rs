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

//! # Zivec Column Metadata Module
//!
//! Each column of a [`ZiSchema`](crate::schema::ZiSchema) is described by a
//! [`ZiColumnMetaData`]: the semantic type plus type-specific validity
//! constraints. Metadata serializes alongside schemas and transform
//! processes. String patterns are compiled once, when the metadata is built or
//! deserialized, and serialize back as their source text.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::value::ZiValue;

/// Semantic column types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiColumnType {
    String,
    Integer,
    Long,
    Double,
    Categorical,
    Time,
    Boolean,
    Bytes,
}

impl ZiColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ZiColumnType::Integer | ZiColumnType::Long | ZiColumnType::Double
        )
    }
}

impl fmt::Display for ZiColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ZiColumnType::String => "String",
            ZiColumnType::Integer => "Integer",
            ZiColumnType::Long => "Long",
            ZiColumnType::Double => "Double",
            ZiColumnType::Categorical => "Categorical",
            ZiColumnType::Time => "Time",
            ZiColumnType::Boolean => "Boolean",
            ZiColumnType::Bytes => "Bytes",
        };
        f.write_str(name)
    }
}

/// A pattern that must match a whole value.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZiPattern {
    source: String,
    anchored: Regex,
}

impl ZiPattern {
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let anchored = Regex::new(&format!("^(?:{source})$"))
            .map_err(|err| ZiError::schema(format!("invalid regex '{source}': {err}")))?;
        Ok(Self { source, anchored })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_full_match(&self, text: &str) -> bool {
        self.anchored.is_match(text)
    }
}

impl PartialEq for ZiPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl FromStr for ZiPattern {
    type Err = ZiError;

    fn from_str(source: &str) -> Result<Self> {
        ZiPattern::new(source)
    }
}

impl TryFrom<String> for ZiPattern {
    type Error = ZiError;

    fn try_from(source: String) -> Result<Self> {
        ZiPattern::new(source)
    }
}

impl From<ZiPattern> for String {
    fn from(pattern: ZiPattern) -> Self {
        pattern.source
    }
}

impl fmt::Display for ZiPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Type and validity constraints of one column.
///
/// Bounds are inclusive; `None` means unbounded on that side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ZiColumnMetaData {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        /// Pattern every value must match in full.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        regex: Option<ZiPattern>,
    },
    Integer {
        #[serde(default)]
        min: Option<i32>,
        #[serde(default)]
        max: Option<i32>,
    },
    Long {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
    Double {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        allow_nan: bool,
        #[serde(default)]
        allow_infinite: bool,
    },
    /// Ordered state names; position is the integer encoding.
    Categorical { states: Vec<String> },
    /// IANA zone used for field extraction. Stored values are epoch-ms UTC.
    Time {
        zone: String,
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
    Boolean,
    Bytes,
}

/// Substitution policy for "replace invalid" transforms.
///
/// Has no default; callers state which value replaces an invalid cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZiPlaceholder {
    /// Always substitute this value.
    Constant(ZiValue),
    /// The declared lower bound (first state for categoricals).
    MinBound,
    /// The declared upper bound (last state for categoricals).
    MaxBound,
}

impl ZiColumnMetaData {
    pub fn string() -> Self {
        ZiColumnMetaData::String {
            min_length: None,
            max_length: None,
            regex: None,
        }
    }

    pub fn integer(min: Option<i32>, max: Option<i32>) -> Self {
        ZiColumnMetaData::Integer { min, max }
    }

    pub fn long(min: Option<i64>, max: Option<i64>) -> Self {
        ZiColumnMetaData::Long { min, max }
    }

    pub fn double(min: Option<f64>, max: Option<f64>) -> Self {
        ZiColumnMetaData::Double {
            min,
            max,
            allow_nan: false,
            allow_infinite: false,
        }
    }

    pub fn categorical<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ZiColumnMetaData::Categorical {
            states: states.into_iter().map(Into::into).collect(),
        }
    }

    pub fn time(zone: impl Into<String>) -> Self {
        ZiColumnMetaData::Time {
            zone: zone.into(),
            min: None,
            max: None,
        }
    }

    pub fn column_type(&self) -> ZiColumnType {
        match self {
            ZiColumnMetaData::String { .. } => ZiColumnType::String,
            ZiColumnMetaData::Integer { .. } => ZiColumnType::Integer,
            ZiColumnMetaData::Long { .. } => ZiColumnType::Long,
            ZiColumnMetaData::Double { .. } => ZiColumnType::Double,
            ZiColumnMetaData::Categorical { .. } => ZiColumnType::Categorical,
            ZiColumnMetaData::Time { .. } => ZiColumnType::Time,
            ZiColumnMetaData::Boolean => ZiColumnType::Boolean,
            ZiColumnMetaData::Bytes => ZiColumnType::Bytes,
        }
    }

    /// State names of a categorical column.
    pub fn states(&self) -> Option<&[String]> {
        match self {
            ZiColumnMetaData::Categorical { states } => Some(states),
            _ => None,
        }
    }

    /// Zone identifier of a time column.
    pub fn zone(&self) -> Option<&str> {
        match self {
            ZiColumnMetaData::Time { zone, .. } => Some(zone),
            _ => None,
        }
    }

    /// Checks that the metadata is self-consistent.
    pub fn validate(&self) -> Result<()> {
        match self {
            ZiColumnMetaData::String {
                min_length,
                max_length,
                ..
            } => check_bounds(min_length, max_length),
            ZiColumnMetaData::Integer { min, max } => check_bounds(min, max),
            ZiColumnMetaData::Long { min, max } => check_bounds(min, max),
            ZiColumnMetaData::Double { min, max, .. } => {
                if min.map_or(false, f64::is_nan) || max.map_or(false, f64::is_nan) {
                    return Err(ZiError::schema("double bounds may not be NaN"));
                }
                check_bounds(min, max)
            }
            ZiColumnMetaData::Categorical { states } => {
                if states.is_empty() {
                    return Err(ZiError::schema("categorical column needs at least one state"));
                }
                let mut seen = HashSet::with_capacity(states.len());
                for state in states {
                    if !seen.insert(state.as_str()) {
                        return Err(ZiError::schema(format!(
                            "duplicate categorical state '{state}'"
                        )));
                    }
                }
                Ok(())
            }
            ZiColumnMetaData::Time { zone, min, max } => {
                parse_zone(zone)?;
                check_bounds(min, max)
            }
            ZiColumnMetaData::Boolean | ZiColumnMetaData::Bytes => Ok(()),
        }
    }

    /// Returns whether `value` is acceptable for this column.
    ///
    /// The value is read as the column's primitive type, so numeric text is
    /// valid in numeric columns. Null is never valid.
    pub fn is_valid(&self, value: &ZiValue) -> bool {
        if value.is_null() {
            return false;
        }
        match self {
            ZiColumnMetaData::String {
                min_length,
                max_length,
                regex,
            } => {
                let text = value.to_text();
                let length = text.chars().count();
                if min_length.map_or(false, |min| length < min)
                    || max_length.map_or(false, |max| length > max)
                {
                    return false;
                }
                regex.as_ref().map_or(true, |pattern| pattern.is_full_match(&text))
            }
            ZiColumnMetaData::Integer { min, max } => integral(value)
                .and_then(|wide| i32::try_from(wide).ok())
                .map_or(false, |v| within(v, min, max)),
            ZiColumnMetaData::Long { min, max } => {
                integral(value).map_or(false, |v| within(v, min, max))
            }
            ZiColumnMetaData::Double {
                min,
                max,
                allow_nan,
                allow_infinite,
            } => {
                if matches!(value, ZiValue::Boolean(_) | ZiValue::Bytes(_)) {
                    return false;
                }
                match value.to_double() {
                    Ok(v) if v.is_nan() => *allow_nan,
                    Ok(v) if v.is_infinite() => *allow_infinite,
                    Ok(v) => within(v, min, max),
                    Err(_) => false,
                }
            }
            ZiColumnMetaData::Categorical { states } => {
                let text = value.to_text();
                states.iter().any(|state| *state == text)
            }
            ZiColumnMetaData::Time { min, max, .. } => {
                value.to_time().map_or(false, |v| within(v, min, max))
            }
            ZiColumnMetaData::Boolean => value.to_bool().is_ok(),
            ZiColumnMetaData::Bytes => matches!(value, ZiValue::Bytes(_)),
        }
    }

    /// Whether every value valid under `other` is also valid here.
    ///
    /// Conservative: `false` means coverage could not be shown from the
    /// declared constraints alone.
    pub fn contains(&self, other: &ZiColumnMetaData) -> bool {
        use ZiColumnMetaData as Meta;
        match (self, other) {
            (
                Meta::String {
                    min_length: None,
                    max_length: None,
                    regex: None,
                },
                _,
            ) => true,
            (
                Meta::String {
                    min_length,
                    max_length,
                    regex,
                },
                Meta::String {
                    min_length: inner_min,
                    max_length: inner_max,
                    regex: inner_regex,
                },
            ) => {
                covers(
                    &min_length.or(Some(0)),
                    max_length,
                    &inner_min.or(Some(0)),
                    inner_max,
                ) && (regex.is_none() || regex == inner_regex)
            }
            (Meta::Categorical { states }, Meta::Categorical { states: inner }) => {
                inner.iter().all(|state| states.contains(state))
            }
            (Meta::Integer { min, max }, Meta::Integer { min: lo, max: hi }) => covers(min, max, lo, hi),
            (Meta::Long { min, max }, Meta::Long { min: lo, max: hi }) => covers(min, max, lo, hi),
            (Meta::Long { min, max }, Meta::Integer { min: lo, max: hi }) => covers(
                min,
                max,
                &Some(lo.map_or(i64::from(i32::MIN), i64::from)),
                &Some(hi.map_or(i64::from(i32::MAX), i64::from)),
            ),
            (
                Meta::Double {
                    min,
                    max,
                    allow_nan,
                    allow_infinite,
                },
                Meta::Double {
                    min: lo,
                    max: hi,
                    allow_nan: inner_nan,
                    allow_infinite: inner_infinite,
                },
            ) => {
                covers(min, max, lo, hi)
                    && (*allow_nan || !*inner_nan)
                    && (*allow_infinite || !*inner_infinite)
            }
            (Meta::Double { min, max, .. }, Meta::Integer { min: lo, max: hi }) => covers(
                min,
                max,
                &Some(lo.map_or(f64::from(i32::MIN), f64::from)),
                &Some(hi.map_or(f64::from(i32::MAX), f64::from)),
            ),
            (Meta::Time { min, max, .. }, Meta::Time { min: lo, max: hi, .. }) => covers(min, max, lo, hi),
            (Meta::Boolean, Meta::Boolean) | (Meta::Bytes, Meta::Bytes) => true,
            _ => false,
        }
    }

    /// Resolves a placeholder policy against this column.
    pub fn placeholder(&self, policy: &ZiPlaceholder) -> Result<ZiValue> {
        let resolved = match (policy, self) {
            (ZiPlaceholder::Constant(value), _) => Some(value.clone()),
            (ZiPlaceholder::MinBound, ZiColumnMetaData::Integer { min, .. }) => {
                min.map(ZiValue::Integer)
            }
            (ZiPlaceholder::MaxBound, ZiColumnMetaData::Integer { max, .. }) => {
                max.map(ZiValue::Integer)
            }
            (ZiPlaceholder::MinBound, ZiColumnMetaData::Long { min, .. }) => min.map(ZiValue::Long),
            (ZiPlaceholder::MaxBound, ZiColumnMetaData::Long { max, .. }) => max.map(ZiValue::Long),
            (ZiPlaceholder::MinBound, ZiColumnMetaData::Double { min, .. }) => {
                min.map(ZiValue::Double)
            }
            (ZiPlaceholder::MaxBound, ZiColumnMetaData::Double { max, .. }) => {
                max.map(ZiValue::Double)
            }
            (ZiPlaceholder::MinBound, ZiColumnMetaData::Time { min, .. }) => min.map(ZiValue::Time),
            (ZiPlaceholder::MaxBound, ZiColumnMetaData::Time { max, .. }) => max.map(ZiValue::Time),
            (ZiPlaceholder::MinBound, ZiColumnMetaData::Categorical { states }) => {
                states.first().cloned().map(ZiValue::Text)
            }
            (ZiPlaceholder::MaxBound, ZiColumnMetaData::Categorical { states }) => {
                states.last().cloned().map(ZiValue::Text)
            }
            _ => None,
        };
        resolved.ok_or_else(|| {
            ZiError::validation(format!(
                "{} column has no bound for placeholder {policy:?}",
                self.column_type()
            ))
        })
    }
}

fn check_bounds<T: PartialOrd + fmt::Debug>(min: &Option<T>, max: &Option<T>) -> Result<()> {
    match (min, max) {
        (Some(lo), Some(hi)) if lo > hi => Err(ZiError::schema(format!(
            "min bound {lo:?} exceeds max bound {hi:?}"
        ))),
        _ => Ok(()),
    }
}

/// Whether `[min, max]` encloses `[lo, hi]`; `None` is unbounded.
fn covers<T: PartialOrd>(min: &Option<T>, max: &Option<T>, lo: &Option<T>, hi: &Option<T>) -> bool {
    let low = match (min, lo) {
        (None, _) => true,
        (Some(min), Some(lo)) => lo >= min,
        (Some(_), None) => false,
    };
    let high = match (max, hi) {
        (None, _) => true,
        (Some(max), Some(hi)) => hi <= max,
        (Some(_), None) => false,
    };
    low && high
}

fn within<T: PartialOrd>(value: T, min: &Option<T>, max: &Option<T>) -> bool {
    min.as_ref().map_or(true, |lo| value >= *lo) && max.as_ref().map_or(true, |hi| value <= *hi)
}

/// Integral reading of a cell: doubles count only when they have no fraction.
fn integral(value: &ZiValue) -> Option<i64> {
    match value {
        ZiValue::Integer(v) => Some(i64::from(*v)),
        ZiValue::Long(v) | ZiValue::Time(v) => Some(*v),
        ZiValue::Double(v) if v.is_finite() && v.fract() == 0.0 => value.to_long().ok(),
        ZiValue::Text(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Parses an IANA zone identifier such as `UTC` or `Europe/Berlin`.
pub(crate) fn parse_zone(zone: &str) -> Result<Tz> {
    zone.parse::<Tz>()
        .map_err(|_| ZiError::validation(format!("unknown time zone '{zone}'")))
}
