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

//! # Zivec Value Module
//!
//! [`ZiValue`] is the typed, immutable cell every record is made of. A value
//! carries its own tag; columns carry the *declared* type. Conversions are
//! total where a numeric meaning exists (widening, checked narrowing, parsing
//! of trimmed numeric text) and fail with [`ZiError::TypeConversion`]
//! otherwise.
//!
//! ```rust
//! use zivec::ZiValue;
//!
//! assert_eq!(ZiValue::from("42").to_int().unwrap(), 42);
//! assert!(ZiValue::from("forty-two").to_int().is_err());
//! assert_eq!(ZiValue::Integer(3).to_double().unwrap(), 3.0);
//! ```

use std::cmp::Ordering;
use std::fmt;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};

/// A single typed cell.
///
/// `Time` holds milliseconds since the Unix epoch, always UTC. Time zones
/// only matter when fields are derived from the instant; they are a property
/// of the column, never of the stored value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZiValue {
    Text(String),
    Integer(i32),
    Long(i64),
    Double(f64),
    Time(i64),
    Boolean(bool),
    Bytes(Vec<u8>),
    Null,
}

impl ZiValue {
    /// Human-readable tag name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ZiValue::Text(_) => "text",
            ZiValue::Integer(_) => "integer",
            ZiValue::Long(_) => "long",
            ZiValue::Double(_) => "double",
            ZiValue::Time(_) => "time",
            ZiValue::Boolean(_) => "boolean",
            ZiValue::Bytes(_) => "bytes",
            ZiValue::Null => "null",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ZiValue::Null)
    }

    /// True for null cells and empty text.
    pub fn is_empty(&self) -> bool {
        match self {
            ZiValue::Null => true,
            ZiValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Borrows the inner string of a text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ZiValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    fn conversion_error<T>(&self, target: &str) -> Result<T> {
        Err(ZiError::conversion(self.to_text(), target))
    }

    pub fn to_long(&self) -> Result<i64> {
        match self {
            ZiValue::Integer(value) => Ok(i64::from(*value)),
            ZiValue::Long(value) | ZiValue::Time(value) => Ok(*value),
            ZiValue::Double(value) => match truncate_to_i64(*value) {
                Some(truncated) => Ok(truncated),
                None => self.conversion_error("long"),
            },
            ZiValue::Boolean(flag) => Ok(i64::from(*flag)),
            ZiValue::Text(text) => text
                .trim()
                .parse::<i64>()
                .or_else(|_| self.conversion_error("long")),
            ZiValue::Bytes(_) | ZiValue::Null => self.conversion_error("long"),
        }
    }

    pub fn to_int(&self) -> Result<i32> {
        match self {
            ZiValue::Integer(value) => Ok(*value),
            ZiValue::Bytes(_) | ZiValue::Null => self.conversion_error("integer"),
            _ => {
                let wide = self
                    .to_long()
                    .or_else(|_| self.conversion_error("integer"))?;
                i32::try_from(wide).or_else(|_| self.conversion_error("integer"))
            }
        }
    }

    pub fn to_double(&self) -> Result<f64> {
        match self {
            ZiValue::Integer(value) => Ok(f64::from(*value)),
            ZiValue::Long(value) | ZiValue::Time(value) => Ok(*value as f64),
            ZiValue::Double(value) => Ok(*value),
            ZiValue::Boolean(flag) => Ok(if *flag { 1.0 } else { 0.0 }),
            ZiValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .or_else(|_| self.conversion_error("double")),
            ZiValue::Bytes(_) | ZiValue::Null => self.conversion_error("double"),
        }
    }

    pub fn to_bool(&self) -> Result<bool> {
        match self {
            ZiValue::Boolean(flag) => Ok(*flag),
            ZiValue::Integer(value) => Ok(*value != 0),
            ZiValue::Long(value) => Ok(*value != 0),
            ZiValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
                    Ok(true)
                } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
                    Ok(false)
                } else {
                    self.conversion_error("boolean")
                }
            }
            _ => self.conversion_error("boolean"),
        }
    }

    /// Epoch milliseconds. Text is accepted as an integral millisecond count
    /// or as an RFC 3339 timestamp.
    pub fn to_time(&self) -> Result<i64> {
        match self {
            ZiValue::Text(text) => {
                let trimmed = text.trim();
                if let Ok(millis) = trimmed.parse::<i64>() {
                    return Ok(millis);
                }
                DateTime::parse_from_rfc3339(trimmed)
                    .map(|parsed| parsed.timestamp_millis())
                    .or_else(|_| self.conversion_error("time"))
            }
            ZiValue::Boolean(_) => self.conversion_error("time"),
            _ => self
                .to_long()
                .or_else(|_| self.conversion_error("time")),
        }
    }

    /// Text rendering. Never fails: null renders empty, bytes render as hex.
    pub fn to_text(&self) -> String {
        match self {
            ZiValue::Text(text) => text.clone(),
            ZiValue::Integer(value) => value.to_string(),
            ZiValue::Long(value) | ZiValue::Time(value) => value.to_string(),
            ZiValue::Double(value) => value.to_string(),
            ZiValue::Boolean(flag) => flag.to_string(),
            ZiValue::Bytes(bytes) => hex::encode(bytes),
            ZiValue::Null => String::new(),
        }
    }
}

fn truncate_to_i64(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

impl PartialOrd for ZiValue {
    /// Values only order against values of the same tag.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (ZiValue::Text(a), ZiValue::Text(b)) => a.partial_cmp(b),
            (ZiValue::Integer(a), ZiValue::Integer(b)) => a.partial_cmp(b),
            (ZiValue::Long(a), ZiValue::Long(b)) => a.partial_cmp(b),
            (ZiValue::Double(a), ZiValue::Double(b)) => a.partial_cmp(b),
            (ZiValue::Time(a), ZiValue::Time(b)) => a.partial_cmp(b),
            (ZiValue::Boolean(a), ZiValue::Boolean(b)) => a.partial_cmp(b),
            (ZiValue::Bytes(a), ZiValue::Bytes(b)) => a.partial_cmp(b),
            (ZiValue::Null, ZiValue::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for ZiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for ZiValue {
    fn from(value: &str) -> Self {
        ZiValue::Text(value.to_string())
    }
}

impl From<String> for ZiValue {
    fn from(value: String) -> Self {
        ZiValue::Text(value)
    }
}

impl From<i32> for ZiValue {
    fn from(value: i32) -> Self {
        ZiValue::Integer(value)
    }
}

impl From<i64> for ZiValue {
    fn from(value: i64) -> Self {
        ZiValue::Long(value)
    }
}

impl From<f64> for ZiValue {
    fn from(value: f64) -> Self {
        ZiValue::Double(value)
    }
}

impl From<bool> for ZiValue {
    fn from(value: bool) -> Self {
        ZiValue::Boolean(value)
    }
}

impl From<Vec<u8>> for ZiValue {
    fn from(value: Vec<u8>) -> Self {
        ZiValue::Bytes(value)
    }
}
