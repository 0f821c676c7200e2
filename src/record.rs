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

//! # Zivec Record Module
//!
//! Records are positional: value `i` belongs to column `i` of the schema that
//! governs the record. A sequence is an ordered list of records sharing one
//! schema, where order carries meaning (usually time).
//!
//! ```rust
//! use zivec::{record, ZiValue};
//!
//! let row = record![1, "one", 1.5];
//! assert_eq!(row[1], ZiValue::from("one"));
//! ```

use crate::errors::{Result, ZiError};
use crate::value::ZiValue;

/// One row of values, ordered like its schema's columns.
pub type ZiRecord = Vec<ZiValue>;

/// Time-ordered rows sharing one schema.
pub type ZiSequence = Vec<ZiRecord>;

/// Independent rows processed together.
pub type ZiRecordBatch = Vec<ZiRecord>;

/// Builds a [`ZiRecord`] from anything convertible into [`ZiValue`].
#[macro_export]
macro_rules! record {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::value::ZiValue::from($value)),*]
    };
}

/// Fetches the cell at `index`, reporting a shape error when absent.
pub(crate) fn cell(record: &ZiRecord, index: usize) -> Result<&ZiValue> {
    record.get(index).ok_or_else(|| {
        ZiError::schema(format!(
            "record has {} values, no column at index {index}",
            record.len()
        ))
    })
}

/// Checks a record length against an expected column count.
pub(crate) fn check_width(record: &ZiRecord, expected: usize, who: &str) -> Result<()> {
    if record.len() == expected {
        Ok(())
    } else {
        Err(ZiError::schema(format!(
            "{who}: record has {} values, input schema has {expected} columns",
            record.len()
        )))
    }
}
