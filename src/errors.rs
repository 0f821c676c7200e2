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

//! # Zivec Error Module
//!
//! This module defines the error types used throughout Zivec for consistent
//! error handling and reporting.
//!
//! ## Error Categories
//!
//! - **ColumnNotFound**: A transform, condition or filter referenced a column
//!   absent from the schema it was bound to
//! - **TypeConversion**: A value could not be converted to the required type
//! - **ConstraintViolation**: A value failed its column metadata check
//! - **State**: A transform was used before `set_input_schema`
//! - **Schema**: Malformed schema, wrong column type or record shape mismatch
//! - **Validation**: Invalid construction parameters
//! - **Transform**: Failures raised by an individual transform
//! - **Pipeline**: Failures while orchestrating a transform process
//! - **Serde**: Serialization/deserialization errors
//! - **Io**: Failures reading a record stream
//!
//! Every error is deterministic in its inputs; nothing here is retried.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Zivec.
pub type Result<T> = std::result::Result<T, ZiError>;

/// Canonical error enumeration for Zivec.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ZiError {
    /// A referenced column does not exist in the bound schema.
    #[error("column '{column}' not found in schema")]
    ColumnNotFound { column: String },

    /// A value could not be converted to the requested type.
    #[error("cannot convert '{value}' to {target}")]
    TypeConversion { value: String, target: String },

    /// A value does not satisfy its column metadata.
    #[error("constraint violation in column '{column}' for value '{value}': {message}")]
    ConstraintViolation {
        column: String,
        value: String,
        message: String,
    },

    /// An operation was invoked in the wrong lifecycle state.
    #[error("illegal state: {message}")]
    State { message: String },

    /// Errors caused by malformed schema or incompatible data layout.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Validation errors triggered by invalid parameters.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Any failure raised by a transform implementation.
    #[error("transform '{transform}' failed: {message}")]
    Transform { transform: String, message: String },

    /// Failures that occur while orchestrating a transform process.
    #[error("pipeline error at stage '{stage}': {message}")]
    Pipeline { stage: String, message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Failures while reading records from a stream.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ZiError {
    fn from(err: std::io::Error) -> Self {
        ZiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ZiError {
    fn from(err: serde_json::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for ZiError {
    fn from(err: serde_yaml::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl ZiError {
    /// Helper to construct column lookup failures.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        ZiError::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Helper to construct conversion failures.
    pub fn conversion(value: impl Into<String>, target: impl Into<String>) -> Self {
        ZiError::TypeConversion {
            value: value.into(),
            target: target.into(),
        }
    }

    /// Helper to construct constraint violations.
    pub fn constraint(
        column: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ZiError::ConstraintViolation {
            column: column.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Helper to construct lifecycle errors.
    pub fn state<T: Into<String>>(message: T) -> Self {
        ZiError::State {
            message: message.into(),
        }
    }

    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        ZiError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct schema errors.
    pub fn schema<T: Into<String>>(message: T) -> Self {
        ZiError::Schema {
            message: message.into(),
        }
    }

    /// Helper to construct transform errors.
    pub fn transform(name: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::Transform {
            transform: name.into(),
            message: message.into(),
        }
    }

    /// Helper to construct pipeline errors.
    pub fn pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::Pipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
