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

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::metadata::{ZiColumnMetaData, ZiColumnType};
use crate::record::{cell, ZiRecord};
use crate::schema::{ZiColumn, ZiSchema};
use crate::transforms::{splice_columns, typed_column, with_cell, ZiTransformOp};
use crate::value::ZiValue;

fn string_column(input: &ZiSchema, column: &str, who: &str) -> Result<usize> {
    typed_column(input, column, &[ZiColumnType::String], who)
}

/// Rewrites a String column in place, dropping its old text constraints.
fn string_schema(input: &ZiSchema, column: &str, who: &str) -> Result<ZiSchema> {
    let index = string_column(input, column, who)?;
    splice_columns(input, index, vec![ZiColumn::new(column, ZiColumnMetaData::string())])
}

fn rewrite_text(
    index: usize,
    record: &ZiRecord,
    rewrite: impl FnOnce(String) -> String,
) -> Result<ZiRecord> {
    let text = cell(record, index)?.to_text();
    Ok(with_cell(record, index, ZiValue::Text(rewrite(text))))
}

/// Replaces every value outside `exceptions` with `new_value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiMapAllStringsExceptList {
    pub column: String,
    pub new_value: String,
    pub exceptions: BTreeSet<String>,
}

impl ZiMapAllStringsExceptList {
    pub fn new<I, S>(column: impl Into<String>, new_value: impl Into<String>, exceptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            new_value: new_value.into(),
            exceptions: exceptions.into_iter().map(Into::into).collect(),
        }
    }
}

impl ZiTransformOp for ZiMapAllStringsExceptList {
    type Bound = usize;

    fn name(&self) -> &'static str {
        "map_all_strings_except_list"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        string_schema(input, &self.column, self.name())
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        string_column(input, &self.column, self.name())
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        rewrite_text(index, record, |text| {
            if self.exceptions.contains(&text) {
                text
            } else {
                self.new_value.clone()
            }
        })
    }
}

/// Strips all whitespace characters, including interior ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiRemoveWhiteSpace {
    pub column: String,
}

impl ZiRemoveWhiteSpace {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl ZiTransformOp for ZiRemoveWhiteSpace {
    type Bound = usize;

    fn name(&self) -> &'static str {
        "remove_white_space"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        string_schema(input, &self.column, self.name())
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        string_column(input, &self.column, self.name())
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        rewrite_text(index, record, |text| {
            text.chars().filter(|c| !c.is_whitespace()).collect()
        })
    }
}

/// Fills empty (or null) text with `value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiReplaceEmptyString {
    pub column: String,
    pub value: String,
}

impl ZiReplaceEmptyString {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

impl ZiTransformOp for ZiReplaceEmptyString {
    type Bound = usize;

    fn name(&self) -> &'static str {
        "replace_empty_string"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        string_schema(input, &self.column, self.name())
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        string_column(input, &self.column, self.name())
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        rewrite_text(index, record, |text| {
            if text.is_empty() {
                self.value.clone()
            } else {
                text
            }
        })
    }
}

/// Exact-match lookup table; unmapped values pass through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiStringMap {
    pub column: String,
    pub mappings: BTreeMap<String, String>,
}

impl ZiStringMap {
    pub fn new<I, K, V>(column: impl Into<String>, mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            column: column.into(),
            mappings: mappings
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        }
    }
}

impl ZiTransformOp for ZiStringMap {
    type Bound = usize;

    fn name(&self) -> &'static str {
        "string_map"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        string_schema(input, &self.column, self.name())
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        string_column(input, &self.column, self.name())
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        rewrite_text(index, record, |text| match self.mappings.get(&text) {
            Some(mapped) => mapped.clone(),
            None => text,
        })
    }
}

/// Expands a delimited token list into one `"true"`/`"false"` categorical
/// column per known token.
///
/// `"a,c"` with tokens `[a, b, c]` becomes `true, false, true`. Empty text
/// yields all `"false"`; an unknown token is a constraint violation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiStringListToCategoricalSet {
    pub column: String,
    pub new_column_names: Vec<String>,
    pub category_tokens: Vec<String>,
    pub delimiter: String,
}

impl ZiStringListToCategoricalSet {
    pub fn new<I, J, S, T>(
        column: impl Into<String>,
        new_column_names: I,
        category_tokens: J,
        delimiter: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            column: column.into(),
            new_column_names: new_column_names.into_iter().map(Into::into).collect(),
            category_tokens: category_tokens.into_iter().map(Into::into).collect(),
            delimiter: delimiter.into(),
        }
    }
}

impl ZiTransformOp for ZiStringListToCategoricalSet {
    type Bound = usize;

    fn name(&self) -> &'static str {
        "string_list_to_categorical_set"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        let index = self.bind(input)?;
        let expanded = self
            .new_column_names
            .iter()
            .map(|name| ZiColumn::new(name, ZiColumnMetaData::categorical(["true", "false"])))
            .collect();
        splice_columns(input, index, expanded)
    }

    fn bind(&self, input: &ZiSchema) -> Result<usize> {
        let index = string_column(input, &self.column, self.name())?;
        if self.new_column_names.len() != self.category_tokens.len() {
            return Err(ZiError::validation(format!(
                "{}: {} column names for {} tokens",
                self.name(),
                self.new_column_names.len(),
                self.category_tokens.len()
            )));
        }
        if self.delimiter.is_empty() {
            return Err(ZiError::validation(format!("{}: empty delimiter", self.name())));
        }
        Ok(index)
    }

    fn map(&self, &index: &usize, record: &ZiRecord) -> Result<ZiRecord> {
        let text = cell(record, index)?.to_text();

        let mut present = vec![false; self.category_tokens.len()];
        if !text.is_empty() {
            for token in text.split(self.delimiter.as_str()) {
                let position = self
                    .category_tokens
                    .iter()
                    .position(|known| known == token)
                    .ok_or_else(|| {
                        ZiError::constraint(&self.column, token, "token is not a known category")
                    })?;
                present[position] = true;
            }
        }

        let mut out = Vec::with_capacity(record.len() + present.len());
        out.extend_from_slice(&record[..index]);
        out.extend(
            present
                .into_iter()
                .map(|flag| ZiValue::Text(flag.to_string())),
        );
        out.extend_from_slice(&record[index + 1..]);
        Ok(out)
    }
}
