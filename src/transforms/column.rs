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

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::record::ZiRecord;
use crate::schema::{ZiColumn, ZiSchema};
use crate::transforms::ZiTransformOp;

fn to_strings<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

fn check_pairing(who: &str, sources: &[String], targets: &[String]) -> Result<()> {
    if sources.len() == targets.len() {
        Ok(())
    } else {
        Err(ZiError::validation(format!(
            "{who}: {} source columns but {} new names",
            sources.len(),
            targets.len()
        )))
    }
}

/// Drops the listed columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiRemoveColumns {
    pub columns: Vec<String>,
}

impl ZiRemoveColumns {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: to_strings(columns),
        }
    }
}

impl ZiRemoveColumns {
    fn removed(&self, input: &ZiSchema) -> Result<HashSet<usize>> {
        let mut removed = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            removed.insert(input.index_of(column)?);
        }
        Ok(removed)
    }
}

impl ZiTransformOp for ZiRemoveColumns {
    type Bound = HashSet<usize>;

    fn name(&self) -> &'static str {
        "remove_columns"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        let removed = self.removed(input)?;
        let kept = input
            .columns()
            .iter()
            .enumerate()
            .filter(|(index, _)| !removed.contains(index))
            .map(|(_, column)| column.clone())
            .collect();
        ZiSchema::new(kept)
    }

    fn bind(&self, input: &ZiSchema) -> Result<HashSet<usize>> {
        self.removed(input)
    }

    fn map(&self, removed: &HashSet<usize>, record: &ZiRecord) -> Result<ZiRecord> {
        Ok(record
            .iter()
            .enumerate()
            .filter(|(index, _)| !removed.contains(index))
            .map(|(_, value)| value.clone())
            .collect())
    }
}

/// Renames columns pairwise; values are untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiRenameColumns {
    pub old_names: Vec<String>,
    pub new_names: Vec<String>,
}

impl ZiRenameColumns {
    pub fn new<I, J, S, T>(old_names: I, new_names: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            old_names: to_strings(old_names),
            new_names: to_strings(new_names),
        }
    }
}

impl ZiTransformOp for ZiRenameColumns {
    type Bound = ();

    fn name(&self) -> &'static str {
        "rename_columns"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        check_pairing(self.name(), &self.old_names, &self.new_names)?;
        let mut columns = input.columns().to_vec();
        for (old, new) in self.old_names.iter().zip(&self.new_names) {
            let index = input.index_of(old)?;
            columns[index].name = new.clone();
        }
        ZiSchema::new(columns)
    }

    fn bind(&self, _input: &ZiSchema) -> Result<()> {
        Ok(())
    }

    fn map(&self, _bound: &(), record: &ZiRecord) -> Result<ZiRecord> {
        Ok(record.clone())
    }
}

/// Moves the named columns to the front; the rest keep their relative order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiReorderColumns {
    pub order: Vec<String>,
}

impl ZiReorderColumns {
    pub fn new<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: to_strings(order),
        }
    }

    /// Source position of every output column.
    fn permutation(&self, input: &ZiSchema) -> Result<Vec<usize>> {
        if self.order.is_empty() {
            return Err(ZiError::validation("reorder_columns needs at least one column"));
        }
        let mut seen = HashSet::with_capacity(self.order.len());
        let mut permutation = Vec::with_capacity(input.num_columns());
        for column in &self.order {
            let index = input.index_of(column)?;
            if !seen.insert(index) {
                return Err(ZiError::validation(format!(
                    "reorder_columns lists '{column}' more than once"
                )));
            }
            permutation.push(index);
        }
        permutation.extend((0..input.num_columns()).filter(|index| !seen.contains(index)));
        Ok(permutation)
    }
}

impl ZiTransformOp for ZiReorderColumns {
    /// Source position of every output column.
    type Bound = Vec<usize>;

    fn name(&self) -> &'static str {
        "reorder_columns"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        let columns = self
            .permutation(input)?
            .into_iter()
            .map(|index| input.columns()[index].clone())
            .collect();
        ZiSchema::new(columns)
    }

    fn bind(&self, input: &ZiSchema) -> Result<Vec<usize>> {
        self.permutation(input)
    }

    fn map(&self, permutation: &Vec<usize>, record: &ZiRecord) -> Result<ZiRecord> {
        Ok(permutation
            .iter()
            .map(|index| record[*index].clone())
            .collect())
    }
}

/// Copies columns under new names, each copy directly after its source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiDuplicateColumns {
    pub columns: Vec<String>,
    pub new_names: Vec<String>,
}

impl ZiDuplicateColumns {
    pub fn new<I, J, S, T>(columns: I, new_names: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            columns: to_strings(columns),
            new_names: to_strings(new_names),
        }
    }
}

impl ZiTransformOp for ZiDuplicateColumns {
    /// Source position of every copy.
    type Bound = Vec<usize>;

    fn name(&self) -> &'static str {
        "duplicate_columns"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        let sources = self.bind(input)?;
        let mut columns = Vec::with_capacity(input.num_columns() + sources.len());
        for (index, column) in input.columns().iter().enumerate() {
            columns.push(column.clone());
            for (source, name) in sources.iter().zip(&self.new_names) {
                if *source == index {
                    columns.push(ZiColumn::new(name, column.meta.clone()));
                }
            }
        }
        ZiSchema::new(columns)
    }

    fn bind(&self, input: &ZiSchema) -> Result<Vec<usize>> {
        check_pairing(self.name(), &self.columns, &self.new_names)?;
        self.columns
            .iter()
            .map(|column| input.index_of(column))
            .collect()
    }

    fn map(&self, sources: &Vec<usize>, record: &ZiRecord) -> Result<ZiRecord> {
        let mut out = Vec::with_capacity(record.len() + sources.len());
        for (index, value) in record.iter().enumerate() {
            out.push(value.clone());
            for _ in sources.iter().filter(|source| **source == index) {
                out.push(value.clone());
            }
        }
        Ok(out)
    }
}
