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

//! # Zivec Reader Module
//!
//! Record sources consumed by [`crate::process::ZiTransformProcess`].
//!
//! - [`ZiCollectionRecordReader`] / [`ZiCollectionSequenceReader`]: in-memory
//! - [`ZiJsonLinesRecordReader`]: one JSON array of cells per line, e.g.
//!   `[{"Integer":1},{"Text":"a"},"Null"]`; blank lines are skipped

use std::io::{BufRead, Seek, SeekFrom};

use crate::errors::{Result, ZiError};
use crate::record::{ZiRecord, ZiSequence};

/// A resettable stream of records.
pub trait ZiRecordReader {
    /// Next record, or `None` once exhausted.
    fn next_record(&mut self) -> Result<Option<ZiRecord>>;

    /// Rewinds to the first record.
    fn reset(&mut self) -> Result<()>;

    fn has_next(&mut self) -> Result<bool>;
}

/// A resettable stream of sequences.
pub trait ZiSequenceReader {
    fn next_sequence(&mut self) -> Result<Option<ZiSequence>>;

    fn reset(&mut self) -> Result<()>;

    fn has_next(&mut self) -> Result<bool>;
}

/// Serves records from memory.
#[derive(Clone, Debug, Default)]
pub struct ZiCollectionRecordReader {
    records: Vec<ZiRecord>,
    position: usize,
}

impl ZiCollectionRecordReader {
    pub fn new(records: Vec<ZiRecord>) -> Self {
        Self {
            records,
            position: 0,
        }
    }
}

impl ZiRecordReader for ZiCollectionRecordReader {
    fn next_record(&mut self) -> Result<Option<ZiRecord>> {
        let record = self.records.get(self.position).cloned();
        if record.is_some() {
            self.position += 1;
        }
        Ok(record)
    }

    fn reset(&mut self) -> Result<()> {
        self.position = 0;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        Ok(self.position < self.records.len())
    }
}

/// Serves sequences from memory.
#[derive(Clone, Debug, Default)]
pub struct ZiCollectionSequenceReader {
    sequences: Vec<ZiSequence>,
    position: usize,
}

impl ZiCollectionSequenceReader {
    pub fn new(sequences: Vec<ZiSequence>) -> Self {
        Self {
            sequences,
            position: 0,
        }
    }
}

impl ZiSequenceReader for ZiCollectionSequenceReader {
    fn next_sequence(&mut self) -> Result<Option<ZiSequence>> {
        let sequence = self.sequences.get(self.position).cloned();
        if sequence.is_some() {
            self.position += 1;
        }
        Ok(sequence)
    }

    fn reset(&mut self) -> Result<()> {
        self.position = 0;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        Ok(self.position < self.sequences.len())
    }
}

/// Reads JSON-encoded records line by line from a seekable buffer.
#[derive(Debug)]
pub struct ZiJsonLinesRecordReader<R> {
    reader: R,
    line: usize,
    pending: Option<ZiRecord>,
}

impl<R: BufRead + Seek> ZiJsonLinesRecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            pending: None,
        }
    }

    fn read_ahead(&mut self) -> Result<Option<ZiRecord>> {
        let mut buffer = String::new();
        loop {
            buffer.clear();
            if self.reader.read_line(&mut buffer)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let content = buffer.trim();
            if content.is_empty() {
                continue;
            }
            return serde_json::from_str(content)
                .map(Some)
                .map_err(|err| ZiError::Serde(format!("line {}: {err}", self.line)));
        }
    }
}

impl<R: BufRead + Seek> ZiRecordReader for ZiJsonLinesRecordReader<R> {
    fn next_record(&mut self) -> Result<Option<ZiRecord>> {
        match self.pending.take() {
            Some(record) => Ok(Some(record)),
            None => self.read_ahead(),
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.line = 0;
        self.pending = None;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        if self.pending.is_none() {
            self.pending = self.read_ahead()?;
        }
        Ok(self.pending.is_some())
    }
}
