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

//! Time parsing and field derivation.
//!
//! Time values are epoch milliseconds in UTC. Zones only matter when a wall
//! clock is involved: parsing local text, or extracting calendar fields.
//! Formats are chrono `strftime` patterns stored as text; they are checked and
//! their zones parsed once, at bind time.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::metadata::{parse_zone, ZiColumnMetaData, ZiColumnType};
use crate::record::{cell, ZiRecord};
use crate::schema::{ZiColumn, ZiSchema};
use crate::transforms::{
    insert_columns_after, splice_columns, typed_column, with_cell, ZiTransformOp,
};
use crate::value::ZiValue;

/// Units for time arithmetic and window sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiTimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl ZiTimeUnit {
    pub fn millis(self) -> i64 {
        match self {
            ZiTimeUnit::Milliseconds => 1,
            ZiTimeUnit::Seconds => 1_000,
            ZiTimeUnit::Minutes => 60_000,
            ZiTimeUnit::Hours => 3_600_000,
            ZiTimeUnit::Days => 86_400_000,
        }
    }

    /// `amount` of this unit in milliseconds.
    pub fn to_millis(self, amount: i64) -> Result<i64> {
        amount.checked_mul(self.millis()).ok_or_else(|| {
            ZiError::validation(format!("{amount} {self:?} overflows a millisecond count"))
        })
    }
}

pub(crate) fn check_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ZiError::validation(format!("invalid time format '{format}'")));
    }
    Ok(())
}

pub(crate) fn format_instant(instant: &DateTime<Tz>, format: &str) -> Result<String> {
    let mut text = String::new();
    write!(text, "{}", instant.format(format))
        .map_err(|_| ZiError::validation(format!("invalid time format '{format}'")))?;
    Ok(text)
}

pub(crate) fn instant(zone: Tz, millis: i64) -> Result<DateTime<Tz>> {
    zone.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| ZiError::conversion(millis.to_string(), "time"))
}

/// Parses wall-clock text into a [`ZiValue::Time`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiStringToTime {
    pub column: String,
    /// chrono `strftime` pattern, e.g. `%Y-%m-%d %H:%M:%S`.
    pub format: String,
    /// IANA zone the text is local to.
    pub zone: String,
}

impl ZiStringToTime {
    pub fn new(column: impl Into<String>, format: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            format: format.into(),
            zone: zone.into(),
        }
    }

    fn parse(&self, zone: Tz, text: &str) -> Result<i64> {
        let text = text.trim();
        let naive = NaiveDateTime::parse_from_str(text, &self.format).or_else(|_| {
            NaiveDate::parse_from_str(text, &self.format)
                .map(|date| date.and_time(NaiveTime::MIN))
        });
        let naive = naive.map_err(|_| ZiError::conversion(text, format!("time ({})", self.format)))?;
        zone.from_local_datetime(&naive)
            .earliest()
            .map(|instant| instant.timestamp_millis())
            .ok_or_else(|| ZiError::conversion(text, format!("time in zone {}", self.zone)))
    }
}

/// A column position with the zone its wall clock is read in.
#[derive(Clone, Copy, Debug)]
pub struct ZiBoundZone {
    pub index: usize,
    pub zone: Tz,
}

impl ZiTransformOp for ZiStringToTime {
    type Bound = ZiBoundZone;

    fn name(&self) -> &'static str {
        "string_to_time"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        let ZiBoundZone { index, .. } = self.bind(input)?;
        splice_columns(
            input,
            index,
            vec![ZiColumn::new(&self.column, ZiColumnMetaData::time(&self.zone))],
        )
    }

    fn bind(&self, input: &ZiSchema) -> Result<ZiBoundZone> {
        let index = typed_column(input, &self.column, &[ZiColumnType::String], self.name())?;
        check_format(&self.format)?;
        Ok(ZiBoundZone {
            index,
            zone: parse_zone(&self.zone)?,
        })
    }

    fn map(&self, bound: &ZiBoundZone, record: &ZiRecord) -> Result<ZiRecord> {
        let millis = self.parse(bound.zone, &cell(record, bound.index)?.to_text())?;
        Ok(with_cell(record, bound.index, ZiValue::Time(millis)))
    }
}

/// Calendar fields extractable from a time value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiTimeField {
    Year,
    MonthOfYear,
    DayOfMonth,
    /// ISO weekday, Monday = 1 through Sunday = 7.
    DayOfWeek,
    DayOfYear,
    HourOfDay,
    MinuteOfHour,
    SecondOfMinute,
    MillisOfSecond,
}

impl ZiTimeField {
    /// Inclusive value range of the field.
    pub fn bounds(self) -> (Option<i32>, Option<i32>) {
        match self {
            ZiTimeField::Year => (None, None),
            ZiTimeField::MonthOfYear => (Some(1), Some(12)),
            ZiTimeField::DayOfMonth => (Some(1), Some(31)),
            ZiTimeField::DayOfWeek => (Some(1), Some(7)),
            ZiTimeField::DayOfYear => (Some(1), Some(366)),
            ZiTimeField::HourOfDay => (Some(0), Some(23)),
            ZiTimeField::MinuteOfHour => (Some(0), Some(59)),
            ZiTimeField::SecondOfMinute => (Some(0), Some(59)),
            ZiTimeField::MillisOfSecond => (Some(0), Some(999)),
        }
    }

    pub fn extract<Z: TimeZone>(self, instant: &DateTime<Z>) -> i32 {
        let value = match self {
            ZiTimeField::Year => return instant.year(),
            ZiTimeField::MonthOfYear => instant.month(),
            ZiTimeField::DayOfMonth => instant.day(),
            ZiTimeField::DayOfWeek => instant.weekday().number_from_monday(),
            ZiTimeField::DayOfYear => instant.ordinal(),
            ZiTimeField::HourOfDay => instant.hour(),
            ZiTimeField::MinuteOfHour => instant.minute(),
            ZiTimeField::SecondOfMinute => instant.second(),
            // Leap-second representation can exceed 999.
            ZiTimeField::MillisOfSecond => instant.timestamp_subsec_millis().min(999),
        };
        value as i32
    }
}

/// What a derived column holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZiDerivedField {
    /// An Integer calendar field in the time column's zone.
    Integer(ZiTimeField),
    /// The instant formatted as text in the given zone.
    Formatted { format: String, zone: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiDerivedColumn {
    pub name: String,
    pub field: ZiDerivedField,
}

/// Adds columns derived from a time column without altering it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiDeriveColumnsFromTime {
    pub column: String,
    /// Derived columns go after this column; defaults to the time column.
    #[serde(default)]
    pub insert_after: Option<String>,
    pub derived: Vec<ZiDerivedColumn>,
}

impl ZiDeriveColumnsFromTime {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            insert_after: None,
            derived: Vec::new(),
        }
    }

    pub fn insert_after(mut self, column: impl Into<String>) -> Self {
        self.insert_after = Some(column.into());
        self
    }

    pub fn add_integer(mut self, name: impl Into<String>, field: ZiTimeField) -> Self {
        self.derived.push(ZiDerivedColumn {
            name: name.into(),
            field: ZiDerivedField::Integer(field),
        });
        self
    }

    pub fn add_formatted(
        mut self,
        name: impl Into<String>,
        format: impl Into<String>,
        zone: impl Into<String>,
    ) -> Self {
        self.derived.push(ZiDerivedColumn {
            name: name.into(),
            field: ZiDerivedField::Formatted {
                format: format.into(),
                zone: zone.into(),
            },
        });
        self
    }

    fn anchor(&self, input: &ZiSchema) -> Result<usize> {
        input.index_of(self.insert_after.as_deref().unwrap_or(&self.column))
    }
}

/// A derived field with its output zone already parsed.
#[derive(Clone, Debug)]
pub enum ZiBoundField {
    Integer(ZiTimeField),
    Formatted { format: String, zone: Tz },
}

#[derive(Clone, Debug)]
pub struct ZiBoundDerivation {
    pub index: usize,
    pub anchor: usize,
    /// Zone of the source time column.
    pub zone: Tz,
    pub fields: Vec<ZiBoundField>,
}

impl ZiTransformOp for ZiDeriveColumnsFromTime {
    type Bound = ZiBoundDerivation;

    fn name(&self) -> &'static str {
        "derive_columns_from_time"
    }

    fn output_schema(&self, input: &ZiSchema) -> Result<ZiSchema> {
        let bound = self.bind(input)?;
        let added = self
            .derived
            .iter()
            .zip(&bound.fields)
            .map(|(derived, field)| {
                let meta = match field {
                    ZiBoundField::Integer(field) => {
                        let (min, max) = field.bounds();
                        ZiColumnMetaData::integer(min, max)
                    }
                    ZiBoundField::Formatted { .. } => ZiColumnMetaData::string(),
                };
                ZiColumn::new(&derived.name, meta)
            })
            .collect();
        insert_columns_after(input, bound.anchor, added)
    }

    fn bind(&self, input: &ZiSchema) -> Result<ZiBoundDerivation> {
        let index = typed_column(input, &self.column, &[ZiColumnType::Time], self.name())?;
        let anchor = self.anchor(input)?;
        if self.derived.is_empty() {
            return Err(ZiError::validation(format!(
                "{}: no derived columns requested",
                self.name()
            )));
        }
        let zone = input
            .meta(index)
            .zone()
            .ok_or_else(|| ZiError::schema(format!("column '{}' has no time zone", self.column)))?;
        let fields = self
            .derived
            .iter()
            .map(|derived| {
                Ok(match &derived.field {
                    ZiDerivedField::Integer(field) => ZiBoundField::Integer(*field),
                    ZiDerivedField::Formatted { format, zone } => {
                        check_format(format)?;
                        ZiBoundField::Formatted {
                            format: format.clone(),
                            zone: parse_zone(zone)?,
                        }
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ZiBoundDerivation {
            index,
            anchor,
            zone: parse_zone(zone)?,
            fields,
        })
    }

    fn map(&self, bound: &ZiBoundDerivation, record: &ZiRecord) -> Result<ZiRecord> {
        let anchor = bound.anchor;
        let millis = cell(record, bound.index)?.to_time()?;
        let local = instant(bound.zone, millis)?;

        let mut derived = Vec::with_capacity(bound.fields.len());
        for field in &bound.fields {
            derived.push(match field {
                ZiBoundField::Integer(field) => ZiValue::Integer(field.extract(&local)),
                ZiBoundField::Formatted { format, zone } => {
                    let shifted = local.with_timezone(zone);
                    ZiValue::Text(format_instant(&shifted, format)?)
                }
            });
        }

        let mut out = Vec::with_capacity(record.len() + derived.len());
        out.extend_from_slice(&record[..=anchor]);
        out.extend(derived);
        out.extend_from_slice(&record[anchor + 1..]);
        Ok(out)
    }
}
