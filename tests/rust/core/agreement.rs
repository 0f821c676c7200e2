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

//! # Zivec Agreement Tests
//!
//! Property tests: for records valid under the input schema, every transform
//! either reports a data error or produces records that are valid under its
//! output schema and exactly as wide as `transform(schema)` says.
//!
//! ```bash
//! cargo test --test agreement
//! ```

use std::collections::HashSet;

use proptest::prelude::*;

use zivec::{
    ZiBindable, ZiCategoricalToInteger, ZiCategoricalToOneHot, ZiConditionOp, ZiConditionSpec,
    ZiConditionalCopyValue, ZiConditionalReplaceValue, ZiDeriveColumnsFromTime,
    ZiDoubleColumnsMathOp, ZiDoubleMathOp, ZiDuplicateColumns, ZiError, ZiIntegerColumnsMathOp,
    ZiIntegerMathOp, ZiIntegerToCategorical, ZiLog2Normalizer, ZiLongColumnsMathOp,
    ZiLongMathOp, ZiMapAllStringsExceptList, ZiMathOp, ZiMinMaxNormalizer, ZiPlaceholder,
    ZiRecord, ZiReduceOp, ZiReduceSequenceByWindow, ZiReducer, ZiRemoveColumns,
    ZiRemoveWhiteSpace, ZiRenameColumns, ZiReorderColumns, ZiReplaceEmptyInteger,
    ZiReplaceEmptyString, ZiReplaceInvalidWithValue, ZiSchema, ZiStandardizeNormalizer,
    ZiStringListToCategoricalSet, ZiStringMap, ZiStringToCategorical, ZiStringToTime,
    ZiSubtractMeanNormalizer, ZiTimeField, ZiTimeMathOp, ZiTimeUnit, ZiTransform,
    ZiTransformSpec, ZiUnknownPolicy, ZiValue, ZiWindow,
};

const VARIANTS: usize = 31;

fn schema() -> ZiSchema {
    ZiSchema::builder()
        .add_column_integer_bounded("n", 0, 100)
        .add_column_double("x")
        .add_column_categorical("c", ["a", "b", "c"])
        .add_column_string("s")
        .add_column_time("t", "UTC")
        .add_column_long_bounded("l", -1_000_000, 1_000_000)
        .add_column_double_bounded("y", 0.5, 100.0)
        .add_column_integer_bounded("k", 0, 2)
        .add_column_string("date")
        .add_column_string("tags")
        .build()
        .unwrap()
}

/// Every transform kind, paired with whether a valid input may still fail
/// to map (overflowing doubles, sequence-only transforms).
fn specs() -> Vec<(ZiTransformSpec, bool)> {
    vec![
        (ZiCategoricalToInteger::new("c").into(), false),
        (ZiCategoricalToOneHot::new("c").into(), false),
        (ZiIntegerToCategorical::new("k", ["zero", "one", "two"]).into(), false),
        (
            ZiIntegerToCategorical::new("n", ["zero", "one"])
                .on_unknown(ZiUnknownPolicy::PassThrough)
                .into(),
            false,
        ),
        (ZiStringToCategorical::new("c", ["a", "b", "c", "d"]).into(), false),
        (
            ZiStringToCategorical::new("s", ["ab"])
                .on_unknown(ZiUnknownPolicy::PassThrough)
                .into(),
            false,
        ),
        (ZiRemoveColumns::new(["x", "s"]).into(), false),
        (ZiRenameColumns::new(["n", "tags"], ["m", "labels"]).into(), false),
        (ZiReorderColumns::new(["t", "s"]).into(), false),
        (ZiDuplicateColumns::new(["c", "t"], ["c2", "t2"]).into(), false),
        (
            ZiConditionalReplaceValue::new(
                "n",
                0,
                ZiConditionSpec::column("n", ZiConditionOp::LessThan, 2.5),
            )
            .into(),
            false,
        ),
        (
            ZiConditionalCopyValue::new(
                "l",
                "n",
                ZiConditionSpec::column("x", ZiConditionOp::LessThan, 0.0),
            )
            .into(),
            false,
        ),
        (ZiIntegerMathOp::new("n", ZiMathOp::Add, 5).into(), false),
        (ZiIntegerMathOp::new("n", ZiMathOp::Multiply, -3).into(), false),
        (ZiIntegerMathOp::new("n", ZiMathOp::Modulus, 7).into(), false),
        (ZiLongMathOp::new("l", ZiMathOp::Multiply, 1000).into(), false),
        (ZiDoubleMathOp::new("x", ZiMathOp::Multiply, 1.0e10).into(), true),
        (ZiDoubleMathOp::new("y", ZiMathOp::ReverseDivide, 10.0).into(), false),
        (ZiIntegerColumnsMathOp::new("nk", ZiMathOp::Add, ["n", "k"]).into(), false),
        (ZiLongColumnsMathOp::new("ll", ZiMathOp::Subtract, ["l", "l"]).into(), false),
        (ZiDoubleColumnsMathOp::new("xy", ZiMathOp::Divide, ["x", "y"]).into(), true),
        (ZiTimeMathOp::new("t", ZiMathOp::Add, 1, ZiTimeUnit::Days).into(), false),
        (ZiMinMaxNormalizer::min_max("n", 0.0, 100.0).into(), false),
        (ZiStandardizeNormalizer::new("x", 0.0, 10.0).into(), false),
        (ZiSubtractMeanNormalizer::new("y", 5.0).into(), false),
        (ZiLog2Normalizer::new("y", 10.0, 0.5, 1.0).into(), false),
        (ZiReplaceEmptyInteger::new("n", 0).into(), false),
        (ZiReplaceInvalidWithValue::new("n", ZiPlaceholder::MinBound).into(), false),
        (ZiMapAllStringsExceptList::new("s", "other", ["ab"]).into(), false),
        (ZiRemoveWhiteSpace::new("s").into(), false),
        (ZiReplaceEmptyString::new("s", "empty").into(), false),
        (ZiStringMap::new("s", [("q", "Q")]).into(), false),
        (
            ZiStringListToCategoricalSet::new(
                "tags",
                ["has_a", "has_b", "has_c"],
                ["a", "b", "c"],
                ",",
            )
            .into(),
            false,
        ),
        (ZiStringToTime::new("date", "%Y-%m-%d", "Europe/Berlin").into(), false),
        (
            ZiDeriveColumnsFromTime::new("t")
                .insert_after("n")
                .add_integer("year", ZiTimeField::Year)
                .add_integer("dow", ZiTimeField::DayOfWeek)
                .add_integer("millis", ZiTimeField::MillisOfSecond)
                .add_formatted("iso", "%Y-%m-%dT%H:%M:%S", "Asia/Tokyo")
                .into(),
            false,
        ),
        (window().into(), true),
    ]
}

fn window() -> ZiReduceSequenceByWindow {
    ZiReduceSequenceByWindow::new(
        ZiWindow::count(2),
        ZiReducer::new(ZiReduceOp::TakeFirst)
            .with_op("n", ZiReduceOp::Sum)
            .with_op("x", ZiReduceOp::Mean)
            .with_op("y", ZiReduceOp::Min)
            .with_op("s", ZiReduceOp::Count)
            .with_op("c", ZiReduceOp::CountUnique),
    )
}

/// Errors a transform may report for a record that is valid on input.
fn is_data_error(error: &ZiError) -> bool {
    matches!(
        error,
        ZiError::Transform { .. } | ZiError::ConstraintViolation { .. } | ZiError::TypeConversion { .. }
    )
}

fn double() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -1.0e6f64..1.0e6,
        1 => Just(f64::MAX),
        1 => Just(-f64::MAX),
        1 => Just(0.0),
    ]
}

fn tags() -> impl Strategy<Value = String> {
    prop::sample::subsequence(vec!["a", "b", "c"], 0..=3).prop_map(|tokens| tokens.join(","))
}

fn valid_record() -> impl Strategy<Value = ZiRecord> {
    (
        (
            0i32..=100,
            double(),
            prop::sample::select(vec!["a", "b", "c"]),
            "[a-z ]{0,4}",
            0i64..4_102_444_800_000,
        ),
        (
            -1_000_000i64..=1_000_000,
            0.5f64..=100.0,
            0i32..=2,
            (1970i32..2100, 1u32..=12, 1u32..=28),
            tags(),
        ),
    )
        .prop_map(|((n, x, c, s, t), (l, y, k, (year, month, day), tags))| {
            vec![
                ZiValue::Integer(n),
                ZiValue::Double(x),
                ZiValue::from(c),
                ZiValue::Text(s),
                ZiValue::Time(t),
                ZiValue::Long(l),
                ZiValue::Double(y),
                ZiValue::Integer(k),
                ZiValue::Text(format!("{year:04}-{month:02}-{day:02}")),
                ZiValue::Text(tags),
            ]
        })
}

#[test]
fn test_every_transform_kind_is_covered() {
    let names: HashSet<&'static str> = specs().iter().map(|(spec, _)| spec.name()).collect();
    assert_eq!(names.len(), VARIANTS);
}

#[test]
fn test_record_map_rejects_sequence_only_transform() {
    let input = schema();
    let transform = ZiTransform::bound(window().into(), &input).unwrap();
    let record = vec![
        ZiValue::Integer(1),
        ZiValue::Double(1.0),
        ZiValue::from("a"),
        ZiValue::Text("s".into()),
        ZiValue::Time(0),
        ZiValue::Long(0),
        ZiValue::Double(1.0),
        ZiValue::Integer(0),
        ZiValue::Text("2016-01-01".into()),
        ZiValue::Text(String::new()),
    ];
    assert!(matches!(transform.map(&record), Err(ZiError::Transform { .. })));
}

proptest! {
    #[test]
    fn test_mapped_records_match_output_schema(record in valid_record()) {
        let input = schema();
        prop_assert!(input.is_valid_record(&record));

        for (spec, may_fail) in specs() {
            let expected = spec.transform(&input).unwrap();
            let transform = ZiTransform::bound(spec, &input).unwrap();
            prop_assert_eq!(transform.output_schema().unwrap(), &expected);

            match transform.map(&record) {
                Ok(mapped) => {
                    prop_assert_eq!(mapped.len(), expected.num_columns());
                    prop_assert!(
                        expected.is_valid_record(&mapped),
                        "{} produced {:?}",
                        transform.name(),
                        mapped
                    );
                }
                Err(error) => {
                    prop_assert!(may_fail, "{} failed: {}", transform.name(), error);
                    prop_assert!(is_data_error(&error), "{} failed: {}", transform.name(), error);
                }
            }
        }
    }

    #[test]
    fn test_reduced_sequences_match_output_schema(
        sequence in prop::collection::vec(valid_record(), 1..8)
    ) {
        let input = schema();
        let spec = ZiTransformSpec::from(window());
        let expected = spec.transform(&input).unwrap();
        let transform = ZiTransform::bound(spec, &input).unwrap();

        match transform.map_sequence(&sequence) {
            Ok(reduced) => {
                prop_assert_eq!(reduced.len(), sequence.len().div_ceil(2));
                for record in &reduced {
                    prop_assert_eq!(record.len(), expected.num_columns());
                    prop_assert!(expected.is_valid_record(record), "reduced to {:?}", record);
                }
            }
            Err(error) => prop_assert!(is_data_error(&error), "window failed: {}", error),
        }
    }

    /// Chained transforms agree with the schema chained the same way.
    #[test]
    fn test_chained_schemas_agree(record in valid_record()) {
        let mut schema = schema();
        let mut current = record;
        for spec in [
            ZiTransformSpec::from(ZiCategoricalToOneHot::new("c")),
            ZiIntegerMathOp::new("n", ZiMathOp::Add, 5).into(),
            ZiStringToTime::new("date", "%Y-%m-%d", "UTC").into(),
            ZiRemoveColumns::new(["s"]).into(),
        ] {
            let transform = ZiTransform::bound(spec, &schema).unwrap();
            current = transform.map(&current).unwrap();
            schema = transform.output_schema().unwrap().clone();
            prop_assert!(schema.is_valid_record(&current));
        }
        prop_assert_eq!(current.len(), schema.num_columns());
    }
}
