#![no_main]

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use loginmon_core::event::{CanonicalPoint, FieldValue};
use loginmon_influx_sink::line_protocol::encode_point;

#[derive(Arbitrary, Debug)]
struct FuzzPoint {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: Vec<(String, FuzzValue)>,
    nanos: u64,
}

#[derive(Arbitrary, Debug)]
enum FuzzValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

fuzz_target!(|input: FuzzPoint| {
    let fields = input
        .fields
        .into_iter()
        .map(|(k, v)| {
            let value = match v {
                FuzzValue::String(s) => FieldValue::String(s),
                FuzzValue::Integer(i) => FieldValue::Integer(i),
                FuzzValue::Float(f) => FieldValue::Float(f),
                FuzzValue::Boolean(b) => FieldValue::Boolean(b),
            };
            (k, value)
        })
        .collect();

    let point = CanonicalPoint::new(
        input.measurement,
        input.tags,
        fields,
        SystemTime::UNIX_EPOCH + Duration::from_nanos(input.nanos),
    );

    // 성공하면 구분 공백이 정확히 두 개인 한 줄이어야 하고, 실패하면 출력이 그대로여야 한다
    let mut out = String::from("prefix");
    match encode_point(&point, &mut out) {
        Ok(()) => {
            assert!(!out.contains('\n'));
            assert_eq!(separator_spaces(&out["prefix".len()..]), 2, "{out:?}");
        }
        Err(_) => assert_eq!(out, "prefix"),
    }
});

/// 파서처럼 읽었을 때 섹션을 나누는 공백 수
fn separator_spaces(line: &str) -> usize {
    let mut spaces = 0;
    let mut in_string = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '"' if in_string => in_string = false,
            '=' if spaces == 1 && !in_string && chars.peek() == Some(&'"') => {
                chars.next();
                in_string = true;
            }
            ' ' if !in_string => spaces += 1,
            _ => {}
        }
    }
    spaces
}
