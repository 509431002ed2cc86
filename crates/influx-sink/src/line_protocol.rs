//! InfluxDB line protocol 인코더
//!
//! ```text
//! measurement[,tag=value...] field=value[,field=value...] timestamp_ns
//! ```
//!
//! # 이스케이프 규칙
//! | 요소 | 이스케이프 대상 |
//! |---|---|
//! | measurement | `,` 공백 |
//! | 태그 키/값, 필드 키 | `,` `=` 공백 |
//! | 문자열 필드 값 | `"` `\` (값은 큰따옴표로 감쌈) |
//!
//! 식별자 안의 백슬래시는 그대로 두지만, 구분자(`,` `=` 공백) 앞이나 값 끝에
//! 오는 연속 백슬래시는 `\\`로 두 배로 씁니다. 그렇지 않으면 뒤따르는 구분자가
//! 이스케이프된 것으로 읽혀 라인 전체가 깨집니다.
//!
//! 빈 태그 값은 생략합니다. 줄바꿈은 식별자에 쓸 수 없으므로 인코딩 에러입니다.

use std::fmt::Write as _;
use std::time::UNIX_EPOCH;

use loginmon_core::event::{CanonicalPoint, FieldValue};

use crate::error::InfluxError;

/// 포인트 목록을 줄바꿈으로 구분된 line protocol 본문으로 인코딩합니다.
pub fn encode_batch(points: &[CanonicalPoint]) -> Result<String, InfluxError> {
    let mut out = String::new();
    for point in points {
        encode_point(point, &mut out)?;
        out.push('\n');
    }
    Ok(out)
}

/// 포인트 하나를 `out` 끝에 인코딩합니다 (줄바꿈 없음).
///
/// # Errors
/// measurement가 비었거나, 필드가 없거나, 식별자에 줄바꿈이 있거나,
/// 타임스탬프가 epoch 이전이거나, 실수 값이 유한하지 않으면 [`InfluxError::Encode`].
pub fn encode_point(point: &CanonicalPoint, out: &mut String) -> Result<(), InfluxError> {
    if point.measurement().is_empty() {
        return Err(InfluxError::Encode("empty measurement".to_owned()));
    }
    if point.fields().is_empty() {
        return Err(InfluxError::Encode(format!(
            "point '{}' has no fields",
            point.measurement()
        )));
    }

    let start = out.len();
    let result = encode_into(point, out);
    if result.is_err() {
        out.truncate(start);
    }
    result
}

fn encode_into(point: &CanonicalPoint, out: &mut String) -> Result<(), InfluxError> {
    escape_into(point.measurement(), &[',', ' '], out)?;

    for (key, value) in point.tags() {
        if value.is_empty() {
            continue;
        }
        if key.is_empty() {
            return Err(InfluxError::Encode("empty tag key".to_owned()));
        }
        out.push(',');
        escape_into(key, &[',', '=', ' '], out)?;
        out.push('=');
        escape_into(value, &[',', '=', ' '], out)?;
    }

    out.push(' ');
    for (i, (key, value)) in point.fields().iter().enumerate() {
        if key.is_empty() {
            return Err(InfluxError::Encode("empty field key".to_owned()));
        }
        if i > 0 {
            out.push(',');
        }
        escape_into(key, &[',', '=', ' '], out)?;
        out.push('=');
        encode_field_value(value, out)?;
    }

    let nanos = point
        .timestamp()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| InfluxError::Encode("timestamp before unix epoch".to_owned()))?
        .as_nanos();
    let nanos = i64::try_from(nanos)
        .map_err(|_| InfluxError::Encode("timestamp out of range".to_owned()))?;
    let _ = write!(out, " {nanos}");

    Ok(())
}

fn escape_into(value: &str, special: &[char], out: &mut String) -> Result<(), InfluxError> {
    // 연속된 백슬래시 개수. 구분자나 값 끝 앞에 오면 두 배로 씁니다.
    let mut backslashes = 0;
    for ch in value.chars() {
        if ch == '\n' {
            return Err(InfluxError::Encode(format!(
                "newline not allowed in identifier {value:?}"
            )));
        }
        if ch == '\\' {
            backslashes += 1;
            continue;
        }

        let is_special = special.contains(&ch);
        push_backslashes(backslashes, is_special, out);
        backslashes = 0;

        if is_special {
            out.push('\\');
        }
        out.push(ch);
    }
    push_backslashes(backslashes, true, out);
    Ok(())
}

/// 백슬래시 `count`개를 씁니다. 파서가 다음 문자를 이스케이프로 읽지 않도록
/// `double`이면 각각을 `\\`로 씁니다.
fn push_backslashes(count: usize, double: bool, out: &mut String) {
    let total = if double { count * 2 } else { count };
    out.extend(std::iter::repeat_n('\\', total));
}

fn encode_field_value(value: &FieldValue, out: &mut String) -> Result<(), InfluxError> {
    match value {
        FieldValue::String(s) => {
            out.push('"');
            for ch in s.chars() {
                match ch {
                    '"' | '\\' => {
                        out.push('\\');
                        out.push(ch);
                    }
                    '\n' => out.push_str("\\n"),
                    _ => out.push(ch),
                }
            }
            out.push('"');
        }
        FieldValue::Integer(i) => {
            let _ = write!(out, "{i}i");
        }
        FieldValue::Float(f) => {
            if !f.is_finite() {
                return Err(InfluxError::Encode(format!("non-finite float {f}")));
            }
            let _ = write!(out, "{f}");
        }
        FieldValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
    }
    Ok(())
}
