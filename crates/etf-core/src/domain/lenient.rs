//! 타입이 흔들리는 원격 컬럼을 위한 관대한 역직렬화.
//!
//! 조인 키가 아닌 컬럼은 타입이 예상과 달라도 행 전체를 버리지 않고
//! 값만 바꾸거나 비웁니다.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Text(String),
    Int(i64),
    Float(f64),
    Other(IgnoredAny),
}

/// 문자열은 그대로, 숫자는 문자열로 바꾸고 그 외(null, 객체, 배열, 불리언)는 `None`.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(s) => Some(s),
        Loose::Int(n) => Some(n.to_string()),
        Loose::Float(n) => Some(n.to_string()),
        Loose::Other(_) => None,
    })
}

/// 숫자는 그대로, 숫자 문자열은 해석하고 그 외는 `None`.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Int(n) => Some(n as f64),
        Loose::Float(n) => Some(n),
        Loose::Text(s) => s.trim().parse().ok(),
        Loose::Other(_) => None,
    })
}
