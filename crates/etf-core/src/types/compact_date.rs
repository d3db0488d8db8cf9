//! 8자리 숫자 문자열(YYYYMMDD) 날짜 변환.
//!
//! 원격 API는 모든 날짜를 `20240115` 형태로 주고받습니다.
//! 저장소와 도메인 모델은 `NaiveDate`를 사용하므로 경계에서 변환합니다.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};

/// 와이어 날짜 형식.
pub const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

/// YYYYMMDD 문자열을 날짜로 변환합니다.
///
/// 비어 있거나 해석할 수 없는 값은 `None`을 반환합니다.
pub fn parse_compact_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(s, COMPACT_DATE_FORMAT).ok()
}

/// `parse_compact_date`의 엄격한 버전. 실패 시 필드명을 담은 에러를 반환합니다.
pub fn require_compact_date(field: &'static str, s: &str) -> CoreResult<NaiveDate> {
    parse_compact_date(s).ok_or_else(|| CoreError::InvalidDate {
        field,
        value: s.to_string(),
    })
}

/// 날짜를 YYYYMMDD 문자열로 변환합니다.
pub fn format_compact_date(date: NaiveDate) -> String {
    date.format(COMPACT_DATE_FORMAT).to_string()
}
