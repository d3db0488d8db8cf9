//! 펀드 기본 정보.
//!
//! 원격 API의 펀드 목록 행(`RawFundReference`)과 저장소에 기록되는
//! 정규화된 모델(`FundReference`)을 정의합니다.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::lenient::{lenient_number, lenient_text};
use crate::error::{CoreError, CoreResult};
use crate::types::parse_compact_date;

/// 원격 API에서 받은 펀드 기본 정보 행.
///
/// 날짜는 YYYYMMDD 문자열 그대로 보관합니다. 스키마에 없는 필드
/// (수수료, 벤치마크 등)는 역직렬화 시 버려집니다. 펀드 코드 외 컬럼은
/// 타입이 달라도 행을 버리지 않고 해당 값만 비웁니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFundReference {
    #[serde(default)]
    pub ts_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub management: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub custodian: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub fund_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub found_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub list_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub issue_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub delist_date: Option<String>,
    /// 발행 규모 (억份)
    #[serde(default, deserialize_with = "lenient_number")]
    pub issue_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub market: Option<String>,
}

/// 펀드 기본 정보 (`etf_basic` 테이블 한 행).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct FundReference {
    /// 펀드 코드 (예: 510300.SH)
    pub ts_code: String,
    /// 약칭
    pub name: Option<String>,
    /// 운용사
    pub management: Option<String>,
    /// 수탁사
    pub custodian: Option<String>,
    /// 투자 유형
    pub fund_type: Option<String>,
    /// 설정일
    pub found_date: Option<NaiveDate>,
    /// 만기일
    pub due_date: Option<NaiveDate>,
    /// 상장일
    pub list_date: Option<NaiveDate>,
    /// 발행일
    pub issue_date: Option<NaiveDate>,
    /// 상장폐지일 (`None`이면 운용 중)
    pub delist_date: Option<NaiveDate>,
    /// 발행 규모 (억份)
    pub issue_amount: Option<f64>,
    /// 시장 구분 (E: 장내, O: 장외)
    pub market: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl FundReference {
    /// 원시 행을 정규화합니다.
    ///
    /// 펀드 코드가 없으면 거부하고, 해석할 수 없는 날짜는 `None`으로 둡니다.
    pub fn from_raw(raw: RawFundReference) -> CoreResult<Self> {
        let ts_code = non_blank(raw.ts_code).ok_or(CoreError::MissingKey { field: "ts_code" })?;

        Ok(Self {
            ts_code,
            name: non_blank(raw.name),
            management: non_blank(raw.management),
            custodian: non_blank(raw.custodian),
            fund_type: non_blank(raw.fund_type),
            found_date: date_field(raw.found_date.as_deref()),
            due_date: date_field(raw.due_date.as_deref()),
            list_date: date_field(raw.list_date.as_deref()),
            issue_date: date_field(raw.issue_date.as_deref()),
            delist_date: date_field(raw.delist_date.as_deref()),
            issue_amount: raw.issue_amount.filter(|v| v.is_finite()),
            market: non_blank(raw.market),
            created_at: None,
            updated_at: None,
        })
    }

    /// 상장폐지되지 않은 펀드인지 여부.
    pub fn is_active(&self) -> bool {
        self.delist_date.is_none()
    }
}

fn date_field(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(parse_compact_date)
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
