//! 펀드 규모(份额) 시계열.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fund::non_blank;
use super::lenient::lenient_number;
use crate::error::{CoreError, CoreResult};
use crate::types::require_compact_date;

/// 원격 API에서 받은 펀드 규모 행.
///
/// 규모 컬럼은 `fund_share` 또는 `fd_share` 이름으로 올 수 있고,
/// 숫자가 아니면 값만 비웁니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawShareSize {
    #[serde(default)]
    pub ts_code: Option<String>,
    #[serde(default)]
    pub trade_date: Option<String>,
    #[serde(default, alias = "fd_share", deserialize_with = "lenient_number")]
    pub fund_share: Option<f64>,
}

/// `(ts_code, trade_date)` 단위의 펀드 규모 관측치.
///
/// 저장소에서 이 쌍은 유일하며 재수집 시 `fund_share`만 갱신됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct ShareSizeObservation {
    pub ts_code: String,
    pub trade_date: NaiveDate,
    /// 펀드 규모 (억份)
    pub fund_share: Option<f64>,
}

impl ShareSizeObservation {
    /// 원시 행을 정규화합니다.
    ///
    /// 펀드 코드와 거래일은 조인 키이므로 없거나 해석할 수 없으면 거부합니다.
    pub fn from_raw(raw: RawShareSize) -> CoreResult<Self> {
        let ts_code = non_blank(raw.ts_code).ok_or(CoreError::MissingKey { field: "ts_code" })?;
        let trade_date = raw
            .trade_date
            .as_deref()
            .ok_or(CoreError::MissingKey {
                field: "trade_date",
            })
            .and_then(|d| require_compact_date("trade_date", d))?;

        Ok(Self {
            ts_code,
            trade_date,
            fund_share: raw.fund_share.filter(|v| v.is_finite()),
        })
    }
}

/// 차트용 규모 포인트 (조회 전용).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct ShareSizePoint {
    pub trade_date: NaiveDate,
    pub fund_share: Option<f64>,
}
