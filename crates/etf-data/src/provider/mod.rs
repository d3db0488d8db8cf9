//! 데이터 Provider 모듈.
//!
//! ## 원격 데이터 소스
//! - `FundDataSource`: 펀드 기본 정보 / 규모 시계열 조회 계약
//! - `TushareClient`: Tushare Pro API 구현 (호출 간격 제한 + 재시도)
//! - `RetryPolicy`: 지수 백오프 재시도 정책

pub mod retry;
pub mod tushare;

use async_trait::async_trait;
use chrono::NaiveDate;
use etf_core::{RawFundReference, RawShareSize};

use crate::Result;

pub use retry::RetryPolicy;
pub use tushare::{TushareClient, TushareConfig, DEFAULT_API_URL};

/// 원격 데이터 소스 trait.
///
/// 구현체는 매 호출마다 네트워크를 사용하며 결과를 캐시하지 않습니다.
/// 재시도를 모두 소진하면 `DataError::RemoteFetch`를 반환합니다.
#[async_trait]
pub trait FundDataSource: Send + Sync {
    /// 시장별 펀드 기본 정보 조회 (빈 문자열은 제공자 기본값).
    async fn fetch_fund_references(&self, market: &str) -> Result<Vec<RawFundReference>>;

    /// 펀드 규모 시계열 조회.
    ///
    /// 날짜 범위는 양끝 포함이며, `None`은 제공자 기본값(전체 기간)입니다.
    async fn fetch_share_sizes(
        &self,
        ts_code: Option<&str>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<RawShareSize>>;
}
