//! 저장소 게이트웨이.
//!
//! `etf_basic`, `etf_share_size` 두 테이블의 스키마와 트랜잭션 경계를 소유합니다.
//! 모든 읽기/쓰기는 `Database::with_session` 범위 안에서 실행됩니다.

pub mod database;
pub mod etf;

use async_trait::async_trait;
use chrono::NaiveDate;
use etf_core::{FundReference, ShareSizeObservation};

use crate::Result;

pub use database::{Database, DatabaseConfig};

/// 수집 작업이 사용하는 저장소 계약.
///
/// 각 메서드는 하나의 트랜잭션으로 실행됩니다.
#[async_trait]
pub trait FundStore: Send + Sync {
    /// 테이블과 유일 인덱스를 생성합니다 (이미 있으면 아무 것도 하지 않음).
    async fn create_schema(&self) -> Result<()>;

    /// 기본 정보 테이블을 통째로 교체합니다 (전체 삭제 후 삽입).
    async fn replace_fund_references(&self, funds: &[FundReference]) -> Result<usize>;

    /// 모든 펀드 코드 (코드 순).
    async fn fund_codes(&self) -> Result<Vec<String>>;

    /// 규모 테이블 전체의 최신 거래일 (워터마크).
    async fn latest_trade_date(&self) -> Result<Option<NaiveDate>>;

    /// `(ts_code, trade_date)` 키로 삽입 또는 갱신합니다.
    async fn merge_share_sizes(&self, rows: &[ShareSizeObservation]) -> Result<usize>;

    /// 저장소 자원을 해제합니다.
    async fn close(&self) {}
}
