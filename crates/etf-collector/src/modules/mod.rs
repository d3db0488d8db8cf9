//! 데이터 수집 모듈.
//!
//! 각 수집 작업은 저장소(`FundStore`)와 원격 데이터 소스(`FundDataSource`)를
//! 생성 시 주입받고 [`Collector`] 계약을 구현합니다.

pub mod reference_sync;
pub mod series_sync;

use async_trait::async_trait;

use crate::{CollectionStats, Result};

pub use reference_sync::ReferenceSyncJob;
pub use series_sync::SeriesSyncJob;

/// 수집 작업 계약.
#[async_trait]
pub trait Collector: Send + Sync {
    /// 로그/리포트에 쓰는 작업 이름
    fn name(&self) -> &'static str;

    /// 전체 수집
    async fn collect_full(&self) -> Result<CollectionStats>;

    /// 증분 수집
    async fn collect_incremental(&self) -> Result<CollectionStats>;
}
