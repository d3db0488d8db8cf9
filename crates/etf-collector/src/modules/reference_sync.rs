//! ETF 기본 정보 동기화 모듈.
//!
//! 기본 정보 테이블은 매번 통째로 교체합니다. 원격 응답이 비어 있으면
//! 기존 데이터를 지우지 않고 건너뜁니다.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use etf_core::{FundReference, RawFundReference};
use etf_data::{FundDataSource, FundStore};

use super::Collector;
use crate::{CollectionStats, Result};

/// 장내(거래소 상장) 시장 구분.
pub const EXCHANGE_MARKET: &str = "E";

/// ETF 기본 정보 동기화 작업
pub struct ReferenceSyncJob {
    store: Arc<dyn FundStore>,
    source: Arc<dyn FundDataSource>,
    market: String,
}

impl ReferenceSyncJob {
    pub fn new(store: Arc<dyn FundStore>, source: Arc<dyn FundDataSource>) -> Self {
        Self {
            store,
            source,
            market: EXCHANGE_MARKET.to_string(),
        }
    }

    /// 기본 정보 전체 동기화
    pub async fn sync_full(&self) -> Result<CollectionStats> {
        let start = Instant::now();
        let mut stats = CollectionStats::new();

        tracing::info!(market = %self.market, "ETF 기본 정보 동기화 시작");

        // 1. 원격 조회 (실패는 그대로 전파)
        let raw = self.source.fetch_fund_references(&self.market).await?;
        stats.total = raw.len();

        if raw.is_empty() {
            tracing::warn!("조회된 ETF 기본 정보 없음, 기존 데이터 유지");
            stats.empty = 1;
            stats.elapsed = start.elapsed();
            return Ok(stats);
        }

        // 2. 정규화
        let (funds, rejected) = normalize_references(raw);
        stats.rejected = rejected;

        if funds.is_empty() {
            tracing::warn!(rejected, "유효한 ETF 기본 정보 없음, 기존 데이터 유지");
            stats.elapsed = start.elapsed();
            return Ok(stats);
        }

        // 3. 삭제 후 재적재 (단일 트랜잭션)
        let saved = self.store.replace_fund_references(&funds).await?;
        stats.success = saved;
        stats.total_rows = saved;
        stats.elapsed = start.elapsed();

        tracing::info!(saved, rejected, "ETF 기본 정보 저장 완료");
        Ok(stats)
    }
}

#[async_trait]
impl Collector for ReferenceSyncJob {
    fn name(&self) -> &'static str {
        "etf_basic"
    }

    async fn collect_full(&self) -> Result<CollectionStats> {
        self.sync_full().await
    }

    /// 기본 정보에는 증분 모드가 없으므로 전체 동기화와 같습니다.
    async fn collect_incremental(&self) -> Result<CollectionStats> {
        self.sync_full().await
    }
}

/// 원시 행을 정규화하고 펀드 코드 기준으로 중복을 제거합니다.
///
/// 같은 코드가 여러 번 나오면 처음 행을 유지합니다. 반환값은 (유효 행, 거부 수)입니다.
fn normalize_references(raw: Vec<RawFundReference>) -> (Vec<FundReference>, usize) {
    let mut seen = HashSet::new();
    let mut funds = Vec::with_capacity(raw.len());
    let mut rejected = 0;

    for row in raw {
        match FundReference::from_raw(row) {
            Ok(fund) => {
                if seen.insert(fund.ts_code.clone()) {
                    funds.push(fund);
                } else {
                    tracing::debug!(ts_code = %fund.ts_code, "중복 펀드 코드 무시");
                }
            }
            Err(e) => {
                rejected += 1;
                tracing::warn!(error = %e, "ETF 기본 정보 행 거부");
            }
        }
    }

    (funds, rejected)
}
