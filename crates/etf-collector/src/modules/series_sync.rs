//! ETF 규모 시계열 동기화 모듈.
//!
//! 펀드마다 같은 날짜 범위를 조회해 `(ts_code, trade_date)` 기준으로 upsert합니다.
//! 증분 수집의 시작점은 테이블 전체의 최신 거래일(전역 워터마크) 다음 날입니다.
//!
//! 한 펀드의 실패(재시도 소진, 저장 실패)는 로그만 남기고 다음 펀드로 넘어갑니다.
//! 펀드 목록 조회처럼 배치 전체에 걸친 실패는 작업을 중단합니다.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use etf_core::{RawShareSize, ShareSizeObservation};
use etf_data::{FundDataSource, FundStore};

use super::Collector;
use crate::{CollectionStats, Result};

/// 저장소가 비어 있을 때 사용하는 기본 수집 시작일 (2020-01-01).
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// 한 펀드 처리 결과
enum FundOutcome {
    /// 조회 결과 없음
    Empty,
    /// 저장 완료 (저장 행 수, 거부 행 수)
    Saved { rows: usize, rejected: usize },
}

/// ETF 규모 시계열 동기화 작업
pub struct SeriesSyncJob {
    store: Arc<dyn FundStore>,
    source: Arc<dyn FundDataSource>,
    default_start: NaiveDate,
    end_date: Option<NaiveDate>,
}

impl SeriesSyncJob {
    pub fn new(store: Arc<dyn FundStore>, source: Arc<dyn FundDataSource>) -> Self {
        Self {
            store,
            source,
            default_start: default_start_date(),
            end_date: None,
        }
    }

    /// 전체 수집 및 빈 저장소 증분 수집의 시작일
    pub fn with_default_start(mut self, start: NaiveDate) -> Self {
        self.default_start = start;
        self
    }

    /// 수집 종료일 고정 (`None`이면 실행 시점의 오늘)
    pub fn with_end_date(mut self, end: Option<NaiveDate>) -> Self {
        self.end_date = end;
        self
    }

    fn end_date(&self) -> NaiveDate {
        self.end_date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// `start_date`부터 오늘까지 모든 펀드의 규모를 수집합니다.
    pub async fn sync_full(&self, start_date: NaiveDate) -> Result<CollectionStats> {
        let end_date = self.end_date();
        tracing::info!(%start_date, %end_date, "ETF 규모 전체 수집 시작");

        self.collect_range(start_date, end_date).await
    }

    /// 전역 워터마크 다음 날부터 오늘까지 수집합니다.
    ///
    /// 저장된 데이터가 없으면 기본 시작일로 전체 수집합니다.
    pub async fn sync_incremental(&self) -> Result<CollectionStats> {
        let watermark = self.store.latest_trade_date().await?;

        let Some(latest) = watermark else {
            tracing::info!(
                default_start = %self.default_start,
                "저장된 규모 데이터 없음, 전체 수집으로 전환"
            );
            return self.sync_full(self.default_start).await;
        };

        let start_date = latest + Duration::days(1);
        let end_date = self.end_date();
        tracing::info!(%latest, %start_date, %end_date, "ETF 규모 증분 수집 시작");

        self.collect_range(start_date, end_date).await
    }

    /// 펀드별 조회/저장 루프.
    async fn collect_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<CollectionStats> {
        let start = Instant::now();
        let mut stats = CollectionStats::new();

        if start_date > end_date {
            tracing::info!(%start_date, %end_date, "수집할 기간 없음, 건너뛰기");
            stats.elapsed = start.elapsed();
            return Ok(stats);
        }

        // 펀드 목록 조회 실패는 배치 전체 실패
        let codes = self.store.fund_codes().await?;
        stats.total = codes.len();

        if codes.is_empty() {
            tracing::warn!("펀드 목록이 비어 있음, 기본 정보 동기화를 먼저 실행하세요");
        }

        for (idx, code) in codes.iter().enumerate() {
            match self.sync_fund(code, start_date, end_date).await {
                Ok(FundOutcome::Empty) => {
                    stats.empty += 1;
                    tracing::debug!(ts_code = %code, "규모 데이터 없음");
                }
                Ok(FundOutcome::Saved { rows, rejected }) => {
                    stats.success += 1;
                    stats.total_rows += rows;
                    stats.rejected += rejected;
                    tracing::debug!(ts_code = %code, rows, "규모 데이터 저장");
                }
                Err(e) => {
                    stats.errors += 1;
                    tracing::error!(ts_code = %code, error = %e, "펀드 규모 수집 실패, 다음 펀드로 진행");
                }
            }

            if (idx + 1) % 100 == 0 {
                tracing::info!(
                    progress = idx + 1,
                    total = codes.len(),
                    rows = stats.total_rows,
                    "ETF 규모 수집 진행 중"
                );
            }
        }

        stats.elapsed = start.elapsed();
        tracing::info!(
            funds = stats.total,
            rows = stats.total_rows,
            errors = stats.errors,
            "ETF 규모 수집 완료"
        );
        Ok(stats)
    }

    /// 한 펀드의 조회/정규화/저장.
    async fn sync_fund(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<FundOutcome> {
        let raw = self
            .source
            .fetch_share_sizes(Some(code), Some(start_date), Some(end_date))
            .await?;

        if raw.is_empty() {
            return Ok(FundOutcome::Empty);
        }

        let (rows, rejected) = normalize_share_sizes(code, raw);
        if rows.is_empty() {
            tracing::warn!(ts_code = %code, rejected, "유효한 규모 데이터 없음");
            return Ok(FundOutcome::Empty);
        }

        let saved = self.store.merge_share_sizes(&rows).await?;
        Ok(FundOutcome::Saved {
            rows: saved,
            rejected,
        })
    }
}

#[async_trait]
impl Collector for SeriesSyncJob {
    fn name(&self) -> &'static str {
        "etf_share_size"
    }

    async fn collect_full(&self) -> Result<CollectionStats> {
        self.sync_full(self.default_start).await
    }

    async fn collect_incremental(&self) -> Result<CollectionStats> {
        self.sync_incremental().await
    }
}

/// 원시 행을 정규화하고 `(ts_code, trade_date)` 중복을 제거합니다.
///
/// 펀드 코드가 빠진 행은 조회한 펀드 코드로 채웁니다. 같은 키가 여러 번 나오면
/// 마지막 행을 유지합니다. 반환값은 (유효 행, 거부 수)입니다.
fn normalize_share_sizes(
    code: &str,
    raw: Vec<RawShareSize>,
) -> (Vec<ShareSizeObservation>, usize) {
    let mut rows: Vec<ShareSizeObservation> = Vec::with_capacity(raw.len());
    let mut rejected = 0;

    for mut row in raw {
        if row.ts_code.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            row.ts_code = Some(code.to_string());
        }

        match ShareSizeObservation::from_raw(row) {
            Ok(obs) => rows.push(obs),
            Err(e) => {
                rejected += 1;
                tracing::warn!(ts_code = %code, error = %e, "규모 데이터 행 거부");
            }
        }
    }

    let mut seen = HashSet::new();
    let mut deduped: Vec<ShareSizeObservation> = rows
        .into_iter()
        .rev()
        .filter(|obs| seen.insert((obs.ts_code.clone(), obs.trade_date)))
        .collect();
    deduped.reverse();

    (deduped, rejected)
}
