//! 수집 실행 조율.
//!
//! 모드(full/incremental)와 대상(basic/share/all)에 맞는 작업을 만들고
//! 순서대로 실행합니다. 작업 성공/실패와 관계없이 저장소는 항상 닫습니다.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::ValueEnum;
use etf_data::{Database, FundDataSource, FundQuery, FundStore, TushareClient};
use serde::Serialize;

use crate::modules::series_sync::default_start_date;
use crate::modules::{Collector, ReferenceSyncJob, SeriesSyncJob};
use crate::{CollectionStats, CollectorConfig, Result};

/// 수집 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionMode {
    /// 지정한 시작일부터 전체 수집
    Full,
    /// 저장된 최신 거래일 이후만 수집
    #[default]
    Incremental,
}

impl fmt::Display for CollectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Incremental => write!(f, "incremental"),
        }
    }
}

/// 수집 대상
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// ETF 기본 정보
    Basic,
    /// ETF 규모 시계열
    Share,
    /// 기본 정보 → 규모 순서로 모두
    #[default]
    All,
}

impl DataType {
    fn includes_basic(self) -> bool {
        matches!(self, Self::Basic | Self::All)
    }

    fn includes_share(self) -> bool {
        matches!(self, Self::Share | Self::All)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Share => write!(f, "share"),
            Self::All => write!(f, "all"),
        }
    }
}

/// 수집 실행 계획
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionPlan {
    pub mode: CollectionMode,
    pub data_type: DataType,
    /// 규모 전체 수집 시작일 (빈 저장소의 증분 수집에도 사용)
    pub start_date: NaiveDate,
}

impl Default for CollectionPlan {
    fn default() -> Self {
        Self {
            mode: CollectionMode::default(),
            data_type: DataType::default(),
            start_date: default_start_date(),
        }
    }
}

/// 작업별 실행 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub name: &'static str,
    pub stats: CollectionStats,
}

/// 저장소 상태 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// 운용 중인 펀드 수
    pub active_funds: i64,
    /// 규모 데이터 최신 거래일
    pub latest_trade_date: Option<NaiveDate>,
}

/// 수집 오케스트레이터
pub struct CollectionOrchestrator {
    store: Arc<dyn FundStore>,
    source: Arc<dyn FundDataSource>,
    end_date: Option<NaiveDate>,
}

impl CollectionOrchestrator {
    pub fn new(store: Arc<dyn FundStore>, source: Arc<dyn FundDataSource>) -> Self {
        Self {
            store,
            source,
            end_date: None,
        }
    }

    /// 규모 수집 종료일 고정 (`None`이면 오늘)
    pub fn with_end_date(mut self, end_date: Option<NaiveDate>) -> Self {
        self.end_date = end_date;
        self
    }

    /// 스키마 확인 후 선택된 작업을 실행합니다.
    ///
    /// 저장소는 결과와 관계없이 닫히며, 작업 실패는 호출자에게 전파됩니다.
    pub async fn execute(&self, plan: &CollectionPlan) -> Result<Vec<JobReport>> {
        tracing::info!(
            mode = %plan.mode,
            data_type = %plan.data_type,
            start_date = %plan.start_date,
            "=== ETF 데이터 수집 시작 ==="
        );

        let result = self.run_jobs(plan).await;
        self.store.close().await;

        match &result {
            Ok(reports) => {
                tracing::info!(jobs = reports.len(), "=== ETF 데이터 수집 완료 ===");
            }
            Err(e) => {
                tracing::error!(error = %e, "ETF 데이터 수집 실패");
            }
        }

        result
    }

    async fn run_jobs(&self, plan: &CollectionPlan) -> Result<Vec<JobReport>> {
        self.store.create_schema().await?;

        let jobs = self.jobs(plan);
        let mut reports = Vec::with_capacity(jobs.len());

        for (idx, job) in jobs.iter().enumerate() {
            tracing::info!(
                step = idx + 1,
                total = jobs.len(),
                job = job.name(),
                "작업 실행"
            );

            let stats = match plan.mode {
                CollectionMode::Full => job.collect_full().await?,
                CollectionMode::Incremental => job.collect_incremental().await?,
            };
            stats.log_summary(job.name());

            reports.push(JobReport {
                name: job.name(),
                stats,
            });
        }

        Ok(reports)
    }

    /// 기본 정보 작업이 항상 규모 작업보다 먼저 옵니다.
    fn jobs(&self, plan: &CollectionPlan) -> Vec<Box<dyn Collector>> {
        let mut jobs: Vec<Box<dyn Collector>> = Vec::new();

        if plan.data_type.includes_basic() {
            jobs.push(Box::new(ReferenceSyncJob::new(
                Arc::clone(&self.store),
                Arc::clone(&self.source),
            )));
        }
        if plan.data_type.includes_share() {
            jobs.push(Box::new(
                SeriesSyncJob::new(Arc::clone(&self.store), Arc::clone(&self.source))
                    .with_default_start(plan.start_date)
                    .with_end_date(self.end_date),
            ));
        }

        jobs
    }
}

/// 설정 검증 → 연결 → 수집 실행.
pub async fn run_collection(config: &CollectorConfig, plan: &CollectionPlan) -> Result<Vec<JobReport>> {
    config.validate()?;

    let client = TushareClient::new(config.tushare_config()?)?;
    let db = Database::connect(&config.database_config()?).await?;

    CollectionOrchestrator::new(Arc::new(db), Arc::new(client))
        .with_end_date(config.share_end_date()?)
        .execute(plan)
        .await
}

/// 테이블과 인덱스를 생성합니다.
pub async fn init_schema(config: &CollectorConfig) -> Result<()> {
    config.validate_database()?;

    let db = Database::connect(&config.database_config()?).await?;
    let result = db.create_schema().await;
    db.close();

    result?;
    tracing::info!("스키마 초기화 완료");
    Ok(())
}

/// 저장소 상태를 조회합니다 (읽기 전용).
pub async fn fetch_status(config: &CollectorConfig) -> Result<StatusReport> {
    config.validate_database()?;

    let db = Database::connect(&config.database_config()?).await?;
    let query = FundQuery::new(db.clone());

    let result = async {
        Ok::<_, etf_data::DataError>(StatusReport {
            active_funds: query.count_active_funds().await?,
            latest_trade_date: query.latest_trade_date().await?,
        })
    }
    .await;
    db.close();

    Ok(result?)
}
