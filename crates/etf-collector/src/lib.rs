//! ETF 데이터 수집기.
//!
//! 이 crate는 주기적으로 실행되는 배치 수집 바이너리를 제공합니다:
//! - ETF 기본 정보 전체 동기화 (삭제 후 재적재)
//! - ETF 규모 시계열 증분/전체 동기화 (펀드 단위 장애 격리, upsert)
//! - 수집 모드/대상 선택 및 프로세스 수명 관리

pub mod config;
pub mod error;
pub mod modules;
pub mod orchestrator;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use orchestrator::{
    fetch_status, init_schema, run_collection, CollectionMode, CollectionOrchestrator,
    CollectionPlan, DataType, JobReport, StatusReport,
};
pub use stats::CollectionStats;
