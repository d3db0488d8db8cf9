//! # ETF Core
//!
//! ETF 데이터 수집 시스템의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! - 펀드 기본 정보 (`FundReference`)
//! - 펀드 규모(份额) 시계열 관측치 (`ShareSizeObservation`)
//! - 원격 API 원시 행 타입 및 정규화
//! - 8자리 날짜(YYYYMMDD) 변환
//! - 로깅 인프라

pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
