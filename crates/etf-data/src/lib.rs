//! ETF 데이터 접근 계층.
//!
//! 이 crate는 다음을 제공합니다:
//! - 원격 데이터 소스 (`FundDataSource`, Tushare Pro 클라이언트)
//! - 재시도/백오프 정책 (`RetryPolicy`)
//! - PostgreSQL 저장소 게이트웨이 (`FundStore`, `Database`)
//! - 대시보드용 읽기 전용 조회 (`FundQuery`)

pub mod error;
pub mod provider;
pub mod query;
pub mod storage;

pub use error::{DataError, FetchError, Result};

pub use provider::{FundDataSource, RetryPolicy, TushareClient, TushareConfig};
pub use query::{search_funds, FilterOptions, FundFilter, FundPage, FundQuery};
pub use storage::{Database, DatabaseConfig, FundStore};
