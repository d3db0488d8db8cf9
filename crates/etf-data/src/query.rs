//! 대시보드용 읽기 전용 조회.
//!
//! 프로세스 시작 시 만든 `Database` 핸들을 주입받아 사용합니다.
//! 이 모듈은 저장소에 쓰지 않습니다.

use chrono::{Duration, Local, NaiveDate};
use etf_core::{FundReference, ShareSizePoint};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Database;

const FUND_COLUMNS: &str = "ts_code, name, management, custodian, fund_type, \
     found_date, due_date, list_date, issue_date, delist_date, \
     issue_amount, market, created_at, updated_at";

/// 펀드 목록 필터. `None`인 항목은 무시합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundFilter {
    pub fund_type: Option<String>,
    pub market: Option<String>,
    pub management: Option<String>,
}

/// 페이지 단위 펀드 목록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundPage {
    pub funds: Vec<FundReference>,
    /// 필터 조건에 맞는 전체 펀드 수
    pub total: i64,
    /// 전체 페이지 수
    pub pages: i64,
}

/// 필터 선택지 (중복 제거, 정렬됨).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub fund_types: Vec<String>,
    pub markets: Vec<String>,
    pub managements: Vec<String>,
}

/// 읽기 전용 조회 서비스.
#[derive(Clone)]
pub struct FundQuery {
    db: Database,
}

impl FundQuery {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 운용 중(상장폐지일 없음)인 펀드 수.
    pub async fn count_active_funds(&self) -> Result<i64> {
        self.db
            .with_session(|conn| {
                Box::pin(async move {
                    let count: i64 = sqlx::query_scalar(
                        "SELECT COUNT(ts_code) FROM etf_basic WHERE delist_date IS NULL",
                    )
                    .fetch_one(&mut *conn)
                    .await?;
                    Ok(count)
                })
            })
            .await
    }

    /// 규모 데이터의 최신 거래일.
    pub async fn latest_trade_date(&self) -> Result<Option<NaiveDate>> {
        self.db
            .with_session(|conn| {
                Box::pin(async move {
                    let latest: Option<NaiveDate> =
                        sqlx::query_scalar("SELECT MAX(trade_date) FROM etf_share_size")
                            .fetch_one(&mut *conn)
                            .await?;
                    Ok(latest)
                })
            })
            .await
    }

    /// 운용 중인 펀드를 코드 순으로 페이지 조회합니다.
    ///
    /// `page`는 1부터 시작합니다.
    pub async fn list_funds(
        &self,
        filter: &FundFilter,
        page: u32,
        page_size: u32,
    ) -> Result<FundPage> {
        let filter = filter.clone();
        let page_size = page_size.max(1);
        let offset = page_offset(page, page_size);

        self.db
            .with_session(move |conn| {
                Box::pin(async move {
                    let where_clause = "WHERE delist_date IS NULL \
                         AND ($1::text IS NULL OR fund_type = $1) \
                         AND ($2::text IS NULL OR market = $2) \
                         AND ($3::text IS NULL OR management = $3)";

                    let total: i64 =
                        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM etf_basic {}", where_clause))
                            .bind(filter.fund_type.as_deref())
                            .bind(filter.market.as_deref())
                            .bind(filter.management.as_deref())
                            .fetch_one(&mut *conn)
                            .await?;

                    let funds: Vec<FundReference> = sqlx::query_as(&format!(
                        "SELECT {} FROM etf_basic {} ORDER BY ts_code LIMIT $4 OFFSET $5",
                        FUND_COLUMNS, where_clause
                    ))
                    .bind(filter.fund_type.as_deref())
                    .bind(filter.market.as_deref())
                    .bind(filter.management.as_deref())
                    .bind(page_size as i64)
                    .bind(offset)
                    .fetch_all(&mut *conn)
                    .await?;

                    Ok(FundPage {
                        funds,
                        total,
                        pages: total_pages(total, page_size),
                    })
                })
            })
            .await
    }

    /// 단일 펀드 상세.
    pub async fn fund_detail(&self, ts_code: &str) -> Result<Option<FundReference>> {
        let ts_code = ts_code.to_string();

        self.db
            .with_session(move |conn| {
                Box::pin(async move {
                    let fund: Option<FundReference> = sqlx::query_as(&format!(
                        "SELECT {} FROM etf_basic WHERE ts_code = $1",
                        FUND_COLUMNS
                    ))
                    .bind(&ts_code)
                    .fetch_optional(&mut *conn)
                    .await?;
                    Ok(fund)
                })
            })
            .await
    }

    /// 최근 `days`일 동안의 규모 추이 (거래일 오름차순).
    pub async fn share_history(&self, ts_code: &str, days: u32) -> Result<Vec<ShareSizePoint>> {
        let ts_code = ts_code.to_string();
        let since = lookback_start(Local::now().date_naive(), days);

        self.db
            .with_session(move |conn| {
                Box::pin(async move {
                    let points: Vec<ShareSizePoint> = sqlx::query_as(
                        r#"
                        SELECT trade_date, fund_share
                        FROM etf_share_size
                        WHERE ts_code = $1 AND trade_date >= $2
                        ORDER BY trade_date
                        "#,
                    )
                    .bind(&ts_code)
                    .bind(since)
                    .fetch_all(&mut *conn)
                    .await?;
                    Ok(points)
                })
            })
            .await
    }

    /// 운용 중인 펀드의 필터 선택지.
    pub async fn filter_options(&self) -> Result<FilterOptions> {
        self.db
            .with_session(|conn| {
                Box::pin(async move {
                    let mut options = FilterOptions::default();

                    for (column, target) in [
                        ("fund_type", &mut options.fund_types),
                        ("market", &mut options.markets),
                        ("management", &mut options.managements),
                    ] {
                        *target = sqlx::query_scalar(&format!(
                            "SELECT DISTINCT {col} FROM etf_basic \
                             WHERE delist_date IS NULL AND {col} IS NOT NULL \
                             ORDER BY {col}",
                            col = column
                        ))
                        .fetch_all(&mut *conn)
                        .await?;
                    }

                    Ok(options)
                })
            })
            .await
    }
}

/// 코드/이름/운용사에 대한 대소문자 무시 부분 일치 검색.
///
/// 빈 검색어는 전체를 반환합니다.
pub fn search_funds<'a>(query: &str, funds: &'a [FundReference]) -> Vec<&'a FundReference> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return funds.iter().collect();
    }

    let contains = |field: Option<&str>| {
        field
            .map(|v| v.to_lowercase().contains(&query))
            .unwrap_or(false)
    };

    funds
        .iter()
        .filter(|f| {
            contains(Some(f.ts_code.as_str()))
                || contains(f.name.as_deref())
                || contains(f.management.as_deref())
        })
        .collect()
}

fn page_offset(page: u32, page_size: u32) -> i64 {
    (page.max(1) as i64 - 1) * page_size as i64
}

fn total_pages(total: i64, page_size: u32) -> i64 {
    let page_size = page_size.max(1) as i64;
    (total + page_size - 1) / page_size
}

fn lookback_start(today: NaiveDate, days: u32) -> NaiveDate {
    today - Duration::days(days as i64)
}
