//! ETF 테이블 저장소 구현.

use async_trait::async_trait;
use chrono::NaiveDate;
use etf_core::{FundReference, ShareSizeObservation};
use tracing::{debug, instrument};

use super::{Database, FundStore};
use crate::error::Result;

const INSERT_FUND_SQL: &str = r#"
    INSERT INTO etf_basic (
        ts_code, name, management, custodian, fund_type,
        found_date, due_date, list_date, issue_date, delist_date,
        issue_amount, market, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW(), NOW())
"#;

const MERGE_SHARE_SQL: &str = r#"
    INSERT INTO etf_share_size (ts_code, trade_date, fund_share, created_at)
    VALUES ($1, $2, $3, NOW())
    ON CONFLICT (ts_code, trade_date) DO UPDATE SET
        fund_share = EXCLUDED.fund_share
"#;

#[async_trait]
impl FundStore for Database {
    async fn create_schema(&self) -> Result<()> {
        Database::create_schema(self).await
    }

    #[instrument(skip_all, fields(count = funds.len()))]
    async fn replace_fund_references(&self, funds: &[FundReference]) -> Result<usize> {
        let funds = funds.to_vec();

        self.with_session(move |conn| {
            Box::pin(async move {
                let deleted = sqlx::query("DELETE FROM etf_basic")
                    .execute(&mut *conn)
                    .await?
                    .rows_affected();
                debug!(deleted, "기존 기본 정보 삭제");

                for fund in &funds {
                    sqlx::query(INSERT_FUND_SQL)
                        .bind(&fund.ts_code)
                        .bind(fund.name.as_deref())
                        .bind(fund.management.as_deref())
                        .bind(fund.custodian.as_deref())
                        .bind(fund.fund_type.as_deref())
                        .bind(fund.found_date)
                        .bind(fund.due_date)
                        .bind(fund.list_date)
                        .bind(fund.issue_date)
                        .bind(fund.delist_date)
                        .bind(fund.issue_amount)
                        .bind(fund.market.as_deref())
                        .execute(&mut *conn)
                        .await?;
                }

                Ok(funds.len())
            })
        })
        .await
    }

    async fn fund_codes(&self) -> Result<Vec<String>> {
        self.with_session(|conn| {
            Box::pin(async move {
                let codes: Vec<String> =
                    sqlx::query_scalar("SELECT ts_code FROM etf_basic ORDER BY ts_code")
                        .fetch_all(&mut *conn)
                        .await?;
                Ok(codes)
            })
        })
        .await
    }

    async fn latest_trade_date(&self) -> Result<Option<NaiveDate>> {
        self.with_session(|conn| {
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

    #[instrument(skip_all, fields(count = rows.len()))]
    async fn merge_share_sizes(&self, rows: &[ShareSizeObservation]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let rows = rows.to_vec();

        self.with_session(move |conn| {
            Box::pin(async move {
                for row in &rows {
                    sqlx::query(MERGE_SHARE_SQL)
                        .bind(&row.ts_code)
                        .bind(row.trade_date)
                        .bind(row.fund_share)
                        .execute(&mut *conn)
                        .await?;
                }
                Ok(rows.len())
            })
        })
        .await
    }

    async fn close(&self) {
        Database::close(self);
    }
}
