//! 통합 테스트용 인메모리 저장소와 스크립트 데이터 소스.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use etf_core::{
    parse_compact_date, FundReference, RawFundReference, RawShareSize, ShareSizeObservation,
};
use etf_data::{DataError, FetchError, FundDataSource, FundStore, Result};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn raw_fund(code: &str, name: &str) -> RawFundReference {
    RawFundReference {
        ts_code: Some(code.to_string()),
        name: Some(name.to_string()),
        management: Some("华夏基金".to_string()),
        fund_type: Some("股票型".to_string()),
        list_date: Some("20120528".to_string()),
        market: Some("E".to_string()),
        ..Default::default()
    }
}

pub fn raw_share(code: &str, trade_date: &str, share: f64) -> RawShareSize {
    RawShareSize {
        ts_code: Some(code.to_string()),
        trade_date: Some(trade_date.to_string()),
        fund_share: Some(share),
    }
}

pub fn fund(code: &str) -> FundReference {
    FundReference::from_raw(raw_fund(code, code)).unwrap()
}

fn remote_failure(operation: &str, message: &str) -> DataError {
    DataError::RemoteFetch {
        operation: operation.to_string(),
        attempts: 3,
        source: FetchError::Provider {
            code: -1,
            message: message.to_string(),
        },
    }
}

// ==================== MemoryStore ====================

#[derive(Debug, Default)]
pub struct MemoryState {
    pub funds: BTreeMap<String, FundReference>,
    pub shares: BTreeMap<(String, NaiveDate), ShareSizeObservation>,
    pub schema_calls: usize,
    pub close_calls: usize,
    pub replace_calls: usize,
    pub fail_schema: bool,
    pub fail_fund_codes: bool,
    pub fail_merge_for: HashSet<String>,
}

/// `FundStore` 인메모리 구현. 규모 테이블은 `(ts_code, trade_date)` 키를 유일하게 유지합니다.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_funds(codes: &[&str]) -> Arc<Self> {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            for code in codes {
                state.funds.insert(code.to_string(), fund(code));
            }
        }
        Arc::new(store)
    }

    pub fn insert_share(&self, code: &str, trade_date: NaiveDate, share: f64) {
        self.state.lock().unwrap().shares.insert(
            (code.to_string(), trade_date),
            ShareSizeObservation {
                ts_code: code.to_string(),
                trade_date,
                fund_share: Some(share),
            },
        );
    }

    pub fn fund_count(&self) -> usize {
        self.state.lock().unwrap().funds.len()
    }

    pub fn share_rows(&self) -> Vec<ShareSizeObservation> {
        self.state.lock().unwrap().shares.values().cloned().collect()
    }

    pub fn share_codes(&self) -> HashSet<String> {
        self.state
            .lock()
            .unwrap()
            .shares
            .keys()
            .map(|(code, _)| code.clone())
            .collect()
    }

    pub fn fund(&self, code: &str) -> Option<FundReference> {
        self.state.lock().unwrap().funds.get(code).cloned()
    }
}

#[async_trait]
impl FundStore for MemoryStore {
    async fn create_schema(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.schema_calls += 1;
        if state.fail_schema {
            return Err(DataError::Connection("schema unavailable".to_string()));
        }
        Ok(())
    }

    async fn replace_fund_references(&self, funds: &[FundReference]) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        state.replace_calls += 1;
        state.funds.clear();
        for fund in funds {
            state.funds.insert(fund.ts_code.clone(), fund.clone());
        }
        Ok(funds.len())
    }

    async fn fund_codes(&self) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.fail_fund_codes {
            return Err(DataError::Connection("fund list unavailable".to_string()));
        }
        Ok(state.funds.keys().cloned().collect())
    }

    async fn latest_trade_date(&self) -> Result<Option<NaiveDate>> {
        let state = self.state.lock().unwrap();
        Ok(state.shares.keys().map(|(_, d)| *d).max())
    }

    async fn merge_share_sizes(&self, rows: &[ShareSizeObservation]) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        if rows
            .iter()
            .any(|row| state.fail_merge_for.contains(&row.ts_code))
        {
            return Err(DataError::InvalidData("merge rejected".to_string()));
        }

        for row in rows {
            state
                .shares
                .entry((row.ts_code.clone(), row.trade_date))
                .and_modify(|existing| existing.fund_share = row.fund_share)
                .or_insert_with(|| row.clone());
        }
        Ok(rows.len())
    }

    async fn close(&self) {
        self.state.lock().unwrap().close_calls += 1;
    }
}

// ==================== ScriptedSource ====================

/// 규모 조회 요청 기록
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub ts_code: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// 미리 정한 행을 돌려주는 `FundDataSource` 구현.
///
/// 규모 조회는 요청한 펀드 코드와 양끝 포함 날짜 범위로 거릅니다.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    pub references: Vec<RawFundReference>,
    pub shares: Vec<RawShareSize>,
    pub failing_codes: HashSet<String>,
    pub fail_references: bool,
    pub reference_markets: Mutex<Vec<String>>,
    pub share_requests: Mutex<Vec<ShareRequest>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_references(mut self, rows: Vec<RawFundReference>) -> Self {
        self.references = rows;
        self
    }

    pub fn with_shares(mut self, rows: Vec<RawShareSize>) -> Self {
        self.shares = rows;
        self
    }

    pub fn failing_for(mut self, code: &str) -> Self {
        self.failing_codes.insert(code.to_string());
        self
    }

    pub fn failing_references(mut self) -> Self {
        self.fail_references = true;
        self
    }

    pub fn requests(&self) -> Vec<ShareRequest> {
        self.share_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FundDataSource for ScriptedSource {
    async fn fetch_fund_references(&self, market: &str) -> Result<Vec<RawFundReference>> {
        self.reference_markets
            .lock()
            .unwrap()
            .push(market.to_string());
        if self.fail_references {
            return Err(remote_failure("fund_basic", "upstream unavailable"));
        }
        Ok(self.references.clone())
    }

    async fn fetch_share_sizes(
        &self,
        ts_code: Option<&str>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<RawShareSize>> {
        self.share_requests.lock().unwrap().push(ShareRequest {
            ts_code: ts_code.map(str::to_string),
            start_date,
            end_date,
        });

        if let Some(code) = ts_code {
            if self.failing_codes.contains(code) {
                return Err(remote_failure("fund_share", "unknown ts_code"));
            }
        }

        let rows = self
            .shares
            .iter()
            .filter(|row| ts_code.is_none() || row.ts_code.as_deref() == ts_code)
            .filter(|row| {
                let Some(trade_date) = row.trade_date.as_deref().and_then(parse_compact_date)
                else {
                    return true;
                };
                start_date.map_or(true, |s| trade_date >= s)
                    && end_date.map_or(true, |e| trade_date <= e)
            })
            .cloned()
            .collect();
        Ok(rows)
    }
}
