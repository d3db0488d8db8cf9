//! Tushare Pro API 클라이언트.
//!
//! 단일 엔드포인트에 `{ api_name, token, params, fields }`를 POST하고
//! 표 형태 응답(`fields` + `items`)을 행 단위 레코드로 변환합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use etf_data::provider::{FundDataSource, TushareClient, TushareConfig};
//!
//! let client = TushareClient::new(TushareConfig::new(token))?;
//! let funds = client.fetch_fund_references("E").await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use etf_core::{format_compact_date, RawFundReference, RawShareSize};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::{FundDataSource, RetryPolicy};
use crate::error::{DataError, FetchError, Result};

/// Tushare Pro API 기본 URL.
pub const DEFAULT_API_URL: &str = "https://api.tushare.pro";

/// 펀드 기본 정보 API.
const API_FUND_BASIC: &str = "fund_basic";

/// 펀드 규모 API.
const API_FUND_SHARE: &str = "fund_share";

/// 클라이언트 설정.
#[derive(Debug)]
pub struct TushareConfig {
    /// API URL
    pub api_url: String,
    /// API 토큰
    pub token: SecretString,
    /// 매 호출 전 고정 대기 시간 (호출 제한 준수)
    pub call_interval: Duration,
    /// 연결 타임아웃
    pub connect_timeout: Duration,
    /// 재시도 정책
    pub retry: RetryPolicy,
}

impl TushareConfig {
    pub fn new(token: SecretString) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token,
            call_interval: Duration::from_millis(200),
            connect_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_call_interval(mut self, interval: Duration) -> Self {
        self.call_interval = interval;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// API 요청 본문.
#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    api_name: &'a str,
    token: &'a str,
    params: &'a Map<String, Value>,
    fields: &'a str,
}

/// API 응답 래퍼.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ApiResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<ApiTable>,
    #[serde(default)]
    request_id: Option<String>,
}

/// 표 형태 응답 데이터.
#[derive(Debug, Default, Deserialize)]
struct ApiTable {
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    items: Vec<Vec<Value>>,
}

/// Tushare Pro API 클라이언트.
pub struct TushareClient {
    client: reqwest::Client,
    config: TushareConfig,
}

impl TushareClient {
    /// 새로운 클라이언트 생성.
    pub fn new(config: TushareConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| DataError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        info!(api_url = %config.api_url, "Tushare 클라이언트 초기화");
        Ok(Self { client, config })
    }

    /// 재시도 정책을 적용하여 API를 호출하고 행 목록을 반환합니다.
    async fn query<T: DeserializeOwned>(
        &self,
        api_name: &str,
        params: Map<String, Value>,
    ) -> Result<Vec<T>> {
        let params = &params;
        self.config
            .retry
            .run(api_name, move || self.query_once(api_name, params))
            .await
    }

    /// 단일 API 호출. 호출 전 고정 간격만큼 대기합니다.
    async fn query_once<T: DeserializeOwned>(
        &self,
        api_name: &str,
        params: &Map<String, Value>,
    ) -> std::result::Result<Vec<T>, FetchError> {
        tokio::time::sleep(self.config.call_interval).await;

        debug!(api_name, params = ?params, "Tushare API 요청");

        let request = ApiRequest {
            api_name,
            token: self.config.token.expose_secret(),
            params,
            fields: "",
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        let text = response.text().await?;
        let api_response: ApiResponse = serde_json::from_str(&text).map_err(|e| {
            FetchError::Decode(format!("{} - {}", e, truncate(&text, 200)))
        })?;

        if api_response.code != 0 {
            return Err(FetchError::Provider {
                code: api_response.code,
                message: api_response.msg.unwrap_or_default(),
            });
        }

        Ok(table_to_rows(api_name, api_response.data.unwrap_or_default()))
    }
}

#[async_trait]
impl FundDataSource for TushareClient {
    async fn fetch_fund_references(&self, market: &str) -> Result<Vec<RawFundReference>> {
        let mut params = Map::new();
        if !market.is_empty() {
            params.insert("market".to_string(), Value::from(market));
        }

        let rows: Vec<RawFundReference> = self.query(API_FUND_BASIC, params).await?;
        info!(market, count = rows.len(), "ETF 기본 정보 조회 완료");
        Ok(rows)
    }

    async fn fetch_share_sizes(
        &self,
        ts_code: Option<&str>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<RawShareSize>> {
        let mut params = Map::new();
        if let Some(code) = ts_code {
            params.insert("ts_code".to_string(), Value::from(code));
        }
        if let Some(date) = start_date {
            params.insert("start_date".to_string(), Value::from(format_compact_date(date)));
        }
        if let Some(date) = end_date {
            params.insert("end_date".to_string(), Value::from(format_compact_date(date)));
        }

        let rows: Vec<RawShareSize> = self.query(API_FUND_SHARE, params).await?;
        info!(
            ts_code = ts_code.unwrap_or(""),
            count = rows.len(),
            "ETF 규모 데이터 조회 완료"
        );
        Ok(rows)
    }
}

/// `fields` + `items` 표를 레코드로 변환합니다.
///
/// 키 컬럼(펀드 코드, 거래일) 타입이 맞지 않는 행은 경고 후 건너뜁니다.
fn table_to_rows<T: DeserializeOwned>(api_name: &str, table: ApiTable) -> Vec<T> {
    let mut rows = Vec::with_capacity(table.items.len());

    for item in table.items {
        let record: Map<String, Value> = table.fields.iter().cloned().zip(item).collect();

        match serde_json::from_value(Value::Object(record)) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(api_name, error = %e, "행 변환 실패, 건너뜀");
            }
        }
    }

    rows
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
