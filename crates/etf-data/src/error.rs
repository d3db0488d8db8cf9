//! 데이터 모듈 오류 타입.

use etf_core::CoreError;
use thiserror::Error;

/// Tushare 호출 제한 초과 응답 코드.
pub const PROVIDER_THROTTLED: i64 = 40203;

/// 원격 API 단일 호출 실패.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 네트워크/전송 오류
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// HTTP 상태 오류
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// 데이터 제공자 오류 응답 (code != 0)
    #[error("Provider error [{code}]: {message}")]
    Provider { code: i64, message: String },

    /// 응답 파싱 오류
    #[error("Decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 네트워크 오류, 5xx/429 응답, 제공자 호출 제한만 재시도합니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::Provider { code, .. } => *code == PROVIDER_THROTTLED,
            FetchError::Decode(_) => false,
        }
    }
}

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 설정 오류 (필수 자격증명/접속 정보 누락 또는 형식 오류)
    #[error("Configuration error: {0}")]
    Config(String),

    /// 재시도를 모두 소진한 원격 호출 실패
    #[error("Remote fetch failed: {operation} after {attempts} attempt(s): {source}")]
    RemoteFetch {
        operation: String,
        attempts: u32,
        #[source]
        source: FetchError,
    },

    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    Connection(String),

    /// 세션/트랜잭션 오류
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// 잘못된 데이터 형식 (조인 키 누락 등)
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<CoreError> for DataError {
    fn from(err: CoreError) -> Self {
        DataError::InvalidData(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
