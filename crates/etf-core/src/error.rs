//! 도메인 에러 타입.

use thiserror::Error;

/// 원격 행을 도메인 모델로 정규화할 때 발생하는 에러.
///
/// 조인 키(펀드 코드, 거래일)가 없거나 깨진 행만 에러가 됩니다.
/// 그 외 필드는 `None`으로 대체됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// 필수 키 누락
    #[error("필수 필드 누락: {field}")]
    MissingKey { field: &'static str },

    /// 날짜 형식 오류
    #[error("날짜 형식 오류: {field}={value}")]
    InvalidDate { field: &'static str, value: String },
}

/// 도메인 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;
