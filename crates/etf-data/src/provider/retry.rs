//! 원격 호출 재시도 정책.
//!
//! 재시도 가능한 실패(`FetchError::is_retryable`)에 한해
//! `base_delay * backoff^(n-1)` 만큼 대기한 뒤 다시 호출합니다.
//! 대기 시간은 `MAX_RETRY_DELAY`를 넘지 않습니다.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{DataError, FetchError, Result};

/// 한 번의 재시도 대기 상한 (5분).
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(300);

/// 재시도 정책.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 최대 시도 횟수 (최초 호출 포함)
    pub max_attempts: u32,
    /// 첫 재시도 전 대기 시간
    pub base_delay: Duration,
    /// 대기 시간 증가 배수
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, backoff: f64) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff,
        }
    }

    /// `attempt`번째 시도가 실패한 뒤의 대기 시간 (1부터 시작).
    ///
    /// 배수가 무한대이거나 지수가 커서 표현할 수 없으면 상한으로 자릅니다.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = self.backoff.max(1.0).powi(exponent);
        Duration::try_from_secs_f64(self.base_delay.as_secs_f64() * factor)
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY)
    }

    /// 재시도 정책을 적용하여 호출합니다.
    ///
    /// 재시도 불가능한 에러는 즉시, 재시도 가능한 에러는 시도 횟수를
    /// 모두 소진한 뒤 마지막 원인을 담은 `DataError::RemoteFetch`로 반환합니다.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, FetchError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match call().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "재시도 성공");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "원격 호출 실패, 재시도 예정"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(
                        operation,
                        attempts = attempt,
                        error = %e,
                        "원격 호출 최종 실패"
                    );
                    return Err(DataError::RemoteFetch {
                        operation: operation.to_string(),
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}
