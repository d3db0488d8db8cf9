//! 수집기 프로세스 로깅 설정.
//!
//! 레벨은 `RUST_LOG` > CLI `--log-level` > `LOG_LEVEL` 순으로 정해집니다.
//! 단순 레벨만 주어지면 SQL/HTTP 라이브러리 로그는 warn으로 묶어
//! 펀드 단위 진행 로그가 묻히지 않게 합니다.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 단순 레벨 지정 시 함께 적용되는 의존성 로그 상한.
const DEPENDENCY_DIRECTIVES: &[&str] = &["sqlx=warn", "hyper=warn", "reqwest=warn", "rustls=warn"];

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 개발용 여러 줄 형식
    Pretty,
    /// 스케줄러/로그 집계용 JSON (이벤트 필드를 최상위로 펼침)
    Json,
    /// 배치 실행 로그용 한 줄 형식
    #[default]
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// 레벨 또는 `EnvFilter` 지시어 (예: "debug", "etf_data=trace")
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LogConfig {
    /// `LOG_LEVEL`, `LOG_FORMAT` 환경 변수에서 설정을 읽습니다.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            level: get("LOG_LEVEL")
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .unwrap_or(defaults.level),
            format: get("LOG_FORMAT")
                .and_then(|f| f.parse().ok())
                .unwrap_or(defaults.format),
        }
    }

    /// CLI에서 받은 레벨로 덮어씁니다 (`None`이면 그대로).
    pub fn with_level(mut self, level: Option<&str>) -> Self {
        if let Some(level) = level.map(str::trim).filter(|l| !l.is_empty()) {
            self.level = level.to_lowercase();
        }
        self
    }

    /// `EnvFilter` 지시어 문자열.
    ///
    /// 모듈별 지시어(`=` 포함)가 주어지면 그대로 사용합니다.
    pub fn filter_directives(&self) -> String {
        if self.level.contains('=') {
            return self.level.clone();
        }
        std::iter::once(self.level.as_str())
            .chain(DEPENDENCY_DIRECTIVES.iter().copied())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// 전역 subscriber를 설치합니다. 프로세스당 한 번만 성공합니다.
///
/// ```no_run
/// use etf_core::logging::{init_logging, LogConfig};
///
/// init_logging(LogConfig::from_env().with_level(Some("debug"))).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let directives = config.filter_directives();
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&directives))?;

    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(env_filter))
        .try_init()?;

    tracing::debug!(format = ?config.format, filter = %directives, "Logging initialized");
    Ok(())
}
