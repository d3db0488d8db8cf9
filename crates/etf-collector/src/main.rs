//! ETF 데이터 수집기 CLI.

use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use etf_collector::{
    fetch_status, init_schema, run_collection, CollectionMode, CollectionPlan, CollectorConfig,
    DataType,
};
use etf_core::{init_logging, parse_compact_date, LogConfig};

#[derive(Parser)]
#[command(name = "etf-collector")]
#[command(about = "ETF reference data and share-size collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error). 미지정 시 LOG_LEVEL 사용
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// ETF 데이터 수집
    Collect {
        /// 수집 모드
        #[arg(long, value_enum, default_value_t = CollectionMode::Incremental)]
        mode: CollectionMode,

        /// 수집 대상
        #[arg(long, value_enum, default_value_t = DataType::All)]
        data_type: DataType,

        /// 규모 전체 수집 시작일 (YYYYMMDD)
        #[arg(long, default_value = "20200101", value_parser = parse_start_date)]
        start_date: NaiveDate,
    },

    /// 테이블과 인덱스 생성
    InitDb,

    /// 저장소 상태 요약 출력
    Status,
}

fn parse_start_date(value: &str) -> Result<NaiveDate, String> {
    parse_compact_date(value).ok_or_else(|| format!("expected YYYYMMDD, got '{}'", value))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env().with_level(cli.log_level.as_deref());
    if let Err(e) = init_logging(log_config) {
        eprintln!("로깅 초기화 실패: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = format!("{:#}", e), "ETF 수집기 실패");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let config = CollectorConfig::from_env();

    match command {
        Commands::Collect {
            mode,
            data_type,
            start_date,
        } => {
            let plan = CollectionPlan {
                mode,
                data_type,
                start_date,
            };
            let reports = run_collection(&config, &plan)
                .await
                .context("수집 실행 실패")?;

            for report in &reports {
                tracing::info!(
                    job = report.name,
                    rows = report.stats.total_rows,
                    errors = report.stats.errors,
                    "작업 결과"
                );
            }
        }
        Commands::InitDb => {
            init_schema(&config).await.context("스키마 초기화 실패")?;
        }
        Commands::Status => {
            let status = fetch_status(&config).await.context("상태 조회 실패")?;
            let latest = status
                .latest_trade_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());

            println!("Active ETFs:       {}", status.active_funds);
            println!("Latest trade date: {}", latest);
        }
    }

    Ok(())
}
