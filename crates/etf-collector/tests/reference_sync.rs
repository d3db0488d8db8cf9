//! ETF 기본 정보 동기화 통합 테스트.

mod common;

use std::sync::Arc;

use common::{date, raw_fund, MemoryStore, ScriptedSource};
use etf_collector::modules::{Collector, ReferenceSyncJob};
use etf_collector::CollectorError;
use etf_core::RawFundReference;

#[tokio::test]
async fn test_empty_fetch_leaves_table_unchanged() {
    let store = MemoryStore::with_funds(&["510300.SH", "159919.SZ"]);
    let source = Arc::new(ScriptedSource::new());
    let job = ReferenceSyncJob::new(store.clone(), source.clone());

    let stats = job.sync_full().await.unwrap();

    assert_eq!(store.fund_count(), 2);
    assert_eq!(store.state.lock().unwrap().replace_calls, 0);
    assert_eq!(stats.empty, 1);
    assert_eq!(stats.total_rows, 0);
}

#[tokio::test]
async fn test_full_sync_replaces_table() {
    let store = MemoryStore::with_funds(&["000001.OF"]);
    let source = Arc::new(ScriptedSource::new().with_references(vec![
        raw_fund("510300.SH", "沪深300ETF"),
        raw_fund("159919.SZ", "嘉实沪深300ETF"),
    ]));
    let job = ReferenceSyncJob::new(store.clone(), source.clone());

    let stats = job.collect_full().await.unwrap();

    assert_eq!(stats.total_rows, 2);
    assert_eq!(store.fund_count(), 2);
    assert!(store.fund("000001.OF").is_none());
    assert_eq!(
        store.fund("510300.SH").unwrap().list_date,
        Some(date(2012, 5, 28))
    );
    assert_eq!(*source.reference_markets.lock().unwrap(), vec!["E".to_string()]);
}

#[tokio::test]
async fn test_bad_dates_become_null() {
    let store = MemoryStore::new();
    let source = Arc::new(ScriptedSource::new().with_references(vec![RawFundReference {
        ts_code: Some("510300.SH".to_string()),
        found_date: Some("2012-05-04".to_string()),
        due_date: Some("".to_string()),
        list_date: Some("20120528".to_string()),
        delist_date: Some("garbage".to_string()),
        ..Default::default()
    }]));
    let job = ReferenceSyncJob::new(store.clone(), source);

    job.sync_full().await.unwrap();

    let fund = store.fund("510300.SH").unwrap();
    assert_eq!(fund.found_date, None);
    assert_eq!(fund.due_date, None);
    assert_eq!(fund.delist_date, None);
    assert_eq!(fund.list_date, Some(date(2012, 5, 28)));
    assert!(fund.is_active());
}

#[tokio::test]
async fn test_rows_without_code_are_rejected() {
    let store = MemoryStore::with_funds(&["510300.SH"]);
    let source = Arc::new(ScriptedSource::new().with_references(vec![RawFundReference {
        name: Some("no code".to_string()),
        ..Default::default()
    }]));
    let job = ReferenceSyncJob::new(store.clone(), source);

    let stats = job.sync_full().await.unwrap();

    assert_eq!(stats.rejected, 1);
    assert_eq!(store.fund_count(), 1, "all-rejected response must not wipe the table");
}

#[tokio::test]
async fn test_incremental_is_full_refresh() {
    let store = MemoryStore::with_funds(&["000001.OF"]);
    let source = Arc::new(
        ScriptedSource::new().with_references(vec![raw_fund("510300.SH", "沪深300ETF")]),
    );
    let job = ReferenceSyncJob::new(store.clone(), source);

    job.collect_incremental().await.unwrap();

    assert_eq!(store.fund_count(), 1);
    assert!(store.fund("510300.SH").is_some());
}

#[tokio::test]
async fn test_fetch_failure_propagates() {
    let store = MemoryStore::with_funds(&["510300.SH"]);
    let source = Arc::new(ScriptedSource::new().failing_references());
    let job = ReferenceSyncJob::new(store.clone(), source);

    let err = job.sync_full().await.unwrap_err();

    assert!(matches!(err, CollectorError::Data(_)));
    assert_eq!(store.fund_count(), 1);
}
