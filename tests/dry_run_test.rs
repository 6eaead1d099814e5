//! Integration tests for dry-run mode
//!
//! These tests verify that dry-run mode routes the export to a counting sink that
//! keeps no samples, while the export itself runs normally.

use chrono::NaiveDate;
use sessionframe::adapters::memory::MemorySink;
use sessionframe::adapters::sink::create_sink;
use sessionframe::config::{SessionFrameConfig, SinkTarget};
use sessionframe::core::export::{export, NoopProgress};
use sessionframe::domain::{Column, Dataset};
use std::sync::Arc;

fn dataset() -> Dataset {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    Dataset::builder()
        .datetime_index(vec![start, start + chrono::Duration::seconds(1)])
        .column("speed", Column::Float(vec![1.0, 2.0]))
        .build()
}

#[test]
fn test_dry_run_default_is_off() {
    let config = SessionFrameConfig::default();
    assert!(!config.application.dry_run);
}

#[test]
fn test_dry_run_overrides_sink_target() {
    let mut config = SessionFrameConfig::default();
    config.application.dry_run = true;
    config.sink.target = SinkTarget::Jsonl;
    config.sink.output_dir = "/nonexistent/should-not-be-created".to_string();

    let sink = create_sink(&config).unwrap();
    assert_eq!(sink.name(), "memory");
    assert!(!std::path::Path::new(&config.sink.output_dir).exists());
}

#[tokio::test]
async fn test_counting_sink_runs_full_export_without_keeping_samples() {
    let sink = Arc::new(MemorySink::counting_only());

    let outcome = export(&dataset(), sink.clone(), 1, &NoopProgress)
        .await
        .unwrap();

    assert_eq!(outcome.write_report.total_samples, 2);
    assert_eq!(outcome.write_report.total_batches, 2);

    let calls = sink.calls();
    assert_eq!(calls.create_session, 1);
    assert_eq!(calls.create_channel, 1);
    assert_eq!(calls.write_batch, 2);
    assert_eq!(calls.close_session, 1);

    let session = sink.session(&outcome.session.key).await.unwrap();
    let speed = session.channel("speed").unwrap();
    assert!(session.closed);
    assert!(speed.samples.is_empty());
    assert_eq!(speed.sample_count, 2);
    assert_eq!(speed.batches, 2);
}
