use shardsync::{JobConfig, Pipeline, ShardStatus};

use crate::flaky_sink;
use crate::helpers::init_logging;

fn job(checkpoints: &std::path::Path, fail_after: usize) -> JobConfig {
    let yaml = format!(
        r#"
name: flaky
batch_size: 2
parallelism: 2
checkpoints:
  storage: filesystem
  dir: '{}'
source:
  type: random
  tables:
    good:
      rows: 12
    bad:
      rows: 12
sink:
  type: flaky
  fail_table: bad
  fail_after: {fail_after}
  tables:
    good: [{{ name: id, type: long }}]
    bad: [{{ name: id, type: long }}]
"#,
        checkpoints.display()
    );
    JobConfig::from_yaml(&yaml).unwrap()
}

#[tokio::test]
async fn test_failed_shards_do_not_stop_others() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();

    let pipeline = Pipeline::new(job(tmp.path(), 1), flaky_sink::registry());
    let report = pipeline.run(false).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.shards.len(), 4);
    assert_eq!(report.completed(), 2);

    let bad: Vec<_> = report.shards.iter().filter(|s| s.table == "bad").collect();
    let good: Vec<_> = report.shards.iter().filter(|s| s.table == "good").collect();
    assert!(good
        .iter()
        .all(|s| matches!(s.status, ShardStatus::Completed) && s.rows_transferred == 6));

    for shard in bad {
        let failure = shard.failure().unwrap();
        assert_eq!(failure.table, "bad");
        assert_eq!(failure.range, shard.range);
        let message = format!("{:#}", failure.error);
        assert!(message.contains("Failed to write batch"), "{message}");
        assert!(message.contains("injected failure"), "{message}");

        // The first batch went through and was checkpointed
        let last = failure.last_checkpoint.as_ref().unwrap();
        assert!(!last.completed);
        assert_eq!(last.rows_transferred, 2);
        assert_eq!(shard.rows_transferred, 2);
    }

    let stored = pipeline.store().list_checkpoints("flaky").await.unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(stored.iter().filter(|cp| cp.completed).count(), 2);
}

#[tokio::test]
async fn test_resume_finishes_failed_shards() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();

    let first = Pipeline::new(job(tmp.path(), 1), flaky_sink::registry());
    assert_eq!(first.run(false).await.unwrap().failures().count(), 2);

    // Same job, the sink no longer fails
    let second = Pipeline::new(job(tmp.path(), 100), flaky_sink::registry());
    let report = second.run(true).await.unwrap();

    assert!(report.is_success(), "{report}");
    assert_eq!(report.skipped(), 2);
    assert_eq!(report.completed(), 2);
    for shard in report.shards.iter().filter(|s| s.table == "bad") {
        assert!(matches!(shard.status, ShardStatus::Completed));
        assert_eq!(shard.rows_transferred, 6);
        // Only the rows after the stored checkpoint were read again
        assert_eq!(shard.batches, 2);
    }
    assert_eq!(report.total_rows(), 24);
}

#[tokio::test]
async fn test_unknown_sink_type() {
    let tmp = tempfile::tempdir().unwrap();
    let mut job = job(tmp.path(), 1);
    job.sink.kind = "postgres".to_string();

    let err = Pipeline::new(job, flaky_sink::registry())
        .run(false)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown sink type 'postgres' (known: flaky, jsonl, mysql)"
    );
}
