use checkpoint::{CheckpointEnvelope, CheckpointID, ShardCheckpoint};
use chrono::Utc;
use shardsync::ShardStatus;
use shardsync_jsonl_sink::JsonlSinkCheckpoint;
use shardsync_random_source::RandomSourceCheckpoint;

use crate::helpers::{file_count, init_logging, orders_job, pipeline, read_ids};

#[tokio::test]
async fn test_resume_skips_completed_shards() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let cps = tmp.path().join("cp");

    let job = orders_job("rerun", &out, &cps, 20, 2, 5);
    let first = pipeline(job.clone()).run(false).await.unwrap();
    assert!(first.is_success());
    assert_eq!(file_count(&out), 2);

    let second = pipeline(job).run(true).await.unwrap();
    assert_eq!(second.skipped(), 2);
    assert_eq!(second.total_rows(), 20);
    assert!(second.shards.iter().all(|s| s.batches == 0));
    // Nothing written again
    assert_eq!(file_count(&out), 2);
    assert_eq!(read_ids(&out), (1..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_without_resume_everything_runs_again() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");

    let job = orders_job("again", &out, &tmp.path().join("cp"), 10, 2, 5);
    pipeline(job.clone()).run(false).await.unwrap();
    let report = pipeline(job).run(false).await.unwrap();

    assert_eq!(report.completed(), 2);
    assert_eq!(file_count(&out), 4);
    assert_eq!(read_ids(&out).len(), 20);
}

/// Byte length of the first `lines` lines of a file.
fn prefix_len(path: &std::path::Path, lines: usize) -> u64 {
    std::fs::read_to_string(path)
        .unwrap()
        .split_inclusive('\n')
        .take(lines)
        .map(|line| line.len() as u64)
        .sum()
}

#[tokio::test]
async fn test_interrupted_shard_resumes_exactly_once() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");

    let job = orders_job("crash", &out, &tmp.path().join("cp"), 20, 2, 5);
    let pipeline = pipeline(job);
    let report = pipeline.run(false).await.unwrap();
    assert!(report.is_success());

    // Rewind shard 0 to its first checkpoint, as if the process died after
    // writing the rest of its rows but before checkpointing them
    let id = CheckpointID::new("crash", "orders", 0);
    let done = pipeline.store().read_checkpoint(&id).await.unwrap().unwrap();
    let sink: JsonlSinkCheckpoint = done.sink.as_ref().unwrap().parse().unwrap();
    let rewound = ShardCheckpoint {
        source: Some(CheckpointEnvelope::new(&RandomSourceCheckpoint { next_row: 5 }).unwrap()),
        sink: Some(
            CheckpointEnvelope::new(&JsonlSinkCheckpoint {
                offset: prefix_len(&sink.path, 5),
                rows: 5,
                path: sink.path.clone(),
            })
            .unwrap(),
        ),
        rows_transferred: 5,
        completed: false,
        created_at: Utc::now(),
        ..done
    };
    pipeline.store().store_checkpoint(&rewound).await.unwrap();

    let report = pipeline.run(true).await.unwrap();
    assert!(report.is_success(), "{report}");
    let shard0 = &report.shards[0];
    assert!(matches!(shard0.status, ShardStatus::Completed));
    assert_eq!(shard0.rows_transferred, 10);
    assert_eq!(shard0.batches, 1);
    assert!(matches!(report.shards[1].status, ShardStatus::Skipped));

    // The unacknowledged tail was truncated, then rewritten once
    assert_eq!(file_count(&out), 2);
    assert_eq!(read_ids(&out), (1..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_replanned_shards_fail_instead_of_resuming() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let cps = tmp.path().join("cp");

    let first = pipeline(orders_job("replan", &out, &cps, 20, 2, 5));
    let id = CheckpointID::new("replan", "orders", 0);
    let stale = ShardCheckpoint {
        job: "replan".to_string(),
        table: "orders".to_string(),
        shard_index: 0,
        range: sync_core::ShardRange::new(0, 7),
        source: None,
        sink: None,
        rows_transferred: 3,
        completed: false,
        created_at: Utc::now(),
    };
    assert_eq!(stale.id(), id);
    first.store().store_checkpoint(&stale).await.unwrap();

    let report = first.run(true).await.unwrap();
    let failure = report.shards[0].failure().unwrap();
    assert!(failure.error.to_string().contains("[0, 7)"));
    assert_eq!(failure.last_checkpoint.as_ref(), Some(&stale));
    assert!(matches!(report.shards[1].status, ShardStatus::Completed));
    assert_eq!(read_ids(&out), (11..=20).collect::<Vec<_>>());
}
