use checkpoint::CheckpointStorage;

use crate::helpers::{file_count, init_logging, orders_job, pipeline, read_ids, read_rows};

#[tokio::test]
async fn test_transfers_every_row_once() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let cps = tmp.path().join("checkpoints");

    let pipeline = pipeline(orders_job("e2e", &out, &cps, 25, 3, 4));
    let report = pipeline.run(false).await.unwrap();

    assert!(report.is_success(), "{report}");
    assert_eq!(report.shards.len(), 3);
    assert_eq!(report.completed(), 3);
    assert_eq!(report.total_rows(), 25);
    let ranges: Vec<String> = report.shards.iter().map(|s| s.range.to_string()).collect();
    assert_eq!(ranges, vec!["[0, 9)", "[9, 17)", "[17, 25)"]);

    // One file per shard, each row exactly once
    assert_eq!(file_count(&out), 3);
    assert_eq!(read_ids(&out), (1..=25).collect::<Vec<_>>());
    for row in read_rows(&out) {
        let id = row["id"].as_i64().unwrap();
        assert_eq!(row["name"], format!("customer-{id}"));
        // 10 random bytes, base64 encoded
        assert_eq!(row["payload"].as_str().unwrap().len(), 16);
    }

    let stored = pipeline.store().list_checkpoints("e2e").await.unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|cp| cp.completed));
    assert_eq!(stored.iter().map(|cp| cp.rows_transferred).sum::<u64>(), 25);
    for cp in &stored {
        assert_eq!(cp.source.as_ref().unwrap().connector_type(), "random");
        assert_eq!(cp.sink.as_ref().unwrap().connector_type(), "jsonl");
    }
}

#[tokio::test]
async fn test_empty_table_completes_without_rows() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");

    let pipeline = pipeline(orders_job("empty", &out, &tmp.path().join("cp"), 0, 2, 4));
    let report = pipeline.run(false).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.total_rows(), 0);
    assert!(read_ids(&out).is_empty());
}

#[tokio::test]
async fn test_disabled_checkpoints_store_nothing() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let cps = tmp.path().join("cp");

    let mut job = orders_job("nocp", &out, &cps, 10, 2, 3);
    job.checkpoints = CheckpointStorage::Disabled;
    let pipeline = pipeline(job);
    let report = pipeline.run(false).await.unwrap();

    assert!(report.is_success());
    assert_eq!(read_ids(&out), (1..=10).collect::<Vec<_>>());
    assert!(pipeline.store().list_checkpoints("nocp").await.unwrap().is_empty());
    assert!(!cps.exists());
}

#[tokio::test]
async fn test_schema_mismatch_aborts_before_data_moves() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");

    let mut job = orders_job("mismatch", &out, &tmp.path().join("cp"), 10, 2, 3);
    // A source table the sink does not have
    let mut ghost = serde_yaml::Mapping::new();
    ghost.insert("rows".into(), 5.into());
    ghost.insert(
        "columns".into(),
        serde_yaml::from_str("[{ name: a, type: int }]").unwrap(),
    );
    let tables = job
        .source
        .options
        .get_mut("tables")
        .and_then(serde_yaml::Value::as_mapping_mut)
        .unwrap();
    tables.insert("ghost".into(), serde_yaml::Value::Mapping(ghost));

    let err = pipeline(job).run(false).await.unwrap_err();
    assert!(format!("{err:#}").contains("Source and sink schemas do not match"));
    assert!(format!("{err:#}").contains("ghost"));
    assert_eq!(file_count(&out), 0);
}

#[tokio::test]
async fn test_prepare_reports_reconciled_schema() {
    let tmp = tempfile::tempdir().unwrap();
    let pipeline = pipeline(orders_job(
        "schema",
        &tmp.path().join("out"),
        &tmp.path().join("cp"),
        10,
        2,
        3,
    ));

    let connectors = pipeline.prepare().await.unwrap();
    let schema = connectors.schema().unwrap();
    let orders = schema.get_table("orders").unwrap();
    assert_eq!(orders.record_type.field_names(), vec!["id", "name", "payload"]);
}
