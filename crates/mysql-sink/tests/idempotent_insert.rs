//! Integration tests against a MySQL server in Docker.
//!
//! Run with `cargo test -p shardsync-mysql-sink -- --ignored`.

use std::sync::Arc;

use connector::{Sink, SinkWriter};
use mysql_async::prelude::*;
use shardsync_mysql_sink::testing::{container::ROOT_PASSWORD, MySQLContainer};
use shardsync_mysql_sink::{MySQLSink, MySQLSinkConfig};
use sync_core::{BasicType, Field, RecordBatch, RecordBuilder, Value};

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};
    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init();
}

async fn start_container(name: &str, port: u16) -> anyhow::Result<MySQLContainer> {
    let container = MySQLContainer::new(name, port);
    container.start()?;
    container.wait_until_ready(90).await?;

    let pool = container.get_pool()?;
    let mut conn = pool.get_conn().await?;
    conn.query_drop(
        "CREATE TABLE orders (id BIGINT PRIMARY KEY, name VARCHAR(255), paid TINYINT(1))",
    )
    .await?;
    drop(conn);
    pool.disconnect().await?;
    Ok(container)
}

fn sink_config(container: &MySQLContainer) -> MySQLSinkConfig {
    let mut config = MySQLSinkConfig::new(container.url());
    config.user = Some("root".to_string());
    config.password = Some(ROOT_PASSWORD.to_string());
    config
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_discovers_schema_and_template() -> anyhow::Result<()> {
    init_logging();
    let container = start_container("shardsync-mysql-schema", 13306).await?;

    let mut sink = MySQLSink::new(sink_config(&container))?;
    sink.init().await?;

    let schema = sink.schema()?;
    let orders = schema.get_table("orders").expect("orders table");
    assert_eq!(
        orders.record_type.fields(),
        &[
            Field::new("id", BasicType::Long),
            Field::new("name", BasicType::String),
            Field::new("paid", BasicType::Boolean),
        ]
    );
    assert_eq!(
        sink.template("orders"),
        Some("INSERT IGNORE INTO orders(id,name,paid) VALUES (?,?,?)")
    );

    sink.shutdown().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_writing_same_batch_twice_is_idempotent() -> anyhow::Result<()> {
    init_logging();
    let container = start_container("shardsync-mysql-idempotent", 13307).await?;

    let mut sink = MySQLSink::new(sink_config(&container))?;
    sink.init().await?;
    let schema = sink.schema()?;
    let orders = schema.get_table("orders").expect("orders table");

    let record_type = Arc::clone(&orders.record_type);
    let records = (1..=3)
        .map(|id| {
            let mut builder = RecordBuilder::new(record_type.clone());
            builder.set(0, Value::Long(id))?;
            builder.set(1, Value::String(format!("customer-{id}")))?;
            builder.set(2, Value::Bool(id % 2 == 0))?;
            builder.build()
        })
        .collect::<Result<Vec<_>, _>>()?;
    let batch = RecordBatch::new(record_type, records);

    let mut writer = sink.create_writer(orders)?;
    writer.open(None).await?;
    writer.write_batch(&batch).await?;
    // Re-delivery after a resume
    writer.write_batch(&batch).await?;
    assert!(writer.checkpoint()?.is_none());
    writer.close().await?;

    let pool = container.get_pool()?;
    let mut conn = pool.get_conn().await?;
    let count: Option<i64> = conn.query_first("SELECT COUNT(*) FROM orders").await?;
    assert_eq!(count, Some(3));
    let paid: Option<i64> = conn
        .query_first("SELECT COUNT(*) FROM orders WHERE paid = 1")
        .await?;
    assert_eq!(paid, Some(1));
    drop(conn);
    pool.disconnect().await?;

    sink.shutdown().await?;
    Ok(())
}
