//! Connector registry.
//!
//! Maps the `type` of a job's connector section to a factory building the
//! boxed connector from its options.

use std::collections::BTreeMap;

use anyhow::{anyhow, Context};
use connector::{Sink, Source};
use shardsync_jsonl_sink::{JsonlSink, JsonlSinkConfig};
use shardsync_mysql_sink::{MySQLSink, MySQLSinkConfig};
use shardsync_random_source::{RandomSource, RandomSourceConfig};

use crate::config::ConnectorConfig;

/// Job-wide settings handed to every factory.
#[derive(Debug, Clone, Copy)]
pub struct ConnectorContext {
    pub batch_size: usize,
}

pub type SourceFactory = fn(&ConnectorConfig, &ConnectorContext) -> anyhow::Result<Box<dyn Source>>;
pub type SinkFactory = fn(&ConnectorConfig, &ConnectorContext) -> anyhow::Result<Box<dyn Sink>>;

/// Known source and sink types.
#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    sources: BTreeMap<&'static str, SourceFactory>,
    sinks: BTreeMap<&'static str, SinkFactory>,
}

impl ConnectorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every connector shipped in this workspace.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_source(shardsync_random_source::CONNECTOR_TYPE, random_source);
        registry.register_sink(shardsync_mysql_sink::CONNECTOR_TYPE, mysql_sink);
        registry.register_sink(shardsync_jsonl_sink::CONNECTOR_TYPE, jsonl_sink);
        registry
    }

    pub fn register_source(&mut self, kind: &'static str, factory: SourceFactory) -> &mut Self {
        self.sources.insert(kind, factory);
        self
    }

    pub fn register_sink(&mut self, kind: &'static str, factory: SinkFactory) -> &mut Self {
        self.sinks.insert(kind, factory);
        self
    }

    pub fn source_types(&self) -> Vec<&'static str> {
        self.sources.keys().copied().collect()
    }

    pub fn sink_types(&self) -> Vec<&'static str> {
        self.sinks.keys().copied().collect()
    }

    /// Build the source described by `config`.
    pub fn build_source(
        &self,
        config: &ConnectorConfig,
        ctx: &ConnectorContext,
    ) -> anyhow::Result<Box<dyn Source>> {
        let factory = self.sources.get(config.kind.as_str()).ok_or_else(|| {
            anyhow!(
                "Unknown source type '{}' (known: {})",
                config.kind,
                self.source_types().join(", ")
            )
        })?;
        factory(config, ctx)
    }

    /// Build the sink described by `config`.
    pub fn build_sink(
        &self,
        config: &ConnectorConfig,
        ctx: &ConnectorContext,
    ) -> anyhow::Result<Box<dyn Sink>> {
        let factory = self.sinks.get(config.kind.as_str()).ok_or_else(|| {
            anyhow!(
                "Unknown sink type '{}' (known: {})",
                config.kind,
                self.sink_types().join(", ")
            )
        })?;
        factory(config, ctx)
    }
}

fn random_source(
    config: &ConnectorConfig,
    ctx: &ConnectorContext,
) -> anyhow::Result<Box<dyn Source>> {
    let options: RandomSourceConfig = config.decode()?;
    let source =
        RandomSource::new(options, ctx.batch_size).context("Failed to create random source")?;
    Ok(Box::new(source))
}

fn mysql_sink(config: &ConnectorConfig, _ctx: &ConnectorContext) -> anyhow::Result<Box<dyn Sink>> {
    let options: MySQLSinkConfig = config.decode()?;
    let sink = MySQLSink::new(options).context("Failed to create MySQL sink")?;
    Ok(Box::new(sink))
}

fn jsonl_sink(config: &ConnectorConfig, _ctx: &ConnectorContext) -> anyhow::Result<Box<dyn Sink>> {
    let options: JsonlSinkConfig = config.decode()?;
    let sink = JsonlSink::new(options).context("Failed to create JSONL sink")?;
    Ok(Box::new(sink))
}
