//! MySQL sink connection options.

use std::collections::BTreeMap;

use mysql_async::{Opts, OptsBuilder};
use serde::{Deserialize, Serialize};
use sync_core::ConnectorError;

use crate::CONNECTOR_TYPE;

/// Connection options of the MySQL sink.
///
/// These are the only recognised fields:
///
/// ```yaml
/// type: mysql
/// url: mysql://localhost:3306/shop
/// user: loader
/// password: secret
/// properties:
///   pool_max: "16"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MySQLSinkConfig {
    /// Connection URL; the database in its path is the one discovered
    pub url: String,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Driver properties, merged into the URL query string
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl MySQLSinkConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: None,
            password: None,
            properties: BTreeMap::new(),
        }
    }

    /// The URL with every property appended to its query string.
    pub fn connection_url(&self) -> String {
        let mut url = self.url.clone();
        for (key, value) in &self.properties {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encode_component(key));
            url.push('=');
            url.push_str(&encode_component(value));
        }
        url
    }

    /// Driver options; explicit `user` and `password` win over the URL.
    pub fn opts(&self) -> Result<Opts, ConnectorError> {
        let opts = Opts::from_url(&self.connection_url()).map_err(|e| {
            ConnectorError::config(CONNECTOR_TYPE, format!("invalid url: {e}"))
        })?;

        let mut builder = OptsBuilder::from_opts(opts);
        if let Some(user) = &self.user {
            builder = builder.user(Some(user));
        }
        if let Some(password) = &self.password {
            builder = builder.pass(Some(password));
        }
        Ok(builder.into())
    }
}

/// Percent-encode everything but RFC 3986 unreserved characters.
fn encode_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
