use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Email published to the emailer service over ZeroMQ.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ZmqEmailMessage {
    pub from_email: String,
    pub from_name: String,
    pub recipients: Vec<String>,
    pub subject: String,
    /// Rendered HTML body.
    pub body: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}
