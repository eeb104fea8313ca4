//! Resource quota patch bodies.

use std::collections::BTreeMap;

use serde::Serialize;

/// A strategic-merge patch for a space's `ResourceQuota`, e.g.
/// `{"spec":{"hard":{"limits.cpu":"4"}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceQuotaPatch {
    spec: QuotaSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
struct QuotaSpec {
    hard: BTreeMap<String, String>,
}

impl ResourceQuotaPatch {
    pub fn from_limits<I>(limits: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            spec: QuotaSpec {
                hard: limits.into_iter().collect(),
            },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Parse a `resource=quantity` pair such as `requests.memory=8Gi`.
pub fn parse_limit(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected RESOURCE=QUANTITY, got '{s}'"))?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return Err(format!("expected RESOURCE=QUANTITY, got '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
