//! Batch request and response types

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::collections::BTreeMap;

/// Most commands the platform executes in one batch
pub const MAX_BATCH_COMMANDS: usize = 50;

/// A set of named sub-calls executed server-side in one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSpec {
    /// Call name → method name
    pub calls: BTreeMap<String, String>,
    /// Call name → pre-encoded `key=value` query fragments
    pub call_params: BTreeMap<String, Vec<String>>,
    /// Stop the remaining commands on the first error
    pub halt: bool,
}

impl BatchSpec {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sub-call without parameters
    #[must_use]
    pub fn call(mut self, name: impl Into<String>, method: impl Into<String>) -> Self {
        self.calls.insert(name.into(), method.into());
        self
    }

    /// Add a sub-call with query fragments
    #[must_use]
    pub fn call_with_params<I, S>(
        mut self,
        name: impl Into<String>,
        method: impl Into<String>,
        params: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        self.calls.insert(name.clone(), method.into());
        self.call_params
            .insert(name, params.into_iter().map(Into::into).collect());
        self
    }

    /// Append one query fragment to a sub-call
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.call_params
            .entry(name.into())
            .or_default()
            .push(fragment.into());
        self
    }

    /// Set the halt flag
    #[must_use]
    pub fn halt(mut self, halt: bool) -> Self {
        self.halt = halt;
        self
    }

    /// Method strings with their query fragments appended
    ///
    /// The first fragment is joined with `?`, the rest with `&`. Fragments are
    /// used verbatim; callers are responsible for encoding them.
    pub fn commands(&self) -> Result<BTreeMap<String, String>> {
        if self.calls.is_empty() {
            return Err(Error::invalid_value("calls", "batch has no commands"));
        }
        if self.calls.len() > MAX_BATCH_COMMANDS {
            return Err(Error::invalid_value(
                "calls",
                format!(
                    "batch has {} commands, at most {MAX_BATCH_COMMANDS} are allowed",
                    self.calls.len()
                ),
            ));
        }

        let mut commands = self.calls.clone();
        for (name, fragments) in &self.call_params {
            let method = commands.get_mut(name).ok_or_else(|| {
                Error::invalid_value("call_params", format!("no call named '{name}' in batch"))
            })?;
            for (i, fragment) in fragments.iter().enumerate() {
                method.push(if i == 0 { '?' } else { '&' });
                method.push_str(fragment);
            }
        }
        Ok(commands)
    }

    /// Wire body of the batch request: `{halt, cmd}`
    pub fn encode(&self) -> Result<JsonValue> {
        Ok(json!({
            "halt": self.halt,
            "cmd": self.commands()?,
        }))
    }
}

/// Per-call results of a batch response
///
/// The platform serializes empty maps as `[]`, both shapes are accepted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BatchResponse {
    /// Successful results by call name
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub result: JsonObject,
    /// Errors by call name
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub result_error: JsonObject,
    /// Total item counts of list methods by call name
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub result_total: JsonObject,
    /// Offsets of the next page of list methods by call name
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub result_next: JsonObject,
    /// Timing information by call name
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub result_time: JsonObject,
}

impl BatchResponse {
    /// Split the payload returned by a batch call
    pub fn from_payload(payload: &JsonValue) -> Result<Self> {
        let inner = payload.get("result").ok_or_else(|| {
            Error::decode("batch response has no 'result' field", payload.to_string())
        })?;
        serde_json::from_value(inner.clone())
            .map_err(|e| Error::decode(e.to_string(), payload.to_string()))
    }

    /// Result of one sub-call
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.result.get(name)
    }

    /// Error of one sub-call
    pub fn error(&self, name: &str) -> Option<&JsonValue> {
        self.result_error.get(name)
    }

    /// Total count reported for one list sub-call
    pub fn total(&self, name: &str) -> Option<u64> {
        self.result_total.get(name).and_then(JsonValue::as_u64)
    }

    /// Offset of the next page for one list sub-call
    pub fn next(&self, name: &str) -> Option<u64> {
        self.result_next.get(name).and_then(JsonValue::as_u64)
    }

    /// True if no sub-call reported an error
    pub fn is_ok(&self) -> bool {
        self.result_error.is_empty()
    }
}

fn map_or_empty_list<'de, D>(deserializer: D) -> std::result::Result<JsonObject, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Array(items) if items.is_empty() => Ok(JsonObject::new()),
        JsonValue::Null => Ok(JsonObject::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a map of call results, got {other}"
        ))),
    }
}
