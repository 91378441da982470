// src/models.rs
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

use crate::errors::Result;

/// Legacy location of the timing field, written by older backends into the
/// report itself.
const LEGACY_TIMING_FIELD: &str = "_timing_ms";
const TIMING_FIELD: &str = "timing_ms";

/// Analysis intensity forwarded to the backend as the `mode` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Turbo,
    Heavy,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Turbo => "turbo",
            Mode::Heavy => "heavy",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Turbo => Mode::Heavy,
            Mode::Heavy => Mode::Turbo,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "turbo" => Ok(Mode::Turbo),
            "heavy" => Ok(Mode::Heavy),
            other => Err(format!("unknown analysis mode '{}'", other)),
        }
    }
}

/// JSON body of `POST /api/analyze`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub user_input: String,
}

/// Outer wrapper returned by both analysis endpoints. `report_json` is itself
/// a JSON document encoded as a string.
#[derive(Debug, Deserialize, Clone)]
pub struct ResponseEnvelope {
    pub report_json: String,

    /// Kept untyped: only a JSON number counts as timing information.
    #[serde(default)]
    pub timing_ms: Option<Value>,

    #[serde(default)]
    pub session_id: Option<String>,
}

/// Error body sent by the backend alongside a non-success status.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// The detail as a display message, if it carries anything.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Message shown for a failed HTTP exchange.
pub fn http_error_message(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status))
}

/// A parsed security report. The shape is owned by the backend, so it stays
/// an open JSON value with the backend's key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report(Value);

impl Report {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Decodes `report_json` and injects `timing_ms`. The envelope value wins;
    /// otherwise a numeric `_timing_ms` is copied over unless the report
    /// already carries a numeric `timing_ms`.
    pub fn from_envelope(envelope: &ResponseEnvelope) -> Result<Self> {
        let mut value: Value = serde_json::from_str(&envelope.report_json)?;
        merge_timing(&mut value, envelope.timing_ms.as_ref());
        Ok(Self(value))
    }

    pub fn timing_ms(&self) -> Option<&Number> {
        match self.0.get(TIMING_FIELD) {
            Some(Value::Number(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Two-space indented rendering used for both display and export.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }
}

fn merge_timing(report: &mut Value, envelope_timing: Option<&Value>) {
    // Non-object reports are rendered as they came.
    let Some(fields) = report.as_object_mut() else {
        return;
    };

    if let Some(timing) = envelope_timing.filter(|v| v.is_number()) {
        fields.insert(TIMING_FIELD.to_string(), timing.clone());
        return;
    }

    let has_timing = fields.get(TIMING_FIELD).is_some_and(Value::is_number);
    if has_timing {
        return;
    }
    if let Some(legacy) = fields.get(LEGACY_TIMING_FIELD).filter(|v| v.is_number()).cloned() {
        fields.insert(TIMING_FIELD.to_string(), legacy);
    }
}
