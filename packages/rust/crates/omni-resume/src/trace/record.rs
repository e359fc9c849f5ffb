//! Typed trace and observation records, validated from raw API JSON.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::error::RecordError;

/// Span name that carries the raw user input of a turn.
pub const USER_INTERACTION_SPAN: &str = "user-interaction";

/// One external record of a conversational round.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub id: String,
    pub session_id: Option<String>,
    pub name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub input: Option<Value>,
    pub output: Option<Value>,
}

/// Kind-specific observation payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationBody {
    Span {
        input: Option<Value>,
        output: Option<Value>,
    },
    Generation {
        input: Option<Value>,
        output: Option<Value>,
    },
    /// Any other `type` (events, tools, future kinds); kept for ordering only.
    Unknown { kind: String },
}

/// A sub-event of a trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub id: String,
    pub trace_id: String,
    pub name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub body: ObservationBody,
}

impl Observation {
    /// Raw user input when this is the `user-interaction` span.
    #[must_use]
    pub fn user_interaction_input(&self) -> Option<&Value> {
        match &self.body {
            ObservationBody::Span { input, .. }
                if self.name.as_deref() == Some(USER_INTERACTION_SPAN) =>
            {
                input.as_ref()
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn generation_input(&self) -> Option<&Value> {
        match &self.body {
            ObservationBody::Generation { input, .. } => input.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn generation_output(&self) -> Option<&Value> {
        match &self.body {
            ObservationBody::Generation { output, .. } => output.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_generation(&self) -> bool {
        matches!(self.body, ObservationBody::Generation { .. })
    }

    /// Validate one element of an observations `data` array.
    ///
    /// # Errors
    /// Returns [`RecordError`] when `id`/`traceId` are missing or a field is mistyped.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;
        let id = required_string(object, "id")?;
        let trace_id = required_string(object, "traceId")?;
        let name = optional_string(object, "name")?;
        let start_time = optional_timestamp(object, "startTime")?;
        let input = payload(object, "input");
        let output = payload(object, "output");
        let kind = optional_string(object, "type")?.unwrap_or_default();
        let body = match kind.as_str() {
            "SPAN" => ObservationBody::Span { input, output },
            "GENERATION" => ObservationBody::Generation { input, output },
            _ => ObservationBody::Unknown { kind },
        };
        Ok(Self {
            id,
            trace_id,
            name,
            start_time,
            body,
        })
    }
}

impl Trace {
    /// Validate one trace object (list element or detail response).
    ///
    /// # Errors
    /// Returns [`RecordError`] when `id` is missing or a field is mistyped.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;
        Ok(Self {
            id: required_string(object, "id")?,
            session_id: optional_string(object, "sessionId")?,
            name: optional_string(object, "name")?,
            timestamp: optional_timestamp(object, "timestamp")?,
            input: payload(object, "input"),
            output: payload(object, "output"),
        })
    }
}

fn required_string(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<String, RecordError> {
    optional_string(object, field)?
        .filter(|value| !value.trim().is_empty())
        .ok_or(RecordError::MissingField(field))
}

fn optional_string(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, RecordError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(RecordError::InvalidField(field)),
    }
}

fn optional_timestamp(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, RecordError> {
    let Some(raw) = optional_string(object, field)? else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|parsed| Some(parsed.with_timezone(&Utc)))
        .map_err(|_| RecordError::InvalidField(field))
}

fn payload(object: &Map<String, Value>, field: &str) -> Option<Value> {
    object.get(field).filter(|value| !value.is_null()).cloned()
}
