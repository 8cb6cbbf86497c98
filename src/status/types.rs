use super::table::Table;
use crate::config::Variant;
use crate::error::PayloadError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_PROGRESS: &str = "PROGRESS";
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// The envelope returned by the status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub result: Value,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>, result: Value) -> Self {
        Self {
            status: status.into(),
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub current: f64,
    pub total: f64,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Failed,
    Stored { s3_path: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Table(Table),
    Task(TaskOutcome),
}

/// A status envelope after validation, keyed by its status.
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    Pending,
    Progress(ProgressReport),
    Succeeded(Completion),
    Failed { detail: String },
}

impl JobUpdate {
    pub fn decode(variant: Variant, response: StatusResponse) -> Result<Self, PayloadError> {
        match response.status.as_str() {
            STATUS_PENDING => Ok(JobUpdate::Pending),
            STATUS_PROGRESS => decode_progress(&response.result).map(JobUpdate::Progress),
            STATUS_SUCCESS => {
                let completion = match variant {
                    Variant::Results => Completion::Table(decode_table(response.result)?),
                    Variant::Task => Completion::Task(decode_task(&response.result)?),
                };
                Ok(JobUpdate::Succeeded(completion))
            }
            _ => Ok(JobUpdate::Failed {
                detail: cell_text(&response.result),
            }),
        }
    }
}

fn decode_progress(result: &Value) -> Result<ProgressReport, PayloadError> {
    let number = |field: &'static str| {
        result
            .get(field)
            .and_then(Value::as_f64)
            .ok_or(PayloadError::MissingProgressField(field))
    };
    Ok(ProgressReport {
        current: number("current")?,
        total: number("total")?,
        message: result
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn decode_table(result: Value) -> Result<Table, PayloadError> {
    let Value::Array(rows) = result else {
        return Err(PayloadError::MissingRows);
    };
    let rows = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Array(cells) => Ok(cells.iter().map(cell_text).collect()),
            _ => Err(PayloadError::InvalidRow(i)),
        })
        .collect::<Result<Vec<Vec<String>>, _>>()?;
    Table::from_rows(rows)
}

fn decode_task(result: &Value) -> Result<TaskOutcome, PayloadError> {
    let Value::Object(fields) = result else {
        return Err(PayloadError::InvalidTaskResult);
    };
    if fields.get("error").is_some_and(is_truthy) {
        return Ok(TaskOutcome::Failed);
    }
    fields
        .get("s3_path")
        .and_then(Value::as_str)
        .map(|path| TaskOutcome::Stored {
            s3_path: path.to_string(),
        })
        .ok_or(PayloadError::MissingReference)
}

/// Script-style truthiness: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
