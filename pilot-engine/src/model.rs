//! Tasks, steps and run results in their JSON authoring shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Lifecycle of a [`Task`]. A [`TaskResult`] only ever reports
/// `Running`, `Completed` or `Failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
    Paused,
}

/// What a step does.
///
/// Unrecognised names are kept as [`ActionType::Unknown`] so a task file
/// still loads; the step fails when it is reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    Navigate,
    Click,
    Type,
    Wait,
    Extract,
    Screenshot,
    Scroll,
    Select,
    ExecuteScript,
    LlmAnalyze,
    OcrExtract,
    Unknown(String),
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            ActionType::Navigate => "navigate",
            ActionType::Click => "click",
            ActionType::Type => "type",
            ActionType::Wait => "wait",
            ActionType::Extract => "extract",
            ActionType::Screenshot => "screenshot",
            ActionType::Scroll => "scroll",
            ActionType::Select => "select",
            ActionType::ExecuteScript => "executeScript",
            ActionType::LlmAnalyze => "llmAnalyze",
            ActionType::OcrExtract => "ocrExtract",
            ActionType::Unknown(name) => name,
        }
    }
}

impl From<&str> for ActionType {
    fn from(name: &str) -> Self {
        match name {
            "navigate" => ActionType::Navigate,
            "click" => ActionType::Click,
            "type" => ActionType::Type,
            "wait" => ActionType::Wait,
            "extract" => ActionType::Extract,
            "screenshot" => ActionType::Screenshot,
            "scroll" => ActionType::Scroll,
            "select" => ActionType::Select,
            "executeScript" => ActionType::ExecuteScript,
            "llmAnalyze" => ActionType::LlmAnalyze,
            "ocrExtract" => ActionType::OcrExtract,
            other => ActionType::Unknown(other.to_string()),
        }
    }
}

impl From<String> for ActionType {
    fn from(name: String) -> Self {
        ActionType::from(name.as_str())
    }
}

impl From<ActionType> for String {
    fn from(action: ActionType) -> Self {
        match action {
            ActionType::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declarative instruction. `value` is interpreted per action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub id: String,
    pub action: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_variable: Option<String>,
    /// Reserved; never evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl Step {
    pub fn new(action: impl Into<ActionType>) -> Self {
        Self {
            id: String::new(),
            action: action.into(),
            selector: None,
            value: None,
            wait_time: None,
            output_variable: None,
            condition: None,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_wait_time(mut self, ms: u64) -> Self {
        self.wait_time = Some(ms);
        self
    }

    pub fn with_output(mut self, variable: impl Into<String>) -> Self {
        self.output_variable = Some(variable.into());
        self
    }

    // Empty strings and a zero wait count as unset.

    pub fn selector(&self) -> Option<&str> {
        non_empty(&self.selector)
    }

    pub fn value(&self) -> Option<&str> {
        non_empty(&self.value)
    }

    pub fn output_variable(&self) -> Option<&str> {
        non_empty(&self.output_variable)
    }

    pub fn wait_time(&self) -> Option<u64> {
        self.wait_time.filter(|ms| *ms > 0)
    }
}

/// A named, ordered list of steps plus lifecycle metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<DateTime<Utc>>,
    /// Informational; nothing schedules on it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, description: Option<String>, steps: Vec<Step>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description,
            steps,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            last_run_at: None,
            schedule: None,
        }
    }
}

/// Record of one run of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub task_id: String,
    pub status: TaskStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub outputs: Map<String, Value>,
    pub logs: Vec<String>,
    pub errors: Vec<String>,
}

impl TaskResult {
    pub(crate) fn started(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            status: TaskStatus::Running,
            start_time: Utc::now(),
            end_time: None,
            outputs: Map::new(),
            logs: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}
