//! The `{"tasks": [...]}` task file format.

use anyhow::{Context, Result, bail};
use pilot_engine::{Step, Task};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskFile {
    pub tasks: Vec<TaskSpec>,
}

/// A task as authored: no lifecycle fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl TaskSpec {
    pub fn into_task(self) -> Task {
        let mut task = Task::new(self.name, self.description, self.steps);
        if let Some(id) = self.id.filter(|id| !id.is_empty()) {
            task.id = id;
        }
        task
    }
}

pub fn parse_task_file(raw: &str) -> Result<Vec<Task>> {
    let file: TaskFile = serde_json::from_str(raw)
        .context(r#"invalid task file, expected { "tasks": [...] }"#)?;
    Ok(file.tasks.into_iter().map(TaskSpec::into_task).collect())
}

pub fn load_task_file(path: &Path) -> Result<Vec<Task>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    parse_task_file(&raw).with_context(|| format!("in {}", path.display()))
}

/// Keep the tasks whose id or name equals `wanted`; all of them when `None`.
pub fn select_tasks(tasks: Vec<Task>, wanted: Option<&str>) -> Result<Vec<Task>> {
    let Some(wanted) = wanted else {
        return Ok(tasks);
    };
    let picked: Vec<Task> = tasks
        .into_iter()
        .filter(|t| t.id == wanted || t.name == wanted)
        .collect();
    if picked.is_empty() {
        bail!("no task with id or name `{wanted}`");
    }
    Ok(picked)
}

/// Wrap model-generated steps into a one-task file. Entries that do not look
/// like steps are dropped.
pub fn planned_task_file(name: &str, description: &str, generated: Vec<Value>) -> TaskFile {
    let steps = generated
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<Step>(raw.clone()) {
            Ok(step) => Some(step),
            Err(err) => {
                tracing::warn!(%err, step = %raw, "plan.step_skipped");
                None
            }
        })
        .collect();

    TaskFile {
        tasks: vec![TaskSpec {
            id: None,
            name: name.to_string(),
            description: Some(description.to_string()),
            steps,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilot_engine::{ActionType, TaskStatus};
    use serde_json::json;

    const FILE: &str = r##"{
      "tasks": [
        {
          "name": "Scrape headline",
          "description": "Grab the first heading",
          "steps": [
            { "action": "navigate", "value": "https://example.com" },
            { "action": "extract", "selector": "h1", "outputVariable": "headline" }
          ]
        },
        { "id": "fixed-id", "name": "Screenshot", "steps": [{ "action": "screenshot" }] }
      ]
    }"##;

    #[test]
    fn parses_authored_tasks() {
        let tasks = parse_task_file(FILE).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert!(!tasks[0].id.is_empty());
        assert_eq!(tasks[0].steps[1].action, ActionType::Extract);
        assert_eq!(tasks[1].id, "fixed-id");
    }

    #[test]
    fn rejects_other_shapes() {
        let err = parse_task_file(r#"[{"name":"x"}]"#).unwrap_err();
        assert!(err.to_string().contains("expected"));
    }

    #[test]
    fn selects_by_id_or_name() {
        let tasks = parse_task_file(FILE).unwrap();
        let by_name = select_tasks(tasks, Some("Scrape headline")).unwrap();
        assert_eq!(by_name.len(), 1);

        let tasks = parse_task_file(FILE).unwrap();
        assert_eq!(select_tasks(tasks, Some("fixed-id")).unwrap()[0].name, "Screenshot");

        let tasks = parse_task_file(FILE).unwrap();
        assert!(select_tasks(tasks, Some("missing")).is_err());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, FILE).unwrap();
        assert_eq!(load_task_file(&path).unwrap().len(), 2);
        assert!(load_task_file(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn plan_keeps_step_shaped_entries() {
        let file = planned_task_file(
            "search",
            "search for rust",
            vec![
                json!({ "action": "navigate", "value": "https://duckduckgo.com" }),
                json!({ "description": "no action here" }),
                json!({ "action": "type", "selector": "input[name=q]", "value": "rust" }),
            ],
        );
        let steps = &file.tasks[0].steps;
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].action, ActionType::Type);

        let round_trip = parse_task_file(&serde_json::to_string(&file).unwrap()).unwrap();
        assert_eq!(round_trip[0].steps.len(), 2);
    }
}
