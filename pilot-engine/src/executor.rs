//! Runs whole tasks and records the outcome.

use crate::interpreter::StepInterpreter;
use crate::model::{Task, TaskResult, TaskStatus};
use crate::variables::Variables;
use chrono::Utc;
use pilot_drivers::PageControl;
use std::sync::Arc;
use tracing::Instrument;

/// Walks a task's steps in order and stops at the first failure.
///
/// Each [`run`](TaskExecutor::run) owns its own [`Variables`], so the
/// executor can be shared between concurrent runs on separate pages.
#[derive(Clone)]
pub struct TaskExecutor {
    interpreter: Arc<StepInterpreter>,
}

impl TaskExecutor {
    pub fn new(interpreter: StepInterpreter) -> Self {
        Self {
            interpreter: Arc::new(interpreter),
        }
    }

    /// Execute `task` against `page`. Never fails; step errors end up in
    /// the returned result.
    pub async fn run(&self, task: &Task, page: &dyn PageControl) -> TaskResult {
        let span = tracing::info_span!("task.run", task.id = %task.id, task.name = %task.name);
        self.run_inner(task, page).instrument(span).await
    }

    async fn run_inner(&self, task: &Task, page: &dyn PageControl) -> TaskResult {
        let mut result = TaskResult::started(&task.id);
        let mut variables = Variables::new();

        result.logs.push(format!("Starting task: {}", task.name));
        tracing::info!(steps = task.steps.len(), "task.start");

        let mut failure = None;
        for (index, step) in task.steps.iter().enumerate() {
            let span = tracing::debug_span!("step", step.index = index, step.action = %step.action);
            result.logs.push(format!("Executing step: {}", step.action));

            let outcome = self
                .interpreter
                .execute(step, page, &mut variables)
                .instrument(span.clone())
                .await;

            match outcome {
                Ok(()) => {
                    span.in_scope(|| tracing::debug!("step.completed"));
                    result.logs.push(format!("Step completed: {}", step.action));
                }
                Err(err) => {
                    span.in_scope(|| tracing::warn!(error = %err, "step.failed"));
                    failure = Some(err.to_string());
                    break;
                }
            }
        }

        result.end_time = Some(Utc::now());
        match failure {
            None => {
                result.status = TaskStatus::Completed;
                result.logs.push("Task completed successfully".to_string());
                tracing::info!("task.completed");
            }
            Some(message) => {
                result.status = TaskStatus::Failed;
                result.logs.push(format!("Task failed: {message}"));
                tracing::info!(error = %message, "task.failed");
                result.errors.push(message);
            }
        }

        result.outputs = variables.drain_snapshot();
        result
    }
}
