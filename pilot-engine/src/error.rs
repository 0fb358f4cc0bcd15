use crate::model::ActionType;
use pilot_common::PilotError;

/// Why a single step could not be carried out.
#[derive(Debug, thiserror::Error)]
pub enum StepFault {
    /// A required step field was absent; nothing touched the page.
    #[error("{0}")]
    MissingField(&'static str),

    #[error("Unknown action type: {0}")]
    UnknownAction(String),

    /// The page-control surface reported a failure.
    #[error("{0:#}")]
    Page(#[from] anyhow::Error),

    /// The LLM or OCR bridge failed.
    #[error(transparent)]
    Bridge(#[from] PilotError),
}

/// A step failure tagged with its action kind.
#[derive(Debug, thiserror::Error)]
#[error("Step {action} failed: {fault}")]
pub struct StepExecutionError {
    pub action: ActionType,
    #[source]
    pub fault: StepFault,
}

impl StepExecutionError {
    pub fn new(action: ActionType, fault: StepFault) -> Self {
        Self { action, fault }
    }

    /// The underlying message, without the step prefix.
    pub fn cause(&self) -> String {
        self.fault.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn display_names_action_and_cause() {
        let err = StepExecutionError::new(
            ActionType::Click,
            StepFault::MissingField("Click action requires a selector"),
        );
        assert_eq!(
            err.to_string(),
            "Step click failed: Click action requires a selector"
        );
        assert_eq!(err.cause(), "Click action requires a selector");
    }

    #[test]
    fn page_faults_keep_the_whole_chain() {
        let inner: anyhow::Result<()> = Err(anyhow::anyhow!("no such element"));
        let fault = StepFault::from(inner.context("waiting for `#go`").unwrap_err());
        assert_eq!(fault.to_string(), "waiting for `#go`: no such element");
    }

    #[test]
    fn bridge_faults_are_transparent() {
        let fault = StepFault::from(PilotError::OcrAuth);
        let err = StepExecutionError::new(ActionType::OcrExtract, fault);
        assert_eq!(
            err.to_string(),
            "Step ocrExtract failed: OCR API authentication failed. Please check your API key."
        );
    }
}
