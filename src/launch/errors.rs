use thiserror::Error;

/// Failure raised by a single step
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{0}")]
    Failed(String),
    #[error("step cancelled")]
    Cancelled,
    #[error("resume signal dropped before it was delivered")]
    ResumeAbandoned,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of a whole pipeline run
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("step '{step}' at position {index} failed: {source}")]
    StepFailed {
        step: String,
        index: usize,
        #[source]
        source: StepError,
    },
    #[error("launch cancelled during step '{step}' at position {index}")]
    Cancelled { step: String, index: usize },
}

impl StepError {
    pub fn failed(reason: impl Into<String>) -> Self {
        StepError::Failed(reason.into())
    }
}

impl LaunchError {
    /// Classify a step failure, keeping cancellation distinct
    pub fn from_step(step: &str, index: usize, error: StepError) -> Self {
        match error {
            StepError::Cancelled => LaunchError::Cancelled {
                step: step.to_string(),
                index,
            },
            source => LaunchError::StepFailed {
                step: step.to_string(),
                index,
                source,
            },
        }
    }

    pub fn step(&self) -> &str {
        match self {
            LaunchError::StepFailed { step, .. } | LaunchError::Cancelled { step, .. } => step,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            LaunchError::StepFailed { index, .. } | LaunchError::Cancelled { index, .. } => *index,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LaunchError::Cancelled { .. })
    }
}
