use std::any::Any;
use std::fmt;

use thiserror::Error;

/// Identifier of a submitted job, unique per coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub(crate) u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Lifecycle of a job: `Pending` until its outcome is delivered, then
/// `Done` or `Failed`. Both end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Done,
    Failed,
}

/// Why a job produced no result.
#[derive(Debug, Error)]
pub enum JobError {
    /// The task returned an error.
    #[error("{0:#}")]
    Failed(anyhow::Error),

    /// The task panicked; the panic was contained on its worker thread.
    #[error("job panicked: {0}")]
    Panicked(String),

    /// No worker thread could be started.
    #[error("could not start worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

impl JobError {
    /// The task's own error, if it returned one. Use `downcast_ref` on it to
    /// recover typed errors such as `ModelError`.
    pub fn task_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
