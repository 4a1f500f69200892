//! Execution coordinator: runs at most one job at a time on a background
//! thread and hands its outcome back to the interactive thread on poll.

mod coordinator;
mod inference;
mod job;

pub use coordinator::{Coordinator, PollReport, Submission};
pub use inference::submit_inference;
pub use job::{JobError, JobId, JobStatus};
