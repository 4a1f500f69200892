//! Single-flight job coordinator.
//!
//! The interactive thread owns the [`Coordinator`]. [`Coordinator::submit`]
//! starts the task on a fresh worker thread and returns at once; the worker
//! only ever touches the hand-off channel. [`Coordinator::poll`], called on
//! a timer tick, drains every finished job in completion order and runs the
//! success callback or the error sink on the interactive thread.

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, error, info, warn};

use crate::job::{JobError, JobId, JobStatus, panic_message};

/// Outcome of [`Coordinator::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The job is running in the background.
    Started(JobId),
    /// Another job is in flight; nothing was started or queued.
    Busy,
}

/// Jobs delivered by one [`Coordinator::poll`], in delivery order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub outcomes: Vec<(JobId, JobStatus)>,
}

impl PollReport {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn done(&self) -> usize {
        self.count(JobStatus::Done)
    }

    pub fn failed(&self) -> usize {
        self.count(JobStatus::Failed)
    }

    pub fn extend(&mut self, other: PollReport) {
        self.outcomes.extend(other.outcomes);
    }

    fn count(&self, status: JobStatus) -> usize {
        self.outcomes.iter().filter(|(_, s)| *s == status).count()
    }
}

type ErrorSink = Box<dyn FnMut(JobId, &JobError)>;

struct Completion<T> {
    id: JobId,
    outcome: Result<T, JobError>,
}

struct InFlight<T> {
    id: JobId,
    name: String,
    started: Instant,
    on_success: Box<dyn FnOnce(T)>,
}

pub struct Coordinator<T> {
    tx: Sender<Completion<T>>,
    rx: Receiver<Completion<T>>,
    in_flight: Option<InFlight<T>>,
    next_id: u64,
    poll_interval: Duration,
    on_error: ErrorSink,
}

impl<T: Send + 'static> Coordinator<T> {
    /// A coordinator whose failures are only logged. Use
    /// [`with_error_sink`](Self::with_error_sink) to surface them.
    pub fn new(poll_interval: Duration) -> Self {
        let (tx, rx) = channel::unbounded();
        Self {
            tx,
            rx,
            in_flight: None,
            next_id: 1,
            poll_interval,
            on_error: Box::new(|id, err| error!(job = %id, error = %err, "job failed")),
        }
    }

    /// Route failed jobs to `sink`, which runs on the polling thread.
    pub fn with_error_sink(mut self, sink: impl FnMut(JobId, &JobError) + 'static) -> Self {
        self.on_error = Box::new(sink);
        self
    }

    /// Tick period the owner should call [`poll`](Self::poll) at.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The job in flight, if any. It stays `Pending` until delivered.
    pub fn current(&self) -> Option<(JobId, JobStatus)> {
        self.in_flight.as_ref().map(|job| (job.id, JobStatus::Pending))
    }

    /// Start `task` on a new worker thread unless a job is already in flight.
    ///
    /// `on_success` runs on the polling thread once the result is delivered.
    pub fn submit<F, S>(&mut self, name: impl Into<String>, task: F, on_success: S) -> Submission
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
        S: FnOnce(T) + 'static,
    {
        let name = name.into();
        if let Some(current) = &self.in_flight {
            debug!(rejected = %name, running = %current.id, "coordinator busy");
            return Submission::Busy;
        }

        let id = JobId(self.next_id);
        self.next_id += 1;

        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("studio-{name}-{}", id.0))
            .spawn(move || {
                let outcome = match panic::catch_unwind(AssertUnwindSafe(task)) {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(err)) => Err(JobError::Failed(err)),
                    Err(payload) => Err(JobError::Panicked(panic_message(payload.as_ref()))),
                };
                // A dropped coordinator has nobody left to notify.
                let _ = tx.send(Completion { id, outcome });
            });

        if let Err(err) = spawned {
            // Report through the normal delivery path so the busy flag is
            // cleared by the next poll.
            let _ = self.tx.send(Completion {
                id,
                outcome: Err(JobError::Spawn(err)),
            });
        }

        info!(job = %id, %name, "job started");
        self.in_flight = Some(InFlight {
            id,
            name,
            started: Instant::now(),
            on_success: Box::new(on_success),
        });
        Submission::Started(id)
    }

    /// Deliver every finished job. Never blocks.
    pub fn poll(&mut self) -> PollReport {
        let mut report = PollReport::default();
        while let Ok(completion) = self.rx.try_recv() {
            if let Some(status) = self.deliver(completion) {
                report.outcomes.push(status);
            }
        }
        report
    }

    fn deliver(&mut self, completion: Completion<T>) -> Option<(JobId, JobStatus)> {
        let job = match self.in_flight.take() {
            Some(job) if job.id == completion.id => job,
            other => {
                warn!(job = %completion.id, "completion for a job that is not in flight");
                self.in_flight = other;
                return None;
            }
        };

        let elapsed_ms = job.started.elapsed().as_millis() as u64;
        match completion.outcome {
            Ok(value) => {
                info!(job = %job.id, name = %job.name, elapsed_ms, "job done");
                (job.on_success)(value);
                Some((job.id, JobStatus::Done))
            }
            Err(err) => {
                warn!(job = %job.id, name = %job.name, elapsed_ms, error = %err, "job failed");
                (self.on_error)(job.id, &err);
                Some((job.id, JobStatus::Failed))
            }
        }
    }
}
