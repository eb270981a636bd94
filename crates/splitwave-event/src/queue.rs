//! In-order device execution queues.
//!
//! A [`DeviceQueue`] owns one worker thread fed by an unbounded
//! crossbeam channel. Submissions never block the issuing thread; the
//! worker waits for each job's dependency, runs it and settles its
//! event. Jobs whose dependency failed are skipped and inherit the
//! failure, so nothing downstream runs on corrupt data.

use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use splitwave_core::TransportError;
use tracing::{trace, warn};

use crate::event::{Completion, Event};

type JobFn = Box<dyn FnOnce() -> Result<(), TransportError> + Send + 'static>;

struct Job {
    label: &'static str,
    depends_on: Event,
    op: JobFn,
    done: Completion,
}

/// An in-order execution queue with its own worker thread.
pub struct DeviceQueue {
    name: String,
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl DeviceQueue {
    /// Start a queue whose worker thread is called `name`.
    pub fn spawn(name: impl Into<String>) -> Result<Self, TransportError> {
        let name = name.into();
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let worker_name = name.clone();
        let worker = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_worker(&worker_name, receiver))
            .map_err(|e| TransportError::WorkerUnavailable {
                reason: format!("spawning queue '{name}': {e}"),
            })?;
        Ok(Self {
            name,
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Name of the queue and its worker thread.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue `op` to run after `depends_on` and after every job
    /// submitted earlier to this queue. Returns immediately.
    pub fn submit<F>(&self, label: &'static str, depends_on: &Event, op: F) -> Event
    where
        F: FnOnce() -> Result<(), TransportError> + Send + 'static,
    {
        let (event, done) = Event::pending();
        let job = Job {
            label,
            depends_on: depends_on.clone(),
            op: Box::new(op),
            done,
        };
        let Some(sender) = &self.sender else {
            job.done.fail(self.unavailable());
            return event;
        };
        if let Err(crossbeam_channel::SendError(job)) = sender.send(job) {
            job.done.fail(self.unavailable());
        }
        event
    }

    fn unavailable(&self) -> TransportError {
        TransportError::WorkerUnavailable {
            reason: format!("queue '{}' has stopped", self.name),
        }
    }
}

impl Drop for DeviceQueue {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl std::fmt::Debug for DeviceQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceQueue")
            .field("name", &self.name)
            .finish()
    }
}

fn run_worker(queue: &str, receiver: Receiver<Job>) {
    for job in receiver.iter() {
        if let Err(e) = job.depends_on.wait() {
            warn!(queue, job = job.label, error = %e, "dependency failed, skipping job");
            job.done.fail(e);
            continue;
        }
        trace!(queue, job = job.label, "running job");
        let outcome = (job.op)();
        if let Err(e) = &outcome {
            warn!(queue, job = job.label, error = %e, "job failed");
        }
        job.done.settle(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    #[test]
    fn jobs_run_in_submission_order() {
        let queue = DeviceQueue::spawn("test-order").unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut last = Event::completed();
        for i in 0..5 {
            let log = Arc::clone(&log);
            last = queue.submit("push", &Event::completed(), move || {
                log.lock().push(i);
                Ok(())
            });
        }
        last.wait().unwrap();
        assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn job_waits_for_dependency_from_elsewhere() {
        let queue = DeviceQueue::spawn("test-dep").unwrap();
        let (gate, open) = Event::pending();
        let ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&ran);
        let ev = queue.submit("gated", &gate, move || {
            *flag.lock() = true;
            Ok(())
        });
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(!*ran.lock());
        assert!(!ev.is_complete());
        open.complete();
        ev.wait().unwrap();
        assert!(*ran.lock());
    }

    #[test]
    fn failed_dependency_poisons_job() {
        let queue = DeviceQueue::spawn("test-poison").unwrap();
        let ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&ran);
        let upstream = Event::failed(TransportError::Disconnected {
            peer: splitwave_core::Rank(3),
        });
        let ev = queue.submit("poisoned", &upstream, move || {
            *flag.lock() = true;
            Ok(())
        });
        assert_eq!(
            ev.wait(),
            Err(TransportError::Disconnected {
                peer: splitwave_core::Rank(3)
            })
        );
        assert!(!*ran.lock());
    }

    #[test]
    fn failing_job_fails_its_event_only() {
        let queue = DeviceQueue::spawn("test-fail").unwrap();
        let bad = queue.submit("bad", &Event::completed(), || Err(TransportError::Abandoned));
        let good = queue.submit("good", &Event::completed(), || Ok(()));
        assert_eq!(bad.wait(), Err(TransportError::Abandoned));
        assert!(good.wait().is_ok());
    }
}
