//! UI-affine delivery context.
//!
//! Rendering surfaces must only be touched from the UI thread. Publishers run
//! wherever the mutation happened, so deliveries for UI subscribers are
//! queued on a [`UiQueue`] and executed when the UI thread drains its
//! [`UiExecutor`].

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Create a connected queue/executor pair.
///
/// Keep the executor on the UI thread; clone the queue freely.
pub fn ui_context() -> (UiQueue, UiExecutor) {
    let (tx, rx) = mpsc::channel();
    (UiQueue { tx }, UiExecutor { rx })
}

/// Sending half: posts jobs to the UI thread.
#[derive(Clone)]
pub struct UiQueue {
    tx: Sender<Job>,
}

impl UiQueue {
    /// Queue a job. Returns `false` when the executor is gone (UI shut down).
    pub fn post(&self, job: impl FnOnce() + Send + 'static) -> bool {
        self.tx.send(Box::new(job)).is_ok()
    }
}

impl core::fmt::Debug for UiQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UiQueue").finish_non_exhaustive()
    }
}

/// Receiving half, owned by the UI thread.
pub struct UiExecutor {
    rx: Receiver<Job>,
}

impl UiExecutor {
    /// Run every job queued so far. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one job, run it, then run whatever else is
    /// already queued. Returns how many ran.
    pub fn run_for(&self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(job) => {
                job();
                1 + self.run_pending()
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => 0,
        }
    }
}

impl core::fmt::Debug for UiExecutor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UiExecutor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn jobs_run_on_the_draining_thread() {
        let (queue, executor) = ui_context();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let worker_queue = queue.clone();
        let worker_seen = seen.clone();
        thread::spawn(move || {
            worker_queue.post(move || {
                worker_seen.lock().unwrap().push(thread::current().id());
            });
        })
        .join()
        .unwrap();

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(executor.run_pending(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![thread::current().id()]);
    }

    #[test]
    fn post_fails_once_executor_is_dropped() {
        let (queue, executor) = ui_context();
        drop(executor);
        assert!(!queue.post(|| {}));
    }

    #[test]
    fn run_for_times_out_when_idle() {
        let (_queue, executor) = ui_context();
        assert_eq!(executor.run_for(Duration::from_millis(10)), 0);
    }
}
