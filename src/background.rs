use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::mpsc::{self, Receiver, SyncSender},
    thread::{self, JoinHandle},
};

use log::{debug, error};

use crate::{NetErr, Result};

/// A unit of work for the `BackgroundQueue`.
pub type Task = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// Why a background task didn't finish.
#[derive(Debug)]
pub enum TaskFailure {
    Failed(NetErr),
    Panicked(String),
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFailure::Failed(e) => write!(f, "background task failed: {e}"),
            TaskFailure::Panicked(msg) => write!(f, "background task panicked: {msg}"),
        }
    }
}

impl std::error::Error for TaskFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TaskFailure::Failed(e) => Some(e),
            TaskFailure::Panicked(_) => None,
        }
    }
}

/// A single worker thread running tasks one at a time in submission order.
///
/// Failing or panicking tasks are logged and reported through `drain_errors`, the worker keeps
/// running the rest.
pub struct BackgroundQueue {
    tx: Option<SyncSender<Task>>,
    errors: Receiver<TaskFailure>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundQueue {
    /// Creates a new `BackgroundQueue` and spawns its worker.
    ///
    /// # Arguments
    /// * `capacity` - How many tasks may wait before `submit` blocks.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::sync_channel::<Task>(capacity);
        let (err_tx, errors) = mpsc::channel();

        let handle = thread::spawn(move || {
            for task in rx {
                let failure = match panic::catch_unwind(AssertUnwindSafe(task)) {
                    Ok(Ok(())) => continue,
                    Ok(Err(e)) => TaskFailure::Failed(e),
                    Err(payload) => TaskFailure::Panicked(panic_message(payload)),
                };

                error!("{failure}");
                // Nobody is listening anymore, the failure was already logged.
                let _ = err_tx.send(failure);
            }

            debug!("background worker finished");
        });

        Self {
            tx: Some(tx),
            errors,
            handle: Some(handle),
        }
    }

    /// Queues a task, blocking while the queue is full.
    ///
    /// # Returns
    /// `false` if the worker is gone and the task was dropped.
    pub fn submit<F>(&self, task: F) -> bool
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        match &self.tx {
            Some(tx) => tx.send(Box::new(task)).is_ok(),
            None => false,
        }
    }

    /// Takes every failure reported since the last call.
    pub fn drain_errors(&self) -> Vec<TaskFailure> {
        self.errors.try_iter().collect()
    }

    /// Closes the queue and waits for the worker to run every queued task.
    ///
    /// # Returns
    /// The failures that weren't drained yet.
    pub fn shutdown(mut self) -> Vec<TaskFailure> {
        self.close();
        self.drain_errors()
    }

    fn close(&mut self) {
        drop(self.tx.take());

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("background worker panicked");
            }
        }
    }
}

impl Drop for BackgroundQueue {
    fn drop(&mut self) {
        self.close();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(msg) => msg.to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}
