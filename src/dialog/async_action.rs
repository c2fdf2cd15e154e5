//! Single tracked asynchronous operation
//!
//! The operation runs on a worker thread and reports back over a channel.
//! The UI loop calls `poll` on every tick to pick up the result, so all
//! state changes the user can see happen on the UI thread.

use crate::error::ActionError;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::debug;

/// Boxed zero-argument operation handed to an `AsyncAction`
pub type Operation<T> = Box<dyn FnOnce() -> Result<T, ActionError> + Send + 'static>;

/// Lifecycle of an `AsyncAction`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Result of calling `trigger`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Started,
    /// Dropped because the action is already running or has finished
    Rejected,
}

/// Outcome delivered once by `poll`
#[derive(Debug, PartialEq)]
pub enum Settled<T> {
    Succeeded(T),
    Failed(ActionError),
}

/// One asynchronous operation with a re-entrancy guard
///
/// An action runs at most once. Dropping it while running detaches the
/// worker: whatever it sends afterwards is discarded.
pub struct AsyncAction<T> {
    status: ActionStatus,
    receiver: Option<Receiver<Result<T, ActionError>>>,
}

impl<T: Send + 'static> Default for AsyncAction<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> AsyncAction<T> {
    pub fn new() -> Self {
        Self {
            status: ActionStatus::Idle,
            receiver: None,
        }
    }

    pub fn status(&self) -> ActionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status() == ActionStatus::Running
    }

    /// Start the operation on a worker thread.
    ///
    /// The status is `Running` as soon as this returns.
    pub fn trigger<F>(&mut self, operation: F) -> Trigger
    where
        F: FnOnce() -> Result<T, ActionError> + Send + 'static,
    {
        if self.status != ActionStatus::Idle {
            debug!(status = ?self.status, "trigger dropped");
            return Trigger::Rejected;
        }

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(operation());
        });

        self.receiver = Some(rx);
        self.status = ActionStatus::Running;
        Trigger::Started
    }

    /// Collect the outcome if the operation has settled.
    ///
    /// Returns `Some` exactly once per action.
    pub fn poll(&mut self) -> Option<Settled<T>> {
        let receiver = self.receiver.as_ref()?;

        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            // Worker panicked before reporting
            Err(TryRecvError::Disconnected) => Err(ActionError::new("operation aborted")),
        };
        self.receiver = None;

        match result {
            Ok(value) => {
                self.status = ActionStatus::Succeeded;
                Some(Settled::Succeeded(value))
            }
            Err(err) => {
                self.status = ActionStatus::Failed;
                Some(Settled::Failed(err))
            }
        }
    }
}
