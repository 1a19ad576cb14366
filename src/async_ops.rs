//! Background tasks
//!
//! Fire-and-poll work that fits macroquad's single-threaded frame loop: a task
//! is started once and polled every frame until it yields. Native builds run
//! the work on a worker thread and hand the result back over a channel. WASM
//! has no threads, so the work runs to completion when the task is spawned and
//! the first poll returns it.

#[cfg(not(target_arch = "wasm32"))]
use std::sync::mpsc::{channel, Receiver, TryRecvError};
#[cfg(not(target_arch = "wasm32"))]
use std::thread;

/// Outcome of one poll
#[derive(Debug, PartialEq)]
pub enum TaskPoll<T> {
    Pending,
    Ready(T),
    /// The worker went away without producing a value (panicked)
    Lost,
}

enum TaskInner<T> {
    #[cfg(not(target_arch = "wasm32"))]
    Channel(Receiver<T>),
    Ready(Option<T>),
}

/// Handle to work that completes in the background
pub struct Task<T> {
    inner: TaskInner<T>,
}

impl<T: Send + 'static> Task<T> {
    /// Run `work` off the frame loop
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = channel();
        thread::spawn(move || {
            let _ = sender.send(work());
        });
        Self {
            inner: TaskInner::Channel(receiver),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self::ready(work())
    }
}

/// Completes a task from outside (the other half of `Task::completer`)
#[cfg(test)]
pub struct TaskCompleter<T> {
    sender: std::sync::mpsc::Sender<T>,
}

#[cfg(test)]
impl<T> TaskCompleter<T> {
    /// Deliver the value; ignored if the task was dropped
    pub fn complete(self, value: T) {
        let _ = self.sender.send(value);
    }
}

impl<T> Task<T> {
    /// A pending task finished by whoever holds the completer
    #[cfg(test)]
    pub fn completer() -> (TaskCompleter<T>, Self) {
        let (sender, receiver) = channel();
        (
            TaskCompleter { sender },
            Self {
                inner: TaskInner::Channel(receiver),
            },
        )
    }

    /// A task that has already finished
    #[cfg(any(test, target_arch = "wasm32"))]
    pub fn ready(value: T) -> Self {
        Self {
            inner: TaskInner::Ready(Some(value)),
        }
    }

    /// Check for completion; `Ready` is returned at most once
    pub fn poll(&mut self) -> TaskPoll<T> {
        match &mut self.inner {
            #[cfg(not(target_arch = "wasm32"))]
            TaskInner::Channel(receiver) => match receiver.try_recv() {
                Ok(value) => {
                    self.inner = TaskInner::Ready(None);
                    TaskPoll::Ready(value)
                }
                Err(TryRecvError::Empty) => TaskPoll::Pending,
                Err(TryRecvError::Disconnected) => {
                    self.inner = TaskInner::Ready(None);
                    TaskPoll::Lost
                }
            },
            TaskInner::Ready(slot) => match slot.take() {
                Some(value) => TaskPoll::Ready(value),
                None => TaskPoll::Lost,
            },
        }
    }
}
