//! Serialized execution context for store backings
//!
//! Jobs are pushed onto a FIFO channel at submission time and executed one at
//! a time by a dedicated worker thread, so a store's blocking I/O never runs
//! on the caller's thread and never interleaves.

use std::thread;

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};

use super::store::{Pending, StoreError};

type Job<S> = Box<dyn FnOnce(&mut S) + Send>;

/// A worker thread owning the state `S` and running submitted jobs in order
///
/// The worker stops once the queue is dropped and every job submitted before
/// that has run.
pub struct SerialQueue<S> {
    sender: mpsc::UnboundedSender<Job<S>>,
}

impl<S: Send + 'static> SerialQueue<S> {
    /// Spawns the worker thread, handing it ownership of `state`
    pub fn spawn(name: &str, mut state: S) -> Result<Self, StoreError> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job<S>>();

        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    job(&mut state);
                }
            })?;

        Ok(Self { sender })
    }

    /// Enqueues `job` now and returns a future for its result
    ///
    /// The job runs even if the returned future is dropped first; only its
    /// result is discarded.
    pub fn submit<T, F>(&self, job: F) -> Pending<Result<T, StoreError>>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> T + Send + 'static,
    {
        let (reply, result) = oneshot::channel();

        let job: Job<S> = Box::new(move |state| {
            let _ = reply.send(job(state));
        });
        // A failed send drops the job along with its reply sender, which
        // resolves the receiver below to `Stopped`.
        let _ = self.sender.send(job);

        result.map(|res| res.map_err(|_| StoreError::Stopped)).boxed()
    }
}
