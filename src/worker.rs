//! Background worker threads.

use std::{
    io,
    panic::resume_unwind,
    thread::{self, JoinHandle},
};

use crossbeam::channel::{Sender, TrySendError};

/// A builder object that can be used to configure and spawn a [`Worker`].
#[derive(Clone)]
pub struct WorkerBuilder {
    name: Option<String>,
    capacity: usize,
}

impl WorkerBuilder {
    /// Sets the name of the [`Worker`] thread.
    pub fn name<N: Into<String>>(self, name: N) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Sets the number of messages that can be queued while the worker is busy.
    ///
    /// With the default capacity of 0, [`Worker::try_send`] only succeeds while the worker is
    /// idle and waiting for a message.
    pub fn capacity(self, capacity: usize) -> Self {
        Self { capacity, ..self }
    }

    /// Spawns a [`Worker`] thread that uses `handler` to process incoming messages.
    pub fn spawn<I, F>(self, mut handler: F) -> io::Result<Worker<I>>
    where
        I: Send + 'static,
        F: FnMut(I) + Send + 'static,
    {
        let (sender, recv) = crossbeam::channel::bounded(self.capacity);
        let mut builder = thread::Builder::new();
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        let name = self.name.unwrap_or_else(|| "<unnamed>".into());
        let handle = builder.spawn(move || {
            log::trace!("worker '{name}' starting");
            for message in recv {
                handler(message);
            }
            log::trace!("worker '{name}' exiting");
        })?;

        Ok(Worker {
            sender: Some(sender),
            handle: Some(handle),
        })
    }
}

/// A handle to a worker thread that processes messages of type `I`.
///
/// When dropped, the channel to the thread is closed and the thread is joined, so messages that
/// were already accepted are still processed. If the thread has panicked, the panic is forwarded
/// to the thread dropping the `Worker`.
pub struct Worker<I: Send + 'static> {
    sender: Option<Sender<I>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker<()> {
    /// Returns a builder that can be used to configure and spawn a [`Worker`].
    #[inline]
    pub fn builder() -> WorkerBuilder {
        WorkerBuilder {
            name: None,
            capacity: 0,
        }
    }
}

impl<I: Send + 'static> Worker<I> {
    fn wait_for_exit(&mut self) {
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            if let Err(payload) = handle.join() {
                if !thread::panicking() {
                    resume_unwind(payload);
                }
            }
        }
    }

    /// Hands a message to the worker without blocking.
    ///
    /// If the worker is busy and its queue is full, the message is handed back as `Err`.
    ///
    /// If the worker has panicked, this will propagate the panic to the calling thread.
    pub fn try_send(&mut self, msg: I) -> Result<(), I> {
        let Some(sender) = &self.sender else {
            return Err(msg);
        };
        match sender.try_send(msg) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(msg)) => Err(msg),
            Err(TrySendError::Disconnected(msg)) => {
                self.wait_for_exit();
                Err(msg)
            }
        }
    }
}

impl<I: Send + 'static> Drop for Worker<I> {
    fn drop(&mut self) {
        self.wait_for_exit();
    }
}
