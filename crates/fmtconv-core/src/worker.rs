//! Run a conversion on a background thread.
//!
//! An interface thread hands one conversion to a worker and gets exactly one
//! completion back, either by polling a [`ConversionHandle`] from its event
//! loop or through a callback run on the worker.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::convert::{convert, ConversionReport};
use crate::error::{ConvertError, Result};

/// The pending result of a background conversion.
#[derive(Debug)]
pub struct ConversionHandle {
    receiver: Receiver<Result<ConversionReport>>,
    thread: JoinHandle<()>,
    delivered: bool,
}

impl ConversionHandle {
    /// Block until the conversion finishes.
    ///
    /// # Errors
    /// Returns the conversion's error, or [`ConvertError::WorkerDisconnected`]
    /// if the worker died without reporting or the result was already taken
    /// by [`try_result`](Self::try_result).
    pub fn wait(self) -> Result<ConversionReport> {
        let result = self
            .receiver
            .recv()
            .unwrap_or(Err(ConvertError::WorkerDisconnected));
        if self.thread.join().is_err() {
            tracing::warn!("conversion worker panicked");
        }
        result
    }

    /// Take the result if the conversion has finished, without blocking.
    ///
    /// Returns `None` while the conversion is still running. The result is
    /// delivered once; later calls return `None`.
    pub fn try_result(&mut self) -> Option<Result<ConversionReport>> {
        if self.delivered {
            return None;
        }
        let result = match self.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(ConvertError::WorkerDisconnected),
        };
        self.delivered = true;
        Some(result)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Start converting `input` into `output` on a new thread.
pub fn spawn_conversion(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> ConversionHandle {
    let (sender, receiver) = mpsc::channel();
    let thread = spawn_conversion_with(input, output, move |result| {
        // The receiver may already be gone if the caller lost interest.
        let _ = sender.send(result);
    });
    ConversionHandle {
        receiver,
        thread,
        delivered: false,
    }
}

/// Start converting `input` into `output` on a new thread and pass the result
/// to `on_complete` when it finishes. `on_complete` runs exactly once, on the
/// worker thread.
pub fn spawn_conversion_with<F>(
    input: impl Into<PathBuf>,
    output: impl Into<PathBuf>,
    on_complete: F,
) -> JoinHandle<()>
where
    F: FnOnce(Result<ConversionReport>) + Send + 'static,
{
    let input = input.into();
    let output = output.into();
    thread::spawn(move || {
        let result = convert(&input, &output);
        if let Err(err) = &result {
            tracing::debug!(error = %err, "background conversion failed");
        }
        on_complete(result);
    })
}
