use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread;

use futures::channel::oneshot;

use crate::core::mesh::Solid;
use crate::core::sampler::{sample_interior_points, SampledPoints, SamplerConfig};
use crate::error::{Error, Result};

/// Sampling request running on its own thread. Resolves once, with the full
/// result; there are no partial results.
#[must_use = "a sampling task does nothing useful unless awaited"]
pub struct SamplingTask {
    receiver: oneshot::Receiver<Result<SampledPoints>>,
}

impl SamplingTask {
    /// Runs `job` on a new thread and returns a future for its result
    pub fn spawn<F>(job: F) -> Self
    where
        F: FnOnce() -> Result<SampledPoints> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let spawned = thread::Builder::new()
            .name("interior-sampler".to_string())
            .spawn(move || {
                // Receiver may have been dropped; nothing to report then
                let _ = sender.send(job());
            });

        if let Err(err) = spawned {
            // The job (and its sender) was dropped, so the task resolves to TaskCancelled
            log::error!("Failed to start sampling thread: {}", err);
        }

        Self { receiver }
    }
}

impl Future for SamplingTask {
    type Output = Result<SampledPoints>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(Error::TaskCancelled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Samples `count` interior points of `solid` off the calling thread
pub fn spawn_sampling<S>(solid: S, count: usize, seed: u64, config: SamplerConfig) -> SamplingTask
where
    S: Solid + Send + 'static,
{
    SamplingTask::spawn(move || sample_interior_points(&solid, count, seed, &config))
}
