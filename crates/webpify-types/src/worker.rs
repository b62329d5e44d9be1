//! Blocking worker pool for codec work.
//!
//! Decoding and encoding images is CPU bound and must not run on the async
//! runtime threads. Jobs go into one of two lanes: `Interactive` for work a
//! user is waiting on (uploads, auto-convert) and `Batch` for bulk rounds.
//! Dedicated threads only serve the interactive lane, shared threads serve
//! both and always drain the interactive lane first.

use flume::{Receiver, Sender};
use futures::channel::oneshot;
use std::{future::Future, sync::Arc, thread};

use crate::prelude::*;

type Job = Box<dyn FnOnce() + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lane {
	Interactive,
	Batch,
}

#[derive(Debug)]
pub struct WorkerPool {
	interactive: Sender<Job>,
	batch: Sender<Job>,
}

impl WorkerPool {
	/// Starts `dedicated` interactive-only threads and `shared` threads
	pub fn new(dedicated: usize, shared: usize) -> Self {
		let (interactive, rx_interactive) = flume::unbounded::<Job>();
		let (batch, rx_batch) = flume::unbounded::<Job>();

		for n in 0..dedicated {
			let queues = [rx_interactive.clone()];
			spawn_worker(format!("webpify-int-{}", n), queues.to_vec());
		}
		for n in 0..shared.max(1) {
			let queues = [rx_interactive.clone(), rx_batch.clone()];
			spawn_worker(format!("webpify-wrk-{}", n), queues.to_vec());
		}

		Self { interactive, batch }
	}

	/// Runs a closure on the pool, resolves to its return value
	pub fn run<F, T>(&self, lane: Lane, f: F) -> impl Future<Output = ClResult<T>> + use<F, T>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		let (res_tx, res_rx) = oneshot::channel();
		let job: Job = Box::new(move || {
			let _ignore = res_tx.send(f());
		});

		let queue = match lane {
			Lane::Interactive => &self.interactive,
			Lane::Batch => &self.batch,
		};
		if queue.send(job).is_err() {
			error!("Worker queue {:?} is closed", lane);
		}

		async move {
			res_rx.await.map_err(|_| {
				error!("Worker dropped result channel (job may have panicked)");
				Error::Internal("worker job failed".into())
			})
		}
	}

	/// Like `run`, but flattens a closure returning `ClResult<T>`
	pub fn try_run<F, T>(&self, lane: Lane, f: F) -> impl Future<Output = ClResult<T>> + use<F, T>
	where
		F: FnOnce() -> ClResult<T> + Send + 'static,
		T: Send + 'static,
	{
		let fut = self.run(lane, f);
		async move { fut.await? }
	}
}

fn spawn_worker(name: String, queues: Vec<Receiver<Job>>) {
	let queues = Arc::new(queues);
	let res = thread::Builder::new().name(name).spawn(move || worker_loop(&queues));
	if let Err(err) = res {
		error!("Failed to spawn worker thread: {}", err);
	}
}

fn worker_loop(queues: &[Receiver<Job>]) {
	loop {
		// Higher priority lanes first, without blocking
		let job = queues.iter().find_map(|rx| rx.try_recv().ok());
		let job = match job {
			Some(job) => job,
			None => {
				let mut selector = flume::Selector::new();
				for rx in queues {
					selector = selector.recv(rx, |res| res);
				}
				match selector.wait() {
					Ok(job) => job,
					// All senders gone, pool dropped
					Err(flume::RecvError::Disconnected) => return,
				}
			}
		};

		if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
			error!("Worker thread caught panic: {:?}", e);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_run_returns_value() {
		let pool = WorkerPool::new(1, 1);
		let res = pool.run(Lane::Batch, || 21 * 2).await.unwrap();
		assert_eq!(res, 42);
	}

	#[tokio::test]
	async fn test_try_run_flattens_errors() {
		let pool = WorkerPool::new(0, 1);
		let res: ClResult<u8> = pool.try_run(Lane::Interactive, || Err(Error::UnsupportedFormat)).await;
		assert!(matches!(res, Err(Error::UnsupportedFormat)));
	}

	#[tokio::test]
	async fn test_panicking_job_reports_error() {
		let pool = WorkerPool::new(0, 1);
		#[allow(clippy::panic)]
		let res = pool.run(Lane::Batch, || -> u8 { panic!("boom") }).await;
		assert!(matches!(res, Err(Error::Internal(_))));
		// Pool still usable afterwards
		assert_eq!(pool.run(Lane::Batch, || 1).await.unwrap(), 1);
	}
}

// vim: ts=4
