//! Fixed worker pool draining the dispatch queue.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::dispatch::drain;
use crate::dispatch::queue::{DispatchQueue, QueueClosed};
use crate::net::Connection;
use crate::observability::metrics;
use crate::proxy::Proxy;

/// `size` long-lived workers, each looping dequeue → session.
///
/// Peak concurrency is bounded by the worker count; connections beyond that
/// wait in the queue, and a full queue makes [`submit`](Self::submit) wait.
#[derive(Debug)]
pub struct WorkerPool {
    queue: Arc<DispatchQueue<Connection>>,
    workers: JoinSet<()>,
}

impl WorkerPool {
    pub fn spawn(size: usize, queue_capacity: usize, proxy: Arc<Proxy>) -> Self {
        let queue = Arc::new(DispatchQueue::new(queue_capacity));
        let mut workers = JoinSet::new();
        for id in 0..size {
            workers.spawn(run_worker(id, queue.clone(), proxy.clone()));
        }

        tracing::info!(workers = size, queue_capacity, "Worker pool started");
        Self { queue, workers }
    }

    /// Queue a connection, waiting while the queue is full.
    pub async fn submit(&self, conn: Connection) -> Result<(), QueueClosed<Connection>> {
        self.queue.enqueue(conn).await?;
        metrics::set_queue_depth(self.queue.len());
        Ok(())
    }

    pub fn queue(&self) -> &Arc<DispatchQueue<Connection>> {
        &self.queue
    }

    /// Number of workers still running. Reaps any that have exited.
    pub fn workers(&mut self) -> usize {
        while self.workers.try_join_next().is_some() {}
        self.workers.len()
    }

    /// Close the queue, let workers finish queued and in-flight sessions, and
    /// abort whatever is left after `timeout`.
    pub async fn shutdown(mut self, timeout: Duration) {
        self.queue.close();
        drain(&mut self.workers, timeout, "workers").await;
    }
}

async fn run_worker(id: usize, queue: Arc<DispatchQueue<Connection>>, proxy: Arc<Proxy>) {
    tracing::debug!(worker = id, "Worker started");
    while let Some(conn) = queue.dequeue().await {
        metrics::set_queue_depth(queue.len());
        proxy.clone().handle(conn).await;
    }
    tracing::debug!(worker = id, "Worker stopped");
}
