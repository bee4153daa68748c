//! Async, observable access to a [`MeasurementBackend`].
//!
//! `LocalStore` serialises backend calls behind a mutex and runs them on the
//! blocking pool. Every mutating call bumps a revision counter; feeds created
//! with the `watch_*` methods re-run their query whenever it moves.

use std::sync::Arc;

use envirosense_core::{AppError, AppResult};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::measurement_backend::{AverageField, BackendResult, MeasurementBackend};
use crate::record::MeasurementRecord;

type SharedBackend = Arc<Mutex<Box<dyn MeasurementBackend>>>;

/// Cloneable handle to the local measurement store.
#[derive(Clone)]
pub struct LocalStore {
    backend: SharedBackend,
    revision: Arc<watch::Sender<u64>>,
}

impl LocalStore {
    pub fn new<B: MeasurementBackend + 'static>(backend: B) -> Self {
        let backend: Box<dyn MeasurementBackend> = Box::new(backend);
        let (revision, _) = watch::channel(0);
        Self {
            backend: Arc::new(Mutex::new(backend)),
            revision: Arc::new(revision),
        }
    }

    pub async fn insert_or_replace(&self, record: MeasurementRecord) -> AppResult<i64> {
        let id = run_blocking(&self.backend, move |b| b.insert_or_replace(&record)).await?;
        self.bump();
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> AppResult<Option<MeasurementRecord>> {
        run_blocking(&self.backend, move |b| b.get(id)).await
    }

    pub async fn list_all(&self) -> AppResult<Vec<MeasurementRecord>> {
        run_blocking(&self.backend, |b| FeedQuery::All.run(b)).await
    }

    pub async fn list_recent(&self, limit: usize) -> AppResult<Vec<MeasurementRecord>> {
        run_blocking(&self.backend, move |b| FeedQuery::Recent(limit).run(b)).await
    }

    pub async fn list_between(&self, start: i64, end: i64) -> AppResult<Vec<MeasurementRecord>> {
        let query = FeedQuery::Between { start, end };
        run_blocking(&self.backend, move |b| query.run(b)).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<usize> {
        let removed = run_blocking(&self.backend, move |b| b.delete(id)).await?;
        self.bump();
        Ok(removed)
    }

    pub async fn delete_all(&self) -> AppResult<usize> {
        let removed = run_blocking(&self.backend, |b| b.delete_all()).await?;
        self.bump();
        Ok(removed)
    }

    pub async fn count(&self) -> AppResult<usize> {
        run_blocking(&self.backend, |b| b.count()).await
    }

    pub async fn average(&self, field: AverageField, limit: usize) -> AppResult<Option<f64>> {
        run_blocking(&self.backend, move |b| b.average(field, limit)).await
    }

    /// Every record, newest first.
    pub fn watch_all(&self) -> RecordFeed {
        self.feed(FeedQuery::All)
    }

    /// The `limit` newest records.
    pub fn watch_recent(&self, limit: usize) -> RecordFeed {
        self.feed(FeedQuery::Recent(limit))
    }

    /// Records with `start <= timestamp <= end`, newest first.
    pub fn watch_between(&self, start: i64, end: i64) -> RecordFeed {
        self.feed(FeedQuery::Between { start, end })
    }

    fn feed(&self, query: FeedQuery) -> RecordFeed {
        let mut changes = self.revision.subscribe();
        // First poll emits the current snapshot.
        changes.mark_changed();
        RecordFeed {
            backend: Arc::clone(&self.backend),
            changes,
            query,
        }
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedQuery {
    All,
    Recent(usize),
    Between { start: i64, end: i64 },
}

impl FeedQuery {
    fn run(self, backend: &dyn MeasurementBackend) -> BackendResult<Vec<MeasurementRecord>> {
        match self {
            Self::All => backend.list_all(),
            Self::Recent(limit) => backend.list_recent(limit),
            Self::Between { start, end } => backend.list_between(start, end),
        }
    }
}

/// Stream of full query snapshots.
///
/// Snapshots are never deltas. A slow reader skips straight to the latest
/// revision.
pub struct RecordFeed {
    backend: SharedBackend,
    changes: watch::Receiver<u64>,
    query: FeedQuery,
}

impl RecordFeed {
    /// Wait for the next snapshot.
    ///
    /// Returns `None` once every [`LocalStore`] handle has been dropped.
    pub async fn next(&mut self) -> Option<AppResult<Vec<MeasurementRecord>>> {
        self.changes.changed().await.ok()?;
        let query = self.query;
        Some(run_blocking(&self.backend, move |b| query.run(b)).await)
    }
}

async fn run_blocking<T, F>(backend: &SharedBackend, op: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn MeasurementBackend) -> BackendResult<T> + Send + 'static,
{
    let backend = Arc::clone(backend);
    let result = tokio::task::spawn_blocking(move || {
        let guard = backend.lock();
        op(&**guard)
    })
    .await
    .map_err(|e| AppError::Other(anyhow::anyhow!("Storage task failed: {}", e)))?;

    Ok(result?)
}
