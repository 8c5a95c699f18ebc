//! Record cache and the batching by-id resolver
//!
//! The controller hands out pages of record ids; the resolver maps them to
//! displayable records. Lookups hit the shared [`RecordCache`] first, and
//! whatever is missing is fetched in batches: ids accumulating within a
//! short window travel in one request, and ids arriving while a request is
//! outstanding queue into the next batch instead of fanning out into
//! per-id requests.

use crate::core::error::{ListwiseError, ListwiseResult, ResolveError};
use crate::core::record::{Record, RecordFetcher};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// Accumulation window before a batch request is issued
pub const DEFAULT_BATCH_WINDOW: Duration = Duration::from_millis(10);

/// Shared id → record cache.
///
/// Read by every table instance; records are inserted whenever a list page
/// or a resolver batch arrives. Uses RwLock for thread-safe access.
#[derive(Debug)]
pub struct RecordCache<T> {
    records: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T> Clone for RecordCache<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<T> Default for RecordCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordCache<T> {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all cached records
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.write() {
            records.clear();
        }
    }
}

impl<T: Record> RecordCache<T> {
    pub fn get(&self, id: &Uuid) -> Option<T> {
        let Ok(records) = self.records.read() else {
            return None;
        };
        records.get(id).cloned()
    }

    /// Look up many ids at once; ids not present are absent from the result
    pub fn get_many(&self, ids: &[Uuid]) -> HashMap<Uuid, T> {
        let Ok(records) = self.records.read() else {
            return HashMap::new();
        };
        ids.iter()
            .filter_map(|id| records.get(id).map(|record| (*id, record.clone())))
            .collect()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.records
            .read()
            .map(|records| records.contains_key(id))
            .unwrap_or(false)
    }

    pub fn insert(&self, record: T) {
        if let Ok(mut records) = self.records.write() {
            records.insert(record.id(), record);
        }
    }

    pub fn insert_many(&self, new_records: impl IntoIterator<Item = T>) {
        if let Ok(mut records) = self.records.write() {
            for record in new_records {
                records.insert(record.id(), record);
            }
        }
    }
}

/// What a resolve call has to do after enqueuing its missing ids
enum Role {
    /// Nobody is fetching: this caller drives the batch loop
    Driver,
    /// A batch is out: wait until `completed` reaches `target`. The ids are
    /// covered by the batches numbered `low..=target`; only a failure in
    /// that window concerns this caller.
    Waiter { low: u64, target: u64 },
}

struct BatchState {
    /// Ids waiting for the next batch, in arrival order
    pending: Vec<Uuid>,
    /// Every id currently queued or in flight, for deduplication
    queued: HashSet<Uuid>,
    /// Ids of the batch currently on the wire
    in_flight_ids: HashSet<Uuid>,
    in_flight: bool,
    /// Number of completed batches; waiters compare against this
    completed: u64,
    /// Last failed batch, if any, with its sequence number
    last_error: Option<(u64, String)>,
}

/// Maps ids returned by the controller to displayable records, batching and
/// deduplicating by-id lookups.
///
/// The first caller that finds no request in flight becomes the driver: it
/// waits a short accumulation window, drains the pending queue into one
/// request, and keeps driving while arrivals queued during the flight
/// remain. Everyone else waits for the batch covering their ids.
pub struct RecordResolver<T: Record> {
    fetcher: Arc<dyn RecordFetcher<T>>,
    cache: RecordCache<T>,
    state: Mutex<BatchState>,
    completed_tx: watch::Sender<u64>,
    batch_window: Duration,
}

impl<T: Record> RecordResolver<T> {
    /// Create a resolver over `fetcher`, sharing `cache` with the
    /// controllers that feed it
    pub fn new(fetcher: Arc<dyn RecordFetcher<T>>, cache: RecordCache<T>) -> Self {
        Self::with_batch_window(fetcher, cache, DEFAULT_BATCH_WINDOW)
    }

    pub fn with_batch_window(
        fetcher: Arc<dyn RecordFetcher<T>>,
        cache: RecordCache<T>,
        batch_window: Duration,
    ) -> Self {
        let (completed_tx, _) = watch::channel(0);
        Self {
            fetcher,
            cache,
            state: Mutex::new(BatchState {
                pending: Vec::new(),
                queued: HashSet::new(),
                in_flight_ids: HashSet::new(),
                in_flight: false,
                completed: 0,
                last_error: None,
            }),
            completed_tx,
            batch_window,
        }
    }

    /// The shared cache this resolver fills
    pub fn cache(&self) -> &RecordCache<T> {
        &self.cache
    }

    /// Resolve `ids` to records.
    ///
    /// Cached records are returned without a request; ids the backend does
    /// not know are omitted from the result. A failed batch surfaces an
    /// error to every caller whose ids it covered.
    pub async fn resolve(&self, ids: &[Uuid]) -> ListwiseResult<HashMap<Uuid, T>> {
        let mut resolved = self.cache.get_many(ids);
        let missing: Vec<Uuid> = ids
            .iter()
            .filter(|id| !resolved.contains_key(id))
            .copied()
            .collect();
        if missing.is_empty() {
            return Ok(resolved);
        }

        match self.enqueue(&missing)? {
            Role::Driver => self.drive().await?,
            Role::Waiter { low, target } => self.wait_for(low, target).await?,
        }

        // pick up whatever the batches produced; unknown ids stay absent
        for id in &missing {
            if let Some(record) = self.cache.get(id) {
                resolved.insert(*id, record);
            }
        }
        Ok(resolved)
    }

    fn lock_state(&self) -> ListwiseResult<MutexGuard<'_, BatchState>> {
        self.state
            .lock()
            .map_err(|e| ListwiseError::Internal(format!("resolver state lock poisoned: {e}")))
    }

    fn enqueue(&self, ids: &[Uuid]) -> ListwiseResult<Role> {
        let mut state = self.lock_state()?;
        // ids queued while the driver is still accumulating make the very
        // next batch; ids queued while a request is on the wire go into the
        // batch after it
        let request_out = !state.in_flight_ids.is_empty();
        let mut low = u64::MAX;
        let mut target = state.completed;
        for id in ids {
            let covering = if state.in_flight_ids.contains(id) {
                // already on the wire; covered when the current batch lands
                state.completed + 1
            } else {
                if state.queued.insert(*id) {
                    state.pending.push(*id);
                }
                state.completed + if request_out { 2 } else { 1 }
            };
            low = low.min(covering);
            target = target.max(covering);
        }

        if !state.in_flight && !state.pending.is_empty() {
            state.in_flight = true;
            Ok(Role::Driver)
        } else {
            Ok(Role::Waiter { low, target })
        }
    }

    /// Run batches until the pending queue is drained.
    ///
    /// Errors do not abandon the loop: waiters queued behind a failed batch
    /// still need their batch to run. The first error is reported once the
    /// queue is dry.
    async fn drive(&self) -> ListwiseResult<()> {
        let mut first_error: Option<String> = None;
        loop {
            // let rapid arrivals pile into this batch
            tokio::time::sleep(self.batch_window).await;

            let batch: Vec<Uuid> = {
                let mut state = self.lock_state()?;
                let batch = std::mem::take(&mut state.pending);
                state.in_flight_ids = batch.iter().copied().collect();
                batch
            };

            tracing::debug!(count = batch.len(), "fetching record batch");
            let result = self.fetcher.fetch_by_ids(&batch).await;
            if let Ok(records) = &result {
                self.cache.insert_many(records.clone());
            }

            let (completed, done) = {
                let mut state = self.lock_state()?;
                state.completed += 1;
                let completed = state.completed;
                for id in &batch {
                    state.queued.remove(id);
                }
                state.in_flight_ids.clear();
                if let Err(err) = &result {
                    let message = err.to_string();
                    tracing::warn!(error = %message, "record batch failed");
                    state.last_error = Some((completed, message.clone()));
                    first_error.get_or_insert(message);
                }
                let done = state.pending.is_empty();
                if done {
                    state.in_flight = false;
                }
                (completed, done)
            };

            // wake waiters after the cache is visible
            let _ = self.completed_tx.send(completed);
            if done {
                break;
            }
        }

        match first_error {
            Some(message) => Err(ResolveError::BatchFailed { message }.into()),
            None => Ok(()),
        }
    }

    async fn wait_for(&self, low: u64, target: u64) -> ListwiseResult<()> {
        let mut completed_rx = self.completed_tx.subscribe();
        while *completed_rx.borrow_and_update() < target {
            completed_rx
                .changed()
                .await
                .map_err(|_| ListwiseError::Internal("resolver dropped mid-wait".to_string()))?;
        }

        // surface a failure of a batch that covered this caller's window;
        // older or newer failures belong to other callers
        let state = self.lock_state()?;
        if let Some((sequence, message)) = &state.last_error {
            if *sequence >= low && *sequence <= target {
                return Err(ResolveError::BatchFailed {
                    message: message.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}
