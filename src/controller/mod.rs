//! Paged collection controller
//!
//! Owns the full state of one paginated, filtered, sorted view over a
//! remote collection: page position, total count, the live [`FilterSet`],
//! the sort order, and the fetch/staleness lifecycle. State snapshots are
//! published through a watch channel so views re-render on every change
//! without the controller knowing about them.
//!
//! Responses can arrive out of order when filters change in quick
//! succession, so every request carries a monotonically increasing
//! generation and a response is applied only while it is still the newest
//! one issued. An explicit page navigation during a fetch is rejected;
//! state mutations supersede the in-flight request instead.

use crate::core::error::{ListwiseError, ListwiseResult, RequestError};
use crate::core::filter::{FilterDescription, FilterOptionsPatch, FilterSet, FilterValue};
use crate::core::query::{DEFAULT_PAGE_SIZE, ListQuery, ListResponse};
use crate::core::record::{ListClient, Record};
use crate::core::sort::SortBy;
use crate::resolver::RecordCache;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::{StreamExt, wrappers::WatchStream};
use uuid::Uuid;

/// Current position within the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub page_number: usize,

    /// Number of items per page
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page_number: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Offset of the first item of this page
    pub fn offset(&self) -> usize {
        (self.page_number - 1) * self.limit
    }

    /// Last page that still holds an item for `total_count`
    fn last_page(&self, total_count: usize) -> usize {
        if total_count == 0 {
            1
        } else {
            total_count.div_ceil(self.limit)
        }
    }
}

/// Lifecycle phase of a paged view, derived from its state flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// No page has been requested yet
    Uninitialized,
    /// A list request is in flight
    Fetching,
    /// The displayed page matches the last successful response
    Ready,
    /// The displayed page may no longer reflect the remote collection
    Stale,
    /// The last request failed; the previous good page stays displayed
    Errored,
}

/// The full state of one paginated, filtered, sorted view
#[derive(Debug, Clone, Default)]
pub struct PagedItems {
    /// Ids of the records on the current page; never longer than
    /// `page.limit`
    pub items: Vec<Uuid>,

    pub page: Page,

    /// Total number of records matching the filters, across all pages
    pub total_count: usize,

    pub filters: FilterSet,

    pub sort_by: Vec<SortBy>,

    pub is_fetching: bool,

    /// Set by an external notification that something mutated the
    /// underlying collection; cleared once a refresh completes
    pub stale: bool,

    /// Failure of the last request, if any
    pub error: Option<Arc<anyhow::Error>>,

    loaded: bool,
}

impl PagedItems {
    pub fn phase(&self) -> FetchPhase {
        if self.is_fetching {
            FetchPhase::Fetching
        } else if self.error.is_some() {
            FetchPhase::Errored
        } else if self.stale {
            FetchPhase::Stale
        } else if self.loaded {
            FetchPhase::Ready
        } else {
            FetchPhase::Uninitialized
        }
    }
}

/// What a fetch found out when its response was applied
enum Applied {
    Done,
    /// A newer request was issued while this one was on the wire
    Superseded,
    /// The requested page fell outside the collection; retry on this one
    Clamped(usize),
}

/// State machine over [`PagedItems`].
///
/// Every successful page feeds the shared [`RecordCache`], so the resolver
/// never re-fetches records that already arrived in a list response.
pub struct PageController<T: Record> {
    client: Arc<dyn ListClient<T>>,
    cache: RecordCache<T>,
    state: watch::Sender<PagedItems>,
    /// Newest issued request id; responses are applied under this lock so
    /// issue and apply cannot interleave
    generation: Mutex<u64>,
}

impl<T: Record> PageController<T> {
    /// Create a controller over `client`, inserting fetched records into
    /// `cache`
    pub fn new(client: Arc<dyn ListClient<T>>, cache: RecordCache<T>) -> Self {
        let (state, _) = watch::channel(PagedItems::default());
        Self {
            client,
            cache,
            state,
            generation: Mutex::new(0),
        }
    }

    /// Subscribe to state snapshots for view updates
    pub fn subscribe(&self) -> watch::Receiver<PagedItems> {
        self.state.subscribe()
    }

    /// Current state snapshot
    pub fn snapshot(&self) -> PagedItems {
        self.state.borrow().clone()
    }

    /// Fetch page `page_number`.
    ///
    /// Rejected with [`RequestError::FetchInFlight`] while another request
    /// is running; page navigation never supersedes or queues.
    pub async fn list_page(&self, page_number: usize) -> ListwiseResult<()> {
        if self.state.borrow().is_fetching {
            return Err(RequestError::FetchInFlight.into());
        }
        self.fetch(page_number).await
    }

    /// Replace the value of one filter, then refetch from page 1.
    ///
    /// Filters always invalidate the current position. Supersedes any
    /// request in flight.
    pub async fn set_filter(
        &self,
        key: &str,
        value: Option<FilterValue>,
        description: FilterDescription,
    ) -> ListwiseResult<()> {
        self.state
            .send_modify(|state| state.filters.set(key, value, description));
        self.fetch(1).await
    }

    /// Merge match-mode flags of one filter, then refetch from page 1
    pub async fn set_filter_options(
        &self,
        key: &str,
        patch: FilterOptionsPatch,
        description: FilterDescription,
    ) -> ListwiseResult<()> {
        self.state
            .send_modify(|state| state.filters.set_options(key, patch, description));
        self.fetch(1).await
    }

    /// Delete one filter, then refetch from page 1
    pub async fn remove_filter(&self, key: &str) -> ListwiseResult<()> {
        self.state.send_modify(|state| {
            state.filters.remove(key);
        });
        self.fetch(1).await
    }

    /// Empty the whole filter set, then refetch from page 1
    pub async fn clear_filters(&self) -> ListwiseResult<()> {
        self.state.send_modify(|state| state.filters.clear());
        self.fetch(1).await
    }

    /// Replace the sort order, then refetch from page 1.
    ///
    /// Entries without a direction are columns whose sort was toggled off;
    /// they leave the list instead of serializing as an implicit ascend.
    pub async fn set_sort_by(&self, sort_by: Vec<SortBy>) -> ListwiseResult<()> {
        let sort_by: Vec<SortBy> = sort_by
            .into_iter()
            .filter(|entry| entry.order.is_some())
            .collect();
        self.state.send_modify(|state| state.sort_by = sort_by);
        self.fetch(1).await
    }

    /// Change the page size, keeping roughly the same absolute offset
    pub async fn set_page_size(&self, limit: usize) -> ListwiseResult<()> {
        let limit = limit.max(1);
        let mut target = 1;
        self.state.send_modify(|state| {
            let offset = state.page.offset();
            state.page.limit = limit;
            target = offset / limit + 1;
        });
        self.fetch(target).await
    }

    /// Re-issue the current page without touching filters or sort; used to
    /// reconcile after staleness
    pub async fn refresh_page(&self) -> ListwiseResult<()> {
        let page_number = self.state.borrow().page.page_number;
        self.fetch(page_number).await
    }

    /// Flag the displayed page as possibly out of date (or back in date).
    ///
    /// External entry point only; the refresh itself is driven by
    /// [`spawn_staleness_watcher`] or an explicit [`Self::refresh_page`].
    pub fn set_stale(&self, stale: bool) {
        self.state.send_modify(|state| state.stale = stale);
    }

    /// Drop all view state; call when the owning view unmounts.
    ///
    /// Any response still in flight is discarded on arrival.
    pub fn flush(&self) -> ListwiseResult<()> {
        let mut generation = self.lock_generation()?;
        *generation += 1;
        self.state.send_replace(PagedItems::default());
        Ok(())
    }

    fn lock_generation(&self) -> ListwiseResult<MutexGuard<'_, u64>> {
        self.generation
            .lock()
            .map_err(|e| ListwiseError::Internal(format!("generation lock poisoned: {e}")))
    }

    async fn fetch(&self, page_number: usize) -> ListwiseResult<()> {
        let mut target = page_number.max(1);
        loop {
            let generation = {
                let mut generation = self.lock_generation()?;
                *generation += 1;
                *generation
            };

            let query = {
                let state = self.state.borrow();
                ListQuery::build(&state.filters, &state.sort_by, target, state.page.limit)?
            };
            self.state.send_modify(|state| {
                state.is_fetching = true;
                state.error = None;
                state.page.page_number = target;
            });

            tracing::debug!(page = target, limit = query.limit, "requesting list page");
            let result = self.client.list(&query).await;

            match self.apply(generation, target, result)? {
                Applied::Done | Applied::Superseded => return Ok(()),
                Applied::Clamped(page) => {
                    tracing::debug!(page, "requested page out of range, clamping");
                    target = page;
                }
            }
        }
    }

    /// Apply a response while holding the generation lock, so a newer
    /// request cannot be issued mid-apply
    fn apply(
        &self,
        generation: u64,
        requested: usize,
        result: anyhow::Result<ListResponse<T>>,
    ) -> ListwiseResult<Applied> {
        let newest = self.lock_generation()?;
        if *newest != generation {
            tracing::debug!(generation, newest = *newest, "discarding superseded response");
            return Ok(Applied::Superseded);
        }

        match result {
            Ok(response) => {
                let ids: Vec<Uuid> = response.results.iter().map(|record| record.id()).collect();
                self.cache.insert_many(response.results);

                let mut clamped = None;
                self.state.send_modify(|state| {
                    state.total_count = response.count;
                    state.items = ids;
                    state.is_fetching = false;
                    state.stale = false;
                    state.loaded = true;
                    state.error = None;
                    let last = state.page.last_page(response.count);
                    if requested > last {
                        state.page.page_number = last;
                        clamped = Some(last);
                    } else {
                        state.page.page_number = requested;
                    }
                });

                match clamped {
                    Some(page) => Ok(Applied::Clamped(page)),
                    None => Ok(Applied::Done),
                }
            }
            Err(err) => {
                let err = Arc::new(err);
                let message = err.to_string();
                self.state.send_modify(|state| {
                    state.is_fetching = false;
                    state.error = Some(Arc::clone(&err));
                });
                Err(RequestError::Endpoint { message }.into())
            }
        }
    }
}

/// Watch for staleness and reconcile.
///
/// Consumes state snapshots and issues exactly one
/// [`PageController::refresh_page`] per rising `stale` edge: never zero,
/// never more than one per staleness event. The refresh supersedes any
/// in-flight request and the flag clears once it completes; a failed
/// refresh leaves the flag set without retrying.
pub fn spawn_staleness_watcher<T: Record>(
    controller: Arc<PageController<T>>,
) -> JoinHandle<()> {
    let mut snapshots = WatchStream::new(controller.subscribe());
    tokio::spawn(async move {
        let mut was_stale = false;
        while let Some(state) = snapshots.next().await {
            let is_stale = state.stale;
            if is_stale && !was_stale {
                tracing::debug!("collection went stale, refreshing current page");
                if let Err(err) = controller.refresh_page().await {
                    tracing::warn!(error = %err, "staleness refresh failed");
                }
            }
            was_stale = is_stale;
        }
    })
}
