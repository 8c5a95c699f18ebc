//! Integration tests for the batching record resolver

mod common;

use common::{Sample, sample};
use listwise::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::advance;

/// Fetcher that records every batch it serves and answers after a delay
struct SlowFetcher {
    known: Vec<Sample>,
    delay: Duration,
    calls: AtomicUsize,
    batch_sizes: std::sync::Mutex<Vec<usize>>,
}

impl SlowFetcher {
    fn new(known: Vec<Sample>, delay: Duration) -> Self {
        Self {
            known,
            delay,
            calls: AtomicUsize::new(0),
            batch_sizes: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RecordFetcher<Sample> for SlowFetcher {
    async fn fetch_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Sample>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batch_sizes.lock().unwrap().push(ids.len());
        tokio::time::sleep(self.delay).await;
        Ok(self
            .known
            .iter()
            .filter(|sample| ids.contains(&sample.id))
            .cloned()
            .collect())
    }
}

#[tokio::test(start_paused = true)]
async fn test_arrivals_during_flight_queue_into_one_next_batch() {
    let a = sample("a", "active", 1.0);
    let b = sample("b", "active", 2.0);
    let c = sample("c", "active", 3.0);
    let fetcher = Arc::new(SlowFetcher::new(
        vec![a.clone(), b.clone(), c.clone()],
        Duration::from_millis(50),
    ));
    let resolver = Arc::new(RecordResolver::with_batch_window(
        fetcher.clone(),
        RecordCache::new(),
        Duration::from_millis(10),
    ));

    let first = {
        let resolver = Arc::clone(&resolver);
        let id = a.id;
        tokio::spawn(async move { resolver.resolve(&[id]).await })
    };
    // let the spawned caller register into the batch window before advancing
    tokio::task::yield_now().await;
    // push past the accumulation window so the first batch is on the wire
    advance(Duration::from_millis(15)).await;
    tokio::task::yield_now().await;
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

    // two more callers arrive while the request is outstanding
    let second = {
        let resolver = Arc::clone(&resolver);
        let id = b.id;
        tokio::spawn(async move { resolver.resolve(&[id]).await })
    };
    let third = {
        let resolver = Arc::clone(&resolver);
        let id = c.id;
        tokio::spawn(async move { resolver.resolve(&[id]).await })
    };

    advance(Duration::from_millis(200)).await;
    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    let third = third.await.unwrap().unwrap();

    assert_eq!(first[&a.id], a);
    assert_eq!(second[&b.id], b);
    assert_eq!(third[&c.id], c);

    // one batch for the first caller, exactly one more for both stragglers
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    assert_eq!(*fetcher.batch_sizes.lock().unwrap(), vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_id_in_flight_is_not_refetched() {
    let a = sample("a", "active", 1.0);
    let fetcher = Arc::new(SlowFetcher::new(vec![a.clone()], Duration::from_millis(50)));
    let resolver = Arc::new(RecordResolver::with_batch_window(
        fetcher.clone(),
        RecordCache::new(),
        Duration::from_millis(10),
    ));

    let first = {
        let resolver = Arc::clone(&resolver);
        let id = a.id;
        tokio::spawn(async move { resolver.resolve(&[id]).await })
    };
    advance(Duration::from_millis(15)).await;
    tokio::task::yield_now().await;

    // same id requested again while its batch is on the wire
    let second = {
        let resolver = Arc::clone(&resolver);
        let id = a.id;
        tokio::spawn(async move { resolver.resolve(&[id]).await })
    };

    advance(Duration::from_millis(200)).await;
    assert_eq!(first.await.unwrap().unwrap().len(), 1);
    assert_eq!(second.await.unwrap().unwrap().len(), 1);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cache_is_shared_across_tables() {
    let a = sample("a", "active", 1.0);
    let fetcher = Arc::new(SlowFetcher::new(vec![a.clone()], Duration::ZERO));
    let cache = RecordCache::new();
    let samples_view = RecordResolver::new(fetcher.clone(), cache.clone());
    let picker_view = RecordResolver::new(fetcher.clone(), cache);

    samples_view.resolve(&[a.id]).await.unwrap();
    let resolved = picker_view.resolve(&[a.id]).await.unwrap();

    assert_eq!(resolved[&a.id], a);
    // the second table never issued a request
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_many_concurrent_callers_coalesce() {
    let samples: Vec<_> = (0..8)
        .map(|i| sample(&format!("s{i}"), "active", i as f64))
        .collect();
    let fetcher = Arc::new(SlowFetcher::new(samples.clone(), Duration::from_millis(5)));
    let resolver = Arc::new(RecordResolver::with_batch_window(
        fetcher.clone(),
        RecordCache::new(),
        Duration::from_millis(10),
    ));

    // a burst of per-row lookups, the way a rendering table issues them
    let lookups = samples.iter().map(|sample| {
        let resolver = Arc::clone(&resolver);
        let id = sample.id;
        async move { resolver.resolve(&[id]).await }
    });
    let results = futures_util::future::join_all(lookups).await;

    for (result, sample) in results.into_iter().zip(&samples) {
        assert_eq!(result.unwrap()[&sample.id], *sample);
    }
    // the whole burst fit into the first accumulation window
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*fetcher.batch_sizes.lock().unwrap(), vec![8]);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_ids_in_one_call_resolve_once() {
    let a = sample("a", "active", 1.0);
    let fetcher = Arc::new(SlowFetcher::new(vec![a.clone()], Duration::ZERO));
    let resolver = RecordResolver::new(fetcher.clone(), RecordCache::new());

    let resolved = resolver.resolve(&[a.id, a.id, a.id]).await.unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*fetcher.batch_sizes.lock().unwrap(), vec![1]);
}
