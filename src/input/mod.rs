//! Debounced input adapter
//!
//! Wraps a text or number input so keystrokes never block on the network:
//! the local display text updates immediately while the committed value
//! trails behind a quiet period. Each adapter instance owns its single
//! timer; there is no ambient timer state shared across instances.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Default quiet period before an edit is committed
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

type CommitFn = Arc<dyn Fn(String) + Send + Sync>;

/// A text input buffer committing through a callback after a quiet period.
///
/// Only the last edit before the timer elapses triggers the commit, and a
/// new edit cancels any pending timer before scheduling a new one, so no
/// concurrent commits are ever in flight from one adapter instance. The
/// pending timer is also canceled on drop.
pub struct DebouncedInput {
    text: String,
    delay: Duration,
    commit: CommitFn,
    pending: Option<JoinHandle<()>>,
}

impl DebouncedInput {
    /// Create an adapter committing through `commit` after
    /// [`DEFAULT_DEBOUNCE`]
    pub fn new(commit: impl Fn(String) + Send + Sync + 'static) -> Self {
        Self::with_delay(DEFAULT_DEBOUNCE, commit)
    }

    pub fn with_delay(delay: Duration, commit: impl Fn(String) + Send + Sync + 'static) -> Self {
        Self {
            text: String::new(),
            delay,
            commit: Arc::new(commit),
            pending: None,
        }
    }

    /// Record a keystroke: update the local text immediately and (re)start
    /// the single trailing commit timer
    pub fn input(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cancel();

        let commit = Arc::clone(&self.commit);
        let value = self.text.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            commit(value);
        }));
    }

    /// Local display text, possibly ahead of the committed value
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Resynchronize from the canonical value after an outside change such
    /// as "clear filters". Cancels any pending commit: a cleared filter
    /// must not be resurrected by a stale keystroke timer.
    pub fn sync(&mut self, canonical: impl Into<String>) {
        self.cancel();
        self.text = canonical.into();
    }

    /// Cancel the pending commit, if any
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for DebouncedInput {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for DebouncedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebouncedInput")
            .field("text", &self.text)
            .field("delay", &self.delay)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::advance;

    fn recording_input(delay: Duration) -> (DebouncedInput, Arc<Mutex<Vec<String>>>) {
        let committed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&committed);
        let input = DebouncedInput::with_delay(delay, move |value| {
            sink.lock().unwrap().push(value);
        });
        (input, committed)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_commit_once_with_last_value() {
        let (mut input, committed) = recording_input(Duration::from_millis(500));

        input.input("f");
        tokio::task::yield_now().await;
        advance(Duration::from_millis(100)).await;
        input.input("fo");
        tokio::task::yield_now().await;
        advance(Duration::from_millis(100)).await;
        input.input("foo");
        tokio::task::yield_now().await;
        advance(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;

        assert_eq!(*committed.lock().unwrap(), vec!["foo".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_text_updates_immediately() {
        let (mut input, committed) = recording_input(Duration::from_millis(500));

        input.input("foo");
        assert_eq!(input.text(), "foo");
        assert!(committed.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_quiet_periods_commit_separately() {
        let (mut input, committed) = recording_input(Duration::from_millis(500));

        input.input("first");
        tokio::task::yield_now().await;
        advance(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;
        input.input("second");
        tokio::task::yield_now().await;
        advance(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;

        assert_eq!(
            *committed.lock().unwrap(),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_cancels_pending_commit() {
        let (mut input, committed) = recording_input(Duration::from_millis(500));

        input.input("typed");
        input.sync("");
        advance(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;

        assert_eq!(input.text(), "");
        assert!(committed.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_pending_timer() {
        let (mut input, committed) = recording_input(Duration::from_millis(500));

        input.input("typed");
        drop(input);
        advance(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;

        assert!(committed.lock().unwrap().is_empty());
    }
}
