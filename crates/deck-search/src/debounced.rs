//! Debounced filter over a fixed collection.
//!
//! Input terms are coalesced: only the last term typed before a quiet period
//! is evaluated. Evaluation runs on the timer task, so the filtered view is
//! shared behind a mutex.

use crate::debounce::Debouncer;
use crate::filter::{Searchable, filter_items};
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Called after every evaluation with the applied term and the filtered view.
pub type ApplyCallback<T> = Arc<dyn Fn(&str, &[T]) + Send + Sync>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterPhase {
    /// No evaluation waiting.
    #[default]
    Idle,
    /// A term is waiting for its quiet period.
    Pending,
    /// Torn down with nothing waiting; new input starts over.
    Cancelled,
}

struct FilterState<T> {
    items: Vec<T>,
    pending_term: String,
    applied_term: Option<String>,
    filtered: Vec<T>,
    evaluations: u64,
}

pub struct DebouncedFilter<T> {
    state: Arc<Mutex<FilterState<T>>>,
    debouncer: Debouncer,
    on_apply: Option<ApplyCallback<T>>,
    torn_down: bool,
}

impl<T> DebouncedFilter<T>
where
    T: Searchable + Clone + Send + 'static,
{
    pub fn new(quiet: Duration) -> Self {
        Self::with_items(quiet, Vec::new())
    }

    pub fn with_items(quiet: Duration, items: Vec<T>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FilterState {
                filtered: items.clone(),
                items,
                pending_term: String::new(),
                applied_term: None,
                evaluations: 0,
            })),
            debouncer: Debouncer::new(quiet),
            on_apply: None,
            torn_down: false,
        }
    }

    /// Register a callback run after each evaluation.
    pub fn on_apply<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &[T]) + Send + Sync + 'static,
    {
        self.on_apply = Some(Arc::new(callback));
        self
    }

    /// Record `term` and (re)start the quiet period.
    pub fn on_input(&mut self, term: impl Into<String>) {
        let term = term.into();
        self.torn_down = false;
        self.state.lock().pending_term = term;

        let state = Arc::clone(&self.state);
        let on_apply = self.on_apply.clone();
        self.debouncer.schedule(move || evaluate(&state, on_apply.as_ref()));
    }

    /// Replace the unfiltered collection and re-apply the current term now.
    pub fn set_items(&self, items: Vec<T>) {
        self.state.lock().items = items;
        evaluate(&self.state, self.on_apply.as_ref());
    }

    /// Skip the rest of the quiet period and evaluate the pending term.
    pub fn apply_now(&mut self) {
        self.debouncer.cancel();
        evaluate(&self.state, self.on_apply.as_ref());
    }

    /// Reset the term to empty and show the full collection.
    pub fn clear(&mut self) {
        self.debouncer.cancel();
        self.state.lock().pending_term.clear();
        evaluate(&self.state, self.on_apply.as_ref());
    }

    /// Cancel any pending evaluation. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.debouncer.cancel() {
            debug!("Debounced filter torn down with a pending term");
        }
        self.torn_down = true;
    }

    pub fn phase(&self) -> FilterPhase {
        if self.debouncer.is_pending() {
            FilterPhase::Pending
        } else if self.torn_down {
            FilterPhase::Cancelled
        } else {
            FilterPhase::Idle
        }
    }

    pub fn filtered(&self) -> Vec<T> {
        self.state.lock().filtered.clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.state.lock().items.clone()
    }

    /// The most recent input, applied or not.
    pub fn term(&self) -> String {
        self.state.lock().pending_term.clone()
    }

    /// The term of the last evaluation, if any ran.
    pub fn applied_term(&self) -> Option<String> {
        self.state.lock().applied_term.clone()
    }

    pub fn evaluations(&self) -> u64 {
        self.state.lock().evaluations
    }

    pub fn quiet_period(&self) -> Duration {
        self.debouncer.quiet_period()
    }
}

fn evaluate<T>(state: &Mutex<FilterState<T>>, on_apply: Option<&ApplyCallback<T>>)
where
    T: Searchable + Clone,
{
    let (term, filtered) = {
        let mut state = state.lock();
        let filtered = filter_items(&state.items, &state.pending_term);
        let term = state.pending_term.clone();
        state.filtered = filtered.clone();
        state.applied_term = Some(term.clone());
        state.evaluations += 1;
        (term, filtered)
    };
    debug!("Filter applied '{}': {} match(es)", term, filtered.len());

    if let Some(callback) = on_apply {
        callback(&term, &filtered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[derive(Clone, Debug, PartialEq)]
    struct Entry(&'static str);

    impl Searchable for Entry {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.0]
        }
    }

    type Spy = Arc<Mutex<Vec<(String, usize)>>>;

    fn spied_filter(items: Vec<Entry>) -> (DebouncedFilter<Entry>, Spy) {
        let spy: Spy = Arc::new(Mutex::new(Vec::new()));
        let calls = spy.clone();
        let filter = DebouncedFilter::with_items(Duration::from_millis(300), items)
            .on_apply(move |term, view| calls.lock().push((term.to_string(), view.len())));
        (filter, spy)
    }

    fn entries() -> Vec<Entry> {
        vec![Entry("abc"), Entry("abd"), Entry("xyz")]
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_evaluates_last_term_once() {
        let (mut filter, spy) = spied_filter(entries());

        filter.on_input("a");
        sleep(Duration::from_millis(50)).await;
        filter.on_input("ab");
        sleep(Duration::from_millis(50)).await;
        filter.on_input("abc");
        assert_eq!(filter.phase(), FilterPhase::Pending);

        sleep(Duration::from_millis(400)).await;
        assert_eq!(*spy.lock(), vec![("abc".to_string(), 1)]);
        assert_eq!(filter.evaluations(), 1);
        assert_eq!(filter.filtered(), vec![Entry("abc")]);
        assert_eq!(filter.phase(), FilterPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_term_after_quiet_period_restores_full_list() {
        let (mut filter, spy) = spied_filter(entries());

        filter.on_input("x");
        sleep(Duration::from_millis(350)).await;
        assert_eq!(*spy.lock(), vec![("x".to_string(), 1)]);

        filter.on_input("");
        sleep(Duration::from_millis(350)).await;
        assert_eq!(spy.lock().len(), 2);
        assert_eq!(spy.lock()[1], (String::new(), 3));
        assert_eq!(filter.filtered(), entries());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_before_fire_never_calls_spy() {
        let (mut filter, spy) = spied_filter(entries());

        filter.on_input("ab");
        filter.teardown();
        assert_eq!(filter.phase(), FilterPhase::Cancelled);
        filter.teardown();

        sleep(Duration::from_secs(2)).await;
        assert!(spy.lock().is_empty());
        assert_eq!(filter.evaluations(), 0);
        assert_eq!(filter.applied_term(), None);

        // New input after teardown starts a fresh quiet period.
        filter.on_input("xy");
        assert_eq!(filter.phase(), FilterPhase::Pending);
        sleep(Duration::from_millis(350)).await;
        assert_eq!(*spy.lock(), vec![("xy".to_string(), 1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_filter_cancels_timer() {
        let (mut filter, spy) = spied_filter(entries());
        filter.on_input("abc");
        drop(filter);
        sleep(Duration::from_secs(1)).await;
        assert!(spy.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_items_reapplies_current_term() {
        let (mut filter, spy) = spied_filter(Vec::new());
        filter.on_input("ab");
        filter.set_items(entries());
        // set_items evaluates right away with the pending term.
        assert_eq!(filter.filtered().len(), 2);

        sleep(Duration::from_millis(350)).await;
        assert_eq!(spy.lock().len(), 2);
        assert_eq!(filter.term(), "ab");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_pending_and_shows_everything() {
        let (mut filter, spy) = spied_filter(entries());
        filter.on_input("xyz");
        filter.clear();
        assert_eq!(filter.filtered(), entries());
        assert_eq!(filter.term(), "");

        sleep(Duration::from_secs(1)).await;
        assert_eq!(*spy.lock(), vec![(String::new(), 3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_now_skips_quiet_period() {
        let (mut filter, spy) = spied_filter(entries());

        filter.on_input("x");
        filter.apply_now();
        assert_eq!(filter.evaluations(), 1);
        assert_eq!(filter.applied_term().as_deref(), Some("x"));
        assert_eq!(filter.phase(), FilterPhase::Idle);
        assert_eq!(filter.filtered(), vec![Entry("xyz")]);

        sleep(Duration::from_millis(400)).await;
        assert_eq!(filter.evaluations(), 1);
        assert_eq!(*spy.lock(), vec![("x".to_string(), 1)]);
    }
}
