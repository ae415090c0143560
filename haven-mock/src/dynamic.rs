use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use haven_core::{HavenError, Resource, SourceAdapter, SourceQuery};

/// Instruction for how `fetch` should behave.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return the provided resources immediately, exactly as given.
    Return(Vec<Resource>),
    /// Fail immediately with the provided error.
    Fail(HavenError),
    /// Fail the first `failures` calls with `error`, then return `resources`.
    FailThenReturn {
        /// Number of leading failed calls.
        failures: usize,
        /// Error returned while failing.
        error: HavenError,
        /// Resources returned afterwards.
        resources: Vec<Resource>,
    },
    /// Hang indefinitely (simulate a stalled backend).
    Hang,
    /// Sleep for the given duration, then return the resources.
    Delay(Duration, Vec<Resource>),
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self::Return(Vec::new())
    }
}

#[derive(Default)]
struct InternalState {
    behavior: MockBehavior,
    calls_since_set: usize,
    queries: Vec<SourceQuery>,
}

/// Controller handle used by tests to drive a [`MockSource`] from the outside.
#[derive(Clone)]
pub struct MockController {
    state: Arc<Mutex<InternalState>>,
    calls: Arc<AtomicUsize>,
}

impl MockController {
    /// Replace the behavior for subsequent `fetch` calls.
    ///
    /// Resets the `FailThenReturn` progress.
    pub async fn set_behavior(&self, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard.behavior = behavior;
        guard.calls_since_set = 0;
    }

    /// Total number of `fetch` invocations, including failed and hung ones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every query received so far, in call order.
    pub async fn queries(&self) -> Vec<SourceQuery> {
        self.state.lock().await.queries.clone()
    }

    /// Reset behavior, counters and the query log.
    pub async fn reset(&self) {
        let mut guard = self.state.lock().await;
        *guard = InternalState::default();
        self.calls.store(0, Ordering::SeqCst);
    }
}

/// A source that defers all behavior to an external [`MockController`].
pub struct MockSource {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
    calls: Arc<AtomicUsize>,
}

impl MockSource {
    /// Create a new scripted source and its controller.
    ///
    /// The source starts out returning an empty list.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<dyn SourceAdapter>, MockController) {
        Self::scripted(name, MockBehavior::default())
    }

    /// Create a scripted source with an initial behavior.
    #[must_use]
    pub fn scripted(
        name: &'static str,
        behavior: MockBehavior,
    ) -> (Arc<dyn SourceAdapter>, MockController) {
        let state = Arc::new(Mutex::new(InternalState {
            behavior,
            ..InternalState::default()
        }));
        let calls = Arc::new(AtomicUsize::new(0));
        let controller = MockController {
            state: Arc::clone(&state),
            calls: Arc::clone(&calls),
        };
        let me = Arc::new(Self { name, state, calls });
        (me as Arc<dyn SourceAdapter>, controller)
    }
}

#[async_trait]
impl SourceAdapter for MockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<Resource>, HavenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Snapshot the behavior without holding the lock across await points
        let (behavior, nth) = {
            let mut guard = self.state.lock().await;
            guard.queries.push(*query);
            let nth = guard.calls_since_set;
            guard.calls_since_set += 1;
            (guard.behavior.clone(), nth)
        };

        match behavior {
            MockBehavior::Return(resources) => Ok(resources),
            MockBehavior::Fail(e) => Err(e),
            MockBehavior::FailThenReturn {
                failures,
                error,
                resources,
            } => {
                if nth < failures {
                    Err(error)
                } else {
                    Ok(resources)
                }
            }
            MockBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            MockBehavior::Delay(wait, resources) => {
                tokio::time::sleep(wait).await;
                Ok(resources)
            }
        }
    }
}
