use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::{
    components::dexscreener::{DexScreenerError, PairSearch},
    config::time::{DEBOUNCE_TIME, TIMEOUT},
    models::dexscreener::SearchResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    /// Waiting for the quiet interval to pass.
    Pending { query: String, deadline: Instant },
    InFlight { query: String, seq: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Success { query: String, count: usize },
}

struct State {
    phase: SearchPhase,
    query: String,
    result: Option<SearchResult>,
    next_seq: u64,
    applied_seq: u64,
    timer: Option<JoinHandle<()>>,
}

struct Shared<S> {
    source: S,
    quiet: Duration,
    timeout: Duration,
    state: RwLock<State>,
    events: mpsc::UnboundedSender<SearchEvent>,
}

/// Turns a stream of keystrokes into debounced searches.
///
/// Every non-empty `set_query` restarts a single timer. When the timer runs
/// out the current text is searched once; the result replaces the previous
/// one only if no newer request has already been applied.
pub struct SearchOrchestrator<S: PairSearch> {
    shared: Arc<Shared<S>>,
}

impl<S: PairSearch> Clone for SearchOrchestrator<S> {
    fn clone(&self) -> Self {
        SearchOrchestrator {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: PairSearch> SearchOrchestrator<S> {
    pub fn new(source: S) -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        Self::with_timings(source, DEBOUNCE_TIME, TIMEOUT)
    }

    pub fn with_timings(
        source: S,
        quiet: Duration,
        timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let state = State {
            phase: SearchPhase::Idle,
            query: String::new(),
            result: None,
            next_seq: 0,
            applied_seq: 0,
            timer: None,
        };
        let shared = Shared {
            source,
            quiet,
            timeout,
            state: RwLock::new(state),
            events,
        };

        (
            SearchOrchestrator {
                shared: Arc::new(shared),
            },
            rx,
        )
    }

    pub async fn set_query(&self, text: &str) {
        let mut state = self.shared.state.write().await;

        state.query = text.to_string();

        if text.is_empty() {
            return;
        }

        if let SearchPhase::Pending { .. } = state.phase {
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
        }

        let deadline = Instant::now() + self.shared.quiet;
        let shared = Arc::clone(&self.shared);

        state.phase = SearchPhase::Pending {
            query: text.to_string(),
            deadline,
        };
        state.timer = Some(tokio::spawn(async move {
            time::sleep_until(deadline).await;
            shared.fire(deadline).await;
        }));
    }

    pub async fn phase(&self) -> SearchPhase {
        self.shared.state.read().await.phase.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.shared.state.read().await.phase != SearchPhase::Idle
    }

    pub async fn query(&self) -> String {
        self.shared.state.read().await.query.clone()
    }

    pub async fn result(&self) -> Option<SearchResult> {
        self.shared.state.read().await.result.clone()
    }
}

impl<S: PairSearch> Shared<S> {
    async fn fire(self: Arc<Self>, deadline: Instant) {
        let (query, seq) = {
            let mut state = self.state.write().await;
            let query = match &state.phase {
                SearchPhase::Pending { query, deadline: d } if *d == deadline => query.clone(),
                _ => return,
            };

            state.next_seq += 1;

            let seq = state.next_seq;

            state.phase = SearchPhase::InFlight {
                query: query.clone(),
                seq,
            };

            (query, seq)
        };

        debug!("search #{}: fetching {:?}", seq, query);

        let res = match time::timeout(self.timeout, self.source.search(&query)).await {
            Ok(res) => res,
            Err(_) => Err(DexScreenerError::Timeout(self.timeout)),
        };
        let mut state = self.state.write().await;

        if matches!(&state.phase, SearchPhase::InFlight { seq: s, .. } if *s == seq) {
            state.phase = SearchPhase::Idle;
        }

        match res {
            Ok(result) => {
                if seq <= state.applied_seq {
                    debug!(
                        "search #{}: dropping stale response, #{} already applied",
                        seq, state.applied_seq
                    );

                    return;
                }

                let count = result.pair_count();

                state.applied_seq = seq;
                state.result = Some(result);

                info!("search #{}: found {} pairs for {:?}", seq, count, query);

                if self.events.send(SearchEvent::Success { query, count }).is_err() {
                    debug!("search #{}: no event listener", seq);
                }
            }
            Err(e) => {
                error!("search #{}: error fetching {:?}: {}", seq, query, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dexscreener::fixtures::{pair, result};
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::mpsc::error::TryRecvError;

    #[derive(Default)]
    struct FakeSource {
        calls: Arc<Mutex<Vec<String>>>,
        results: HashMap<String, SearchResult>,
        delays: HashMap<String, Duration>,
    }

    impl FakeSource {
        fn with_result(mut self, query: &str, result: SearchResult) -> Self {
            self.results.insert(query.to_string(), result);
            self
        }

        fn with_delay(mut self, query: &str, delay: Duration) -> Self {
            self.delays.insert(query.to_string(), delay);
            self
        }
    }

    impl PairSearch for FakeSource {
        async fn search(&self, query: &str) -> Result<SearchResult, DexScreenerError> {
            self.calls.lock().unwrap().push(query.to_string());

            let delay = self
                .delays
                .get(query)
                .copied()
                .unwrap_or(Duration::from_millis(50));

            time::sleep(delay).await;

            match self.results.get(query) {
                Some(result) => Ok(result.clone()),
                None => Err(DexScreenerError::Status(StatusCode::INTERNAL_SERVER_ERROR)),
            }
        }
    }

    fn pepe_result() -> SearchResult {
        result(vec![pair("solana", "pepe-1", "PEPE"), pair("ethereum", "pepe-2", "PEPE")])
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once_with_last_text() {
        let source = FakeSource::default().with_result("pepe", pepe_result());
        let calls = Arc::clone(&source.calls);
        let (search, mut events) = SearchOrchestrator::new(source);

        for text in ["p", "pe", "pep", "pepe"] {
            search.set_query(text).await;
            time::sleep(ms(100)).await;
        }

        assert!(calls.lock().unwrap().is_empty());
        assert!(search.is_loading().await);

        time::sleep(ms(600)).await;

        assert_eq!(*calls.lock().unwrap(), vec!["pepe".to_string()]);
        assert_eq!(search.result().await, Some(pepe_result()));
        assert!(!search.is_loading().await);
        assert_eq!(search.phase().await, SearchPhase::Idle);
        assert_eq!(
            events.try_recv(),
            Ok(SearchEvent::Success {
                query: "pepe".to_string(),
                count: 2
            })
        );
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_input_restarts_timer() {
        let source = FakeSource::default().with_result("pepe", pepe_result());
        let calls = Arc::clone(&source.calls);
        let (search, _events) = SearchOrchestrator::new(source);

        search.set_query("pe").await;
        time::sleep(ms(400)).await;
        search.set_query("pepe").await;
        time::sleep(ms(400)).await;

        assert!(calls.lock().unwrap().is_empty());
        match search.phase().await {
            SearchPhase::Pending { query, .. } => assert_eq!(query, "pepe"),
            other => panic!("Expected Pending, got {:?}", other),
        }

        time::sleep(ms(200)).await;

        assert_eq!(*calls.lock().unwrap(), vec!["pepe".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_query_never_fetches() {
        let source = FakeSource::default();
        let calls = Arc::clone(&source.calls);
        let (search, mut events) = SearchOrchestrator::new(source);

        search.set_query("").await;

        assert!(!search.is_loading().await);

        time::sleep(ms(1000)).await;

        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(search.phase().await, SearchPhase::Idle);
        assert_eq!(search.result().await, None);
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_query_keeps_previous_result() {
        let source = FakeSource::default().with_result("pepe", pepe_result());
        let calls = Arc::clone(&source.calls);
        let (search, _events) = SearchOrchestrator::new(source);

        search.set_query("pepe").await;
        time::sleep(ms(600)).await;
        search.set_query("").await;
        time::sleep(ms(1000)).await;

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(search.query().await, "");
        assert_eq!(search.result().await, Some(pepe_result()));
        assert!(!search.is_loading().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_previous_result() {
        let source = FakeSource::default()
            .with_result("pepe", pepe_result())
            .with_result("slow", result(vec![pair("base", "slow-1", "SLOW")]))
            .with_delay("slow", Duration::from_secs(10));
        let calls = Arc::clone(&source.calls);
        let (search, mut events) = SearchOrchestrator::new(source);

        search.set_query("pepe").await;
        time::sleep(ms(600)).await;
        assert!(events.try_recv().is_ok());

        search.set_query("slow").await;
        time::sleep(ms(500 + 2900)).await;

        assert!(search.is_loading().await);

        time::sleep(ms(200)).await;

        assert_eq!(*calls.lock().unwrap(), vec!["pepe".to_string(), "slow".to_string()]);
        assert!(!search.is_loading().await);
        assert_eq!(search.result().await, Some(pepe_result()));
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_result() {
        let source = FakeSource::default().with_result("pepe", pepe_result());
        let (search, mut events) = SearchOrchestrator::new(source);

        search.set_query("pepe").await;
        time::sleep(ms(600)).await;
        assert!(events.try_recv().is_ok());

        search.set_query("boom").await;
        time::sleep(ms(600)).await;

        assert!(!search.is_loading().await);
        assert_eq!(search.result().await, Some(pepe_result()));
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let fast = result(vec![pair("solana", "fast-1", "FAST")]);
        let source = FakeSource::default()
            .with_result("slow", result(vec![pair("base", "slow-1", "SLOW")]))
            .with_delay("slow", ms(2000))
            .with_result("fast", fast.clone());
        let calls = Arc::clone(&source.calls);
        let (search, mut events) = SearchOrchestrator::new(source);

        search.set_query("slow").await;
        time::sleep(ms(600)).await;
        assert!(matches!(search.phase().await, SearchPhase::InFlight { .. }));

        search.set_query("fast").await;
        time::sleep(ms(600)).await;

        assert_eq!(search.result().await, Some(fast.clone()));
        assert!(!search.is_loading().await);

        time::sleep(ms(2000)).await;

        assert_eq!(*calls.lock().unwrap(), vec!["slow".to_string(), "fast".to_string()]);
        assert_eq!(search.result().await, Some(fast));
        assert_eq!(
            events.try_recv(),
            Ok(SearchEvent::Success {
                query: "fast".to_string(),
                count: 1
            })
        );
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_stays_on_while_newer_query_pending() {
        let source = FakeSource::default()
            .with_result("pe", pepe_result())
            .with_delay("pe", ms(300))
            .with_result("pepe", pepe_result());
        let (search, _events) = SearchOrchestrator::new(source);

        search.set_query("pe").await;
        time::sleep(ms(600)).await;
        search.set_query("pepe").await;
        time::sleep(ms(300)).await;

        // "pe" settled, "pepe" is still waiting for its quiet interval
        assert!(search.is_loading().await);
        assert_eq!(search.result().await, Some(pepe_result()));

        time::sleep(ms(400)).await;

        assert!(!search.is_loading().await);
    }
}
