pub mod events;
pub mod lifecycle;

use log::{debug, error, info, warn};
use tokio::sync::watch;

use crate::api::{RESULTS_PATH, ResultsResponse, StorefrontApi, VOTE_PATH, VoteRequest, VoteResponse};
use crate::error::VoteError;
use crate::models::{EngineConfiguration, EngineState, ProductId, Vote};
use crate::store::{LAST_VOTE_TIME_KEY, Preferences, USER_VOTES_KEY};
use events::{EventChannel, VoteEvent};
use lifecycle::RequestLifecycle;

const DEFAULT_VOTE_FAILURE: &str = "Vote failed";
const DEFAULT_RESULTS_FAILURE: &str = "Failed to fetch results";

// Vote state for one widget instance: eligibility, submission, results.
pub struct VoteEngine {
    config: EngineConfiguration,
    api: StorefrontApi,
    prefs: Preferences,
    state: watch::Sender<EngineState>,
    events: EventChannel,
    lifecycle: RequestLifecycle,
}

// Keeps `loading` set while alive. The in-flight counter is only touched
// inside `send_modify` so the flag and the counter move together.
struct LoadingGuard<'a> {
    engine: &'a VoteEngine,
}

impl<'a> LoadingGuard<'a> {
    fn new(engine: &'a VoteEngine) -> Self {
        engine.state.send_modify(|state| {
            state.loading = engine.lifecycle.enter() > 0;
        });
        Self { engine }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let lifecycle = &self.engine.lifecycle;
        self.engine.state.send_modify(|state| {
            state.loading = lifecycle.leave() > 0;
        });
    }
}

impl VoteEngine {
    // Builds an engine seeded with the votes persisted by earlier sessions.
    pub async fn new(config: EngineConfiguration, api: StorefrontApi, prefs: Preferences) -> Self {
        let mut votes: Vec<Vote> = prefs.get(USER_VOTES_KEY, Vec::new()).await;
        if let Some(cap) = config.max_votes_per_user.cap() {
            if votes.len() > cap {
                warn!(
                    "Persisted {} votes but the limit is {}; ignoring the extra votes",
                    votes.len(),
                    cap
                );
                votes.truncate(cap);
            }
        }

        let (state, _) = watch::channel(EngineState::seeded(votes));

        Self {
            config,
            api,
            prefs,
            state,
            events: EventChannel::new(),
            lifecycle: RequestLifecycle::new(),
        }
    }

    pub fn config(&self) -> &EngineConfiguration {
        &self.config
    }

    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    pub fn state(&self) -> EngineState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.state.subscribe()
    }

    pub fn can_vote(&self) -> bool {
        self.eligibility().is_ok()
    }

    pub fn has_voted(&self) -> bool {
        !self.state.borrow().votes.is_empty()
    }

    pub fn has_voted_for(&self, product_id: &ProductId) -> bool {
        self.state
            .borrow()
            .votes
            .iter()
            .any(|vote| &vote.product_id == product_id)
    }

    fn eligibility(&self) -> Result<(), VoteError> {
        if !self.config.voting_enabled {
            return Err(VoteError::VotingDisabled);
        }
        let cast = self.state.borrow().votes.len();
        if self.config.max_votes_per_user.allows(cast) {
            Ok(())
        } else {
            Err(VoteError::LimitReached)
        }
    }

    fn set_error(&self, message: Option<String>) {
        self.state.send_modify(|state| state.last_error = message);
    }

    /// Returns whether the vote was accepted. Failures are reported through
    /// `last_error` and the event channel, never to the caller.
    pub async fn submit_vote(&self, product_id: impl Into<ProductId>) -> bool {
        let product_id = product_id.into();

        match self.try_submit_vote(&product_id).await {
            Ok(()) => true,
            Err(e @ (VoteError::LimitReached | VoteError::VotingDisabled | VoteError::SubmitInFlight)) => {
                info!("Vote for {} refused: {}", product_id, e);
                self.set_error(Some(e.to_string()));
                false
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Vote for {} failed: {}", product_id, message);
                self.set_error(Some(message.clone()));
                self.events.emit(VoteEvent::Failed {
                    product_id,
                    error: message,
                });
                false
            }
        }
    }

    async fn try_submit_vote(&self, product_id: &ProductId) -> Result<(), VoteError> {
        // Checked under the permit so it sees any vote the previous holder
        // recorded.
        let _permit = self
            .lifecycle
            .try_begin_submit()
            .ok_or(VoteError::SubmitInFlight)?;
        self.eligibility()?;
        let _loading = LoadingGuard::new(self);

        self.set_error(None);
        self.events.emit(VoteEvent::Submitted {
            product_id: product_id.clone(),
        });

        let vote = Vote::new(product_id.clone());
        let request = VoteRequest {
            product_id,
            customer_id: self.config.customer_id.as_deref(),
            timestamp: vote.timestamp.timestamp_millis(),
        };
        let response: VoteResponse = self.api.post_json(VOTE_PATH, &request).await?;

        if !response.success {
            let message = response
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_VOTE_FAILURE.to_string());
            return Err(VoteError::Rejected(message));
        }

        let mut cast = 0;
        self.state.send_modify(|state| {
            state.votes.push(vote.clone());
            cast = state.votes.len();
        });

        // Other widgets on the page share the key, so merge instead of
        // overwriting their votes.
        let persisted = self
            .prefs
            .update(USER_VOTES_KEY, Vec::<Vote>::new(), |stored| {
                if !stored.contains(&vote) {
                    stored.push(vote.clone());
                }
            })
            .await;
        if persisted.is_none() {
            warn!("Vote for {} recorded but not persisted", product_id);
        }
        if !self
            .prefs
            .set(LAST_VOTE_TIME_KEY, &vote.timestamp.timestamp_millis())
            .await
        {
            warn!("Last vote time for {} not persisted", product_id);
        }

        info!("Vote for {} accepted ({} cast)", product_id, cast);
        self.events.emit(VoteEvent::Succeeded {
            product_id: product_id.clone(),
        });

        self.fetch_results().await;
        Ok(())
    }

    // Replaces the results snapshot. Errors land in `last_error`.
    pub async fn fetch_results(&self) {
        let token = self.lifecycle.begin_fetch();
        let _loading = LoadingGuard::new(self);
        self.set_error(None);

        let outcome = self.api.get_json::<ResultsResponse>(RESULTS_PATH).await;

        if !self.lifecycle.is_current(token) {
            debug!("Discarding results from a superseded fetch");
            return;
        }

        match outcome {
            Ok(response) if response.success => {
                let results = response.results;
                self.state
                    .send_modify(|state| state.results = results.clone());
                self.events.emit(VoteEvent::ResultsUpdated { results });
            }
            Ok(response) => {
                let message = response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| DEFAULT_RESULTS_FAILURE.to_string());
                warn!("Failed to fetch results: {}", message);
                self.set_error(Some(message));
            }
            Err(e) => {
                error!("Failed to fetch results: {}", e);
                self.set_error(Some(e.to_string()));
            }
        }
    }

    // Forgets every recorded vote. Only honoured in dev mode.
    pub async fn clear_votes(&self) -> bool {
        if !self.config.dev_mode {
            warn!("Ignoring clear_votes outside dev mode");
            return false;
        }

        self.state.send_modify(|state| state.votes.clear());
        self.prefs.remove(USER_VOTES_KEY).await;
        self.prefs.remove(LAST_VOTE_TIME_KEY).await;
        info!("Cleared recorded votes");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StorefrontSettings;
    use crate::models::{VoteLimit, VoteResult};
    use crate::store::{MemoryStore, PreferenceStore};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn limited(n: u32) -> EngineConfiguration {
        EngineConfiguration {
            max_votes_per_user: VoteLimit::AtMost(n),
            ..EngineConfiguration::default()
        }
    }

    async fn engine_for(
        server: &MockServer,
        config: EngineConfiguration,
        store: Arc<MemoryStore>,
    ) -> VoteEngine {
        let api = StorefrontApi::new(
            reqwest::Client::new(),
            &server.uri(),
            &config.api_base_endpoint,
            StorefrontSettings::default(),
        );
        VoteEngine::new(config, api, Preferences::new(store)).await
    }

    async fn mount_vote(server: &MockServer, body: serde_json::Value, times: u64) {
        Mock::given(method("POST"))
            .and(path("/apps/campaign-api/vote"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(server)
            .await;
    }

    async fn mount_results(server: &MockServer, results: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/apps/campaign-api/results"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "results": results })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn single_vote_exhausts_a_limit_of_one() {
        let server = MockServer::start().await;
        mount_vote(&server, json!({ "success": true }), 1).await;
        mount_results(&server, json!([{ "productId": "sku-1", "voteCount": 4 }])).await;

        let engine = engine_for(&server, limited(1), Arc::new(MemoryStore::new())).await;
        assert!(engine.can_vote());

        assert!(engine.submit_vote("sku-1").await);
        assert!(engine.has_voted_for(&"sku-1".into()));
        assert!(engine.has_voted());
        assert!(!engine.can_vote());

        let state = engine.state();
        assert!(!state.loading);
        assert_eq!(state.last_error, None);
        assert_eq!(
            state.results,
            vec![VoteResult {
                product_id: "sku-1".into(),
                vote_count: 4
            }]
        );
    }

    #[tokio::test]
    async fn submit_past_the_limit_sends_no_request() {
        let server = MockServer::start().await;
        mount_vote(&server, json!({ "success": true }), 2).await;
        mount_results(&server, json!([])).await;

        let engine = engine_for(&server, limited(2), Arc::new(MemoryStore::new())).await;
        assert!(engine.submit_vote("sku-1").await);
        assert!(engine.submit_vote("sku-2").await);
        assert!(!engine.can_vote());

        assert!(!engine.submit_vote("sku-3").await);
        let state = engine.state();
        assert_eq!(state.votes.len(), 2);
        assert_eq!(
            state.last_error.as_deref(),
            Some("You have reached the maximum number of votes")
        );
    }

    #[tokio::test]
    async fn zero_limit_never_votes() {
        let server = MockServer::start().await;
        mount_vote(&server, json!({ "success": true }), 0).await;

        let engine = engine_for(&server, limited(0), Arc::new(MemoryStore::new())).await;
        assert!(!engine.can_vote());
        assert!(!engine.submit_vote("sku-1").await);
    }

    #[tokio::test]
    async fn unlimited_engine_always_can_vote() {
        let server = MockServer::start().await;
        mount_vote(&server, json!({ "success": true }), 5).await;
        mount_results(&server, json!([])).await;

        let config = EngineConfiguration {
            max_votes_per_user: VoteLimit::Unlimited,
            ..EngineConfiguration::default()
        };
        let engine = engine_for(&server, config, Arc::new(MemoryStore::new())).await;

        for i in 0..5 {
            assert!(engine.can_vote());
            assert!(engine.submit_vote(format!("sku-{i}")).await);
        }
        assert!(engine.can_vote());
        assert_eq!(engine.state().votes.len(), 5);
    }

    #[tokio::test]
    async fn disabled_voting_is_refused_locally() {
        let server = MockServer::start().await;
        mount_vote(&server, json!({ "success": true }), 0).await;

        let config = EngineConfiguration {
            voting_enabled: false,
            ..EngineConfiguration::default()
        };
        let engine = engine_for(&server, config, Arc::new(MemoryStore::new())).await;

        assert!(!engine.can_vote());
        assert!(!engine.submit_vote("sku-1").await);
        assert_eq!(engine.state().last_error.as_deref(), Some("Voting is not enabled"));
    }

    #[tokio::test]
    async fn rejected_vote_keeps_state() {
        let server = MockServer::start().await;
        mount_vote(&server, json!({ "success": false, "message": "closed" }), 1).await;

        let engine = engine_for(&server, limited(1), Arc::new(MemoryStore::new())).await;
        let mut events = engine.events().subscribe();

        assert!(!engine.submit_vote("sku-2").await);

        let state = engine.state();
        assert_eq!(state.last_error.as_deref(), Some("closed"));
        assert!(state.votes.is_empty());
        assert!(!state.loading);
        assert!(engine.can_vote());

        assert_eq!(events.recv().await.unwrap().name(), "vote:submitted");
        assert_eq!(
            events.recv().await.unwrap(),
            VoteEvent::Failed {
                product_id: "sku-2".into(),
                error: "closed".to_string()
            }
        );
    }

    #[tokio::test]
    async fn rejection_without_message_uses_default() {
        let server = MockServer::start().await;
        mount_vote(&server, json!({ "success": false }), 1).await;

        let engine = engine_for(&server, limited(1), Arc::new(MemoryStore::new())).await;
        assert!(!engine.submit_vote("sku-2").await);
        assert_eq!(engine.state().last_error.as_deref(), Some("Vote failed"));
    }

    #[tokio::test]
    async fn transport_error_becomes_last_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/apps/campaign-api/vote"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let engine = engine_for(&server, limited(1), Arc::new(MemoryStore::new())).await;
        assert!(!engine.submit_vote("sku-1").await);

        let state = engine.state();
        assert_eq!(
            state.last_error.as_deref(),
            Some("API request failed: Internal Server Error")
        );
        assert!(!state.loading);
        assert!(state.votes.is_empty());
    }

    #[tokio::test]
    async fn request_body_carries_customer_and_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/apps/campaign-api/vote"))
            .and(body_partial_json(json!({ "productId": "sku-9", "customerId": "cust-42" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;
        mount_results(&server, json!([])).await;

        let config = EngineConfiguration {
            customer_id: Some("cust-42".to_string()),
            ..EngineConfiguration::default()
        };
        let engine = engine_for(&server, config, Arc::new(MemoryStore::new())).await;
        assert!(engine.submit_vote("sku-9").await);

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn votes_survive_engine_reconstruction() {
        let server = MockServer::start().await;
        mount_vote(&server, json!({ "success": true }), 1).await;
        mount_results(&server, json!([])).await;

        let store = Arc::new(MemoryStore::new());
        let engine = engine_for(&server, limited(1), store.clone()).await;
        assert!(engine.submit_vote("sku-1").await);
        drop(engine);

        assert!(store.get(LAST_VOTE_TIME_KEY).await.unwrap().is_some());

        let reloaded = engine_for(&server, limited(1), store).await;
        assert!(reloaded.has_voted_for(&"sku-1".into()));
        assert!(!reloaded.can_vote());
    }

    #[tokio::test]
    async fn votes_from_two_widgets_share_the_store() {
        let server = MockServer::start().await;
        mount_vote(&server, json!({ "success": true }), 2).await;
        mount_results(&server, json!([])).await;

        let store = Arc::new(MemoryStore::new());
        let first = engine_for(&server, limited(1), store.clone()).await;
        let second = engine_for(&server, limited(1), store.clone()).await;
        assert!(first.submit_vote("sku-1").await);
        assert!(second.submit_vote("sku-2").await);
        drop(first);

        let stored: Vec<Vote> = Preferences::new(store.clone())
            .get(USER_VOTES_KEY, Vec::new())
            .await;
        let ids: Vec<&str> = stored.iter().map(|v| v.product_id.as_str()).collect();
        assert_eq!(ids, vec!["sku-1", "sku-2"]);

        let reloaded = engine_for(&server, limited(1), store).await;
        assert!(reloaded.has_voted_for(&"sku-1".into()));
    }

    #[tokio::test]
    async fn limit_is_checked_once_the_previous_submit_lets_go() {
        let server = MockServer::start().await;
        mount_vote(&server, json!({ "success": true }), 0).await;

        let engine = engine_for(&server, limited(1), Arc::new(MemoryStore::new())).await;
        let held = engine.lifecycle.try_begin_submit();
        assert!(held.is_some());

        assert!(!engine.submit_vote("sku-2").await);
        assert_eq!(
            engine.state().last_error.as_deref(),
            Some("A vote is already being submitted")
        );

        // The holder records its vote before it releases the permit.
        engine
            .state
            .send_modify(|state| state.votes.push(Vote::new("sku-1".into())));
        drop(held);

        assert!(!engine.submit_vote("sku-2").await);
        let state = engine.state();
        assert_eq!(
            state.last_error.as_deref(),
            Some("You have reached the maximum number of votes")
        );
        assert_eq!(state.votes.len(), 1);
    }

    #[tokio::test]
    async fn request_timestamp_matches_the_stored_vote() {
        let server = MockServer::start().await;
        mount_vote(&server, json!({ "success": true }), 1).await;
        mount_results(&server, json!([])).await;

        let store = Arc::new(MemoryStore::new());
        let engine = engine_for(&server, limited(1), store.clone()).await;
        assert!(engine.submit_vote("sku-1").await);

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let sent = body["timestamp"].as_i64().unwrap();

        assert_eq!(engine.state().votes[0].timestamp.timestamp_millis(), sent);
        let last: i64 = Preferences::new(store).get(LAST_VOTE_TIME_KEY, 0).await;
        assert_eq!(last, sent);
    }

    #[tokio::test]
    async fn persisted_votes_beyond_limit_are_truncated() {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        let votes = vec![Vote::new("a".into()), Vote::new("b".into()), Vote::new("c".into())];
        Preferences::new(store.clone()).set(USER_VOTES_KEY, &votes).await;

        let engine = engine_for(&server, limited(2), store).await;
        assert_eq!(engine.state().votes, votes[..2].to_vec());
    }

    #[tokio::test]
    async fn successful_vote_emits_events_in_order() {
        let server = MockServer::start().await;
        mount_vote(&server, json!({ "success": true }), 1).await;
        mount_results(&server, json!([{ "productId": 7, "voteCount": 1 }])).await;

        let engine = engine_for(&server, limited(1), Arc::new(MemoryStore::new())).await;
        let mut events = engine.events().subscribe();
        assert!(engine.submit_vote("7").await);

        assert_eq!(
            events.recv().await.unwrap(),
            VoteEvent::Submitted { product_id: "7".into() }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            VoteEvent::Succeeded { product_id: "7".into() }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            VoteEvent::ResultsUpdated {
                results: vec![VoteResult {
                    product_id: "7".into(),
                    vote_count: 1
                }]
            }
        );
    }

    #[tokio::test]
    async fn fetch_results_clears_loading_on_success_and_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps/campaign-api/results"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "results": [{ "productId": "sku-1", "voteCount": 2 }]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/apps/campaign-api/results"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let engine = engine_for(&server, limited(1), Arc::new(MemoryStore::new())).await;

        engine.fetch_results().await;
        let state = engine.state();
        assert!(!state.loading);
        assert_eq!(state.vote_count_for(&"sku-1".into()), Some(2));

        engine.fetch_results().await;
        let state = engine.state();
        assert!(!state.loading);
        assert_eq!(state.last_error.as_deref(), Some("API request failed: Bad Gateway"));
        // A failed fetch leaves the previous snapshot alone.
        assert_eq!(state.vote_count_for(&"sku-1".into()), Some(2));
    }

    #[tokio::test]
    async fn unsuccessful_results_response_sets_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps/campaign-api/results"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": false })),
            )
            .mount(&server)
            .await;

        let engine = engine_for(&server, limited(1), Arc::new(MemoryStore::new())).await;
        engine.fetch_results().await;

        let state = engine.state();
        assert!(!state.loading);
        assert_eq!(state.last_error.as_deref(), Some("Failed to fetch results"));
    }

    #[tokio::test]
    async fn loading_is_visible_while_request_is_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps/campaign-api/results"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "results": [] }))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let engine = engine_for(&server, limited(1), Arc::new(MemoryStore::new())).await;
        let mut rx = engine.subscribe();

        let observe = async {
            rx.changed().await.unwrap();
            rx.borrow().loading
        };
        let (_, saw_loading) = tokio::join!(engine.fetch_results(), observe);

        assert!(saw_loading);
        assert!(!engine.state().loading);
    }

    #[tokio::test]
    async fn second_submit_while_in_flight_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/apps/campaign-api/vote"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true }))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_results(&server, json!([])).await;

        let config = EngineConfiguration {
            max_votes_per_user: VoteLimit::Unlimited,
            ..EngineConfiguration::default()
        };
        let engine = engine_for(&server, config, Arc::new(MemoryStore::new())).await;

        let late = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            engine.submit_vote("sku-b").await
        };
        let (first, second) = tokio::join!(engine.submit_vote("sku-a"), late);

        assert!(first);
        assert!(!second);
        let state = engine.state();
        assert_eq!(state.votes.len(), 1);
        assert!(engine.has_voted_for(&"sku-a".into()));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn stale_fetch_does_not_overwrite_newer_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps/campaign-api/results"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "success": true,
                        "results": [{ "productId": "old", "voteCount": 1 }]
                    }))
                    .set_delay(Duration::from_millis(300)),
            )
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        mount_results(&server, json!([{ "productId": "new", "voteCount": 9 }])).await;

        let engine = engine_for(&server, limited(1), Arc::new(MemoryStore::new())).await;

        let late = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            engine.fetch_results().await
        };
        tokio::join!(engine.fetch_results(), late);

        let state = engine.state();
        assert!(!state.loading);
        assert_eq!(
            state.results,
            vec![VoteResult {
                product_id: "new".into(),
                vote_count: 9
            }]
        );
    }

    #[tokio::test]
    async fn clear_votes_only_in_dev_mode() {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        Preferences::new(store.clone())
            .set(USER_VOTES_KEY, &vec![Vote::new("sku-1".into())])
            .await;

        let engine = engine_for(&server, limited(1), store.clone()).await;
        assert!(!engine.clear_votes().await);
        assert!(engine.has_voted());

        let dev = EngineConfiguration {
            dev_mode: true,
            ..limited(1)
        };
        let engine = engine_for(&server, dev, store.clone()).await;
        assert!(engine.clear_votes().await);
        assert!(!engine.has_voted());
        assert!(engine.can_vote());
        assert_eq!(store.get(USER_VOTES_KEY).await.unwrap(), None);
    }
}
