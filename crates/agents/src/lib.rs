use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{info, instrument, warn};
use wayfarer_core::{
    analyze_message, build_system_prompt, redirect_message, validate_message, ChatMessage,
    ConversationTurn, CoreError, LocationRecord,
};
use wayfarer_llm::{CompletionClient, CompletionRequest, DEFAULT_MAX_TOKENS};
use wayfarer_observability::AppMetrics;
use wayfarer_storage::LocationStore;

/// Sampling temperature for every completion call.
pub const COMPLETION_TEMPERATURE: f32 = 0.3;

/// Gate, then either a canned redirect or one completion call.
#[derive(Clone)]
pub struct ConversationRouter<S>
where
    S: LocationStore,
{
    store: Arc<S>,
    client: Arc<dyn CompletionClient>,
    metrics: Arc<AppMetrics>,
    max_tokens: u32,
}

impl<S> ConversationRouter<S>
where
    S: LocationStore,
{
    pub fn new(store: Arc<S>, client: Arc<dyn CompletionClient>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            store,
            client,
            metrics,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Resolves `location` through the store (a miss means no location) and answers.
    ///
    /// A blank message fails with [`CoreError::EmptyMessage`]; store failures
    /// propagate. Completion failures never do.
    #[instrument(skip(self, message, history), fields(turns = history.len()))]
    pub async fn respond(
        &self,
        message: &str,
        location: Option<&str>,
        history: &[ConversationTurn],
    ) -> Result<String> {
        validate_message(message)?;

        let record = match location.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => self.store.get(name).await?,
            None => None,
        };

        Ok(self
            .respond_with_record(message, record.as_ref(), history)
            .await?)
    }

    pub async fn respond_with_record(
        &self,
        message: &str,
        location: Option<&LocationRecord>,
        history: &[ConversationTurn],
    ) -> Result<String, CoreError> {
        validate_message(message)?;
        let started = Instant::now();
        self.metrics.inc_request();

        let analysis = analyze_message(message);
        let reply = if analysis.travel_related {
            let request = self.build_request(message, location, history);
            match self.client.complete(request).await {
                Ok(text) => {
                    self.metrics.inc_completion();
                    text
                }
                Err(err) => {
                    self.metrics.inc_completion_failure();
                    warn!(error = %err, model = %self.client.model_name(), "completion failed");
                    format!("Error: {err}")
                }
            }
        } else {
            self.metrics.inc_redirect();
            redirect_message(location.map(|record| record.name.as_str()), message)
        };

        let elapsed = started.elapsed();
        self.metrics.observe_latency(elapsed);
        info!(
            location = location.map(|record| record.name.as_str()).unwrap_or("none"),
            query_type = analysis.query_type.as_str(),
            duration_days = ?analysis.duration_days,
            travel_related = analysis.travel_related,
            latency_ms = elapsed.as_millis() as u64,
            "message routed"
        );

        Ok(reply)
    }

    /// System prompt first, then history verbatim, then the new message, all history as user turns.
    pub fn build_request(
        &self,
        message: &str,
        location: Option<&LocationRecord>,
        history: &[ConversationTurn],
    ) -> CompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(build_system_prompt(location)));
        messages.extend(history.iter().map(|turn| ChatMessage::user(turn.text())));
        messages.push(ChatMessage::user(message));

        CompletionRequest {
            messages,
            max_tokens: self.max_tokens,
            temperature: COMPLETION_TEMPERATURE,
        }
    }

    pub async fn list_locations(&self) -> Result<Vec<String>> {
        self.store.list_names().await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use wayfarer_core::{Attraction, Budget, ChatRole};
    use wayfarer_llm::CompletionError;
    use wayfarer_storage::MemoryStore;

    use super::*;

    #[derive(Default)]
    struct RecordingClient {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        fn model_name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
            self.requests.lock().push(request);
            Ok("Day 1: Asakusa\n- Morning (8:00 AM): Senso-ji Temple".to_string())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl CompletionClient for FailingClient {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            Err(CompletionError::Status {
                status: 429,
                body: "rate limit reached".to_string(),
            })
        }
    }

    fn tokyo() -> LocationRecord {
        LocationRecord {
            attractions: vec![
                Attraction {
                    name: "Senso-ji Temple".to_string(),
                    description: "Ancient Buddhist temple".to_string(),
                    rating: Some(4.7),
                },
                Attraction {
                    name: "Meiji Shrine".to_string(),
                    description: "Shinto shrine".to_string(),
                    rating: Some(4.6),
                },
            ],
            budget: Some(Budget {
                daily_low: Some(70.0),
                daily_mid: Some(140.0),
                daily_high: Some(300.0),
                currency: Some("USD".to_string()),
                notes: None,
            }),
            ..LocationRecord::new("Tokyo")
        }
    }

    fn router_with(client: Arc<dyn CompletionClient>) -> ConversationRouter<MemoryStore> {
        let store = MemoryStore::from_records([tokyo(), LocationRecord::new("Paris")]);
        ConversationRouter::new(Arc::new(store), client, AppMetrics::shared())
    }

    #[tokio::test]
    async fn thanks_is_acknowledged_without_model_call() {
        let client = Arc::new(RecordingClient::default());
        let router = router_with(client.clone());

        let reply = router.respond("thanks!", Some("Paris"), &[]).await.unwrap();

        assert!(reply.contains("Paris"));
        assert!(reply.starts_with("You're welcome!"));
        assert!(client.requests.lock().is_empty());
        assert_eq!(router.metrics().snapshot().redirects_total, 1);
    }

    #[tokio::test]
    async fn travel_question_dispatches_prompt_history_and_message() {
        let client = Arc::new(RecordingClient::default());
        let router = router_with(client.clone());
        let history = vec![
            ConversationTurn::from("I'm going to Japan"),
            ConversationTurn::from("  with my partner  "),
        ];

        let reply = router
            .respond("What's a 3-day budget itinerary for Tokyo?", Some("tokyo"), &history)
            .await
            .unwrap();
        assert_eq!(reply, "Day 1: Asakusa\n- Morning (8:00 AM): Senso-ji Temple");

        let requests = client.requests.lock();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.temperature, COMPLETION_TEMPERATURE);
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(request.messages.len(), 4);

        let system = &request.messages[0];
        assert_eq!(system.role, ChatRole::System);
        assert!(system.content.contains("Senso-ji Temple"));
        assert!(system.content.contains("Meiji Shrine"));
        assert!(system.content.contains("BUDGET REFERENCE FOR TOKYO:"));
        assert!(!system.content.contains("I'm going to Japan"));

        let rest = &request.messages[1..];
        assert!(rest.iter().all(|message| message.role == ChatRole::User));
        assert_eq!(rest[0].content, "I'm going to Japan");
        assert_eq!(rest[1].content, "  with my partner  ");
        assert_eq!(rest[2].content, "What's a 3-day budget itinerary for Tokyo?");
    }

    #[tokio::test]
    async fn unknown_location_uses_generic_prompt() {
        let client = Arc::new(RecordingClient::default());
        let router = router_with(client.clone());

        router
            .respond("Where should I travel in spring?", Some("Atlantis"), &[])
            .await
            .unwrap();

        let requests = client.requests.lock();
        assert!(requests[0].messages[0].content.contains("No destination has been selected"));
    }

    #[tokio::test]
    async fn blank_message_is_rejected_before_anything_else() {
        let client = Arc::new(RecordingClient::default());
        let router = router_with(client.clone());

        let err = router.respond("   ", Some("Tokyo"), &[]).await.unwrap_err();
        assert_eq!(err.downcast_ref::<CoreError>(), Some(&CoreError::EmptyMessage));
        assert!(client.requests.lock().is_empty());
        assert_eq!(router.metrics().snapshot().requests_total, 0);
    }

    #[tokio::test]
    async fn completion_failure_degrades_to_inline_error() {
        let router = router_with(Arc::new(FailingClient));

        let reply = router
            .respond("Plan a 2 day trip", Some("Tokyo"), &[])
            .await
            .unwrap();

        assert!(reply.starts_with("Error: "));
        assert!(reply.contains("rate limit reached"));
        assert_eq!(router.metrics().snapshot().completion_failures_total, 1);
    }

    #[tokio::test]
    async fn casual_message_without_location_gets_generic_redirect() {
        let client = Arc::new(RecordingClient::default());
        let router = router_with(client.clone());

        let reply = router
            .respond_with_record("hello there", None, &[])
            .await
            .unwrap();

        assert!(reply.contains("Please select a destination first"));
        assert!(client.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn max_tokens_override_is_sent() {
        let client = Arc::new(RecordingClient::default());
        let router = router_with(client.clone()).with_max_tokens(256);

        router.respond("Best time to visit?", None, &[]).await.unwrap();
        assert_eq!(client.requests.lock()[0].max_tokens, 256);
    }

    #[tokio::test]
    async fn lists_store_locations() {
        let router = router_with(Arc::new(RecordingClient::default()));
        assert_eq!(router.list_locations().await.unwrap(), vec!["Paris", "Tokyo"]);
    }
}
