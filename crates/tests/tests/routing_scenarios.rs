mod support;

use std::sync::Arc;

use support::{locations_path, ScriptedClient};
use wayfarer_agents::ConversationRouter;
use wayfarer_core::{classify_query_type, ChatRole, ConversationTurn, QueryType};
use wayfarer_observability::AppMetrics;
use wayfarer_storage::{LocationStore, MemoryStore};

fn router(client: Arc<ScriptedClient>) -> ConversationRouter<MemoryStore> {
    let store = MemoryStore::from_json_file(locations_path()).expect("sample locations load");
    ConversationRouter::new(Arc::new(store), client, AppMetrics::shared())
}

#[tokio::test]
async fn thanks_for_paris_never_reaches_the_model() {
    let client = Arc::new(ScriptedClient::replying("unused"));
    let router = router(client.clone());

    let reply = router.respond("thanks!", Some("Paris"), &[]).await.unwrap();

    assert_eq!(
        reply,
        "You're welcome! Feel free to ask me anything else about your Paris trip."
    );
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn tokyo_budget_itinerary_reaches_the_model_with_tokyo_data() {
    let client = Arc::new(ScriptedClient::replying("Day 1: Asakusa"));
    let router = router(client.clone());
    let message = "What's a 3-day budget itinerary for Tokyo?";

    assert_eq!(classify_query_type(message), QueryType::Itinerary);

    let history = vec![ConversationTurn::from("hi, I'm planning Japan")];
    let reply = router.respond(message, Some("Tokyo"), &history).await.unwrap();
    assert_eq!(reply, "Day 1: Asakusa");

    let requests = client.requests.lock();
    let request = &requests[0];
    assert_eq!(request.messages.len(), 3);
    assert_eq!(request.messages[0].role, ChatRole::System);
    assert_eq!(request.messages[1].content, "hi, I'm planning Japan");
    assert_eq!(request.messages[2].content, message);

    let prompt = &request.messages[0].content;
    let store = MemoryStore::from_json_file(locations_path()).unwrap();
    let tokyo = store.get("Tokyo").await.unwrap().unwrap();
    for attraction in &tokyo.attractions {
        assert!(prompt.contains(&attraction.name), "missing {}", attraction.name);
    }
    assert!(prompt.contains("- Budget Low: 70 USD/day"));
    assert!(prompt.contains("- Budget High: 300 USD/day"));
    assert!(!prompt.contains("Eiffel Tower"));
}

#[tokio::test]
async fn every_sample_location_prompt_lists_only_its_own_attractions() {
    let store = MemoryStore::from_json_file(locations_path()).unwrap();
    let names = store.list_names().await.unwrap();
    assert!(names.len() >= 2);

    let mut records = Vec::new();
    for name in &names {
        records.push(store.get(name).await.unwrap().unwrap());
    }

    for record in &records {
        let prompt = wayfarer_core::build_system_prompt(Some(record));
        for other in records.iter().filter(|other| other.name != record.name) {
            for attraction in &other.attractions {
                if record.attractions.iter().any(|own| own.name == attraction.name) {
                    continue;
                }
                assert!(
                    !prompt.contains(&format!("- {}:", attraction.name)),
                    "{} prompt leaked {}",
                    record.name,
                    attraction.name
                );
            }
        }
    }
}

#[tokio::test]
async fn completion_failure_is_returned_as_text() {
    let client = Arc::new(ScriptedClient::failing("connection reset"));
    let router = router(client.clone());

    let reply = router
        .respond("Which museum should I visit first?", Some("Paris"), &[])
        .await
        .unwrap();

    assert_eq!(reply, "Error: completion request failed: connection reset");
    assert_eq!(client.calls(), 1);
}
