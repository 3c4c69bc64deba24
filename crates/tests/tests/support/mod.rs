use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use wayfarer_llm::{CompletionClient, CompletionError, CompletionRequest};

pub fn locations_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/locations.json")
}

/// Completion double that records every request and answers with a fixed text.
pub struct ScriptedClient {
    reply: Result<String, String>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().push(request);
        self.reply
            .clone()
            .map_err(CompletionError::Transport)
    }
}
