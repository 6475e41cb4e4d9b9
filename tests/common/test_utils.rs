use super::mocks::{FlakyStore, MockCompletionClient};
use relay_chat::{
    config::{CompletionConfig, Config, LogsConfig, ServerConfig},
    history::MessageStore,
    llm::CompletionClient,
    relay::Relay,
};
use std::sync::Arc;

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: ":memory:".to_string(),
            logs: LogsConfig {
                level: "debug".to_string(),
            },
        },
        completion: CompletionConfig {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: "test-api-key".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout_secs: 30,
            retries: 0,
        },
    }
}

/// Wires a relay around a fresh flaky store and the given completion mock
pub async fn create_relay(
    completion: MockCompletionClient,
) -> (Relay, Arc<FlakyStore>, Arc<MockCompletionClient>) {
    let store = Arc::new(FlakyStore::new().await);
    let completion = Arc::new(completion);
    let relay = Relay::new(
        Arc::clone(&store) as Arc<dyn MessageStore>,
        Arc::clone(&completion) as Arc<dyn CompletionClient>,
    );
    (relay, store, completion)
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 9090
  database_path: "/tmp/messages.db"
  logs:
    level: "debug"

completion:
  base_url: "https://api.groq.com/openai/v1"
  api_key: "test-api-key"
  model: "llama-3.1-8b-instant"
  temperature: 0.2
  max_tokens: 256
  timeout_secs: 10
  retries: 1
"#;

/// Only the required parts; everything else falls back to defaults
pub const MINIMAL_CONFIG_YAML: &str = r#"
completion:
  api_key: "test-api-key"
"#;

/// Builds a chat completion body the way OpenAI-compatible providers return it
pub fn completion_body(content: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "llama-3.1-8b-instant",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 5,
            "completion_tokens": 3,
            "total_tokens": 8
        }
    })
}
