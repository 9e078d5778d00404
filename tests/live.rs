use std::env;

use ai_connectors::http::reqwest::default_dyn_transport;
use ai_connectors::{
    ChatMessage, ChatRequest, Claude, Cohere, ConnectorConfig, ProviderKind,
    build_hub_from_configs,
};
use ai_connectors::connector::chatgpt::moderation::ModerationRequest;
use ai_connectors::connector::ChatGpt;
use dotenvy::dotenv;

fn load_env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn ping() -> ChatRequest {
    ChatRequest::new("", vec![ChatMessage::user("Reply with the single word: pong")])
        .with_max_tokens(16)
}

#[tokio::test]
#[ignore = "requires OPENAI_API_KEY"]
async fn chatgpt_live_chat_and_moderation() {
    let _ = dotenv();
    let Some(api_key) = load_env_var("OPENAI_API_KEY") else {
        eprintln!("skip live test: OPENAI_API_KEY missing");
        return;
    };
    let chatgpt = ChatGpt::new(default_dyn_transport().expect("transport"), api_key)
        .with_default_model(load_env_var("OPENAI_CHAT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()));

    let response = ai_connectors::Connector::chat(&chatgpt, ping())
        .await
        .expect("chat request should succeed");
    assert!(response.text.to_lowercase().contains("pong"), "unexpected reply: {}", response.text);

    let moderation = chatgpt
        .create_moderation(&ModerationRequest::new("I like turtles."))
        .await
        .expect("moderation should succeed");
    assert!(!moderation.results[0].flagged);
}

#[tokio::test]
#[ignore = "requires ANTHROPIC_API_KEY"]
async fn claude_live_models() {
    let _ = dotenv();
    let Some(api_key) = load_env_var("ANTHROPIC_API_KEY") else {
        eprintln!("skip live test: ANTHROPIC_API_KEY missing");
        return;
    };
    let claude = Claude::new(default_dyn_transport().expect("transport"), api_key);
    let page = claude.list_models(None, None, Some(5)).await.expect("models");
    assert!(!page.data.is_empty());
}

#[tokio::test]
#[ignore = "requires COHERE_API_KEY"]
async fn cohere_live_tokenize() {
    let _ = dotenv();
    let Some(api_key) = load_env_var("COHERE_API_KEY") else {
        eprintln!("skip live test: COHERE_API_KEY missing");
        return;
    };
    let cohere = Cohere::new(default_dyn_transport().expect("transport"), api_key);
    let tokens = cohere
        .tokenize("tokenize me!", "command-r")
        .await
        .expect("tokenize");
    let text = cohere
        .detokenize(&tokens.tokens, "command-r")
        .await
        .expect("detokenize");
    assert_eq!(text.text, "tokenize me!");
}

#[tokio::test]
#[ignore = "requires MISTRAL_API_KEY"]
async fn mistral_live_chat_through_hub() {
    let _ = dotenv();
    let config = match ConnectorConfig::from_env("mistral", ProviderKind::Mistral) {
        Ok(mut config) => {
            config.default_model = Some("mistral-small-latest".to_string());
            config
        }
        Err(err) => {
            eprintln!("skip live test: {err}");
            return;
        }
    };
    let hub = build_hub_from_configs(&[config], default_dyn_transport().expect("transport"))
        .expect("hub");
    let response = hub.chat("mistral", ping()).await.expect("chat");
    assert!(!response.text.is_empty());
}
