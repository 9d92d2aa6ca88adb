use forktrace_providers::stub::EchoProvider;
use forktrace_providers::{ProviderAdapter, ProviderRequest, ToolChoice};

#[tokio::test]
async fn echo_provider_echoes_last_user_message() {
    let provider = EchoProvider::default();
    let messages = vec![
        ProviderRequest {
            role: "system".to_string(),
            content: "be nice".to_string(),
        },
        ProviderRequest {
            role: "user".to_string(),
            content: "hello".to_string(),
        },
    ];
    let reply = provider
        .start_request(&messages, &[], &ToolChoice::Auto, "claude-sonnet-4-5", "none")
        .await
        .unwrap();
    assert_eq!(reply.assistant_text.as_deref(), Some("echo: hello"));
    assert!(reply.tool_calls.is_empty());
}
