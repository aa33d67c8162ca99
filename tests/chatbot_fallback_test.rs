#[cfg(test)]
mod chatbot_fallback_tests {
    use healthdesk::chatbot::{
        Chatbot, BACKUP_PREFIX, CONNECTIVITY_TROUBLE, PROCESSING_TROUBLE, QUOTA_BOTH_EXHAUSTED,
    };
    use healthdesk::chatbot::openai::TROUBLE_PROCESSING;
    use healthdesk::config::LlmConfig;

    fn config(base_url: &str, backup: bool) -> LlmConfig {
        LlmConfig {
            base_url: base_url.to_string(),
            model: "gpt-4o".to_string(),
            api_key: Some("primary-key".to_string()),
            backup_api_key: backup.then(|| "backup-key".to_string()),
        }
    }

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "choices": [ { "message": { "content": content } } ]
        })
        .to_string()
    }

    const QUOTA_BODY: &str =
        r#"{"error":{"code":"insufficient_quota","message":"You exceeded your current quota"}}"#;

    /// A port nothing listens on, to simulate a network outage.
    fn dead_endpoint() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind scratch port");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn primary_success_is_returned_as_is() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer primary-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(
                r#"{"message": "Happy to help!", "create_ticket": false}"#,
            ))
            .create_async()
            .await;

        let chatbot = Chatbot::new(&config(&server.url(), true));
        let response = chatbot.process_message("hello", "s1").await;
        mock.assert_async().await;
        assert_eq!(response.message, "Happy to help!");
        assert!(!response.create_ticket);
    }

    #[tokio::test]
    async fn quota_exhaustion_switches_to_backup_key_with_marker() {
        let mut server = mockito::Server::new_async().await;
        let primary = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer primary-key")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(QUOTA_BODY)
            .create_async()
            .await;
        let backup = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer backup-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(
                r#"{"message": "Back again.", "create_ticket": false}"#,
            ))
            .create_async()
            .await;

        let chatbot = Chatbot::new(&config(&server.url(), true));
        let response = chatbot.process_message("hello", "s1").await;
        primary.assert_async().await;
        backup.assert_async().await;
        assert_eq!(response.message, format!("{BACKUP_PREFIX}Back again."));
    }

    #[tokio::test]
    async fn both_keys_exhausted_names_both_keys() {
        let mut server = mockito::Server::new_async().await;
        let _both = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(QUOTA_BODY)
            .expect(2)
            .create_async()
            .await;

        let chatbot = Chatbot::new(&config(&server.url(), true));
        let response = chatbot.process_message("hello", "s1").await;
        assert_eq!(response.message, QUOTA_BOTH_EXHAUSTED);
        assert!(!response.create_ticket);
        assert!(response.ticket_data.is_none());
    }

    #[tokio::test]
    async fn backup_failure_yields_connectivity_notice() {
        let mut server = mockito::Server::new_async().await;
        let _primary = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer primary-key")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(QUOTA_BODY)
            .create_async()
            .await;
        let _backup = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer backup-key")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"code":"server_error","message":"boom"}}"#)
            .create_async()
            .await;

        let chatbot = Chatbot::new(&config(&server.url(), true));
        let response = chatbot.process_message("hello", "s1").await;
        assert_eq!(response.message, CONNECTIVITY_TROUBLE);
        assert!(!response.create_ticket);
    }

    #[tokio::test]
    async fn non_quota_primary_failure_yields_processing_notice() {
        let mut server = mockito::Server::new_async().await;
        let _primary = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"code":"server_error","message":"boom"}}"#)
            .create_async()
            .await;

        let chatbot = Chatbot::new(&config(&server.url(), true));
        let response = chatbot.process_message("hello", "s1").await;
        assert_eq!(response.message, PROCESSING_TROUBLE);
        assert!(!response.create_ticket);
    }

    #[tokio::test]
    async fn quota_exhaustion_without_backup_key_yields_processing_notice() {
        let mut server = mockito::Server::new_async().await;
        let _primary = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(QUOTA_BODY)
            .create_async()
            .await;

        let chatbot = Chatbot::new(&config(&server.url(), false));
        let response = chatbot.process_message("hello", "s1").await;
        assert_eq!(response.message, PROCESSING_TROUBLE);
    }

    #[tokio::test]
    async fn plain_rate_limit_does_not_trigger_backup_key() {
        let mut server = mockito::Server::new_async().await;
        // 429 without the insufficient_quota code is a generic failure.
        let primary = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer primary-key")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"code":"rate_limit_exceeded","message":"slow down"}}"#)
            .expect(1)
            .create_async()
            .await;

        let chatbot = Chatbot::new(&config(&server.url(), true));
        let response = chatbot.process_message("hello", "s1").await;
        primary.assert_async().await;
        assert_eq!(response.message, PROCESSING_TROUBLE);
    }

    #[tokio::test]
    async fn network_outage_falls_back_to_keyword_triage() {
        let chatbot = Chatbot::new(&config(&dead_endpoint(), true));
        let response = chatbot
            .process_message("I can't log in to my account", "s1")
            .await;
        assert!(response.create_ticket);
        let draft = response.ticket_data.expect("keyword draft expected");
        assert_eq!(draft.category, "authentication");
        assert_eq!(draft.priority, "high");
    }

    #[tokio::test]
    async fn network_outage_with_no_keywords_still_answers() {
        let chatbot = Chatbot::new(&config(&dead_endpoint(), true));
        let response = chatbot.process_message("good morning", "s1").await;
        assert!(!response.create_ticket);
        assert!(response.message.contains("How can I assist you today?"));
    }

    #[tokio::test]
    async fn malformed_model_reply_recovers_locally() {
        let mut server = mockito::Server::new_async().await;
        let _primary = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("this is not json at all"))
            .create_async()
            .await;

        let chatbot = Chatbot::new(&config(&server.url(), true));
        let response = chatbot.process_message("hello", "s1").await;
        assert_eq!(response.message, TROUBLE_PROCESSING);
        assert!(!response.create_ticket);
    }

    #[tokio::test]
    async fn no_credentials_means_keyword_only_mode() {
        let chatbot = Chatbot::new(&LlmConfig {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            backup_api_key: None,
        });
        let response = chatbot.process_message("my claim was denied", "s1").await;
        assert!(response.create_ticket);
        assert_eq!(
            response.ticket_data.expect("claims draft").category,
            "claims"
        );
    }
}
