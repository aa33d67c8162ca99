use std::time::Duration;

use log::warn;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::config::LlmConfig;
use crate::shared::models::{ChatbotResponse, TicketDraft, VALID_PRIORITIES};

use super::categories::{CATEGORY_RULES, GREETING};

const SYSTEM_PROMPT: &str = "You are HealthBot, an intelligent healthcare support assistant for \
HealthDesk.
Your role is to help users with healthcare-related questions and support issues.

When responding, follow these guidelines:
1. Be polite, professional, and empathetic
2. For simple queries about documentation, providers, or general healthcare information, provide \
direct helpful answers
3. For technical issues, login problems, or claim disputes, suggest creating a support ticket
4. If you determine a ticket should be created, include appropriate ticket data in your response

Your goal is to resolve simple issues directly and escalate complex issues to human agents via \
the ticketing system.";

pub const TROUBLE_PROCESSING: &str =
    "I'm having trouble processing your request. Could you please try again?";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error code the completion service reports when a credential's usage
/// allowance is depleted. This is the one failure kind that triggers the
/// backup-credential path.
const INSUFFICIENT_QUOTA: &str = "insufficient_quota";

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion service error ({status}), code {code:?}")]
    Api {
        status: StatusCode,
        code: Option<String>,
    },
    #[error("completion transport error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CompletionError {
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(
            self,
            Self::Api { status, code }
                if *status == StatusCode::TOO_MANY_REQUESTS
                    && code.as_deref() == Some(INSUFFICIENT_QUOTA)
        )
    }

    /// True when the upstream answered at all (status-bearing failure).
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

/// Client for the external chat-completion service. Credentials are passed
/// per call so the orchestrator can retry the same request on the backup
/// key without rebuilding the client.
pub struct CompletionClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl CompletionClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    pub async fn complete(
        &self,
        message: &str,
        api_key: &str,
    ) -> Result<ChatbotResponse, CompletionError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!(
                        "User message: {message}\n\nAnalyze this message and respond \
                         appropriately. If a support ticket should be created, indicate that \
                         in your response."
                    ),
                },
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.7,
            "max_tokens": 500,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body: Value = response.json().await.unwrap_or(Value::Null);
            let code = error_body["error"]["code"].as_str().map(str::to_string);
            warn!("completion service error ({status}), code {code:?}");
            return Err(CompletionError::Api { status, code });
        }

        let result: Value = response.json().await?;
        let content = result["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("{}");

        let parsed: Value = match serde_json::from_str(content) {
            Ok(value) => value,
            Err(err) => {
                warn!("completion reply was not valid JSON: {err}");
                return Ok(ChatbotResponse::plain(TROUBLE_PROCESSING));
            }
        };

        Ok(reconcile(&parsed, message))
    }
}

fn clamp_priority(priority: &str) -> String {
    if VALID_PRIORITIES.contains(&priority) {
        priority.to_string()
    } else {
        "medium".to_string()
    }
}

fn quoted_description(message: &str) -> String {
    format!("User reported: \"{message}\"")
}

/// Reconciles the model's loosely-structured reply with the deterministic
/// category table. Field-by-field with explicit defaults: the reply is
/// never trusted to match a fixed schema.
pub(crate) fn reconcile(parsed: &Value, message: &str) -> ChatbotResponse {
    let decision_present = parsed.get("create_ticket").is_some();
    let mut create_ticket = parsed["create_ticket"].as_bool().unwrap_or(false);
    let mut ticket_data = None;

    if !create_ticket && !decision_present {
        // The model stayed silent on the ticket decision: defer to the
        // keyword table. Informational categories never raise a ticket.
        let lower = message.to_lowercase();
        for rule in CATEGORY_RULES {
            let Some(subject) = rule.subject else { continue };
            if rule.keywords.iter().any(|kw| lower.contains(kw)) {
                create_ticket = true;
                ticket_data = Some(TicketDraft {
                    subject: subject.to_string(),
                    category: rule.name.to_string(),
                    priority: clamp_priority(rule.priority.unwrap_or("medium")),
                    description: quoted_description(message),
                });
                break;
            }
        }
    } else if create_ticket {
        ticket_data = Some(match parsed.get("ticket_data").filter(|d| d.is_object()) {
            Some(data) => TicketDraft {
                subject: data["subject"]
                    .as_str()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("Support Request")
                    .to_string(),
                category: data["category"]
                    .as_str()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("general")
                    .to_string(),
                priority: clamp_priority(data["priority"].as_str().unwrap_or("medium")),
                description: data["description"]
                    .as_str()
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| quoted_description(message)),
            },
            // Ticket requested but no payload supplied: synthesize one.
            None => TicketDraft {
                subject: "Support Request".to_string(),
                category: "general".to_string(),
                priority: "medium".to_string(),
                description: quoted_description(message),
            },
        });
    }

    ChatbotResponse {
        message: parsed["message"]
            .as_str()
            .filter(|s| !s.is_empty())
            .unwrap_or(GREETING)
            .to_string(),
        create_ticket,
        ticket_data,
    }
}
