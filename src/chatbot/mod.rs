//! Chat triage pipeline: completion gateway with a two-credential fallback
//! chain, degrading to deterministic keyword matching when the completion
//! service is unreachable.

pub mod categories;
pub mod keywords;
pub mod openai;

use log::{debug, info, warn};

use crate::config::LlmConfig;
use crate::shared::models::ChatbotResponse;

use self::keywords::keyword_triage;
use self::openai::{CompletionClient, CompletionError};

pub const BACKUP_PREFIX: &str = "[Using backup API] ";

pub const QUOTA_BOTH_EXHAUSTED: &str = "Both the primary and backup API keys have exceeded \
their quotas, so I'm limited to basic keyword matching for now. Please update the API key \
quotas to restore full AI assistance.";

pub const CONNECTIVITY_TROUBLE: &str = "I'm having some trouble connecting to my knowledge \
base right now. Please try again in a moment.";

pub const PROCESSING_TROUBLE: &str = "I'm having some trouble processing your request right \
now. Please try again in a moment.";

pub struct Chatbot {
    gateway: CompletionClient,
    api_key: Option<String>,
    backup_api_key: Option<String>,
}

impl Chatbot {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            gateway: CompletionClient::new(config),
            api_key: config.api_key.clone(),
            backup_api_key: config.backup_api_key.clone(),
        }
    }

    /// Triage entry point. Total: every failure mode resolves to a
    /// well-formed response, so the chat surface never sees an error.
    pub async fn process_message(&self, message: &str, session_id: &str) -> ChatbotResponse {
        let Some(primary) = self.api_key.as_deref() else {
            debug!("no completion credential configured; keyword triage for session {session_id}");
            return keyword_triage(message);
        };
        match self.try_completion(message, primary).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "completion pipeline unavailable for session {session_id} ({err}); \
                     falling back to keyword triage"
                );
                keyword_triage(message)
            }
        }
    }

    /// The credential fallback sequence. API-level failures (the upstream
    /// answered with a status) terminate here in a canned notice; transport
    /// failures on the primary attempt propagate so the caller can degrade
    /// to keyword triage.
    async fn try_completion(
        &self,
        message: &str,
        primary: &str,
    ) -> Result<ChatbotResponse, CompletionError> {
        match self.gateway.complete(message, primary).await {
            Ok(response) => Ok(response),
            Err(err) if err.is_quota_exhausted() => {
                let Some(backup) = self.backup_api_key.as_deref() else {
                    warn!("primary credential quota exhausted and no backup key configured");
                    return Ok(ChatbotResponse::plain(PROCESSING_TROUBLE));
                };
                info!("primary credential quota exhausted; retrying with backup key");
                match self.gateway.complete(message, backup).await {
                    Ok(mut response) => {
                        response.message = format!("{BACKUP_PREFIX}{}", response.message);
                        Ok(response)
                    }
                    Err(err) if err.is_quota_exhausted() => {
                        warn!("backup credential quota exhausted as well");
                        Ok(ChatbotResponse::plain(QUOTA_BOTH_EXHAUSTED))
                    }
                    Err(err) => {
                        warn!("backup completion attempt failed: {err}");
                        Ok(ChatbotResponse::plain(CONNECTIVITY_TROUBLE))
                    }
                }
            }
            Err(err) if err.is_api() => {
                warn!("completion attempt failed: {err}");
                Ok(ChatbotResponse::plain(PROCESSING_TROUBLE))
            }
            Err(err) => Err(err),
        }
    }
}
