use crate::shared::models::{ChatbotResponse, TicketDraft};

use super::categories::{CATEGORY_RULES, GREETING};

/// Pure keyword triage. Total and deterministic: this is the last-resort
/// fallback when the completion service is unreachable, so it must never
/// fail. First matching rule wins; no match yields the generic greeting.
pub fn keyword_triage(message: &str) -> ChatbotResponse {
    let lower = message.to_lowercase();
    for rule in CATEGORY_RULES {
        if rule.keywords.iter().any(|kw| lower.contains(kw)) {
            let ticket_data = rule.subject.map(|subject| TicketDraft {
                subject: subject.to_string(),
                category: rule.name.to_string(),
                priority: rule.priority.unwrap_or("medium").to_string(),
                description: format!("User reported: \"{message}\""),
            });
            return ChatbotResponse {
                message: rule.reply.to_string(),
                create_ticket: ticket_data.is_some(),
                ticket_data,
            };
        }
    }
    ChatbotResponse::plain(GREETING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_issues_open_high_priority_auth_ticket() {
        for message in ["I forgot my password", "login is broken", "LOGIN please"] {
            let response = keyword_triage(message);
            assert!(response.create_ticket, "{message:?} should raise a ticket");
            let draft = response.ticket_data.expect("auth rule carries a draft");
            assert_eq!(draft.category, "authentication");
            assert_eq!(draft.priority, "high");
        }
    }

    #[test]
    fn cannot_log_in_scenario() {
        let message = "I can't log in to my account";
        let response = keyword_triage(message);
        assert!(response.create_ticket);
        assert_eq!(
            response.ticket_data,
            Some(TicketDraft {
                subject: "Login Access Issues".to_string(),
                category: "authentication".to_string(),
                priority: "high".to_string(),
                description: "User reported: \"I can't log in to my account\"".to_string(),
            })
        );
        assert!(response.message.contains("login issues"));
    }

    #[test]
    fn provider_lookup_is_informational() {
        let response = keyword_triage("How do I find a doctor near me?");
        assert!(!response.create_ticket);
        assert!(response.ticket_data.is_none());
        assert!(response.message.contains("provider directory"));
    }

    #[test]
    fn document_upload_is_informational() {
        let response = keyword_triage("where do I upload my paperwork");
        assert!(!response.create_ticket);
        assert!(response.message.contains("Upload New"));
    }

    #[test]
    fn claim_denial_opens_medium_priority_ticket() {
        let response = keyword_triage("my claim was denied last week");
        let draft = response.ticket_data.expect("claims rule carries a draft");
        assert_eq!(draft.category, "claims");
        assert_eq!(draft.priority, "medium");
        assert_eq!(draft.subject, "Claim Processing Issue");
    }

    #[test]
    fn authentication_outranks_technical() {
        // "password" and "error" both appear; the auth rule is checked first.
        let response = keyword_triage("password error on the portal");
        let draft = response.ticket_data.expect("draft expected");
        assert_eq!(draft.category, "authentication");
    }

    #[test]
    fn unmatched_messages_get_the_greeting() {
        for message in ["hello there", "", "¿qué tal?", "what are your opening hours"] {
            let response = keyword_triage(message);
            assert!(!response.create_ticket);
            assert!(response.ticket_data.is_none());
            assert!(response.message.contains("How can I assist you today?"));
        }
    }

    #[test]
    fn classification_is_deterministic() {
        let a = keyword_triage("claim denied");
        let b = keyword_triage("claim denied");
        assert_eq!(a.message, b.message);
        assert_eq!(a.ticket_data, b.ticket_data);
    }
}
