//! Static triage category table shared by the keyword classifier and the
//! completion gateway's keyword fallback. Order is precedence: first rule
//! whose keyword list matches wins.

pub struct CategoryRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    /// Absent subject means informational only, no ticket.
    pub subject: Option<&'static str>,
    pub priority: Option<&'static str>,
    pub reply: &'static str,
}

pub const GREETING: &str =
    "I'm here to help with your healthcare questions. How can I assist you today?";

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        name: "authentication",
        keywords: &[
            "login",
            "password",
            "account access",
            "sign in",
            "can't log in",
            "cannot sign in",
            "reset password",
        ],
        subject: Some("Login Access Issues"),
        priority: Some("high"),
        reply: "I understand you're having login issues. I can help create a ticket for our \
                technical team to assist you. Could you please provide your email address so we \
                can follow up?",
    },
    CategoryRule {
        name: "claims",
        keywords: &[
            "claim",
            "denied",
            "rejected",
            "not covered",
            "bill",
            "reimbursement",
        ],
        subject: Some("Claim Processing Issue"),
        priority: Some("medium"),
        reply: "I'm sorry to hear about your claim issue. Let me create a ticket for our claims \
                department to look into this. Could you please provide your name and email \
                address so we can follow up with you?",
    },
    CategoryRule {
        name: "documentation",
        keywords: &[
            "upload",
            "document",
            "file",
            "attachment",
            "form",
            "paperwork",
        ],
        subject: None,
        priority: None,
        reply: "To upload documents, go to 'My Account' > 'Documents' > 'Upload New'. You can \
                upload files up to 10MB in PDF, JPG, or PNG format. Would you like me to create \
                a ticket for additional assistance with document uploads?",
    },
    CategoryRule {
        name: "providers",
        keywords: &[
            "doctor",
            "provider",
            "specialist",
            "hospital",
            "clinic",
            "in-network",
        ],
        subject: None,
        priority: None,
        reply: "To find in-network providers, you can use our provider directory by clicking on \
                'Find a Provider' in the main menu. Would you like me to create a ticket if you \
                need more specific help with finding providers?",
    },
    CategoryRule {
        name: "technical",
        keywords: &["error", "problem", "not working", "issue", "bug", "glitch"],
        subject: Some("Technical Issue Report"),
        priority: Some("medium"),
        reply: "I'm sorry you're experiencing technical difficulties. I'll create a support \
                ticket for our technical team to investigate this issue. Could you please \
                provide your email address for follow-up?",
    },
];
