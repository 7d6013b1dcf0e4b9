use crate::domain::ContactDraft;
use serde::{Deserialize, Serialize};

/// Publishable identifiers the relay needs to pick a mailbox and template.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RelayIdentity {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl RelayIdentity {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.service_id.trim().is_empty() {
            missing.push("service_id");
        }
        if self.template_id.trim().is_empty() {
            missing.push("template_id");
        }
        if self.public_key.trim().is_empty() {
            missing.push("public_key");
        }
        missing
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TemplateParams {
    pub from_name: String,
    pub reply_to: String,
    pub message: String,
    pub to_name: String,
}

/// JSON body of the relay's send endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub service_id: String,
    pub template_id: String,
    pub user_id: String,
    pub template_params: TemplateParams,
}

impl EmailRequest {
    pub fn from_draft(identity: &RelayIdentity, draft: &ContactDraft) -> Self {
        Self {
            service_id: identity.service_id.clone(),
            template_id: identity.template_id.clone(),
            user_id: identity.public_key.clone(),
            template_params: TemplateParams {
                from_name: draft.from_name.clone(),
                reply_to: draft.reply_to.clone(),
                message: draft.message.clone(),
                to_name: draft.to_name.clone(),
            },
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeliveryOutcome {
    Sent,
    /// The relay accepted the request but its mailbox integration is broken.
    MailboxUnavailable,
    Failed { reason: String },
}

const STATUS_OK: u16 = 200;
const STATUS_PRECONDITION_FAILED: u16 = 412;
const MAILBOX_ERROR_MARKER: &str = "Gmail_API";

pub fn classify_relay_response(status: u16, body: &str) -> DeliveryOutcome {
    if status == STATUS_OK {
        return DeliveryOutcome::Sent;
    }
    if status == STATUS_PRECONDITION_FAILED && body.contains(MAILBOX_ERROR_MARKER) {
        return DeliveryOutcome::MailboxUnavailable;
    }
    DeliveryOutcome::Failed {
        reason: format!("relay responded with status {status}: {}", body.trim()),
    }
}
