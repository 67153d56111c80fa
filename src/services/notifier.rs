use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::database::models::{BalanceRecord, LeaveRequest, LeaveType};
use crate::services::approval::Decision;

pub const APPROVE_ACTION_ID: &str = "approve_leave";
pub const REJECT_ACTION_ID: &str = "reject_leave";

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("delivery to {recipient} failed: {reason}")]
    Delivery { recipient: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStyle {
    Primary,
    Danger,
}

/// Interactive button attached to a message. `value` carries the request id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAction {
    pub action_id: String,
    pub label: String,
    pub value: String,
    pub style: ActionStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageField {
    pub label: String,
    pub value: String,
}

/// Fully formed content for the gateway. The gateway decides how to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub header: Option<String>,
    pub text: String,
    pub fields: Vec<MessageField>,
    pub actions: Vec<MessageAction>,
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            header: None,
            text: text.into(),
            fields: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Prompt sent to the admin with approve/reject buttons.
    pub fn approval_prompt(request: &LeaveRequest) -> Self {
        let field = |label: &str, value: String| MessageField {
            label: label.to_string(),
            value,
        };
        let request_id = request.id.to_string();

        Self {
            header: Some("🚀 New Leave Request".to_string()),
            text: format!("New leave request from {}", request.user_name),
            fields: vec![
                field("User", request.user_name.clone()),
                field(
                    "Dates",
                    format!("{} to {}", request.start_date, request.end_date),
                ),
                field("Type", request.leave_type.to_string()),
                field("Reason", request.reason.clone().unwrap_or_default()),
            ],
            actions: vec![
                MessageAction {
                    action_id: APPROVE_ACTION_ID.to_string(),
                    label: "✅ Approve".to_string(),
                    value: request_id.clone(),
                    style: ActionStyle::Primary,
                },
                MessageAction {
                    action_id: REJECT_ACTION_ID.to_string(),
                    label: "❌ Reject".to_string(),
                    value: request_id,
                    style: ActionStyle::Danger,
                },
            ],
        }
    }

    pub fn submission_confirmation() -> Self {
        Self::text("✅ Your leave request has been submitted and is pending approval.")
    }

    pub fn decision_notice(request: &LeaveRequest, decision: Decision) -> Self {
        let emoji = match decision {
            Decision::Approve => "✅",
            Decision::Reject => "❌",
        };
        Self::text(format!(
            "{} Your leave request from {} to {} has been {}.",
            emoji,
            request.start_date,
            request.end_date,
            decision.target_status()
        ))
    }

    pub fn announcement(user_name: &str, leave_date: NaiveDate) -> Self {
        Self::text(format!("🏖️ {} is on leave today ({})", user_name, leave_date))
    }

    pub fn balance_summary(balance: &BalanceRecord) -> Self {
        let mut text = String::from("📊 Your Leave Balance:");
        for leave_type in LeaveType::ALL {
            text.push_str(&format!(
                "\n• {}: {} days",
                leave_type.label(),
                balance.days(*leave_type)
            ));
        }
        Self::text(text)
    }
}

/// Outbound delivery of messages to users, the admin, or a channel.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn notify(&self, recipient: &str, message: &Message) -> Result<(), NotifyError>;
}

/// Gateway that writes every message to the log. Used when no chat transport
/// is wired in.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl NotificationGateway for LogNotifier {
    async fn notify(&self, recipient: &str, message: &Message) -> Result<(), NotifyError> {
        log::info!(
            "notify {}: {}{}",
            recipient,
            message.text,
            if message.actions.is_empty() {
                String::new()
            } else {
                format!(" [{} actions]", message.actions.len())
            }
        );
        Ok(())
    }
}

/// Sends and logs a failure instead of returning it.
pub async fn deliver(gateway: &dyn NotificationGateway, recipient: &str, message: &Message) -> bool {
    match gateway.notify(recipient, message).await {
        Ok(()) => true,
        Err(err) => {
            log::error!("Error sending notification: {}", err);
            false
        }
    }
}
