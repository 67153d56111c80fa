use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{
    models::{LeaveRequest, LeaveStatus},
    repositories::LeaveRequestStore,
};
use crate::error::{LeaveError, LeaveResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(self) -> LeaveStatus {
        match self {
            Decision::Approve => LeaveStatus::Approved,
            Decision::Reject => LeaveStatus::Rejected,
        }
    }
}

impl FromStr for Decision {
    type Err = LeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "approved" => Ok(Decision::Approve),
            "reject" | "rejected" => Ok(Decision::Reject),
            other => Err(LeaveError::invalid_argument(format!(
                "unknown decision '{}'",
                other
            ))),
        }
    }
}

/// What the caller must tell the requester once a decision is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationInstruction {
    pub recipient: String,
    pub outcome: Decision,
    pub request: LeaveRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    pub request: LeaveRequest,
    pub notification: NotificationInstruction,
}

/// Status after applying `decision` to a request currently in `current`.
/// Terminal states accept nothing.
pub fn transition(current: LeaveStatus, decision: Decision) -> LeaveResult<LeaveStatus> {
    if current.is_terminal() {
        return Err(LeaveError::invalid_state(format!(
            "request is already {}",
            current
        )));
    }
    Ok(decision.target_status())
}

/// pending -> approved | rejected, once. Approval does not touch the ledger.
#[derive(Clone)]
pub struct ApprovalStateMachine {
    store: Arc<dyn LeaveRequestStore>,
}

impl ApprovalStateMachine {
    pub fn new(store: Arc<dyn LeaveRequestStore>) -> Self {
        Self { store }
    }

    pub async fn decide(
        &self,
        request_id: Uuid,
        decision: Decision,
        actor_id: &str,
    ) -> LeaveResult<DecisionOutcome> {
        let current = self
            .store
            .get(request_id)
            .await?
            .ok_or_else(|| LeaveError::not_found(format!("leave request {}", request_id)))?;

        let target = transition(current.status, decision).map_err(|_| {
            LeaveError::invalid_state(format!(
                "leave request {} is already {}",
                request_id, current.status
            ))
        })?;

        // The store re-checks the pending guard atomically, so a racing
        // decision that slipped in after the read still loses here.
        let request = self.store.update_status(request_id, target, actor_id).await?;

        log::info!(
            "Leave request {} {} by {}",
            request.id,
            request.status,
            actor_id
        );

        Ok(DecisionOutcome {
            notification: NotificationInstruction {
                recipient: request.user_id.clone(),
                outcome: decision,
                request: request.clone(),
            },
            request,
        })
    }
}
