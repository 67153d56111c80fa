use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::Config;
use crate::database::{
    Stores,
    models::{
        BalanceRecord, LeaveRequest, LeaveRequestInput, LeaveType, MAX_USER_ID_LEN, check_length,
    },
    repositories::LeaveRequestStore,
};
use crate::error::{LeaveError, LeaveResult};
use crate::services::{
    announcement::{Announcement, AnnouncementSelector},
    approval::{ApprovalStateMachine, Decision},
    ledger::BalanceLedger,
    notifier::{Message, NotificationGateway, deliver},
};

/// Entry point for every front-end operation. Owns no state of its own; all
/// reads and writes go straight to the stores.
#[derive(Clone)]
pub struct LeaveService {
    requests: Arc<dyn LeaveRequestStore>,
    approvals: ApprovalStateMachine,
    ledger: BalanceLedger,
    announcements: AnnouncementSelector,
    notifier: Arc<dyn NotificationGateway>,
    admin_user_id: String,
    announcement_channel: String,
}

impl LeaveService {
    pub fn new(
        stores: Stores,
        notifier: Arc<dyn NotificationGateway>,
        admin_user_id: impl Into<String>,
        announcement_channel: impl Into<String>,
    ) -> Self {
        Self {
            approvals: ApprovalStateMachine::new(stores.requests.clone()),
            announcements: AnnouncementSelector::new(stores.requests.clone()),
            ledger: BalanceLedger::new(stores.balances),
            requests: stores.requests,
            notifier,
            admin_user_id: admin_user_id.into(),
            announcement_channel: announcement_channel.into(),
        }
    }

    pub fn from_config(
        config: &Config,
        stores: Stores,
        notifier: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self::new(
            stores,
            notifier,
            config.admin_user_id.clone(),
            config.announcement_channel.clone(),
        )
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        user_id == self.admin_user_id
    }

    fn require_admin(&self, actor_id: &str, action: &str) -> LeaveResult<()> {
        if self.is_admin(actor_id) {
            return Ok(());
        }
        log::warn!("{} attempted admin-only action: {}", actor_id, action);
        Err(LeaveError::unauthorized(format!(
            "only the admin can {}",
            action
        )))
    }

    fn require_self_or_admin(&self, actor_id: &str, user_id: &str) -> LeaveResult<()> {
        if actor_id == user_id || self.is_admin(actor_id) {
            return Ok(());
        }
        Err(LeaveError::unauthorized(
            "cannot view another user's leave",
        ))
    }

    /// Validates and stores a new request, then prompts the admin and
    /// confirms to the requester.
    pub async fn submit_request(&self, input: LeaveRequestInput) -> LeaveResult<LeaveRequest> {
        let new_request = input.validate()?;

        if self.is_admin(&new_request.user_id) {
            return Err(LeaveError::unauthorized(
                "admins cannot request leave through the bot",
            ));
        }

        let request = self.requests.create(new_request).await?;
        log::info!(
            "Leave request {} submitted by {} ({} {} to {}, {} days)",
            request.id,
            request.user_id,
            request.leave_type,
            request.start_date,
            request.end_date,
            request.days()
        );

        deliver(
            self.notifier.as_ref(),
            &self.admin_user_id,
            &Message::approval_prompt(&request),
        )
        .await;
        deliver(
            self.notifier.as_ref(),
            &request.user_id,
            &Message::submission_confirmation(),
        )
        .await;

        Ok(request)
    }

    pub async fn get_request(&self, actor_id: &str, request_id: Uuid) -> LeaveResult<LeaveRequest> {
        let request = self
            .requests
            .get(request_id)
            .await?
            .ok_or_else(|| LeaveError::not_found(format!("leave request {}", request_id)))?;
        self.require_self_or_admin(actor_id, &request.user_id)?;
        Ok(request)
    }

    /// Records the admin's decision and tells the requester. Balances are
    /// left untouched.
    pub async fn decide(
        &self,
        request_id: Uuid,
        decision: Decision,
        actor_id: &str,
    ) -> LeaveResult<LeaveRequest> {
        self.require_admin(actor_id, "decide leave requests")?;
        check_length(actor_id, "approvedBy", MAX_USER_ID_LEN)?;

        let outcome = self.approvals.decide(request_id, decision, actor_id).await?;
        let notice = outcome.notification;
        deliver(
            self.notifier.as_ref(),
            &notice.recipient,
            &Message::decision_notice(&notice.request, notice.outcome),
        )
        .await;

        Ok(outcome.request)
    }

    pub async fn query_balance(&self, user_id: &str) -> LeaveResult<BalanceRecord> {
        self.ledger.get(user_id).await
    }

    pub async fn query_history(
        &self,
        actor_id: &str,
        user_id: &str,
    ) -> LeaveResult<Vec<LeaveRequest>> {
        self.require_self_or_admin(actor_id, user_id)?;
        self.requests.list_for_user(user_id).await
    }

    pub async fn admin_adjust_balance(
        &self,
        actor_id: &str,
        target_user_id: &str,
        leave_type: &str,
        delta_days: i32,
    ) -> LeaveResult<BalanceRecord> {
        self.require_admin(actor_id, "adjust leave balances")?;

        let target_user_id = target_user_id.trim();
        if target_user_id.is_empty() {
            return Err(LeaveError::invalid_argument("target user is required"));
        }
        check_length(target_user_id, "userId", MAX_USER_ID_LEN)?;
        let leave_type = leave_type
            .parse::<LeaveType>()
            .map_err(LeaveError::InvalidArgument)?;

        let balance = self
            .ledger
            .adjust(target_user_id, leave_type, delta_days)
            .await?;
        log::info!(
            "{} adjusted {} {} balance by {}",
            actor_id,
            target_user_id,
            leave_type,
            delta_days
        );
        Ok(balance)
    }

    pub async fn admin_list_balances(&self, actor_id: &str) -> LeaveResult<Vec<BalanceRecord>> {
        self.require_admin(actor_id, "list leave balances")?;
        self.ledger.list_all().await
    }

    pub async fn select_for_date(&self, date: NaiveDate) -> LeaveResult<Vec<Announcement>> {
        self.announcements.select_for_date(date).await
    }

    /// Posts one announcement per person whose leave starts on `date`.
    /// Returns how many were selected; delivery failures are only logged.
    pub async fn post_announcements(&self, date: NaiveDate) -> LeaveResult<usize> {
        let announcements = self.select_for_date(date).await?;

        for announcement in &announcements {
            deliver(
                self.notifier.as_ref(),
                &self.announcement_channel,
                &Message::announcement(&announcement.user_name, announcement.leave_date),
            )
            .await;
        }

        if !announcements.is_empty() {
            log::info!(
                "Posted {} leave announcements for {}",
                announcements.len(),
                date
            );
        }
        Ok(announcements.len())
    }

    pub async fn store_reachable(&self) -> LeaveResult<()> {
        self.requests.ping().await
    }
}
