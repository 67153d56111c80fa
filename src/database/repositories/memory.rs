//! Process-local stores used when no database URL is configured, and by tests.
//!
//! Every operation holds the store lock for its whole read-modify-write, which
//! gives the same per-key atomicity the Postgres statements provide.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{BalanceStore, LeaveRequestStore};
use crate::database::models::{
    BalanceRecord, LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest,
};
use crate::error::{LeaveError, LeaveResult};

#[derive(Default)]
pub struct InMemoryLeaveRequestStore {
    // Insertion order doubles as a tie-breaker for equal timestamps.
    requests: RwLock<Vec<LeaveRequest>>,
}

impl InMemoryLeaveRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaveRequestStore for InMemoryLeaveRequestStore {
    async fn create(&self, input: NewLeaveRequest) -> LeaveResult<LeaveRequest> {
        let now = Utc::now();
        let request = LeaveRequest {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            user_name: input.user_name,
            leave_type: input.leave_type,
            start_date: input.start_date,
            end_date: input.end_date,
            reason: input.reason,
            status: LeaveStatus::Pending,
            approved_by: None,
            created_at: now,
            updated_at: now,
        };

        self.requests.write().await.push(request.clone());
        Ok(request)
    }

    async fn get(&self, id: Uuid) -> LeaveResult<Option<LeaveRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.iter().find(|r| r.id == id).cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: LeaveStatus,
        decided_by: &str,
    ) -> LeaveResult<LeaveRequest> {
        if status == LeaveStatus::Pending {
            return Err(LeaveError::invalid_argument(
                "a request can only be moved to approved or rejected",
            ));
        }

        let mut requests = self.requests.write().await;
        let request = requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| LeaveError::not_found(format!("leave request {}", id)))?;

        if !request.is_pending() {
            return Err(LeaveError::invalid_state(format!(
                "leave request {} is already {}",
                id, request.status
            )));
        }

        request.status = status;
        request.approved_by = Some(decided_by.to_string());
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    async fn list_for_user(&self, user_id: &str) -> LeaveResult<Vec<LeaveRequest>> {
        let requests = self.requests.read().await;
        let mut matching: Vec<LeaveRequest> = requests
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn list_approved_starting_on(&self, date: NaiveDate) -> LeaveResult<Vec<LeaveRequest>> {
        let requests = self.requests.read().await;
        let mut matching: Vec<LeaveRequest> = requests
            .iter()
            .filter(|r| r.status == LeaveStatus::Approved && r.start_date == date)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.user_name.cmp(&b.user_name));
        Ok(matching)
    }

    async fn ping(&self) -> LeaveResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryBalanceStore {
    balances: Mutex<HashMap<String, BalanceRecord>>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn get(&self, user_id: &str) -> LeaveResult<Option<BalanceRecord>> {
        Ok(self.balances.lock().await.get(user_id).cloned())
    }

    async fn adjust(
        &self,
        user_id: &str,
        leave_type: LeaveType,
        delta_days: i32,
    ) -> LeaveResult<BalanceRecord> {
        let now = Utc::now();
        let mut balances = self.balances.lock().await;

        let record = match balances.get_mut(user_id) {
            Some(existing) => {
                existing.apply(leave_type, delta_days, now);
                existing.clone()
            }
            None => {
                let created = BalanceRecord::first_adjustment(user_id, leave_type, delta_days, now);
                balances.insert(user_id.to_string(), created.clone());
                created
            }
        };

        log::info!(
            "Adjusted {} balance for {} by {} (now {})",
            leave_type,
            user_id,
            delta_days,
            record.days(leave_type)
        );

        Ok(record)
    }

    async fn list_all(&self) -> LeaveResult<Vec<BalanceRecord>> {
        let balances = self.balances.lock().await;
        let mut all: Vec<BalanceRecord> = balances.values().cloned().collect();
        all.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(all)
    }
}
