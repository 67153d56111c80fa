use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::models::{
    BalanceRecord, LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest,
};
use crate::error::LeaveResult;

pub mod balance;
pub mod leave_request;
pub mod memory;

pub use balance::BalanceRepository;
pub use leave_request::LeaveRequestRepository;
pub use memory::{InMemoryBalanceStore, InMemoryLeaveRequestStore};

/// Persistence operations the request lifecycle needs.
#[async_trait]
pub trait LeaveRequestStore: Send + Sync {
    async fn create(&self, input: NewLeaveRequest) -> LeaveResult<LeaveRequest>;

    async fn get(&self, id: Uuid) -> LeaveResult<Option<LeaveRequest>>;

    /// Moves a pending request to `status`. Fails with `NotFound` for an
    /// unknown id and `InvalidState` when the request was already decided.
    async fn update_status(
        &self,
        id: Uuid,
        status: LeaveStatus,
        decided_by: &str,
    ) -> LeaveResult<LeaveRequest>;

    /// Newest first.
    async fn list_for_user(&self, user_id: &str) -> LeaveResult<Vec<LeaveRequest>>;

    async fn list_approved_starting_on(&self, date: NaiveDate) -> LeaveResult<Vec<LeaveRequest>>;

    /// Cheap reachability probe for health reporting.
    async fn ping(&self) -> LeaveResult<()>;
}

/// Persistence operations the balance ledger needs.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    async fn get(&self, user_id: &str) -> LeaveResult<Option<BalanceRecord>>;

    /// Atomically adds `delta_days` to one category, creating the record on
    /// first use. The stored value never drops below zero.
    async fn adjust(
        &self,
        user_id: &str,
        leave_type: LeaveType,
        delta_days: i32,
    ) -> LeaveResult<BalanceRecord>;

    async fn list_all(&self) -> LeaveResult<Vec<BalanceRecord>>;
}
