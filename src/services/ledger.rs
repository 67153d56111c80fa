use std::sync::Arc;

use chrono::Utc;

use crate::database::{
    models::{BalanceRecord, LeaveType},
    repositories::BalanceStore,
};
use crate::error::LeaveResult;

/// Per-user leave balances. Reads never create records; the first adjustment
/// does.
#[derive(Clone)]
pub struct BalanceLedger {
    store: Arc<dyn BalanceStore>,
}

impl BalanceLedger {
    pub fn new(store: Arc<dyn BalanceStore>) -> Self {
        Self { store }
    }

    /// Stored balance, or the default entitlements when none exists yet.
    pub async fn get(&self, user_id: &str) -> LeaveResult<BalanceRecord> {
        let stored = self.store.get(user_id).await?;
        Ok(stored.unwrap_or_else(|| BalanceRecord::with_defaults(user_id, Utc::now())))
    }

    pub async fn adjust(
        &self,
        user_id: &str,
        leave_type: LeaveType,
        delta_days: i32,
    ) -> LeaveResult<BalanceRecord> {
        self.store.adjust(user_id, leave_type, delta_days).await
    }

    pub async fn list_all(&self) -> LeaveResult<Vec<BalanceRecord>> {
        self.store.list_all().await
    }
}
