use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::leave_request::LeaveType;

pub const DEFAULT_VACATION_DAYS: i32 = 20;
pub const DEFAULT_SICK_DAYS: i32 = 10;
pub const DEFAULT_PERSONAL_DAYS: i32 = 5;
pub const DEFAULT_OTHER_DAYS: i32 = 3;

/// Remaining leave days per category for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    pub user_id: String,
    pub vacation: i32,
    pub sick: i32,
    pub personal: i32,
    pub other: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BalanceRecord {
    /// Fresh record with the default entitlements. Not persisted.
    pub fn with_defaults(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            vacation: DEFAULT_VACATION_DAYS,
            sick: DEFAULT_SICK_DAYS,
            personal: DEFAULT_PERSONAL_DAYS,
            other: DEFAULT_OTHER_DAYS,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn days(&self, leave_type: LeaveType) -> i32 {
        match leave_type {
            LeaveType::Vacation => self.vacation,
            LeaveType::Sick => self.sick,
            LeaveType::Personal => self.personal,
            LeaveType::Other => self.other,
        }
    }

    fn days_mut(&mut self, leave_type: LeaveType) -> &mut i32 {
        match leave_type {
            LeaveType::Vacation => &mut self.vacation,
            LeaveType::Sick => &mut self.sick,
            LeaveType::Personal => &mut self.personal,
            LeaveType::Other => &mut self.other,
        }
    }

    /// Adds `delta_days` to one category, flooring the result at zero.
    pub fn apply(&mut self, leave_type: LeaveType, delta_days: i32, now: DateTime<Utc>) {
        let slot = self.days_mut(leave_type);
        *slot = clamp_days(*slot, delta_days);
        self.updated_at = now;
    }

    /// Record created by the first adjustment for a user. The adjusted
    /// category starts from zero, the others get their defaults.
    pub fn first_adjustment(
        user_id: &str,
        leave_type: LeaveType,
        delta_days: i32,
        now: DateTime<Utc>,
    ) -> Self {
        let mut record = Self::with_defaults(user_id, now);
        *record.days_mut(leave_type) = clamp_days(0, delta_days);
        record
    }
}

pub fn clamp_days(current: i32, delta_days: i32) -> i32 {
    current.saturating_add(delta_days).max(0)
}

/// Admin correction to a single category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAdjustmentInput {
    pub leave_type: String,
    pub delta_days: i32,
}
