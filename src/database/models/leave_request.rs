use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use crate::error::{LeaveError, LeaveResult};

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "snake_case")]
    pub enum LeaveType {
        Vacation => "vacation",
        Sick => "sick",
        Personal => "personal",
        Other => "other",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum LeaveStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl LeaveType {
    /// Label shown to people, e.g. in the balance summary.
    pub fn label(&self) -> &'static str {
        match self {
            LeaveType::Vacation => "Vacation",
            LeaveType::Sick => "Sick Leave",
            LeaveType::Personal => "Personal",
            LeaveType::Other => "Other",
        }
    }
}

impl LeaveStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Raw submission as it arrives from the front-end. Nothing is trusted yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestInput {
    pub user_id: String,
    pub user_name: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
    pub leave_type: String,
}

/// A submission that passed validation and can be handed to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLeaveRequest {
    pub user_id: String,
    pub user_name: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// Column widths of `user_id` / `approved_by` and `user_name`.
pub const MAX_USER_ID_LEN: usize = 64;
pub const MAX_USER_NAME_LEN: usize = 255;

/// Rejects values longer than their column allows, counted in characters.
pub fn check_length(value: &str, field: &str, max: usize) -> LeaveResult<()> {
    let len = value.chars().count();
    if len > max {
        return Err(LeaveError::invalid_argument(format!(
            "{} is {} characters long, at most {} allowed",
            field, len, max
        )));
    }
    Ok(())
}

fn required(value: &str, field: &str) -> LeaveResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LeaveError::invalid_argument(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn parse_date(value: &str, field: &str) -> LeaveResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        LeaveError::invalid_argument(format!(
            "{} must be a YYYY-MM-DD date, got '{}'",
            field, value
        ))
    })
}

impl LeaveRequestInput {
    pub fn validate(self) -> LeaveResult<NewLeaveRequest> {
        let user_id = required(&self.user_id, "userId")?;
        let user_name = required(&self.user_name, "userName")?;
        check_length(&user_id, "userId", MAX_USER_ID_LEN)?;
        check_length(&user_name, "userName", MAX_USER_NAME_LEN)?;
        let leave_type = required(&self.leave_type, "leaveType")?
            .parse::<LeaveType>()
            .map_err(LeaveError::InvalidArgument)?;
        let start_date = parse_date(&self.start_date, "startDate")?;
        let end_date = parse_date(&self.end_date, "endDate")?;

        if start_date > end_date {
            return Err(LeaveError::invalid_argument(format!(
                "startDate {} is after endDate {}",
                start_date, end_date
            )));
        }

        let reason = self
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        Ok(NewLeaveRequest {
            user_id,
            user_name,
            leave_type,
            start_date,
            end_date,
            reason,
        })
    }
}
