use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::LeaveRequestStore;
use crate::database::{
    models::{LeaveRequest, LeaveStatus, NewLeaveRequest},
    retry::{RetryPolicy, retry_with_backoff},
    utils::sql,
};
use crate::error::{LeaveError, LeaveResult};

const COLUMNS: &str = r#"
    id,
    user_id,
    user_name,
    leave_type,
    start_date,
    end_date,
    reason,
    status,
    approved_by,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct LeaveRequestRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl LeaveRequestRepository {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    /// Inserts with a caller-chosen id so a retried insert that already
    /// landed is detected instead of duplicated.
    async fn insert(
        &self,
        id: Uuid,
        input: &NewLeaveRequest,
        now: DateTime<Utc>,
    ) -> LeaveResult<LeaveRequest> {
        let inserted = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            INSERT INTO
                leave_requests (
                    id,
                    user_id,
                    user_name,
                    leave_type,
                    start_date,
                    end_date,
                    reason,
                    status,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO NOTHING
            RETURNING
                {}
            "#,
            COLUMNS
        )))
        .bind(id)
        .bind(&input.user_id)
        .bind(&input.user_name)
        .bind(input.leave_type)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.reason)
        .bind(LeaveStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(request) => Ok(request),
            None => self
                .find(id)
                .await?
                .ok_or_else(|| LeaveError::StorageError(format!("insert of {} was lost", id))),
        }
    }

    async fn find(&self, id: Uuid) -> LeaveResult<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            SELECT
                {}
            FROM
                leave_requests
            WHERE
                id = ?
            "#,
            COLUMNS
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn transition(
        &self,
        id: Uuid,
        status: LeaveStatus,
        decided_by: &str,
        now: DateTime<Utc>,
    ) -> LeaveResult<LeaveRequest> {
        // The status guard makes the decision a single compare-and-set.
        let updated = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            UPDATE
                leave_requests
            SET
                status = ?,
                approved_by = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING
                {}
            "#,
            COLUMNS
        )))
        .bind(status)
        .bind(decided_by)
        .bind(now)
        .bind(id)
        .bind(LeaveStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(request) = updated {
            return Ok(request);
        }

        match self.find(id).await? {
            None => Err(LeaveError::not_found(format!("leave request {}", id))),
            Some(existing) if existing.status == status
                && existing.approved_by.as_deref() == Some(decided_by)
                && existing.updated_at == now =>
            {
                // A previous attempt of this same call committed before the
                // connection dropped.
                Ok(existing)
            }
            Some(existing) => Err(LeaveError::invalid_state(format!(
                "leave request {} is already {}",
                id, existing.status
            ))),
        }
    }
}

#[async_trait]
impl LeaveRequestStore for LeaveRequestRepository {
    async fn create(&self, input: NewLeaveRequest) -> LeaveResult<LeaveRequest> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        retry_with_backoff(&self.retry, "create leave request", || {
            self.insert(id, &input, now)
        })
        .await
    }

    async fn get(&self, id: Uuid) -> LeaveResult<Option<LeaveRequest>> {
        retry_with_backoff(&self.retry, "get leave request", || self.find(id)).await
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

        // Postgres keeps microseconds; truncating lets a retry recognise its own write.
        let now = Utc::now().trunc_subsecs(6);
        retry_with_backoff(&self.retry, "update leave request status", || {
            self.transition(id, status, decided_by, now)
        })
        .await
    }

    async fn list_for_user(&self, user_id: &str) -> LeaveResult<Vec<LeaveRequest>> {
        let query = sql(&format!(
            r#"
            SELECT
                {}
            FROM
                leave_requests
            WHERE
                user_id = ?
            ORDER BY
                created_at DESC
            "#,
            COLUMNS
        ));

        retry_with_backoff(&self.retry, "list leave requests for user", || async {
            let requests = sqlx::query_as::<_, LeaveRequest>(&query)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
            Ok::<_, LeaveError>(requests)
        })
        .await
    }

    async fn list_approved_starting_on(&self, date: NaiveDate) -> LeaveResult<Vec<LeaveRequest>> {
        let query = sql(&format!(
            r#"
            SELECT
                {}
            FROM
                leave_requests
            WHERE
                start_date = ?
                AND status = ?
            ORDER BY
                user_name ASC
            "#,
            COLUMNS
        ));

        retry_with_backoff(&self.retry, "list approved leave starting on date", || async {
            let requests = sqlx::query_as::<_, LeaveRequest>(&query)
                .bind(date)
                .bind(LeaveStatus::Approved)
                .fetch_all(&self.pool)
                .await?;
            Ok::<_, LeaveError>(requests)
        })
        .await
    }

    async fn ping(&self) -> LeaveResult<()> {
        sqlx::query("SELECT id FROM leave_requests LIMIT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
