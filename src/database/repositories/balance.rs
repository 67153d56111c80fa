use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::BalanceStore;
use crate::database::{
    models::{BalanceRecord, LeaveType},
    retry::{RetryPolicy, retry_with_backoff},
    utils::sql,
};
use crate::error::{LeaveError, LeaveResult};

const COLUMNS: &str = r#"
    user_id,
    vacation,
    sick,
    personal,
    other,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct BalanceRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl BalanceRepository {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }
}

#[async_trait]
impl BalanceStore for BalanceRepository {
    async fn get(&self, user_id: &str) -> LeaveResult<Option<BalanceRecord>> {
        let query = sql(&format!(
            r#"
            SELECT
                {}
            FROM
                user_leave_balances
            WHERE
                user_id = ?
            "#,
            COLUMNS
        ));

        retry_with_backoff(&self.retry, "get leave balance", || async {
            let balance = sqlx::query_as::<_, BalanceRecord>(&query)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok::<_, LeaveError>(balance)
        })
        .await
    }

    async fn adjust(
        &self,
        user_id: &str,
        leave_type: LeaveType,
        delta_days: i32,
    ) -> LeaveResult<BalanceRecord> {
        let now = Utc::now();
        let seed = BalanceRecord::first_adjustment(user_id, leave_type, delta_days, now);
        let column = leave_type.as_str();

        // Insert-or-increment in one statement, so concurrent adjustments for
        // the same user serialize on the row lock instead of overwriting
        // each other.
        let query = sql(&format!(
            r#"
            INSERT INTO
                user_leave_balances (
                    user_id,
                    vacation,
                    sick,
                    personal,
                    other,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE
            SET
                {column} = GREATEST(
                    0,
                    LEAST(2147483647, user_leave_balances.{column}::BIGINT + ?)
                )::INTEGER,
                updated_at = EXCLUDED.updated_at
            RETURNING
                {columns}
            "#,
            column = column,
            columns = COLUMNS
        ));

        // Only acquiring the connection is retried: the upsert is not
        // idempotent, so replaying it after an ambiguous failure could apply
        // the delta twice.
        let mut conn = retry_with_backoff(&self.retry, "acquire connection", || async {
            Ok::<_, LeaveError>(self.pool.acquire().await?)
        })
        .await?;

        let balance = sqlx::query_as::<_, BalanceRecord>(&query)
            .bind(&seed.user_id)
            .bind(seed.vacation)
            .bind(seed.sick)
            .bind(seed.personal)
            .bind(seed.other)
            .bind(seed.created_at)
            .bind(seed.updated_at)
            .bind(i64::from(delta_days))
            .fetch_one(&mut *conn)
            .await?;

        log::info!(
            "Adjusted {} balance for {} by {} (now {})",
            leave_type,
            user_id,
            delta_days,
            balance.days(leave_type)
        );

        Ok(balance)
    }

    async fn list_all(&self) -> LeaveResult<Vec<BalanceRecord>> {
        let query = sql(&format!(
            r#"
            SELECT
                {}
            FROM
                user_leave_balances
            ORDER BY
                user_id ASC
            "#,
            COLUMNS
        ));

        retry_with_backoff(&self.retry, "list leave balances", || async {
            let balances = sqlx::query_as::<_, BalanceRecord>(&query)
                .fetch_all(&self.pool)
                .await?;
            Ok::<_, LeaveError>(balances)
        })
        .await
    }
}
