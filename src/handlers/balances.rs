use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::AppState;
use crate::database::models::{BalanceAdjustmentInput, BalanceRecord};
use crate::error::LeaveError;
use crate::handlers::{actor::Actor, shared::ApiResponse};
use crate::services::Message;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceView {
    #[serde(flatten)]
    pub balance: BalanceRecord,
    pub summary: String,
}

/// Leave balance of the calling user
pub async fn get_my_balance(
    actor: Actor,
    state: web::Data<AppState>,
) -> Result<HttpResponse, LeaveError> {
    let balance = state.leave_service.query_balance(&actor.id).await?;
    let summary = Message::balance_summary(&balance).text;

    Ok(ApiResponse::ok(BalanceView { balance, summary }))
}

/// Every stored balance (admin only)
pub async fn list_balances(
    actor: Actor,
    state: web::Data<AppState>,
) -> Result<HttpResponse, LeaveError> {
    let balances = state.leave_service.admin_list_balances(&actor.id).await?;

    Ok(ApiResponse::ok(balances))
}

/// Add or remove days from one category of a user's balance (admin only)
pub async fn adjust_balance(
    actor: Actor,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<BalanceAdjustmentInput>,
) -> Result<HttpResponse, LeaveError> {
    let adjustment = input.into_inner();
    let balance = state
        .leave_service
        .admin_adjust_balance(
            &actor.id,
            &path.into_inner(),
            &adjustment.leave_type,
            adjustment.delta_days,
        )
        .await?;

    Ok(ApiResponse::ok(balance))
}
