use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::LeaveRequestInput;
use crate::error::LeaveError;
use crate::handlers::{actor::Actor, shared::ApiResponse};
use crate::services::Decision;

/// Form fields of the leave request dialog. The requester comes from the actor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLeaveRequest {
    pub leave_type: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
}

/// Submit a new leave request for the calling user
pub async fn create_leave_request(
    actor: Actor,
    state: web::Data<AppState>,
    input: web::Json<SubmitLeaveRequest>,
) -> Result<HttpResponse, LeaveError> {
    let form = input.into_inner();
    let request = state
        .leave_service
        .submit_request(LeaveRequestInput {
            user_id: actor.id,
            user_name: actor.name,
            start_date: form.start_date,
            end_date: form.end_date,
            reason: form.reason,
            leave_type: form.leave_type,
        })
        .await?;

    Ok(ApiResponse::created(request))
}

/// Get a leave request by id (owner or admin)
pub async fn get_leave_request(
    actor: Actor,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, LeaveError> {
    let request = state
        .leave_service
        .get_request(&actor.id, path.into_inner())
        .await?;

    Ok(ApiResponse::ok(request))
}

async fn decide(
    actor: Actor,
    state: web::Data<AppState>,
    request_id: Uuid,
    decision: Decision,
) -> Result<HttpResponse, LeaveError> {
    let request = state
        .leave_service
        .decide(request_id, decision, &actor.id)
        .await?;

    let message = format!("Leave request {} by <@{}>", request.status, actor.id);
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(request, message)))
}

/// Approve button callback (admin only)
pub async fn approve_leave_request(
    actor: Actor,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, LeaveError> {
    decide(actor, state, path.into_inner(), Decision::Approve).await
}

/// Reject button callback (admin only)
pub async fn reject_leave_request(
    actor: Actor,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, LeaveError> {
    decide(actor, state, path.into_inner(), Decision::Reject).await
}

/// Leave history for a user, newest first (self or admin)
pub async fn get_user_leave_requests(
    actor: Actor,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, LeaveError> {
    let requests = state
        .leave_service
        .query_history(&actor.id, &path.into_inner())
        .await?;

    Ok(ApiResponse::ok(requests))
}
