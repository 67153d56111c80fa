use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::LeaveError;
use crate::handlers::{actor::Actor, shared::ApiResponse};

#[derive(Debug, Deserialize)]
pub struct AnnouncementQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementRun {
    pub date: NaiveDate,
    pub announced: usize,
}

/// Who would be announced on a date (defaults to today)
pub async fn preview_announcements(
    _actor: Actor,
    state: web::Data<AppState>,
    query: web::Query<AnnouncementQuery>,
) -> Result<HttpResponse, LeaveError> {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let announcements = state.leave_service.select_for_date(date).await?;

    Ok(ApiResponse::ok(announcements))
}

/// Run the daily announcement now (admin only)
pub async fn run_announcements(
    actor: Actor,
    state: web::Data<AppState>,
    query: web::Query<AnnouncementQuery>,
) -> Result<HttpResponse, LeaveError> {
    if !state.leave_service.is_admin(&actor.id) {
        return Err(LeaveError::unauthorized("only the admin can run announcements"));
    }

    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let announced = state.leave_service.post_announcements(date).await?;

    Ok(ApiResponse::ok(AnnouncementRun { date, announced }))
}
