use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::AppState;

/// Liveness plus store reachability and scheduler state
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let database = match state.leave_service.store_reachable().await {
        Ok(()) => "healthy".to_string(),
        Err(err) => {
            log::warn!("Health check could not reach the store: {}", err);
            format!("unhealthy: {}", err)
        }
    };

    let scheduler = if state.scheduler.is_running() {
        "running"
    } else {
        "stopped"
    };

    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "database": database,
        "scheduler": scheduler,
    }))
}
