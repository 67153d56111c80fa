use actix_web::web;

pub mod actor;
pub mod announcements;
pub mod balances;
pub mod health;
pub mod leave_requests;
pub mod shared;

/// Mounts every route. Shared by the server binary and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health)).service(
        web::scope("/api/v1")
            .service(
                web::scope("/leave-requests")
                    .route("", web::post().to(leave_requests::create_leave_request))
                    .route("/{id}", web::get().to(leave_requests::get_leave_request))
                    .route(
                        "/{id}/approve",
                        web::post().to(leave_requests::approve_leave_request),
                    )
                    .route(
                        "/{id}/reject",
                        web::post().to(leave_requests::reject_leave_request),
                    ),
            )
            .route(
                "/users/{user_id}/leave-requests",
                web::get().to(leave_requests::get_user_leave_requests),
            )
            .route("/balance", web::get().to(balances::get_my_balance))
            .service(
                web::scope("/balances")
                    .route("", web::get().to(balances::list_balances))
                    .route("/{user_id}/adjust", web::post().to(balances::adjust_balance)),
            )
            .service(
                web::scope("/announcements")
                    .route("", web::get().to(announcements::preview_announcements))
                    .route("/run", web::post().to(announcements::run_announcements)),
            ),
    );
}
