use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Result;

use leavebot::database::connect_stores;
use leavebot::handlers;
use leavebot::services::{DailyAnnouncer, LogNotifier, NotificationGateway};
use leavebot::{AppState, Config, LeaveService};

#[actix_web::main]
async fn main() -> Result<()> {
    // Load configuration (also reads .env)
    let config = Config::from_env()?;

    let default_filter = if config.is_production() { "info" } else { "debug" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    log::info!(
        "Starting leave bot (environment: {})",
        config.environment
    );

    let stores = connect_stores(&config).await?;

    let notifier: Arc<dyn NotificationGateway> = Arc::new(LogNotifier);
    let leave_service = LeaveService::from_config(&config, stores, notifier);

    // Daily announcements
    let announcer = DailyAnnouncer::new(
        leave_service.clone(),
        config.announcement_hour,
        config.announcement_minute,
    );
    let scheduler = announcer.start();
    log::info!(
        "Daily announcements scheduled at {:02}:{:02} to {}",
        config.announcement_hour,
        config.announcement_minute,
        config.announcement_channel
    );

    let app_state = web::Data::new(AppState {
        leave_service,
        scheduler: announcer.status(),
    });

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    let server_result = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Logger::new(r#"%a "%r" %s %b %T"#))
            .configure(handlers::configure)
    })
    .bind(&server_address)?
    .run()
    .await;

    scheduler.shutdown().await;

    server_result.map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
