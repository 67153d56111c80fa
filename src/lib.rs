pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod services;

pub use config::Config;
pub use error::{LeaveError, LeaveResult};
pub use services::{LeaveService, SchedulerStatus};

pub struct AppState {
    pub leave_service: LeaveService,
    pub scheduler: SchedulerStatus,
}
