use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::services::leave::LeaveService;

/// First `hour:minute` strictly after `now`.
pub fn next_run_after(now: NaiveDateTime, hour: u32, minute: u32) -> NaiveDateTime {
    let at = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Shared flag the health endpoint reads.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStatus(Arc<AtomicBool>);

impl SchedulerStatus {
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn set(&self, running: bool) {
        self.0.store(running, Ordering::SeqCst);
    }
}

/// Fires the daily announcement once a day at a fixed local time.
pub struct DailyAnnouncer {
    service: LeaveService,
    hour: u32,
    minute: u32,
    status: SchedulerStatus,
    shutdown_tx: watch::Sender<bool>,
}

impl DailyAnnouncer {
    pub fn new(service: LeaveService, hour: u32, minute: u32) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            service,
            hour,
            minute,
            status: SchedulerStatus::default(),
            shutdown_tx,
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        self.status.clone()
    }

    pub fn start(&self) -> SchedulerHandle {
        let service = self.service.clone();
        let (hour, minute) = (self.hour, self.minute);
        let status = self.status.clone();
        let mut shutdown = self.shutdown_tx.subscribe();

        status.set(true);
        let task = tokio::spawn(async move {
            loop {
                let now = Local::now().naive_local();
                let next = next_run_after(now, hour, minute);
                let wait = (next - now).to_std().unwrap_or_default();
                log::info!("Next leave announcement run at {}", next);

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = shutdown.changed() => break,
                }

                if let Err(err) = service.post_announcements(next.date()).await {
                    log::error!("Error posting daily leave announcements: {}", err);
                }
            }
            status.set(false);
            log::info!("Leave announcement scheduler stopped");
        });

        SchedulerHandle {
            task,
            shutdown_tx: self.shutdown_tx.clone(),
        }
    }
}

pub struct SchedulerHandle {
    task: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl SchedulerHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(err) = self.task.await {
            log::error!("Scheduler task ended abnormally: {}", err);
        }
    }
}
