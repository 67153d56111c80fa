#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fake::Fake;
use fake::faker::internet::en::Username;
use fake::faker::name::en::FirstName;

use leavebot::database::{Stores, models::LeaveRequestInput};
use leavebot::services::{LeaveService, Message, NotificationGateway, NotifyError};

pub const ADMIN: &str = "UADMIN";
pub const CHANNEL: &str = "#general";

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Gateway that remembers every message it was asked to deliver.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, Message)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, Message)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<Message> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| to == recipient)
            .map(|(_, message)| message)
            .collect()
    }
}

#[async_trait]
impl NotificationGateway for RecordingNotifier {
    async fn notify(&self, recipient: &str, message: &Message) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.clone()));
        Ok(())
    }
}

/// Gateway whose every delivery fails.
pub struct FailingNotifier;

#[async_trait]
impl NotificationGateway for FailingNotifier {
    async fn notify(&self, recipient: &str, _message: &Message) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery {
            recipient: recipient.to_string(),
            reason: "chat platform unavailable".to_string(),
        })
    }
}

pub struct TestContext {
    pub service: LeaveService,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    pub fn new() -> Self {
        setup_test_env();
        let notifier = Arc::new(RecordingNotifier::default());
        let service = LeaveService::new(Stores::in_memory(), notifier.clone(), ADMIN, CHANNEL);
        Self { service, notifier }
    }

    pub fn with_notifier(notifier: Arc<dyn NotificationGateway>) -> LeaveService {
        setup_test_env();
        LeaveService::new(Stores::in_memory(), notifier, ADMIN, CHANNEL)
    }
}

pub fn random_user() -> (String, String) {
    let id = format!("U{}", (100000..999999).fake::<u32>());
    let name: String = if (0..2).fake::<u8>() == 0 {
        FirstName().fake()
    } else {
        Username().fake()
    };
    (id, name)
}

pub fn submission(
    user_id: &str,
    user_name: &str,
    leave_type: &str,
    start_date: &str,
    end_date: &str,
) -> LeaveRequestInput {
    LeaveRequestInput {
        user_id: user_id.to_string(),
        user_name: user_name.to_string(),
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        reason: Some("Out of office".to_string()),
        leave_type: leave_type.to_string(),
    }
}
