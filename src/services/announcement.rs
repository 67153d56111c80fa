use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::database::repositories::LeaveRequestStore;
use crate::error::LeaveResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub user_name: String,
    pub leave_date: NaiveDate,
}

/// Picks who to announce for a day: approved requests whose leave *starts*
/// that day. Later days of a multi-day span are not announced.
#[derive(Clone)]
pub struct AnnouncementSelector {
    store: Arc<dyn LeaveRequestStore>,
}

impl AnnouncementSelector {
    pub fn new(store: Arc<dyn LeaveRequestStore>) -> Self {
        Self { store }
    }

    pub async fn select_for_date(&self, date: NaiveDate) -> LeaveResult<Vec<Announcement>> {
        let requests = self.store.list_approved_starting_on(date).await?;
        Ok(requests
            .into_iter()
            .map(|request| Announcement {
                user_name: request.user_name,
                leave_date: date,
            })
            .collect())
    }
}
