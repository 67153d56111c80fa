pub mod announcement;
pub mod approval;
pub mod leave;
pub mod ledger;
pub mod notifier;
pub mod scheduler;

pub use announcement::{Announcement, AnnouncementSelector};
pub use approval::{ApprovalStateMachine, Decision, DecisionOutcome, NotificationInstruction};
pub use leave::LeaveService;
pub use ledger::BalanceLedger;
pub use notifier::{LogNotifier, Message, NotificationGateway, NotifyError};
pub use scheduler::{DailyAnnouncer, SchedulerHandle, SchedulerStatus};
