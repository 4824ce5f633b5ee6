pub mod inventory_service;
pub mod notification_service;

pub use inventory_service::InventoryService;
pub use notification_service::{
    NotificationSink, NotifyError, RecordingNotifier, SentNotification, SnsNotifier,
};
