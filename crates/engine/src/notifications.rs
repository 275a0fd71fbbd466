//! Out-of-band notifications emitted by the engine.
//!
//! Publishing is best-effort: the engine logs a failed publish and carries on
//! with the request that triggered it.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    ReminderScheduled {
        reminder_id: Uuid,
        important_date_id: Uuid,
        user_id: String,
        scheduled_time: DateTime<Utc>,
        delivery_channel: String,
    },
    ReminderSnoozed {
        reminder_id: Uuid,
        user_id: String,
        scheduled_time: DateTime<Utc>,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum PublishError {
    #[error("no subscriber is listening")]
    NoSubscribers,
    #[error("publish failed: {0}")]
    Other(String),
}

/// Sink for [`Notification`]s.
pub trait NotificationPublisher: Send + Sync + Debug {
    fn publish(&self, notification: Notification) -> Result<(), PublishError>;
}

/// In-process publisher backed by a `tokio` broadcast channel.
#[derive(Clone, Debug)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl NotificationPublisher for BroadcastPublisher {
    fn publish(&self, notification: Notification) -> Result<(), PublishError> {
        self.sender
            .send(notification)
            .map(|_| ())
            .map_err(|_| PublishError::NoSubscribers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snoozed() -> Notification {
        Notification::ReminderSnoozed {
            reminder_id: Uuid::nil(),
            user_id: "alice".to_string(),
            scheduled_time: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn publish_without_subscribers_fails() {
        let publisher = BroadcastPublisher::new(4);
        assert_eq!(publisher.publish(snoozed()), Err(PublishError::NoSubscribers));
    }

    #[test]
    fn subscriber_receives_notification() {
        let publisher = BroadcastPublisher::new(4);
        let mut rx = publisher.subscribe();

        publisher.publish(snoozed()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), snoozed());
    }

    #[test]
    fn serialises_with_kind_tag() {
        let json = serde_json::to_value(snoozed()).unwrap();
        assert_eq!(json["kind"], "reminder_snoozed");
        assert_eq!(json["user_id"], "alice");
    }
}
