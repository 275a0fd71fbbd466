use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{Notification, NotificationPublisher, ResultEngine};

mod access;
mod accounts;
mod bills;
mod habits;
mod reminders;
mod users;
mod warranties;

pub use warranties::PurchaseDetail;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    publisher: Option<Arc<dyn NotificationPublisher>>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Hand a notification to the publisher, if any. Failures are logged and
    /// never reach the caller.
    fn notify(&self, notification: Notification) {
        let Some(publisher) = &self.publisher else {
            return;
        };
        if let Err(err) = publisher.publish(notification) {
            tracing::warn!("failed to publish notification: {err}");
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    publisher: Option<Arc<dyn NotificationPublisher>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Where reminder notifications go. Without one they are dropped.
    pub fn publisher(mut self, publisher: Arc<dyn NotificationPublisher>) -> EngineBuilder {
        self.publisher = Some(publisher);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            publisher: self.publisher,
        })
    }
}
