pub use accounts::{Account, PASSWORD_MAX_AGE_DAYS};
pub use bills::Bill;
pub use breach_alerts::BreachAlert;
pub use error::EngineError;
pub use habits::Habit;
pub use important_dates::ImportantDate;
pub use notifications::{BroadcastPublisher, Notification, NotificationPublisher, PublishError};
pub use ops::{Engine, EngineBuilder, PurchaseDetail};
pub use payees::Payee;
pub use payments::Payment;
pub use purchases::Purchase;
pub use reminders::Reminder;
pub use return_windows::{CLOSING_SOON_DAYS, ReturnWindow};
pub use security_audits::SecurityAudit;
pub use streaks::Streak;
pub use users::{User, hash_password};
pub use warranties::{EXPIRING_SOON_DAYS, Warranty};

mod accounts;
mod bills;
mod breach_alerts;
mod error;
mod habits;
mod important_dates;
mod notifications;
mod ops;
mod payees;
mod payments;
mod purchases;
mod reminders;
mod return_windows;
mod security_audits;
mod streaks;
mod users;
mod util;
mod warranties;

type ResultEngine<T> = Result<T, EngineError>;
