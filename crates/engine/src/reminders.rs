//! The module contains `Reminder` struct and its implementation.

use api_types::reminders::{DeliveryChannel, ReminderStatus};
use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_id};

/// A scheduled notification about an [`ImportantDate`](crate::ImportantDate).
#[derive(Clone, Debug, PartialEq)]
pub struct Reminder {
    pub id: Uuid,
    pub important_date_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub advance_notice_days: i32,
    pub delivery_channel: DeliveryChannel,
    pub status: ReminderStatus,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Reminder {
    pub fn new(
        important_date_id: Uuid,
        scheduled_time: DateTime<Utc>,
        advance_notice_days: i32,
        delivery_channel: DeliveryChannel,
    ) -> ResultEngine<Self> {
        check_notice(advance_notice_days)?;
        Ok(Self {
            id: Uuid::new_v4(),
            important_date_id,
            scheduled_time,
            advance_notice_days,
            delivery_channel,
            status: ReminderStatus::Scheduled,
            sent_at: None,
        })
    }

    /// Edit the schedule. Status only moves through the explicit actions.
    pub fn reschedule(
        &mut self,
        scheduled_time: DateTime<Utc>,
        advance_notice_days: i32,
        delivery_channel: DeliveryChannel,
    ) -> ResultEngine<()> {
        check_notice(advance_notice_days)?;
        self.scheduled_time = scheduled_time;
        self.advance_notice_days = advance_notice_days;
        self.delivery_channel = delivery_channel;
        Ok(())
    }

    pub fn is_ready_to_send(&self, now: DateTime<Utc>) -> bool {
        matches!(
            self.status,
            ReminderStatus::Scheduled | ReminderStatus::Snoozed
        ) && self.scheduled_time <= now
    }

    pub fn mark_as_sent(&mut self, now: DateTime<Utc>) -> ResultEngine<()> {
        self.require_pending("sent")?;
        self.status = ReminderStatus::Sent;
        self.sent_at = Some(now);
        Ok(())
    }

    /// Push the reminder forward by `duration`.
    pub fn snooze(&mut self, duration: Duration) -> ResultEngine<()> {
        if duration <= Duration::zero() {
            return Err(EngineError::InvalidValue(
                "snooze duration must be positive".to_string(),
            ));
        }
        self.require_pending("snoozed")?;
        self.scheduled_time = self
            .scheduled_time
            .checked_add_signed(duration)
            .ok_or_else(|| EngineError::InvalidValue("snooze duration too large".to_string()))?;
        self.status = ReminderStatus::Snoozed;
        Ok(())
    }

    pub fn dismiss(&mut self) -> ResultEngine<()> {
        if self.status == ReminderStatus::Sent {
            return Err(EngineError::InvalidState(
                "reminder already sent".to_string(),
            ));
        }
        self.status = ReminderStatus::Dismissed;
        Ok(())
    }

    fn require_pending(&self, action: &str) -> ResultEngine<()> {
        match self.status {
            ReminderStatus::Sent | ReminderStatus::Dismissed => Err(EngineError::InvalidState(
                format!("a {} reminder cannot be {action}", self.status),
            )),
            _ => Ok(()),
        }
    }
}

fn check_notice(days: i32) -> ResultEngine<()> {
    if days < 0 {
        return Err(EngineError::InvalidValue(
            "advance_notice_days must be >= 0".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reminders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub important_date_id: String,
    pub scheduled_time: DateTimeUtc,
    pub advance_notice_days: i32,
    pub delivery_channel: String,
    pub status: String,
    pub sent_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::important_dates::Entity",
        from = "Column::ImportantDateId",
        to = "super::important_dates::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ImportantDates,
}

impl Related<super::important_dates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ImportantDates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Reminder> for ActiveModel {
    fn from(value: &Reminder) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            important_date_id: ActiveValue::Set(value.important_date_id.to_string()),
            scheduled_time: ActiveValue::Set(value.scheduled_time),
            advance_notice_days: ActiveValue::Set(value.advance_notice_days),
            delivery_channel: ActiveValue::Set(value.delivery_channel.as_str().to_string()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            sent_at: ActiveValue::Set(value.sent_at),
        }
    }
}

impl TryFrom<Model> for Reminder {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "reminder")?,
            important_date_id: parse_id(&model.important_date_id, "important_date")?,
            scheduled_time: model.scheduled_time,
            advance_notice_days: model.advance_notice_days,
            delivery_channel: DeliveryChannel::try_from(model.delivery_channel.as_str())?,
            status: ReminderStatus::try_from(model.status.as_str())?,
            sent_at: model.sent_at,
        })
    }
}
