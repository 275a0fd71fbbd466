use api_types::reminders::{
    ImportantDateFilter, ImportantDateNew, ImportantDateUpdate, ReminderFilter, ReminderNew,
    ReminderStatus, ReminderUpdate,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ImportantDate, Notification, Reminder, ResultEngine, important_dates, reminders,
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn important_dates(
        &self,
        user_id: &str,
        filter: &ImportantDateFilter,
    ) -> ResultEngine<Vec<ImportantDate>> {
        let mut query = important_dates::Entity::find()
            .filter(important_dates::Column::UserId.eq(user_id.to_string()));
        if let Some(active) = filter.active {
            query = query.filter(important_dates::Column::IsActive.eq(active));
        }
        query
            .order_by_asc(important_dates::Column::PersonName)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ImportantDate::try_from)
            .collect()
    }

    pub async fn important_date(&self, id: Uuid, user_id: &str) -> ResultEngine<ImportantDate> {
        let model = self
            .require_important_date(&self.database, id, user_id)
            .await?;
        ImportantDate::try_from(model)
    }

    pub async fn new_important_date(
        &self,
        user_id: &str,
        input: ImportantDateNew,
    ) -> ResultEngine<ImportantDate> {
        let date = ImportantDate::new(user_id, input, Utc::now())?;
        important_dates::ActiveModel::from(&date)
            .insert(&self.database)
            .await?;
        Ok(date)
    }

    pub async fn update_important_date(
        &self,
        id: Uuid,
        user_id: &str,
        input: ImportantDateUpdate,
    ) -> ResultEngine<ImportantDate> {
        with_tx!(self, |db_tx| {
            let model = self.require_important_date(&db_tx, id, user_id).await?;
            let mut date = ImportantDate::try_from(model)?;
            date.apply(input)?;
            important_dates::ActiveModel::from(&date)
                .update(&db_tx)
                .await?;
            Ok(date)
        })
    }

    /// Delete an important date and every reminder scheduled for it.
    pub async fn delete_important_date(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_important_date(&db_tx, id, user_id).await?;
            important_dates::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn reminders(
        &self,
        user_id: &str,
        filter: &ReminderFilter,
    ) -> ResultEngine<Vec<Reminder>> {
        let mut query = reminders::Entity::find()
            .inner_join(important_dates::Entity)
            .filter(important_dates::Column::UserId.eq(user_id.to_string()));
        if let Some(date_id) = filter.important_date_id {
            query = query.filter(reminders::Column::ImportantDateId.eq(date_id.to_string()));
        }
        query
            .order_by_asc(reminders::Column::ScheduledTime)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Reminder::try_from)
            .collect()
    }

    /// Reminders that should go out at `now`.
    pub async fn due_reminders(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<Reminder>> {
        let pending = reminders::Entity::find()
            .inner_join(important_dates::Entity)
            .filter(important_dates::Column::UserId.eq(user_id.to_string()))
            .filter(reminders::Column::Status.is_in([
                ReminderStatus::Scheduled.as_str(),
                ReminderStatus::Snoozed.as_str(),
            ]))
            .order_by_asc(reminders::Column::ScheduledTime)
            .all(&self.database)
            .await?;

        let mut due = Vec::new();
        for model in pending {
            let reminder = Reminder::try_from(model)?;
            if reminder.is_ready_to_send(now) {
                due.push(reminder);
            }
        }
        Ok(due)
    }

    pub async fn reminder(&self, id: Uuid, user_id: &str) -> ResultEngine<Reminder> {
        let model = self.require_reminder(&self.database, id, user_id).await?;
        Reminder::try_from(model)
    }

    /// Schedule a reminder and announce it to the notification publisher.
    pub async fn new_reminder(&self, user_id: &str, input: ReminderNew) -> ResultEngine<Reminder> {
        let reminder = with_tx!(self, |db_tx| {
            self.require_important_date(&db_tx, input.important_date_id, user_id)
                .await?;
            let reminder = Reminder::new(
                input.important_date_id,
                input.scheduled_time,
                input.advance_notice_days,
                input.delivery_channel,
            )?;
            reminders::ActiveModel::from(&reminder)
                .insert(&db_tx)
                .await?;
            Ok::<_, EngineError>(reminder)
        })?;

        self.notify(Notification::ReminderScheduled {
            reminder_id: reminder.id,
            important_date_id: reminder.important_date_id,
            user_id: user_id.to_string(),
            scheduled_time: reminder.scheduled_time,
            delivery_channel: reminder.delivery_channel.as_str().to_string(),
        });
        Ok(reminder)
    }

    pub async fn update_reminder(
        &self,
        id: Uuid,
        user_id: &str,
        input: ReminderUpdate,
    ) -> ResultEngine<Reminder> {
        self.change_reminder(id, user_id, |reminder| {
            reminder.reschedule(
                input.scheduled_time,
                input.advance_notice_days,
                input.delivery_channel,
            )
        })
        .await
    }

    pub async fn delete_reminder(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_reminder(&db_tx, id, user_id).await?;
            reminders::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn mark_reminder_sent(
        &self,
        id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Reminder> {
        self.change_reminder(id, user_id, |reminder| reminder.mark_as_sent(now))
            .await
    }

    /// Push a reminder `minutes` forward and announce the new time.
    pub async fn snooze_reminder(
        &self,
        id: Uuid,
        user_id: &str,
        minutes: i64,
    ) -> ResultEngine<Reminder> {
        let duration = Duration::try_minutes(minutes)
            .ok_or_else(|| EngineError::InvalidValue("snooze duration too large".to_string()))?;
        let reminder = self
            .change_reminder(id, user_id, |reminder| reminder.snooze(duration))
            .await?;

        self.notify(Notification::ReminderSnoozed {
            reminder_id: reminder.id,
            user_id: user_id.to_string(),
            scheduled_time: reminder.scheduled_time,
        });
        Ok(reminder)
    }

    pub async fn dismiss_reminder(&self, id: Uuid, user_id: &str) -> ResultEngine<Reminder> {
        self.change_reminder(id, user_id, Reminder::dismiss).await
    }

    async fn change_reminder<F>(&self, id: Uuid, user_id: &str, change: F) -> ResultEngine<Reminder>
    where
        F: FnOnce(&mut Reminder) -> ResultEngine<()>,
    {
        with_tx!(self, |db_tx| {
            let mut reminder = Reminder::try_from(self.require_reminder(&db_tx, id, user_id).await?)?;
            change(&mut reminder)?;
            reminders::ActiveModel::from(&reminder)
                .update(&db_tx)
                .await?;
            Ok(reminder)
        })
    }
}
