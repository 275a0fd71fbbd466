use api_types::habits::{HabitNew, HabitUpdate, StreakFilter, StreakNew, StreakUpdate};
use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Habit, ResultEngine, Streak, habits, streaks};

use super::{Engine, with_tx};

impl Engine {
    pub async fn habits(&self, user_id: &str) -> ResultEngine<Vec<Habit>> {
        habits::Entity::find()
            .filter(habits::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(habits::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Habit::try_from)
            .collect()
    }

    pub async fn habit(&self, id: Uuid, user_id: &str) -> ResultEngine<Habit> {
        let model = self.require_habit(&self.database, id, user_id).await?;
        Habit::try_from(model)
    }

    pub async fn new_habit(&self, user_id: &str, input: HabitNew) -> ResultEngine<Habit> {
        let habit = Habit::new(user_id, input, Utc::now())?;
        habits::ActiveModel::from(&habit)
            .insert(&self.database)
            .await?;
        Ok(habit)
    }

    pub async fn update_habit(
        &self,
        id: Uuid,
        user_id: &str,
        input: HabitUpdate,
    ) -> ResultEngine<Habit> {
        with_tx!(self, |db_tx| {
            let mut habit = Habit::try_from(self.require_habit(&db_tx, id, user_id).await?)?;
            habit.apply(input)?;
            habits::ActiveModel::from(&habit).update(&db_tx).await?;
            Ok(habit)
        })
    }

    pub async fn toggle_habit(&self, id: Uuid, user_id: &str) -> ResultEngine<Habit> {
        with_tx!(self, |db_tx| {
            let mut habit = Habit::try_from(self.require_habit(&db_tx, id, user_id).await?)?;
            habit.toggle_active();
            habits::ActiveModel::from(&habit).update(&db_tx).await?;
            Ok(habit)
        })
    }

    pub async fn delete_habit(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_habit(&db_tx, id, user_id).await?;
            habits::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn streaks(&self, user_id: &str, filter: &StreakFilter) -> ResultEngine<Vec<Streak>> {
        let mut query = streaks::Entity::find()
            .inner_join(habits::Entity)
            .filter(habits::Column::UserId.eq(user_id.to_string()));
        if let Some(habit_id) = filter.habit_id {
            query = query.filter(streaks::Column::HabitId.eq(habit_id.to_string()));
        }
        query
            .order_by_desc(streaks::Column::CurrentStreak)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Streak::try_from)
            .collect()
    }

    pub async fn streak(&self, id: Uuid, user_id: &str) -> ResultEngine<Streak> {
        let model = self.require_streak(&self.database, id, user_id).await?;
        Streak::try_from(model)
    }

    /// Start an empty streak for a habit.
    pub async fn new_streak(&self, user_id: &str, input: StreakNew) -> ResultEngine<Streak> {
        with_tx!(self, |db_tx| {
            self.require_habit(&db_tx, input.habit_id, user_id).await?;
            let streak = Streak::new(input.habit_id);
            streaks::ActiveModel::from(&streak).insert(&db_tx).await?;
            Ok(streak)
        })
    }

    pub async fn update_streak(
        &self,
        id: Uuid,
        user_id: &str,
        input: StreakUpdate,
    ) -> ResultEngine<Streak> {
        self.change_streak(id, user_id, |streak| streak.apply(input))
            .await
    }

    /// Record a habit completion at `at`.
    pub async fn complete_streak(
        &self,
        id: Uuid,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> ResultEngine<Streak> {
        self.change_streak(id, user_id, |streak| streak.increment_streak(at))
            .await
    }

    pub async fn reset_streak(&self, id: Uuid, user_id: &str) -> ResultEngine<Streak> {
        self.change_streak(id, user_id, |streak| {
            streak.reset_streak();
            Ok(())
        })
        .await
    }

    pub async fn delete_streak(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_streak(&db_tx, id, user_id).await?;
            streaks::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn change_streak<F>(&self, id: Uuid, user_id: &str, change: F) -> ResultEngine<Streak>
    where
        F: FnOnce(&mut Streak) -> ResultEngine<()>,
    {
        with_tx!(self, |db_tx| {
            let mut streak = Streak::try_from(self.require_streak(&db_tx, id, user_id).await?)?;
            change(&mut streak)?;
            streaks::ActiveModel::from(&streak).update(&db_tx).await?;
            Ok(streak)
        })
    }
}
