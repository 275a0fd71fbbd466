//! The module contains `Streak` struct and its implementation.

use api_types::habits::StreakUpdate;
use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_id};

/// Consecutive-day completion counter for a [`Habit`](crate::Habit).
#[derive(Clone, Debug, PartialEq)]
pub struct Streak {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_completion_date: Option<DateTime<Utc>>,
    pub streak_start_date: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Streak {
    pub fn new(habit_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            habit_id,
            current_streak: 0,
            longest_streak: 0,
            last_completion_date: None,
            streak_start_date: None,
            is_active: false,
        }
    }

    /// Overwrite the counters, e.g. when importing history.
    pub fn apply(&mut self, input: StreakUpdate) -> ResultEngine<()> {
        if input.current_streak < 0 || input.longest_streak < 0 {
            return Err(EngineError::InvalidValue(
                "streak counters must be >= 0".to_string(),
            ));
        }
        if input.longest_streak < input.current_streak {
            return Err(EngineError::InvalidValue(
                "longest_streak must be >= current_streak".to_string(),
            ));
        }
        self.current_streak = input.current_streak;
        self.longest_streak = input.longest_streak;
        self.last_completion_date = input.last_completion_date;
        self.streak_start_date = input.streak_start_date;
        self.is_active = input.is_active;
        Ok(())
    }

    /// Record a completion at `at`.
    ///
    /// Days are compared on the UTC calendar. A completion on the day after
    /// the last one extends the streak, one on the same day is a no-op and a
    /// later one restarts the count. After a reset the next completion always
    /// starts a fresh streak.
    pub fn increment_streak(&mut self, at: DateTime<Utc>) -> ResultEngine<()> {
        let gap = self
            .last_completion_date
            .map(|last| (at.date_naive() - last.date_naive()).num_days());
        if gap.is_some_and(|gap| gap < 0) {
            return Err(EngineError::InvalidValue(
                "completion precedes the last recorded one".to_string(),
            ));
        }
        match gap {
            Some(0) if self.current_streak > 0 => return Ok(()),
            Some(1) if self.current_streak > 0 => self.current_streak += 1,
            _ => self.restart(at),
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_completion_date = Some(at);
        self.is_active = true;
        Ok(())
    }

    pub fn reset_streak(&mut self) {
        self.current_streak = 0;
        self.streak_start_date = None;
        self.is_active = false;
    }

    /// Whether more than one calendar day has passed since the last completion.
    pub fn is_streak_broken(&self, now: DateTime<Utc>) -> bool {
        self.last_completion_date
            .is_some_and(|last| (now.date_naive() - last.date_naive()).num_days() > 1)
    }

    fn restart(&mut self, at: DateTime<Utc>) {
        self.current_streak = 1;
        self.streak_start_date = Some(at);
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "streaks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub habit_id: String,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_completion_date: Option<DateTimeUtc>,
    pub streak_start_date: Option<DateTimeUtc>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::habits::Entity",
        from = "Column::HabitId",
        to = "super::habits::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Habits,
}

impl Related<super::habits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Habits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Streak> for ActiveModel {
    fn from(value: &Streak) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            habit_id: ActiveValue::Set(value.habit_id.to_string()),
            current_streak: ActiveValue::Set(value.current_streak),
            longest_streak: ActiveValue::Set(value.longest_streak),
            last_completion_date: ActiveValue::Set(value.last_completion_date),
            streak_start_date: ActiveValue::Set(value.streak_start_date),
            is_active: ActiveValue::Set(value.is_active),
        }
    }
}

impl TryFrom<Model> for Streak {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "streak")?,
            habit_id: parse_id(&model.habit_id, "habit")?,
            current_streak: model.current_streak,
            longest_streak: model.longest_streak,
            last_completion_date: model.last_completion_date,
            streak_start_date: model.streak_start_date,
            is_active: model.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn day(d: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, d, hour, 0, 0).unwrap()
    }

    #[test]
    fn consecutive_days_extend_the_streak() {
        let mut streak = Streak::new(Uuid::new_v4());
        streak.increment_streak(day(1, 7)).unwrap();
        streak.increment_streak(day(2, 23)).unwrap();
        streak.increment_streak(day(3, 0)).unwrap();

        assert_eq!(streak.current_streak, 3);
        assert_eq!(streak.longest_streak, 3);
        assert_eq!(streak.streak_start_date, Some(day(1, 7)));
        assert_eq!(streak.last_completion_date, Some(day(3, 0)));
        assert!(streak.is_active);
    }

    #[test]
    fn same_day_completion_is_idempotent() {
        let mut streak = Streak::new(Uuid::new_v4());
        streak.increment_streak(day(1, 7)).unwrap();
        streak.increment_streak(day(1, 21)).unwrap();

        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.last_completion_date, Some(day(1, 7)));
    }

    #[test]
    fn gap_restarts_but_keeps_longest() {
        let mut streak = Streak::new(Uuid::new_v4());
        streak.increment_streak(day(1, 7)).unwrap();
        streak.increment_streak(day(2, 7)).unwrap();
        streak.increment_streak(day(5, 7)).unwrap();

        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.longest_streak, 2);
        assert_eq!(streak.streak_start_date, Some(day(5, 7)));
    }

    #[test]
    fn earlier_completion_is_rejected() {
        let mut streak = Streak::new(Uuid::new_v4());
        streak.increment_streak(day(5, 7)).unwrap();
        assert!(matches!(
            streak.increment_streak(day(4, 7)),
            Err(EngineError::InvalidValue(_))
        ));
        assert_eq!(streak.current_streak, 1);
    }

    #[test]
    fn broken_after_a_missed_day() {
        let mut streak = Streak::new(Uuid::new_v4());
        assert!(!streak.is_streak_broken(day(10, 0)));

        streak.increment_streak(day(1, 22)).unwrap();
        assert!(!streak.is_streak_broken(day(2, 23)));
        assert!(streak.is_streak_broken(day(3, 0)));
    }

    #[test]
    fn reset_clears_current_run() {
        let mut streak = Streak::new(Uuid::new_v4());
        streak.increment_streak(day(1, 7)).unwrap();
        streak.reset_streak();

        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 1);
        assert_eq!(streak.streak_start_date, None);
        assert!(!streak.is_active);
    }

    #[test]
    fn completion_after_reset_starts_a_new_run() {
        let mut same_day = Streak::new(Uuid::new_v4());
        same_day.increment_streak(day(1, 7)).unwrap();
        same_day.reset_streak();
        same_day.increment_streak(day(1, 20)).unwrap();

        assert_eq!(same_day.current_streak, 1);
        assert!(same_day.is_active);
        assert_eq!(same_day.streak_start_date, Some(day(1, 20)));
        assert_eq!(same_day.last_completion_date, Some(day(1, 20)));

        let mut next_day = Streak::new(Uuid::new_v4());
        next_day.increment_streak(day(1, 7)).unwrap();
        next_day.increment_streak(day(2, 7)).unwrap();
        next_day.reset_streak();
        next_day.increment_streak(day(3, 7)).unwrap();

        assert_eq!(next_day.current_streak, 1);
        assert_eq!(next_day.longest_streak, 2);
        assert_eq!(next_day.streak_start_date, Some(day(3, 7)));
    }
}
