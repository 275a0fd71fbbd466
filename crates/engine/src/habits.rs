//! The module contains `Habit` struct and its implementation.

use api_types::habits::{HabitFrequency, HabitNew};
use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{optional_text, parse_id, required_text},
};

/// A habit the user is trying to build.
#[derive(Clone, Debug, PartialEq)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub frequency: HabitFrequency,
    /// How many days per week the habit should be performed, `1..=7`.
    pub target_days_per_week: i32,
    pub start_date: DateTime<Utc>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(user_id: &str, input: HabitNew, now: DateTime<Utc>) -> ResultEngine<Self> {
        let mut habit = Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name: String::new(),
            description: None,
            frequency: HabitFrequency::default(),
            target_days_per_week: 7,
            start_date: now,
            is_active: true,
            notes: None,
            created_at: now,
        };
        habit.apply(input)?;
        Ok(habit)
    }

    /// Replace the mutable fields. Omitted optional settings keep their
    /// current value.
    pub fn apply(&mut self, input: HabitNew) -> ResultEngine<()> {
        let target = input.target_days_per_week.unwrap_or(self.target_days_per_week);
        if !(1..=7).contains(&target) {
            return Err(EngineError::InvalidValue(
                "target_days_per_week must be between 1 and 7".to_string(),
            ));
        }
        self.name = required_text(&input.name, "name", 200)?;
        self.description = optional_text(input.description, "description", 1000)?;
        self.notes = optional_text(input.notes, "notes", 2000)?;
        self.frequency = input.frequency;
        self.target_days_per_week = target;
        if let Some(start_date) = input.start_date {
            self.start_date = start_date;
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
        Ok(())
    }

    pub fn toggle_active(&mut self) {
        self.is_active = !self.is_active;
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "habits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub target_days_per_week: i32,
    pub start_date: DateTimeUtc,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::streaks::Entity")]
    Streaks,
}

impl Related<super::streaks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Streaks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Habit> for ActiveModel {
    fn from(value: &Habit) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            description: ActiveValue::Set(value.description.clone()),
            frequency: ActiveValue::Set(value.frequency.as_str().to_string()),
            target_days_per_week: ActiveValue::Set(value.target_days_per_week),
            start_date: ActiveValue::Set(value.start_date),
            is_active: ActiveValue::Set(value.is_active),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Habit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "habit")?,
            user_id: model.user_id,
            name: model.name,
            description: model.description,
            frequency: HabitFrequency::try_from(model.frequency.as_str())?,
            target_days_per_week: model.target_days_per_week,
            start_date: model.start_date,
            is_active: model.is_active,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(target: Option<i32>) -> HabitNew {
        HabitNew {
            name: "Read".to_string(),
            description: None,
            frequency: HabitFrequency::Daily,
            target_days_per_week: target,
            start_date: None,
            is_active: None,
            notes: None,
        }
    }

    #[test]
    fn defaults_apply_on_create() {
        let now = Utc::now();
        let habit = Habit::new("alice", input(None), now).unwrap();

        assert_eq!(habit.target_days_per_week, 7);
        assert_eq!(habit.start_date, now);
        assert!(habit.is_active);
    }

    #[test]
    fn target_days_must_fit_a_week() {
        assert!(Habit::new("alice", input(Some(0)), Utc::now()).is_err());
        assert!(Habit::new("alice", input(Some(8)), Utc::now()).is_err());
        assert!(Habit::new("alice", input(Some(3)), Utc::now()).is_ok());
    }

    #[test]
    fn toggle_flips_active_flag() {
        let mut habit = Habit::new("alice", input(None), Utc::now()).unwrap();
        habit.toggle_active();
        assert!(!habit.is_active);
        habit.toggle_active();
        assert!(habit.is_active);
    }
}
