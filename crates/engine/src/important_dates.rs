//! The module contains `ImportantDate` struct and its implementation.

use api_types::reminders::{DateType, ImportantDateNew, RecurrencePattern};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{optional_text, parse_id, required_text},
};

/// A birthday, anniversary or any other date worth remembering.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportantDate {
    pub id: Uuid,
    pub user_id: String,
    pub person_name: String,
    pub date_type: DateType,
    pub date_value: DateTime<Utc>,
    pub recurrence_pattern: RecurrencePattern,
    pub relationship: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ImportantDate {
    pub fn new(user_id: &str, input: ImportantDateNew, now: DateTime<Utc>) -> ResultEngine<Self> {
        let mut date = Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            person_name: String::new(),
            date_type: DateType::default(),
            date_value: input.date_value,
            recurrence_pattern: RecurrencePattern::default(),
            relationship: None,
            notes: None,
            is_active: true,
            created_at: now,
        };
        date.apply(input)?;
        Ok(date)
    }

    /// Replace every mutable field with the validated input. A missing
    /// `is_active` keeps the current flag.
    pub fn apply(&mut self, input: ImportantDateNew) -> ResultEngine<()> {
        self.person_name = required_text(&input.person_name, "person_name", 200)?;
        self.relationship = optional_text(input.relationship, "relationship", 100)?;
        self.notes = optional_text(input.notes, "notes", 1000)?;
        self.date_type = input.date_type;
        self.date_value = input.date_value;
        self.recurrence_pattern = input.recurrence_pattern;
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
        Ok(())
    }

    /// The next occurrence on or after the calendar day of `today`.
    ///
    /// Annual dates keep their month, day and time of day; a Feb 29 date
    /// falls on Feb 28 in non-leap years. One-off dates yield themselves until
    /// they are past. Inactive dates never occur.
    pub fn next_occurrence(&self, today: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.is_active {
            return None;
        }
        let today_day = today.date_naive();
        match self.recurrence_pattern {
            RecurrencePattern::Once => {
                (self.date_value.date_naive() >= today_day).then_some(self.date_value)
            }
            RecurrencePattern::Annual => {
                let this_year = self.anniversary_in(today.year())?;
                if this_year.date_naive() >= today_day {
                    Some(this_year)
                } else {
                    self.anniversary_in(today.year() + 1)
                }
            }
        }
    }

    fn anniversary_in(&self, year: i32) -> Option<DateTime<Utc>> {
        let (month, day) = (self.date_value.month(), self.date_value.day());
        let date = NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
            (month == 2 && day == 29)
                .then(|| NaiveDate::from_ymd_opt(year, 2, 28))
                .flatten()
        })?;
        Some(date.and_time(self.date_value.time()).and_utc())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "important_dates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub person_name: String,
    pub date_type: String,
    pub date_value: DateTimeUtc,
    pub recurrence_pattern: String,
    pub relationship: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reminders::Entity")]
    Reminders,
}

impl Related<super::reminders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reminders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ImportantDate> for ActiveModel {
    fn from(value: &ImportantDate) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            person_name: ActiveValue::Set(value.person_name.clone()),
            date_type: ActiveValue::Set(value.date_type.as_str().to_string()),
            date_value: ActiveValue::Set(value.date_value),
            recurrence_pattern: ActiveValue::Set(value.recurrence_pattern.as_str().to_string()),
            relationship: ActiveValue::Set(value.relationship.clone()),
            notes: ActiveValue::Set(value.notes.clone()),
            is_active: ActiveValue::Set(value.is_active),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for ImportantDate {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "important_date")?,
            user_id: model.user_id,
            person_name: model.person_name,
            date_type: DateType::try_from(model.date_type.as_str())?,
            date_value: model.date_value,
            recurrence_pattern: RecurrencePattern::try_from(model.recurrence_pattern.as_str())?,
            relationship: model.relationship,
            notes: model.notes,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn date(value: DateTime<Utc>, pattern: RecurrencePattern) -> ImportantDate {
        ImportantDate::new(
            "alice",
            ImportantDateNew {
                person_name: "Grandma".to_string(),
                date_type: DateType::Birthday,
                date_value: value,
                recurrence_pattern: pattern,
                relationship: Some("family".to_string()),
                notes: None,
                is_active: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn annual_date_rolls_to_next_year_once_passed() {
        let birthday = date(
            Utc.with_ymd_and_hms(1950, 3, 10, 8, 0, 0).unwrap(),
            RecurrencePattern::Annual,
        );

        let before = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            birthday.next_occurrence(before),
            Some(Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap())
        );

        // Later on the same day still counts as today.
        let same_day = Utc.with_ymd_and_hms(2025, 3, 10, 20, 0, 0).unwrap();
        assert_eq!(
            birthday.next_occurrence(same_day),
            Some(Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap())
        );

        let after = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap();
        assert_eq!(
            birthday.next_occurrence(after),
            Some(Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn leap_day_falls_back_to_feb_28() {
        let leap = date(
            Utc.with_ymd_and_hms(2000, 2, 29, 0, 0, 0).unwrap(),
            RecurrencePattern::Annual,
        );
        let today = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            leap.next_occurrence(today),
            Some(Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap())
        );

        let today = Utc.with_ymd_and_hms(2027, 12, 1, 0, 0, 0).unwrap();
        assert_eq!(
            leap.next_occurrence(today),
            Some(Utc.with_ymd_and_hms(2028, 2, 29, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn one_off_date_expires() {
        let wedding = date(
            Utc.with_ymd_and_hms(2025, 6, 1, 15, 0, 0).unwrap(),
            RecurrencePattern::Once,
        );
        let before = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();

        assert_eq!(wedding.next_occurrence(before), Some(wedding.date_value));
        assert_eq!(wedding.next_occurrence(after), None);
    }

    #[test]
    fn inactive_date_has_no_occurrence() {
        let mut birthday = date(Utc::now(), RecurrencePattern::Annual);
        birthday.is_active = false;
        assert_eq!(birthday.next_occurrence(Utc::now()), None);
    }
}
