//! The module contains `ReturnWindow` struct and its implementation.

use api_types::warranties::{ReturnWindowNew, ReturnWindowStatus, ReturnWindowUpdate};
use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{days_until, optional_text, parse_id},
};

/// Open windows ending within this many days are flagged.
pub const CLOSING_SOON_DAYS: i64 = 7;

/// The period during which a [`Purchase`](crate::Purchase) can be taken back
/// to the store.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnWindow {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub duration_days: i32,
    pub policy_details: Option<String>,
    pub restocking_fee_percent: Option<f64>,
    pub status: ReturnWindowStatus,
}

impl ReturnWindow {
    pub fn new(input: ReturnWindowNew) -> ResultEngine<Self> {
        let mut window = Self {
            id: Uuid::new_v4(),
            purchase_id: input.purchase_id,
            start_date: input.start_date,
            end_date: input.end_date,
            duration_days: 0,
            policy_details: None,
            restocking_fee_percent: None,
            status: ReturnWindowStatus::Open,
        };
        window.apply(ReturnWindowUpdate {
            start_date: input.start_date,
            end_date: input.end_date,
            duration_days: input.duration_days,
            policy_details: input.policy_details,
            restocking_fee_percent: input.restocking_fee_percent,
            status: ReturnWindowStatus::Open,
        })?;
        Ok(window)
    }

    pub fn apply(&mut self, input: ReturnWindowUpdate) -> ResultEngine<()> {
        if input.end_date < input.start_date {
            return Err(EngineError::InvalidValue(
                "end_date must not precede start_date".to_string(),
            ));
        }
        if input.duration_days < 0 {
            return Err(EngineError::InvalidValue(
                "duration_days must be >= 0".to_string(),
            ));
        }
        if let Some(fee) = input.restocking_fee_percent
            && !(0.0..=100.0).contains(&fee)
        {
            return Err(EngineError::InvalidValue(
                "restocking_fee_percent must be between 0 and 100".to_string(),
            ));
        }
        self.policy_details = optional_text(input.policy_details, "policy_details", 2000)?;
        self.start_date = input.start_date;
        self.end_date = input.end_date;
        self.duration_days = input.duration_days;
        self.restocking_fee_percent = input.restocking_fee_percent;
        self.status = input.status;
        Ok(())
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == ReturnWindowStatus::Open && self.start_date <= now && now <= self.end_date
    }

    pub fn is_closing_soon(&self, now: DateTime<Utc>) -> bool {
        self.is_open(now) && self.end_date - now <= Duration::days(CLOSING_SOON_DAYS)
    }

    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        if !self.is_open(now) {
            return 0;
        }
        days_until(now, self.end_date)
    }

    pub fn mark_as_used(&mut self) -> ResultEngine<()> {
        if self.status != ReturnWindowStatus::Open {
            return Err(EngineError::InvalidState(format!(
                "a {} return window cannot be used",
                self.status
            )));
        }
        self.status = ReturnWindowStatus::Used;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "return_windows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub purchase_id: String,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub duration_days: i32,
    pub policy_details: Option<String>,
    pub restocking_fee_percent: Option<f64>,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchases::Entity",
        from = "Column::PurchaseId",
        to = "super::purchases::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Purchases,
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ReturnWindow> for ActiveModel {
    fn from(value: &ReturnWindow) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            purchase_id: ActiveValue::Set(value.purchase_id.to_string()),
            start_date: ActiveValue::Set(value.start_date),
            end_date: ActiveValue::Set(value.end_date),
            duration_days: ActiveValue::Set(value.duration_days),
            policy_details: ActiveValue::Set(value.policy_details.clone()),
            restocking_fee_percent: ActiveValue::Set(value.restocking_fee_percent),
            status: ActiveValue::Set(value.status.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for ReturnWindow {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "return_window")?,
            purchase_id: parse_id(&model.purchase_id, "purchase")?,
            start_date: model.start_date,
            end_date: model.end_date,
            duration_days: model.duration_days,
            policy_details: model.policy_details,
            restocking_fee_percent: model.restocking_fee_percent,
            status: ReturnWindowStatus::try_from(model.status.as_str())?,
        })
    }
}
