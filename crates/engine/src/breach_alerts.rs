//! The module contains `BreachAlert` struct and its implementation.

use api_types::accounts::{AlertStatus, BreachAlertUpdate, BreachSeverity};
use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{optional_text, parse_id, required_text},
};

/// A known data breach affecting an [`Account`](crate::Account).
#[derive(Clone, Debug, PartialEq)]
pub struct BreachAlert {
    pub id: Uuid,
    pub account_id: Uuid,
    pub severity: BreachSeverity,
    pub status: AlertStatus,
    pub description: String,
    pub source: Option<String>,
    pub breach_date: Option<DateTime<Utc>>,
    pub discovered_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BreachAlert {
    pub fn new(account_id: Uuid, input: BreachAlertUpdate, now: DateTime<Utc>) -> ResultEngine<Self> {
        let mut alert = Self {
            id: Uuid::new_v4(),
            account_id,
            severity: BreachSeverity::default(),
            status: AlertStatus::default(),
            description: String::new(),
            source: None,
            breach_date: None,
            discovered_at: input.discovered_at,
            notes: None,
            created_at: now,
        };
        alert.apply(input)?;
        Ok(alert)
    }

    pub fn apply(&mut self, input: BreachAlertUpdate) -> ResultEngine<()> {
        self.description = required_text(&input.description, "description", 1000)?;
        self.source = optional_text(input.source, "source", 200)?;
        self.notes = optional_text(input.notes, "notes", 1000)?;
        self.severity = input.severity;
        self.status = input.status;
        self.breach_date = input.breach_date;
        self.discovered_at = input.discovered_at;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "breach_alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub severity: String,
    pub status: String,
    pub description: String,
    pub source: Option<String>,
    pub breach_date: Option<DateTimeUtc>,
    pub discovered_at: DateTimeUtc,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BreachAlert> for ActiveModel {
    fn from(value: &BreachAlert) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            account_id: ActiveValue::Set(value.account_id.to_string()),
            severity: ActiveValue::Set(value.severity.as_str().to_string()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            description: ActiveValue::Set(value.description.clone()),
            source: ActiveValue::Set(value.source.clone()),
            breach_date: ActiveValue::Set(value.breach_date),
            discovered_at: ActiveValue::Set(value.discovered_at),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for BreachAlert {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "breach_alert")?,
            account_id: parse_id(&model.account_id, "account")?,
            severity: BreachSeverity::try_from(model.severity.as_str())?,
            status: AlertStatus::try_from(model.status.as_str())?,
            description: model.description,
            source: model.source,
            breach_date: model.breach_date,
            discovered_at: model.discovered_at,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}
