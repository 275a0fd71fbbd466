//! The module contains `Payee` struct and its implementation.

use api_types::bills::PayeeNew;
use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{optional_text, parse_id, required_text},
};

/// Someone a bill is paid to: a utility, a landlord, a card issuer.
#[derive(Clone, Debug, PartialEq)]
pub struct Payee {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub account_number: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payee {
    pub fn new(user_id: &str, input: PayeeNew, now: DateTime<Utc>) -> ResultEngine<Self> {
        let mut payee = Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name: String::new(),
            account_number: None,
            website: None,
            phone: None,
            notes: None,
            created_at: now,
        };
        payee.apply(input)?;
        Ok(payee)
    }

    /// Replace every mutable field with the validated input.
    pub fn apply(&mut self, input: PayeeNew) -> ResultEngine<()> {
        self.name = required_text(&input.name, "name", 200)?;
        self.account_number = optional_text(input.account_number, "account_number", 100)?;
        self.website = optional_text(input.website, "website", 500)?;
        self.phone = optional_text(input.phone, "phone", 50)?;
        self.notes = optional_text(input.notes, "notes", 1000)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub account_number: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bills::Entity")]
    Bills,
}

impl Related<super::bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payee> for ActiveModel {
    fn from(value: &Payee) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            account_number: ActiveValue::Set(value.account_number.clone()),
            website: ActiveValue::Set(value.website.clone()),
            phone: ActiveValue::Set(value.phone.clone()),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Payee {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "payee")?,
            user_id: model.user_id,
            name: model.name,
            account_number: model.account_number,
            website: model.website,
            phone: model.phone,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> PayeeNew {
        PayeeNew {
            name: name.to_string(),
            account_number: Some("  ".to_string()),
            website: Some(" https://power.example ".to_string()),
            phone: None,
            notes: None,
        }
    }

    #[test]
    fn new_payee_normalises_text() {
        let payee = Payee::new("alice", input("  Power Co "), Utc::now()).unwrap();

        assert_eq!(payee.name, "Power Co");
        assert_eq!(payee.account_number, None);
        assert_eq!(payee.website.as_deref(), Some("https://power.example"));
        assert_eq!(payee.user_id, "alice");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Payee::new("alice", input(" "), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidValue("name must not be empty".to_string())
        );
    }
}
