//! The module contains `Payment` struct and its implementation.

use api_types::bills::PaymentUpdate;
use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{optional_text, parse_id},
};

/// A single payment made against a [`Bill`](crate::Bill).
#[derive(Clone, Debug, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub amount_minor: i64,
    pub payment_date: DateTime<Utc>,
    pub payment_method: Option<String>,
    pub confirmation_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(bill_id: Uuid, input: PaymentUpdate, now: DateTime<Utc>) -> ResultEngine<Self> {
        let mut payment = Self {
            id: Uuid::new_v4(),
            bill_id,
            amount_minor: 0,
            payment_date: input.payment_date,
            payment_method: None,
            confirmation_number: None,
            notes: None,
            created_at: now,
        };
        payment.apply(input)?;
        Ok(payment)
    }

    pub fn apply(&mut self, input: PaymentUpdate) -> ResultEngine<()> {
        if input.amount_minor <= 0 {
            return Err(EngineError::InvalidValue(
                "amount_minor must be > 0".to_string(),
            ));
        }
        self.payment_method = optional_text(input.payment_method, "payment_method", 100)?;
        self.confirmation_number =
            optional_text(input.confirmation_number, "confirmation_number", 100)?;
        self.notes = optional_text(input.notes, "notes", 1000)?;
        self.amount_minor = input.amount_minor;
        self.payment_date = input.payment_date;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub bill_id: String,
    pub amount_minor: i64,
    pub payment_date: DateTimeUtc,
    pub payment_method: Option<String>,
    pub confirmation_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bills::Entity",
        from = "Column::BillId",
        to = "super::bills::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Bills,
}

impl Related<super::bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payment> for ActiveModel {
    fn from(value: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            bill_id: ActiveValue::Set(value.bill_id.to_string()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            payment_date: ActiveValue::Set(value.payment_date),
            payment_method: ActiveValue::Set(value.payment_method.clone()),
            confirmation_number: ActiveValue::Set(value.confirmation_number.clone()),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "payment")?,
            bill_id: parse_id(&model.bill_id, "bill")?,
            amount_minor: model.amount_minor,
            payment_date: model.payment_date,
            payment_method: model.payment_method,
            confirmation_number: model.confirmation_number,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(amount_minor: i64) -> PaymentUpdate {
        PaymentUpdate {
            amount_minor,
            payment_date: Utc::now(),
            payment_method: Some(" card ".to_string()),
            confirmation_number: None,
            notes: Some(String::new()),
        }
    }

    #[test]
    fn payment_requires_positive_amount() {
        assert!(Payment::new(Uuid::new_v4(), update(0), Utc::now()).is_err());

        let payment = Payment::new(Uuid::new_v4(), update(2_500), Utc::now()).unwrap();
        assert_eq!(payment.amount_minor, 2_500);
        assert_eq!(payment.payment_method.as_deref(), Some("card"));
        assert_eq!(payment.notes, None);
    }
}
