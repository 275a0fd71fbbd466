//! The module contains `Bill` struct and its implementation.

use api_types::bills::{BillNew, BillStatus, BillingFrequency};
use chrono::{DateTime, Duration, Months, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{non_negative, optional_text, parse_id, required_text},
};

/// A recurring (or one-off) amount owed to a [`Payee`](crate::Payee).
#[derive(Clone, Debug, PartialEq)]
pub struct Bill {
    pub id: Uuid,
    pub user_id: String,
    pub payee_id: Uuid,
    pub name: String,
    /// Amount due, in minor units.
    pub amount_minor: i64,
    pub due_date: DateTime<Utc>,
    pub billing_frequency: BillingFrequency,
    pub status: BillStatus,
    pub is_autopay: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    pub fn new(user_id: &str, input: BillNew, now: DateTime<Utc>) -> ResultEngine<Self> {
        let mut bill = Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            payee_id: input.payee_id,
            name: String::new(),
            amount_minor: 0,
            due_date: input.due_date,
            billing_frequency: BillingFrequency::default(),
            status: BillStatus::default(),
            is_autopay: false,
            notes: None,
            created_at: now,
        };
        bill.apply(input)?;
        Ok(bill)
    }

    /// Replace every mutable field with the validated input.
    pub fn apply(&mut self, input: BillNew) -> ResultEngine<()> {
        non_negative(input.amount_minor, "amount_minor")?;
        self.name = required_text(&input.name, "name", 200)?;
        self.notes = optional_text(input.notes, "notes", 1000)?;
        self.payee_id = input.payee_id;
        self.amount_minor = input.amount_minor;
        self.due_date = input.due_date;
        self.billing_frequency = input.billing_frequency;
        self.status = input.status;
        self.is_autopay = input.is_autopay;
        Ok(())
    }

    pub fn mark_paid(&mut self) -> ResultEngine<()> {
        if self.status == BillStatus::Cancelled {
            return Err(EngineError::InvalidState(
                "a cancelled bill cannot be paid".to_string(),
            ));
        }
        self.status = BillStatus::Paid;
        Ok(())
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, BillStatus::Pending | BillStatus::Overdue) && self.due_date < now
    }

    /// The due date advanced by one billing period, `None` for one-time bills.
    pub fn next_due_date(&self) -> Option<DateTime<Utc>> {
        match self.billing_frequency {
            BillingFrequency::OneTime => None,
            BillingFrequency::Weekly => self.due_date.checked_add_signed(Duration::weeks(1)),
            BillingFrequency::BiWeekly => self.due_date.checked_add_signed(Duration::weeks(2)),
            BillingFrequency::Monthly => self.due_date.checked_add_months(Months::new(1)),
            BillingFrequency::Quarterly => self.due_date.checked_add_months(Months::new(3)),
            BillingFrequency::SemiAnnually => self.due_date.checked_add_months(Months::new(6)),
            BillingFrequency::Annually => self.due_date.checked_add_months(Months::new(12)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub payee_id: String,
    pub name: String,
    pub amount_minor: i64,
    pub due_date: DateTimeUtc,
    pub billing_frequency: String,
    pub status: String,
    pub is_autopay: bool,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payees::Entity",
        from = "Column::PayeeId",
        to = "super::payees::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Payees,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::payees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payees.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Bill> for ActiveModel {
    fn from(value: &Bill) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            payee_id: ActiveValue::Set(value.payee_id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            due_date: ActiveValue::Set(value.due_date),
            billing_frequency: ActiveValue::Set(value.billing_frequency.as_str().to_string()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            is_autopay: ActiveValue::Set(value.is_autopay),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Bill {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "bill")?,
            user_id: model.user_id,
            payee_id: parse_id(&model.payee_id, "payee")?,
            name: model.name,
            amount_minor: model.amount_minor,
            due_date: model.due_date,
            billing_frequency: BillingFrequency::try_from(model.billing_frequency.as_str())?,
            status: BillStatus::try_from(model.status.as_str())?,
            is_autopay: model.is_autopay,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn bill(frequency: BillingFrequency, status: BillStatus) -> Bill {
        Bill::new(
            "alice",
            BillNew {
                payee_id: Uuid::new_v4(),
                name: "Electricity".to_string(),
                amount_minor: 8_950,
                due_date: Utc.with_ymd_and_hms(2025, 1, 31, 9, 0, 0).unwrap(),
                billing_frequency: frequency,
                status,
                is_autopay: false,
                notes: None,
            },
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn pending_bill_past_due_is_overdue() {
        let bill = bill(BillingFrequency::Monthly, BillStatus::Pending);
        let after = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2025, 1, 30, 0, 0, 0).unwrap();

        assert!(bill.is_overdue(after));
        assert!(!bill.is_overdue(before));
    }

    #[test]
    fn paid_bill_is_never_overdue() {
        let mut bill = bill(BillingFrequency::Monthly, BillStatus::Pending);
        bill.mark_paid().unwrap();

        assert_eq!(bill.status, BillStatus::Paid);
        assert!(!bill.is_overdue(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn cancelled_bill_cannot_be_paid() {
        let mut bill = bill(BillingFrequency::Monthly, BillStatus::Cancelled);
        assert!(matches!(bill.mark_paid(), Err(EngineError::InvalidState(_))));
    }

    #[test]
    fn next_due_date_follows_frequency() {
        let monthly = bill(BillingFrequency::Monthly, BillStatus::Pending);
        // Jan 31 + 1 month clamps to the end of February.
        assert_eq!(
            monthly.next_due_date(),
            Some(Utc.with_ymd_and_hms(2025, 2, 28, 9, 0, 0).unwrap())
        );

        let weekly = bill(BillingFrequency::BiWeekly, BillStatus::Pending);
        assert_eq!(
            weekly.next_due_date(),
            Some(Utc.with_ymd_and_hms(2025, 2, 14, 9, 0, 0).unwrap())
        );

        let once = bill(BillingFrequency::OneTime, BillStatus::Pending);
        assert_eq!(once.next_due_date(), None);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut bill = bill(BillingFrequency::Monthly, BillStatus::Pending);
        let err = bill
            .apply(BillNew {
                payee_id: bill.payee_id,
                name: "Electricity".to_string(),
                amount_minor: -1,
                due_date: bill.due_date,
                billing_frequency: BillingFrequency::Monthly,
                status: BillStatus::Pending,
                is_autopay: false,
                notes: None,
            })
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidValue("amount_minor must be >= 0".to_string())
        );
    }
}
