//! The module contains `Purchase` struct and its implementation.

use api_types::warranties::{PurchaseNew, PurchaseStatus};
use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, ReturnWindow, Warranty,
    util::{append_note, non_negative, optional_text, parse_id, required_text},
};

const NOTES_MAX_LEN: usize = 2000;

/// A product bought by the user, the parent of its warranties and return
/// windows.
#[derive(Clone, Debug, PartialEq)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: String,
    pub product_name: String,
    pub category: Option<String>,
    pub store_name: Option<String>,
    pub purchase_date: DateTime<Utc>,
    pub price_minor: i64,
    pub model_number: Option<String>,
    pub serial_number: Option<String>,
    pub status: PurchaseStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    pub fn new(user_id: &str, input: PurchaseNew, now: DateTime<Utc>) -> ResultEngine<Self> {
        let mut purchase = Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            product_name: String::new(),
            category: None,
            store_name: None,
            purchase_date: input.purchase_date,
            price_minor: 0,
            model_number: None,
            serial_number: None,
            status: PurchaseStatus::default(),
            notes: None,
            created_at: now,
        };
        purchase.apply(input)?;
        Ok(purchase)
    }

    pub fn apply(&mut self, input: PurchaseNew) -> ResultEngine<()> {
        non_negative(input.price_minor, "price_minor")?;
        self.product_name = required_text(&input.product_name, "product_name", 200)?;
        self.category = optional_text(input.category, "category", 100)?;
        self.store_name = optional_text(input.store_name, "store_name", 200)?;
        self.model_number = optional_text(input.model_number, "model_number", 100)?;
        self.serial_number = optional_text(input.serial_number, "serial_number", 100)?;
        self.notes = optional_text(input.notes, "notes", NOTES_MAX_LEN)?;
        self.purchase_date = input.purchase_date;
        self.price_minor = input.price_minor;
        self.status = input.status;
        Ok(())
    }

    pub fn mark_as_returned(&mut self, returned_on: DateTime<Utc>) -> ResultEngine<()> {
        self.require_active("returned")?;
        append_note(
            &mut self.notes,
            format!("Returned on {}", returned_on.format("%Y-%m-%d")),
            NOTES_MAX_LEN,
        )?;
        self.status = PurchaseStatus::Returned;
        Ok(())
    }

    pub fn mark_as_disposed(&mut self) -> ResultEngine<()> {
        self.require_active("disposed")?;
        self.status = PurchaseStatus::Disposed;
        Ok(())
    }

    pub fn has_active_warranty(&self, warranties: &[Warranty], now: DateTime<Utc>) -> bool {
        warranties
            .iter()
            .any(|w| w.purchase_id == self.id && w.is_active(now))
    }

    /// A purchase can go back to the store while it is still held and one of
    /// its return windows is open.
    pub fn can_be_returned(&self, windows: &[ReturnWindow], now: DateTime<Utc>) -> bool {
        self.status == PurchaseStatus::Active
            && windows
                .iter()
                .any(|w| w.purchase_id == self.id && w.is_open(now))
    }

    fn require_active(&self, action: &str) -> ResultEngine<()> {
        if self.status != PurchaseStatus::Active {
            return Err(EngineError::InvalidState(format!(
                "a {} purchase cannot be {action}",
                self.status
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub product_name: String,
    pub category: Option<String>,
    pub store_name: Option<String>,
    pub purchase_date: DateTimeUtc,
    pub price_minor: i64,
    pub model_number: Option<String>,
    pub serial_number: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::warranties::Entity")]
    Warranties,
    #[sea_orm(has_many = "super::return_windows::Entity")]
    ReturnWindows,
}

impl Related<super::warranties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warranties.def()
    }
}

impl Related<super::return_windows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReturnWindows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Purchase> for ActiveModel {
    fn from(value: &Purchase) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            product_name: ActiveValue::Set(value.product_name.clone()),
            category: ActiveValue::Set(value.category.clone()),
            store_name: ActiveValue::Set(value.store_name.clone()),
            purchase_date: ActiveValue::Set(value.purchase_date),
            price_minor: ActiveValue::Set(value.price_minor),
            model_number: ActiveValue::Set(value.model_number.clone()),
            serial_number: ActiveValue::Set(value.serial_number.clone()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Purchase {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "purchase")?,
            user_id: model.user_id,
            product_name: model.product_name,
            category: model.category,
            store_name: model.store_name,
            purchase_date: model.purchase_date,
            price_minor: model.price_minor,
            model_number: model.model_number,
            serial_number: model.serial_number,
            status: PurchaseStatus::try_from(model.status.as_str())?,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use api_types::warranties::{ReturnWindowNew, WarrantyNew, WarrantyType};
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 10, 0, 0).unwrap()
    }

    fn purchase(notes: Option<&str>) -> Purchase {
        Purchase::new(
            "alice",
            PurchaseNew {
                product_name: "Kettle".to_string(),
                category: Some("kitchen".to_string()),
                store_name: None,
                purchase_date: now() - Duration::days(5),
                price_minor: 3_999,
                model_number: None,
                serial_number: None,
                status: PurchaseStatus::Active,
                notes: notes.map(str::to_string),
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn returning_appends_a_note() {
        let mut purchase = purchase(Some("gift"));
        purchase.mark_as_returned(now()).unwrap();

        assert_eq!(purchase.status, PurchaseStatus::Returned);
        assert_eq!(purchase.notes.as_deref(), Some("gift\nReturned on 2025-03-15"));
        assert!(matches!(
            purchase.mark_as_returned(now()),
            Err(EngineError::InvalidState(_))
        ));
        assert!(purchase.mark_as_disposed().is_err());
    }

    #[test]
    fn return_note_must_fit_the_column() {
        let mut purchase = purchase(Some(&"x".repeat(NOTES_MAX_LEN)));
        assert!(matches!(
            purchase.mark_as_returned(now()),
            Err(EngineError::InvalidValue(_))
        ));
        assert_eq!(purchase.status, PurchaseStatus::Active);
    }

    #[test]
    fn warranty_and_window_checks() {
        let purchase = purchase(None);
        let warranty = Warranty::new(WarrantyNew {
            purchase_id: purchase.id,
            warranty_type: WarrantyType::Manufacturer,
            provider: None,
            start_date: now() - Duration::days(5),
            end_date: now() + Duration::days(365),
            duration_months: 12,
            coverage_details: None,
            registration_number: None,
            notes: None,
        })
        .unwrap();
        let window = ReturnWindow::new(ReturnWindowNew {
            purchase_id: purchase.id,
            start_date: now() - Duration::days(5),
            end_date: now() + Duration::days(25),
            duration_days: 30,
            policy_details: None,
            restocking_fee_percent: None,
        })
        .unwrap();

        assert!(purchase.has_active_warranty(std::slice::from_ref(&warranty), now()));
        assert!(!purchase.has_active_warranty(&[], now()));
        assert!(purchase.can_be_returned(std::slice::from_ref(&window), now()));
        assert!(!purchase.can_be_returned(&[window], now() + Duration::days(26)));
    }
}
