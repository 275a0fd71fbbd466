//! The module contains `Warranty` struct and its implementation.

use api_types::warranties::{WarrantyNew, WarrantyStatus, WarrantyType, WarrantyUpdate};
use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{append_note, days_until, optional_text, parse_id, required_text},
};

const NOTES_MAX_LEN: usize = 2000;
/// Active warranties ending within this many days are flagged.
pub const EXPIRING_SOON_DAYS: i64 = 30;

/// Coverage attached to a [`Purchase`](crate::Purchase).
///
/// Claims follow `active -> claim_filed -> claim_approved | claim_rejected`.
/// Any warranty can be expired or voided.
#[derive(Clone, Debug, PartialEq)]
pub struct Warranty {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub warranty_type: WarrantyType,
    pub provider: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub duration_months: i32,
    pub coverage_details: Option<String>,
    pub registration_number: Option<String>,
    pub status: WarrantyStatus,
    pub claim_filed_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Warranty {
    pub fn new(input: WarrantyNew) -> ResultEngine<Self> {
        let mut warranty = Self {
            id: Uuid::new_v4(),
            purchase_id: input.purchase_id,
            warranty_type: WarrantyType::default(),
            provider: None,
            start_date: input.start_date,
            end_date: input.end_date,
            duration_months: 0,
            coverage_details: None,
            registration_number: None,
            status: WarrantyStatus::Active,
            claim_filed_date: None,
            notes: None,
        };
        warranty.apply(WarrantyUpdate {
            warranty_type: input.warranty_type,
            provider: input.provider,
            start_date: input.start_date,
            end_date: input.end_date,
            duration_months: input.duration_months,
            coverage_details: input.coverage_details,
            registration_number: input.registration_number,
            status: WarrantyStatus::Active,
            notes: input.notes,
        })?;
        Ok(warranty)
    }

    pub fn apply(&mut self, input: WarrantyUpdate) -> ResultEngine<()> {
        if input.end_date < input.start_date {
            return Err(EngineError::InvalidValue(
                "end_date must not precede start_date".to_string(),
            ));
        }
        if input.duration_months < 0 {
            return Err(EngineError::InvalidValue(
                "duration_months must be >= 0".to_string(),
            ));
        }
        self.provider = optional_text(input.provider, "provider", 200)?;
        self.coverage_details = optional_text(input.coverage_details, "coverage_details", 2000)?;
        self.registration_number =
            optional_text(input.registration_number, "registration_number", 100)?;
        self.notes = optional_text(input.notes, "notes", NOTES_MAX_LEN)?;
        self.warranty_type = input.warranty_type;
        self.start_date = input.start_date;
        self.end_date = input.end_date;
        self.duration_months = input.duration_months;
        self.status = input.status;
        Ok(())
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == WarrantyStatus::Active && self.end_date > now
    }

    pub fn is_expiring_soon(&self, now: DateTime<Utc>) -> bool {
        self.is_active(now) && self.end_date - now <= Duration::days(EXPIRING_SOON_DAYS)
    }

    /// Whole days of coverage left, rounded up; zero unless active.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        if !self.is_active(now) {
            return 0;
        }
        days_until(now, self.end_date)
    }

    pub fn file_claim(&mut self, now: DateTime<Utc>) -> ResultEngine<()> {
        self.require_status(WarrantyStatus::Active, "file a claim")?;
        self.status = WarrantyStatus::ClaimFiled;
        self.claim_filed_date = Some(now);
        Ok(())
    }

    pub fn approve_claim(&mut self) -> ResultEngine<()> {
        self.require_status(WarrantyStatus::ClaimFiled, "approve a claim")?;
        self.status = WarrantyStatus::ClaimApproved;
        Ok(())
    }

    pub fn reject_claim(&mut self, reason: &str) -> ResultEngine<()> {
        self.require_status(WarrantyStatus::ClaimFiled, "reject a claim")?;
        let reason = required_text(reason, "reason", 500)?;
        append_note(
            &mut self.notes,
            format!("Claim rejected: {reason}"),
            NOTES_MAX_LEN,
        )?;
        self.status = WarrantyStatus::ClaimRejected;
        Ok(())
    }

    pub fn mark_as_expired(&mut self) {
        self.status = WarrantyStatus::Expired;
    }

    pub fn void_warranty(&mut self, reason: &str) -> ResultEngine<()> {
        let reason = required_text(reason, "reason", 500)?;
        append_note(&mut self.notes, format!("Voided: {reason}"), NOTES_MAX_LEN)?;
        self.status = WarrantyStatus::Voided;
        Ok(())
    }

    fn require_status(&self, expected: WarrantyStatus, action: &str) -> ResultEngine<()> {
        if self.status != expected {
            return Err(EngineError::InvalidState(format!(
                "cannot {action} on a {} warranty",
                self.status
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "warranties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub purchase_id: String,
    pub warranty_type: String,
    pub provider: Option<String>,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub duration_months: i32,
    pub coverage_details: Option<String>,
    pub registration_number: Option<String>,
    pub status: String,
    pub claim_filed_date: Option<DateTimeUtc>,
    pub notes: Option<String>,
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

impl From<&Warranty> for ActiveModel {
    fn from(value: &Warranty) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            purchase_id: ActiveValue::Set(value.purchase_id.to_string()),
            warranty_type: ActiveValue::Set(value.warranty_type.as_str().to_string()),
            provider: ActiveValue::Set(value.provider.clone()),
            start_date: ActiveValue::Set(value.start_date),
            end_date: ActiveValue::Set(value.end_date),
            duration_months: ActiveValue::Set(value.duration_months),
            coverage_details: ActiveValue::Set(value.coverage_details.clone()),
            registration_number: ActiveValue::Set(value.registration_number.clone()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            claim_filed_date: ActiveValue::Set(value.claim_filed_date),
            notes: ActiveValue::Set(value.notes.clone()),
        }
    }
}

impl TryFrom<Model> for Warranty {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "warranty")?,
            purchase_id: parse_id(&model.purchase_id, "purchase")?,
            warranty_type: WarrantyType::try_from(model.warranty_type.as_str())?,
            provider: model.provider,
            start_date: model.start_date,
            end_date: model.end_date,
            duration_months: model.duration_months,
            coverage_details: model.coverage_details,
            registration_number: model.registration_number,
            status: WarrantyStatus::try_from(model.status.as_str())?,
            claim_filed_date: model.claim_filed_date,
            notes: model.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn warranty(days_left: i64) -> Warranty {
        Warranty::new(WarrantyNew {
            purchase_id: Uuid::new_v4(),
            warranty_type: WarrantyType::Extended,
            provider: Some("Acme Care".to_string()),
            start_date: now() - Duration::days(300),
            end_date: now() + Duration::days(days_left),
            duration_months: 12,
            coverage_details: None,
            registration_number: None,
            notes: None,
        })
        .unwrap()
    }

    #[test]
    fn activity_and_remaining_days() {
        let long = warranty(90);
        assert!(long.is_active(now()));
        assert!(!long.is_expiring_soon(now()));
        assert_eq!(long.days_remaining(now()), 90);

        let short = warranty(10);
        assert!(short.is_expiring_soon(now()));

        let ended = warranty(0);
        assert!(!ended.is_active(now()));
        assert_eq!(ended.days_remaining(now()), 0);
    }

    #[test]
    fn partial_day_counts_as_a_day() {
        let mut warranty = warranty(0);
        warranty.end_date = now() + Duration::hours(36);
        assert_eq!(warranty.days_remaining(now()), 2);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = Warranty::new(WarrantyNew {
            purchase_id: Uuid::new_v4(),
            warranty_type: WarrantyType::Store,
            provider: None,
            start_date: now(),
            end_date: now() - Duration::days(1),
            duration_months: 0,
            coverage_details: None,
            registration_number: None,
            notes: None,
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidValue(_)));
    }

    #[test]
    fn claim_lifecycle() {
        let mut warranty = warranty(90);
        assert!(warranty.approve_claim().is_err());

        warranty.file_claim(now()).unwrap();
        assert_eq!(warranty.status, WarrantyStatus::ClaimFiled);
        assert_eq!(warranty.claim_filed_date, Some(now()));
        assert!(!warranty.is_active(now()));
        assert!(matches!(
            warranty.file_claim(now()),
            Err(EngineError::InvalidState(_))
        ));

        warranty.reject_claim("water damage").unwrap();
        assert_eq!(warranty.status, WarrantyStatus::ClaimRejected);
        assert_eq!(warranty.notes.as_deref(), Some("Claim rejected: water damage"));
    }

    #[test]
    fn approve_after_filing() {
        let mut warranty = warranty(90);
        warranty.file_claim(now()).unwrap();
        warranty.approve_claim().unwrap();
        assert_eq!(warranty.status, WarrantyStatus::ClaimApproved);
    }

    #[test]
    fn void_and_expire() {
        let mut warranty = warranty(90);
        warranty.void_warranty("sold the item").unwrap();
        assert_eq!(warranty.status, WarrantyStatus::Voided);
        assert_eq!(warranty.notes.as_deref(), Some("Voided: sold the item"));
        assert_eq!(warranty.days_remaining(now()), 0);

        warranty.mark_as_expired();
        assert_eq!(warranty.status, WarrantyStatus::Expired);
    }
}
