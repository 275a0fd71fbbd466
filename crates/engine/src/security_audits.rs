//! The module contains `SecurityAudit` struct and its implementation.

use api_types::accounts::{AuditStatus, AuditType, SecurityAuditUpdate};
use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{optional_text, parse_id},
};

/// The outcome of reviewing an [`Account`](crate::Account).
#[derive(Clone, Debug, PartialEq)]
pub struct SecurityAudit {
    pub id: Uuid,
    pub account_id: Uuid,
    pub audit_type: AuditType,
    pub status: AuditStatus,
    /// Clamped into `0..=100`.
    pub security_score: i32,
    pub findings: Option<String>,
    pub recommendations: Option<String>,
    pub audit_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SecurityAudit {
    pub fn new(
        account_id: Uuid,
        input: SecurityAuditUpdate,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let mut audit = Self {
            id: Uuid::new_v4(),
            account_id,
            audit_type: AuditType::default(),
            status: AuditStatus::default(),
            security_score: 0,
            findings: None,
            recommendations: None,
            audit_date: input.audit_date,
            created_at: now,
        };
        audit.apply(input)?;
        Ok(audit)
    }

    pub fn apply(&mut self, input: SecurityAuditUpdate) -> ResultEngine<()> {
        self.findings = optional_text(input.findings, "findings", 2000)?;
        self.recommendations = optional_text(input.recommendations, "recommendations", 2000)?;
        self.audit_type = input.audit_type;
        self.status = input.status;
        self.security_score = input.security_score.clamp(0, 100);
        self.audit_date = input.audit_date;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "security_audits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub audit_type: String,
    pub status: String,
    pub security_score: i32,
    pub findings: Option<String>,
    pub recommendations: Option<String>,
    pub audit_date: DateTimeUtc,
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

impl From<&SecurityAudit> for ActiveModel {
    fn from(value: &SecurityAudit) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            account_id: ActiveValue::Set(value.account_id.to_string()),
            audit_type: ActiveValue::Set(value.audit_type.as_str().to_string()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            security_score: ActiveValue::Set(value.security_score),
            findings: ActiveValue::Set(value.findings.clone()),
            recommendations: ActiveValue::Set(value.recommendations.clone()),
            audit_date: ActiveValue::Set(value.audit_date),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for SecurityAudit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "security_audit")?,
            account_id: parse_id(&model.account_id, "account")?,
            audit_type: AuditType::try_from(model.audit_type.as_str())?,
            status: AuditStatus::try_from(model.status.as_str())?,
            security_score: model.security_score,
            findings: model.findings,
            recommendations: model.recommendations,
            audit_date: model.audit_date,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_clamped() {
        let input = |score| SecurityAuditUpdate {
            audit_type: AuditType::Manual,
            status: AuditStatus::Completed,
            security_score: score,
            findings: Some("reused password".to_string()),
            recommendations: None,
            audit_date: Utc::now(),
        };

        let high = SecurityAudit::new(Uuid::new_v4(), input(140), Utc::now()).unwrap();
        let low = SecurityAudit::new(Uuid::new_v4(), input(-5), Utc::now()).unwrap();

        assert_eq!(high.security_score, 100);
        assert_eq!(low.security_score, 0);
    }
}
