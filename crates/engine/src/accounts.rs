//! The module contains `Account` struct and its implementation.

use api_types::accounts::{AccountCategory, AccountNew, SecurityLevel};
use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{optional_text, parse_id, required_text},
};

/// Passwords older than this are due for a change.
pub const PASSWORD_MAX_AGE_DAYS: i64 = 90;

/// An online account whose security posture is being tracked.
///
/// `security_level` is derived: every mutation that touches the password or
/// the second factor recomputes it.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub user_id: String,
    pub account_name: String,
    pub username: String,
    pub website_url: Option<String>,
    pub category: AccountCategory,
    pub security_level: SecurityLevel,
    pub has_two_factor_auth: bool,
    pub last_password_change: Option<DateTime<Utc>>,
    pub last_access_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user_id: &str, input: AccountNew, now: DateTime<Utc>) -> ResultEngine<Self> {
        let mut account = Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            account_name: String::new(),
            username: String::new(),
            website_url: None,
            category: AccountCategory::default(),
            security_level: SecurityLevel::Unknown,
            has_two_factor_auth: false,
            last_password_change: None,
            last_access_date: None,
            notes: None,
            is_active: true,
            created_at: now,
        };
        account.apply(input, now)?;
        Ok(account)
    }

    pub fn apply(&mut self, input: AccountNew, now: DateTime<Utc>) -> ResultEngine<()> {
        self.account_name = required_text(&input.account_name, "account_name", 200)?;
        self.username = required_text(&input.username, "username", 200)?;
        self.website_url = optional_text(input.website_url, "website_url", 500)?;
        self.notes = optional_text(input.notes, "notes", 1000)?;
        self.category = input.category;
        self.has_two_factor_auth = input.has_two_factor_auth;
        self.last_password_change = input.last_password_change;
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
        self.security_level = self.calculate_security_level(now);
        Ok(())
    }

    /// True when no change was ever recorded or the last one is more than
    /// [`PASSWORD_MAX_AGE_DAYS`] old.
    pub fn needs_password_change(&self, now: DateTime<Utc>) -> bool {
        match self.last_password_change {
            None => true,
            Some(last) => now - last > Duration::days(PASSWORD_MAX_AGE_DAYS),
        }
    }

    pub fn calculate_security_level(&self, now: DateTime<Utc>) -> SecurityLevel {
        match (self.has_two_factor_auth, self.needs_password_change(now)) {
            (true, false) => SecurityLevel::High,
            (true, true) => SecurityLevel::Medium,
            (false, _) => SecurityLevel::Low,
        }
    }

    pub fn record_password_change(&mut self, now: DateTime<Utc>) {
        self.last_password_change = Some(now);
        self.security_level = self.calculate_security_level(now);
    }

    pub fn enable_two_factor_auth(&mut self, now: DateTime<Utc>) {
        self.has_two_factor_auth = true;
        self.security_level = self.calculate_security_level(now);
    }

    pub fn disable_two_factor_auth(&mut self, now: DateTime<Utc>) {
        self.has_two_factor_auth = false;
        self.security_level = self.calculate_security_level(now);
    }

    pub fn record_access(&mut self, now: DateTime<Utc>) {
        self.last_access_date = Some(now);
    }

    pub fn toggle_active(&mut self) {
        self.is_active = !self.is_active;
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub account_name: String,
    pub username: String,
    pub website_url: Option<String>,
    pub category: String,
    pub security_level: String,
    pub has_two_factor_auth: bool,
    pub last_password_change: Option<DateTimeUtc>,
    pub last_access_date: Option<DateTimeUtc>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::security_audits::Entity")]
    SecurityAudits,
    #[sea_orm(has_many = "super::breach_alerts::Entity")]
    BreachAlerts,
}

impl Related<super::security_audits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SecurityAudits.def()
    }
}

impl Related<super::breach_alerts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BreachAlerts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            account_name: ActiveValue::Set(value.account_name.clone()),
            username: ActiveValue::Set(value.username.clone()),
            website_url: ActiveValue::Set(value.website_url.clone()),
            category: ActiveValue::Set(value.category.as_str().to_string()),
            security_level: ActiveValue::Set(value.security_level.as_str().to_string()),
            has_two_factor_auth: ActiveValue::Set(value.has_two_factor_auth),
            last_password_change: ActiveValue::Set(value.last_password_change),
            last_access_date: ActiveValue::Set(value.last_access_date),
            notes: ActiveValue::Set(value.notes.clone()),
            is_active: ActiveValue::Set(value.is_active),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "account")?,
            user_id: model.user_id,
            account_name: model.account_name,
            username: model.username,
            website_url: model.website_url,
            category: AccountCategory::try_from(model.category.as_str())?,
            security_level: SecurityLevel::try_from(model.security_level.as_str())?,
            has_two_factor_auth: model.has_two_factor_auth,
            last_password_change: model.last_password_change,
            last_access_date: model.last_access_date,
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

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn account(two_factor: bool, changed: Option<DateTime<Utc>>) -> Account {
        Account::new(
            "alice",
            AccountNew {
                account_name: "Mail".to_string(),
                username: "alice@example.com".to_string(),
                website_url: None,
                category: AccountCategory::Email,
                has_two_factor_auth: two_factor,
                last_password_change: changed,
                notes: None,
                is_active: None,
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn password_age_boundary_is_ninety_days() {
        let exactly = account(false, Some(now() - Duration::days(90)));
        assert!(!exactly.needs_password_change(now()));

        let older = account(false, Some(now() - Duration::days(90) - Duration::seconds(1)));
        assert!(older.needs_password_change(now()));

        let never = account(false, None);
        assert!(never.needs_password_change(now()));
    }

    #[test]
    fn security_level_is_computed_on_create() {
        assert_eq!(
            account(true, Some(now())).security_level,
            SecurityLevel::High
        );
        assert_eq!(account(true, None).security_level, SecurityLevel::Medium);
        assert_eq!(account(false, Some(now())).security_level, SecurityLevel::Low);
    }

    #[test]
    fn mutators_recompute_security_level() {
        let mut account = account(false, None);
        account.enable_two_factor_auth(now());
        assert_eq!(account.security_level, SecurityLevel::Medium);

        account.record_password_change(now());
        assert_eq!(account.security_level, SecurityLevel::High);
        assert_eq!(account.last_password_change, Some(now()));

        account.disable_two_factor_auth(now());
        assert_eq!(account.security_level, SecurityLevel::Low);
    }

    #[test]
    fn access_and_toggle() {
        let mut account = account(false, None);
        account.record_access(now());
        account.toggle_active();

        assert_eq!(account.last_access_date, Some(now()));
        assert!(!account.is_active);
    }
}
