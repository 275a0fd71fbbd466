use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error returned when a stored or received enum value is not recognized.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a wire enum.
///
/// Each variant maps to a canonical snake_case string which is used both in
/// JSON and as the value stored by the engine in the database.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(#[default] $default:ident => $default_value:literal,)?
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
            Deserialize,
        )]
        pub enum $name {
            $(
                #[default]
                #[serde(rename = $default_value)]
                $default,
            )?
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// Returns the canonical string used by the engine/database.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$default => $default_value,)?
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = UnknownVariant;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value {
                    $($default_value => Ok(Self::$default),)?
                    $($value => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Generic list envelope returned by every `GET /api/{resource}` endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

pub mod bills {
    use super::*;

    wire_enum! {
        /// How often a bill comes due.
        BillingFrequency {
            #[default] Monthly => "monthly",
            OneTime => "one_time",
            Weekly => "weekly",
            BiWeekly => "bi_weekly",
            Quarterly => "quarterly",
            SemiAnnually => "semi_annually",
            Annually => "annually",
        }
    }

    wire_enum! {
        BillStatus {
            #[default] Pending => "pending",
            Paid => "paid",
            Overdue => "overdue",
            Cancelled => "cancelled",
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayeeNew {
        pub name: String,
        pub account_number: Option<String>,
        pub website: Option<String>,
        pub phone: Option<String>,
        pub notes: Option<String>,
    }

    pub type PayeeUpdate = PayeeNew;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct PayeeView {
        pub id: Uuid,
        pub user_id: String,
        pub name: String,
        pub account_number: Option<String>,
        pub website: Option<String>,
        pub phone: Option<String>,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillNew {
        pub payee_id: Uuid,
        pub name: String,
        pub amount_minor: i64,
        pub due_date: DateTime<Utc>,
        #[serde(default)]
        pub billing_frequency: BillingFrequency,
        #[serde(default)]
        pub status: BillStatus,
        #[serde(default)]
        pub is_autopay: bool,
        pub notes: Option<String>,
    }

    /// Full replacement of a bill. The payee may be changed to another payee
    /// owned by the same user.
    pub type BillUpdate = BillNew;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct BillFilter {
        pub payee_id: Option<Uuid>,
        pub status: Option<BillStatus>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BillView {
        pub id: Uuid,
        pub user_id: String,
        pub payee_id: Uuid,
        pub name: String,
        pub amount_minor: i64,
        pub due_date: DateTime<Utc>,
        pub billing_frequency: BillingFrequency,
        pub status: BillStatus,
        pub is_autopay: bool,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
        /// Derived: the bill is unpaid and past its due date.
        pub is_overdue: bool,
        /// Derived: due date of the following period, absent for one-time bills.
        pub next_due_date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub bill_id: Uuid,
        pub amount_minor: i64,
        pub payment_date: DateTime<Utc>,
        pub payment_method: Option<String>,
        pub confirmation_number: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentUpdate {
        pub amount_minor: i64,
        pub payment_date: DateTime<Utc>,
        pub payment_method: Option<String>,
        pub confirmation_number: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct PaymentFilter {
        pub bill_id: Option<Uuid>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct PaymentView {
        pub id: Uuid,
        pub bill_id: Uuid,
        pub amount_minor: i64,
        pub payment_date: DateTime<Utc>,
        pub payment_method: Option<String>,
        pub confirmation_number: Option<String>,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod reminders {
    use super::*;

    wire_enum! {
        DateType {
            #[default] Birthday => "birthday",
            Anniversary => "anniversary",
            Custom => "custom",
        }
    }

    wire_enum! {
        RecurrencePattern {
            #[default] Annual => "annual",
            Once => "once",
        }
    }

    wire_enum! {
        DeliveryChannel {
            #[default] Email => "email",
            Sms => "sms",
            Push => "push",
            InApp => "in_app",
        }
    }

    wire_enum! {
        ReminderStatus {
            #[default] Scheduled => "scheduled",
            Sent => "sent",
            Snoozed => "snoozed",
            Dismissed => "dismissed",
            Failed => "failed",
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImportantDateNew {
        pub person_name: String,
        #[serde(default)]
        pub date_type: DateType,
        pub date_value: DateTime<Utc>,
        #[serde(default)]
        pub recurrence_pattern: RecurrencePattern,
        pub relationship: Option<String>,
        pub notes: Option<String>,
        /// Defaults to `true`.
        pub is_active: Option<bool>,
    }

    pub type ImportantDateUpdate = ImportantDateNew;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ImportantDateFilter {
        pub active: Option<bool>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ImportantDateView {
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
        /// Derived: next occurrence on or after today, if any.
        pub next_occurrence: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReminderNew {
        pub important_date_id: Uuid,
        pub scheduled_time: DateTime<Utc>,
        #[serde(default)]
        pub advance_notice_days: i32,
        #[serde(default)]
        pub delivery_channel: DeliveryChannel,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReminderUpdate {
        pub scheduled_time: DateTime<Utc>,
        pub advance_notice_days: i32,
        pub delivery_channel: DeliveryChannel,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ReminderFilter {
        pub important_date_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReminderSnooze {
        /// Must be > 0.
        pub minutes: i64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ReminderView {
        pub id: Uuid,
        pub important_date_id: Uuid,
        pub scheduled_time: DateTime<Utc>,
        pub advance_notice_days: i32,
        pub delivery_channel: DeliveryChannel,
        pub status: ReminderStatus,
        pub sent_at: Option<DateTime<Utc>>,
        /// Derived: the reminder is due and not yet sent.
        pub is_ready_to_send: bool,
    }
}

pub mod habits {
    use super::*;

    wire_enum! {
        HabitFrequency {
            #[default] Daily => "daily",
            Weekly => "weekly",
            Custom => "custom",
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HabitNew {
        pub name: String,
        pub description: Option<String>,
        #[serde(default)]
        pub frequency: HabitFrequency,
        /// Defaults to 7.
        pub target_days_per_week: Option<i32>,
        /// Defaults to now.
        pub start_date: Option<DateTime<Utc>>,
        /// Defaults to `true`.
        pub is_active: Option<bool>,
        pub notes: Option<String>,
    }

    pub type HabitUpdate = HabitNew;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct HabitView {
        pub id: Uuid,
        pub user_id: String,
        pub name: String,
        pub description: Option<String>,
        pub frequency: HabitFrequency,
        pub target_days_per_week: i32,
        pub start_date: DateTime<Utc>,
        pub is_active: bool,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StreakNew {
        pub habit_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StreakUpdate {
        pub current_streak: i32,
        pub longest_streak: i32,
        pub last_completion_date: Option<DateTime<Utc>>,
        pub streak_start_date: Option<DateTime<Utc>>,
        pub is_active: bool,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct StreakFilter {
        pub habit_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StreakComplete {
        /// Optional: if absent, server uses now().
        pub completed_at: Option<DateTime<Utc>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct StreakView {
        pub id: Uuid,
        pub habit_id: Uuid,
        pub current_streak: i32,
        pub longest_streak: i32,
        pub last_completion_date: Option<DateTime<Utc>>,
        pub streak_start_date: Option<DateTime<Utc>>,
        pub is_active: bool,
        /// Derived: more than a calendar day has passed since the last completion.
        pub is_broken: bool,
    }
}

pub mod accounts {
    use super::*;

    wire_enum! {
        AccountCategory {
            #[default] SocialMedia => "social_media",
            Email => "email",
            Banking => "banking",
            Shopping => "shopping",
            Entertainment => "entertainment",
            Work => "work",
            Other => "other",
        }
    }

    wire_enum! {
        /// Ordered from weakest to strongest.
        SecurityLevel {
            #[default] Unknown => "unknown",
            Low => "low",
            Medium => "medium",
            High => "high",
        }
    }

    wire_enum! {
        AuditType {
            #[default] Manual => "manual",
            Automated => "automated",
            Scheduled => "scheduled",
        }
    }

    wire_enum! {
        AuditStatus {
            #[default] Pending => "pending",
            InProgress => "in_progress",
            Completed => "completed",
            Failed => "failed",
        }
    }

    wire_enum! {
        BreachSeverity {
            #[default] Low => "low",
            Medium => "medium",
            High => "high",
            Critical => "critical",
        }
    }

    wire_enum! {
        AlertStatus {
            #[default] New => "new",
            Acknowledged => "acknowledged",
            Resolved => "resolved",
            Dismissed => "dismissed",
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub account_name: String,
        pub username: String,
        pub website_url: Option<String>,
        #[serde(default)]
        pub category: AccountCategory,
        #[serde(default)]
        pub has_two_factor_auth: bool,
        pub last_password_change: Option<DateTime<Utc>>,
        pub notes: Option<String>,
        /// Defaults to `true`.
        pub is_active: Option<bool>,
    }

    pub type AccountUpdate = AccountNew;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TwoFactorSet {
        pub enabled: bool,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AccountView {
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
        /// Derived: password never changed or older than 90 days.
        pub needs_password_change: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SecurityAuditNew {
        pub account_id: Uuid,
        #[serde(default)]
        pub audit_type: AuditType,
        #[serde(default)]
        pub status: AuditStatus,
        /// Clamped into `0..=100`.
        pub security_score: i32,
        pub findings: Option<String>,
        pub recommendations: Option<String>,
        /// Defaults to now.
        pub audit_date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SecurityAuditUpdate {
        pub audit_type: AuditType,
        pub status: AuditStatus,
        pub security_score: i32,
        pub findings: Option<String>,
        pub recommendations: Option<String>,
        pub audit_date: DateTime<Utc>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct AccountChildFilter {
        pub account_id: Option<Uuid>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct SecurityAuditView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub audit_type: AuditType,
        pub status: AuditStatus,
        pub security_score: i32,
        pub findings: Option<String>,
        pub recommendations: Option<String>,
        pub audit_date: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BreachAlertNew {
        pub account_id: Uuid,
        #[serde(default)]
        pub severity: BreachSeverity,
        #[serde(default)]
        pub status: AlertStatus,
        pub description: String,
        pub source: Option<String>,
        pub breach_date: Option<DateTime<Utc>>,
        /// Defaults to now.
        pub discovered_at: Option<DateTime<Utc>>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BreachAlertUpdate {
        pub severity: BreachSeverity,
        pub status: AlertStatus,
        pub description: String,
        pub source: Option<String>,
        pub breach_date: Option<DateTime<Utc>>,
        pub discovered_at: DateTime<Utc>,
        pub notes: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BreachAlertView {
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
}

pub mod warranties {
    use super::*;

    wire_enum! {
        PurchaseStatus {
            #[default] Active => "active",
            Returned => "returned",
            Disposed => "disposed",
        }
    }

    wire_enum! {
        WarrantyType {
            #[default] Manufacturer => "manufacturer",
            Extended => "extended",
            Store => "store",
            ThirdParty => "third_party",
            Limited => "limited",
            Lifetime => "lifetime",
        }
    }

    wire_enum! {
        WarrantyStatus {
            #[default] Active => "active",
            Expired => "expired",
            ClaimFiled => "claim_filed",
            ClaimApproved => "claim_approved",
            ClaimRejected => "claim_rejected",
            Voided => "voided",
        }
    }

    wire_enum! {
        ReturnWindowStatus {
            #[default] Open => "open",
            Used => "used",
            Expired => "expired",
            Closed => "closed",
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseNew {
        pub product_name: String,
        pub category: Option<String>,
        pub store_name: Option<String>,
        pub purchase_date: DateTime<Utc>,
        pub price_minor: i64,
        pub model_number: Option<String>,
        pub serial_number: Option<String>,
        #[serde(default)]
        pub status: PurchaseStatus,
        pub notes: Option<String>,
    }

    pub type PurchaseUpdate = PurchaseNew;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PurchaseReturn {
        /// Optional: if absent, server uses now().
        pub returned_on: Option<DateTime<Utc>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct PurchaseView {
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
        /// Derived: at least one warranty is currently active.
        pub has_active_warranty: bool,
        /// Derived: at least one return window is currently open.
        pub can_be_returned: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WarrantyNew {
        pub purchase_id: Uuid,
        #[serde(default)]
        pub warranty_type: WarrantyType,
        pub provider: Option<String>,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        #[serde(default)]
        pub duration_months: i32,
        pub coverage_details: Option<String>,
        pub registration_number: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WarrantyUpdate {
        pub warranty_type: WarrantyType,
        pub provider: Option<String>,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        pub duration_months: i32,
        pub coverage_details: Option<String>,
        pub registration_number: Option<String>,
        pub status: WarrantyStatus,
        pub notes: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct PurchaseChildFilter {
        pub purchase_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Reason {
        pub reason: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct WarrantyView {
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
        pub days_remaining: i64,
        pub is_expiring_soon: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReturnWindowNew {
        pub purchase_id: Uuid,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        #[serde(default)]
        pub duration_days: i32,
        pub policy_details: Option<String>,
        pub restocking_fee_percent: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReturnWindowUpdate {
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        pub duration_days: i32,
        pub policy_details: Option<String>,
        pub restocking_fee_percent: Option<f64>,
        pub status: ReturnWindowStatus,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ReturnWindowView {
        pub id: Uuid,
        pub purchase_id: Uuid,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        pub duration_days: i32,
        pub policy_details: Option<String>,
        pub restocking_fee_percent: Option<f64>,
        pub status: ReturnWindowStatus,
        pub is_open: bool,
        pub is_closing_soon: bool,
        pub days_remaining: i64,
    }
}

#[cfg(test)]
mod tests {
    use super::accounts::SecurityLevel;
    use super::bills::BillingFrequency;
    use super::reminders::RecurrencePattern;

    #[test]
    fn wire_enum_round_trips_through_storage_string() {
        let parsed = BillingFrequency::try_from("semi_annually").unwrap();
        assert_eq!(parsed, BillingFrequency::SemiAnnually);
        assert_eq!(parsed.as_str(), "semi_annually");
    }

    #[test]
    fn wire_enum_rejects_unknown_values() {
        let err = BillingFrequency::try_from("fortnightly").unwrap_err();
        assert_eq!(err.kind, "BillingFrequency");
        assert_eq!(err.to_string(), "invalid BillingFrequency: fortnightly");
    }

    #[test]
    fn wire_enum_uses_snake_case_in_json() {
        let json = serde_json::to_string(&RecurrencePattern::Once).unwrap();
        assert_eq!(json, "\"once\"");
        let level: SecurityLevel = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(level, SecurityLevel::Medium);
    }

    #[test]
    fn security_levels_are_ordered() {
        assert!(SecurityLevel::Unknown < SecurityLevel::Low);
        assert!(SecurityLevel::Low < SecurityLevel::Medium);
        assert!(SecurityLevel::Medium < SecurityLevel::High);
        assert_eq!(SecurityLevel::default(), SecurityLevel::Unknown);
    }
}
