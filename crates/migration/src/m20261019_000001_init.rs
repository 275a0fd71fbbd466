//! Initial schema migration.
//!
//! Creates the users table and one table per tracked entity. Child rows
//! reference their parent with `ON DELETE CASCADE`; ownership lives on the
//! top-level rows (`user_id`).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    PasswordHash,
}

#[derive(Iden)]
enum Payees {
    Table,
    Id,
    UserId,
    Name,
    AccountNumber,
    Website,
    Phone,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Bills {
    Table,
    Id,
    UserId,
    PayeeId,
    Name,
    AmountMinor,
    DueDate,
    BillingFrequency,
    Status,
    IsAutopay,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    BillId,
    AmountMinor,
    PaymentDate,
    PaymentMethod,
    ConfirmationNumber,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum ImportantDates {
    Table,
    Id,
    UserId,
    PersonName,
    DateType,
    DateValue,
    RecurrencePattern,
    Relationship,
    Notes,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Reminders {
    Table,
    Id,
    ImportantDateId,
    ScheduledTime,
    AdvanceNoticeDays,
    DeliveryChannel,
    Status,
    SentAt,
}

#[derive(Iden)]
enum Habits {
    Table,
    Id,
    UserId,
    Name,
    Description,
    Frequency,
    TargetDaysPerWeek,
    StartDate,
    IsActive,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Streaks {
    Table,
    Id,
    HabitId,
    CurrentStreak,
    LongestStreak,
    LastCompletionDate,
    StreakStartDate,
    IsActive,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    UserId,
    AccountName,
    Username,
    WebsiteUrl,
    Category,
    SecurityLevel,
    HasTwoFactorAuth,
    LastPasswordChange,
    LastAccessDate,
    Notes,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum SecurityAudits {
    Table,
    Id,
    AccountId,
    AuditType,
    Status,
    SecurityScore,
    Findings,
    Recommendations,
    AuditDate,
    CreatedAt,
}

#[derive(Iden)]
enum BreachAlerts {
    Table,
    Id,
    AccountId,
    Severity,
    Status,
    Description,
    Source,
    BreachDate,
    DiscoveredAt,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Purchases {
    Table,
    Id,
    UserId,
    ProductName,
    Category,
    StoreName,
    PurchaseDate,
    PriceMinor,
    ModelNumber,
    SerialNumber,
    Status,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Warranties {
    Table,
    Id,
    PurchaseId,
    WarrantyType,
    Provider,
    StartDate,
    EndDate,
    DurationMonths,
    CoverageDetails,
    RegistrationNumber,
    Status,
    ClaimFiledDate,
    Notes,
}

#[derive(Iden)]
enum ReturnWindows {
    Table,
    Id,
    PurchaseId,
    StartDate,
    EndDate,
    DurationDays,
    PolicyDetails,
    RestockingFeePercent,
    Status,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).string().not_null().primary_key().to_owned()
}

fn text_col<T: IntoIden>(col: T, len: u32) -> ColumnDef {
    ColumnDef::new(col).string_len(len).to_owned()
}

fn required_text_col<T: IntoIden>(col: T, len: u32) -> ColumnDef {
    ColumnDef::new(col).string_len(len).not_null().to_owned()
}

fn timestamp_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).timestamp().not_null().to_owned()
}

fn owner_fk<T: IntoIden + 'static>(name: &str, table: T, col: T) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(Users::Table, Users::Username)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

fn parent_fk<C: IntoIden + 'static, P: IntoIden + 'static>(
    name: &str,
    child: C,
    child_col: C,
    parent: P,
    parent_col: P,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(child, child_col)
        .to(parent, parent_col)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

async fn index<T: IntoIden + 'static>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    cols: Vec<T>,
) -> Result<(), DbErr> {
    let mut stmt = Index::create();
    stmt.name(name).table(table);
    for col in cols {
        stmt.col(col);
    }
    manager.create_index(stmt).await
}

async fn drop_table<T: IntoIden + 'static>(manager: &SchemaManager<'_>, table: T) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(table).if_exists().to_owned())
        .await
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // Bills: payees -> bills -> payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payees::Table)
                    .if_not_exists()
                    .col(id_col(Payees::Id))
                    .col(ColumnDef::new(Payees::UserId).string().not_null())
                    .col(required_text_col(Payees::Name, 200))
                    .col(text_col(Payees::AccountNumber, 100))
                    .col(text_col(Payees::Website, 500))
                    .col(text_col(Payees::Phone, 50))
                    .col(text_col(Payees::Notes, 1000))
                    .col(timestamp_col(Payees::CreatedAt))
                    .foreign_key(&mut owner_fk("fk-payees-user_id", Payees::Table, Payees::UserId))
                    .to_owned(),
            )
            .await?;
        index(manager, "idx-payees-user_id", Payees::Table, vec![Payees::UserId]).await?;

        manager
            .create_table(
                Table::create()
                    .table(Bills::Table)
                    .if_not_exists()
                    .col(id_col(Bills::Id))
                    .col(ColumnDef::new(Bills::UserId).string().not_null())
                    .col(ColumnDef::new(Bills::PayeeId).string().not_null())
                    .col(required_text_col(Bills::Name, 200))
                    .col(ColumnDef::new(Bills::AmountMinor).big_integer().not_null())
                    .col(timestamp_col(Bills::DueDate))
                    .col(required_text_col(Bills::BillingFrequency, 32))
                    .col(required_text_col(Bills::Status, 32))
                    .col(
                        ColumnDef::new(Bills::IsAutopay)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(text_col(Bills::Notes, 1000))
                    .col(timestamp_col(Bills::CreatedAt))
                    .foreign_key(&mut owner_fk("fk-bills-user_id", Bills::Table, Bills::UserId))
                    .foreign_key(&mut parent_fk(
                        "fk-bills-payee_id",
                        Bills::Table,
                        Bills::PayeeId,
                        Payees::Table,
                        Payees::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        index(
            manager,
            "idx-bills-user_id-due_date",
            Bills::Table,
            vec![Bills::UserId, Bills::DueDate],
        )
        .await?;
        index(manager, "idx-bills-payee_id", Bills::Table, vec![Bills::PayeeId]).await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(id_col(Payments::Id))
                    .col(ColumnDef::new(Payments::BillId).string().not_null())
                    .col(ColumnDef::new(Payments::AmountMinor).big_integer().not_null())
                    .col(timestamp_col(Payments::PaymentDate))
                    .col(text_col(Payments::PaymentMethod, 100))
                    .col(text_col(Payments::ConfirmationNumber, 100))
                    .col(text_col(Payments::Notes, 1000))
                    .col(timestamp_col(Payments::CreatedAt))
                    .foreign_key(&mut parent_fk(
                        "fk-payments-bill_id",
                        Payments::Table,
                        Payments::BillId,
                        Bills::Table,
                        Bills::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        index(manager, "idx-payments-bill_id", Payments::Table, vec![Payments::BillId]).await?;

        // ───────────────────────────────────────────────────────────────────
        // Reminders: important_dates -> reminders
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ImportantDates::Table)
                    .if_not_exists()
                    .col(id_col(ImportantDates::Id))
                    .col(ColumnDef::new(ImportantDates::UserId).string().not_null())
                    .col(required_text_col(ImportantDates::PersonName, 200))
                    .col(required_text_col(ImportantDates::DateType, 32))
                    .col(timestamp_col(ImportantDates::DateValue))
                    .col(required_text_col(ImportantDates::RecurrencePattern, 32))
                    .col(text_col(ImportantDates::Relationship, 100))
                    .col(text_col(ImportantDates::Notes, 1000))
                    .col(
                        ColumnDef::new(ImportantDates::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp_col(ImportantDates::CreatedAt))
                    .foreign_key(&mut owner_fk(
                        "fk-important_dates-user_id",
                        ImportantDates::Table,
                        ImportantDates::UserId,
                    ))
                    .to_owned(),
            )
            .await?;
        index(
            manager,
            "idx-important_dates-user_id",
            ImportantDates::Table,
            vec![ImportantDates::UserId],
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reminders::Table)
                    .if_not_exists()
                    .col(id_col(Reminders::Id))
                    .col(ColumnDef::new(Reminders::ImportantDateId).string().not_null())
                    .col(timestamp_col(Reminders::ScheduledTime))
                    .col(
                        ColumnDef::new(Reminders::AdvanceNoticeDays)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(required_text_col(Reminders::DeliveryChannel, 32))
                    .col(required_text_col(Reminders::Status, 32))
                    .col(ColumnDef::new(Reminders::SentAt).timestamp())
                    .foreign_key(&mut parent_fk(
                        "fk-reminders-important_date_id",
                        Reminders::Table,
                        Reminders::ImportantDateId,
                        ImportantDates::Table,
                        ImportantDates::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        index(
            manager,
            "idx-reminders-important_date_id",
            Reminders::Table,
            vec![Reminders::ImportantDateId],
        )
        .await?;
        index(
            manager,
            "idx-reminders-status-scheduled_time",
            Reminders::Table,
            vec![Reminders::Status, Reminders::ScheduledTime],
        )
        .await?;

        // ───────────────────────────────────────────────────────────────────
        // Habits: habits -> streaks
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Habits::Table)
                    .if_not_exists()
                    .col(id_col(Habits::Id))
                    .col(ColumnDef::new(Habits::UserId).string().not_null())
                    .col(required_text_col(Habits::Name, 200))
                    .col(text_col(Habits::Description, 1000))
                    .col(required_text_col(Habits::Frequency, 32))
                    .col(
                        ColumnDef::new(Habits::TargetDaysPerWeek)
                            .integer()
                            .not_null()
                            .default(7),
                    )
                    .col(timestamp_col(Habits::StartDate))
                    .col(
                        ColumnDef::new(Habits::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(text_col(Habits::Notes, 2000))
                    .col(timestamp_col(Habits::CreatedAt))
                    .foreign_key(&mut owner_fk("fk-habits-user_id", Habits::Table, Habits::UserId))
                    .to_owned(),
            )
            .await?;
        index(manager, "idx-habits-user_id", Habits::Table, vec![Habits::UserId]).await?;

        manager
            .create_table(
                Table::create()
                    .table(Streaks::Table)
                    .if_not_exists()
                    .col(id_col(Streaks::Id))
                    .col(ColumnDef::new(Streaks::HabitId).string().not_null())
                    .col(
                        ColumnDef::new(Streaks::CurrentStreak)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Streaks::LongestStreak)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Streaks::LastCompletionDate).timestamp())
                    .col(ColumnDef::new(Streaks::StreakStartDate).timestamp())
                    .col(
                        ColumnDef::new(Streaks::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(&mut parent_fk(
                        "fk-streaks-habit_id",
                        Streaks::Table,
                        Streaks::HabitId,
                        Habits::Table,
                        Habits::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        index(manager, "idx-streaks-habit_id", Streaks::Table, vec![Streaks::HabitId]).await?;

        // ───────────────────────────────────────────────────────────────────
        // Accounts: accounts -> security_audits, breach_alerts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(id_col(Accounts::Id))
                    .col(ColumnDef::new(Accounts::UserId).string().not_null())
                    .col(required_text_col(Accounts::AccountName, 200))
                    .col(required_text_col(Accounts::Username, 200))
                    .col(text_col(Accounts::WebsiteUrl, 500))
                    .col(required_text_col(Accounts::Category, 32))
                    .col(required_text_col(Accounts::SecurityLevel, 32))
                    .col(
                        ColumnDef::new(Accounts::HasTwoFactorAuth)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Accounts::LastPasswordChange).timestamp())
                    .col(ColumnDef::new(Accounts::LastAccessDate).timestamp())
                    .col(text_col(Accounts::Notes, 1000))
                    .col(
                        ColumnDef::new(Accounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp_col(Accounts::CreatedAt))
                    .foreign_key(&mut owner_fk(
                        "fk-accounts-user_id",
                        Accounts::Table,
                        Accounts::UserId,
                    ))
                    .to_owned(),
            )
            .await?;
        index(manager, "idx-accounts-user_id", Accounts::Table, vec![Accounts::UserId]).await?;

        manager
            .create_table(
                Table::create()
                    .table(SecurityAudits::Table)
                    .if_not_exists()
                    .col(id_col(SecurityAudits::Id))
                    .col(ColumnDef::new(SecurityAudits::AccountId).string().not_null())
                    .col(required_text_col(SecurityAudits::AuditType, 32))
                    .col(required_text_col(SecurityAudits::Status, 32))
                    .col(
                        ColumnDef::new(SecurityAudits::SecurityScore)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(text_col(SecurityAudits::Findings, 2000))
                    .col(text_col(SecurityAudits::Recommendations, 2000))
                    .col(timestamp_col(SecurityAudits::AuditDate))
                    .col(timestamp_col(SecurityAudits::CreatedAt))
                    .foreign_key(&mut parent_fk(
                        "fk-security_audits-account_id",
                        SecurityAudits::Table,
                        SecurityAudits::AccountId,
                        Accounts::Table,
                        Accounts::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        index(
            manager,
            "idx-security_audits-account_id",
            SecurityAudits::Table,
            vec![SecurityAudits::AccountId],
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(BreachAlerts::Table)
                    .if_not_exists()
                    .col(id_col(BreachAlerts::Id))
                    .col(ColumnDef::new(BreachAlerts::AccountId).string().not_null())
                    .col(required_text_col(BreachAlerts::Severity, 32))
                    .col(required_text_col(BreachAlerts::Status, 32))
                    .col(required_text_col(BreachAlerts::Description, 1000))
                    .col(text_col(BreachAlerts::Source, 200))
                    .col(ColumnDef::new(BreachAlerts::BreachDate).timestamp())
                    .col(timestamp_col(BreachAlerts::DiscoveredAt))
                    .col(text_col(BreachAlerts::Notes, 1000))
                    .col(timestamp_col(BreachAlerts::CreatedAt))
                    .foreign_key(&mut parent_fk(
                        "fk-breach_alerts-account_id",
                        BreachAlerts::Table,
                        BreachAlerts::AccountId,
                        Accounts::Table,
                        Accounts::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        index(
            manager,
            "idx-breach_alerts-account_id",
            BreachAlerts::Table,
            vec![BreachAlerts::AccountId],
        )
        .await?;

        // ───────────────────────────────────────────────────────────────────
        // Warranties: purchases -> warranties, return_windows
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(id_col(Purchases::Id))
                    .col(ColumnDef::new(Purchases::UserId).string().not_null())
                    .col(required_text_col(Purchases::ProductName, 200))
                    .col(text_col(Purchases::Category, 100))
                    .col(text_col(Purchases::StoreName, 200))
                    .col(timestamp_col(Purchases::PurchaseDate))
                    .col(ColumnDef::new(Purchases::PriceMinor).big_integer().not_null())
                    .col(text_col(Purchases::ModelNumber, 100))
                    .col(text_col(Purchases::SerialNumber, 100))
                    .col(required_text_col(Purchases::Status, 32))
                    .col(text_col(Purchases::Notes, 2000))
                    .col(timestamp_col(Purchases::CreatedAt))
                    .foreign_key(&mut owner_fk(
                        "fk-purchases-user_id",
                        Purchases::Table,
                        Purchases::UserId,
                    ))
                    .to_owned(),
            )
            .await?;
        index(manager, "idx-purchases-user_id", Purchases::Table, vec![Purchases::UserId]).await?;

        manager
            .create_table(
                Table::create()
                    .table(Warranties::Table)
                    .if_not_exists()
                    .col(id_col(Warranties::Id))
                    .col(ColumnDef::new(Warranties::PurchaseId).string().not_null())
                    .col(required_text_col(Warranties::WarrantyType, 32))
                    .col(text_col(Warranties::Provider, 200))
                    .col(timestamp_col(Warranties::StartDate))
                    .col(timestamp_col(Warranties::EndDate))
                    .col(
                        ColumnDef::new(Warranties::DurationMonths)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(text_col(Warranties::CoverageDetails, 2000))
                    .col(text_col(Warranties::RegistrationNumber, 100))
                    .col(required_text_col(Warranties::Status, 32))
                    .col(ColumnDef::new(Warranties::ClaimFiledDate).timestamp())
                    .col(text_col(Warranties::Notes, 2000))
                    .foreign_key(&mut parent_fk(
                        "fk-warranties-purchase_id",
                        Warranties::Table,
                        Warranties::PurchaseId,
                        Purchases::Table,
                        Purchases::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        index(
            manager,
            "idx-warranties-purchase_id",
            Warranties::Table,
            vec![Warranties::PurchaseId],
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReturnWindows::Table)
                    .if_not_exists()
                    .col(id_col(ReturnWindows::Id))
                    .col(ColumnDef::new(ReturnWindows::PurchaseId).string().not_null())
                    .col(timestamp_col(ReturnWindows::StartDate))
                    .col(timestamp_col(ReturnWindows::EndDate))
                    .col(
                        ColumnDef::new(ReturnWindows::DurationDays)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(text_col(ReturnWindows::PolicyDetails, 2000))
                    .col(ColumnDef::new(ReturnWindows::RestockingFeePercent).double())
                    .col(required_text_col(ReturnWindows::Status, 32))
                    .foreign_key(&mut parent_fk(
                        "fk-return_windows-purchase_id",
                        ReturnWindows::Table,
                        ReturnWindows::PurchaseId,
                        Purchases::Table,
                        Purchases::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        index(
            manager,
            "idx-return_windows-purchase_id",
            ReturnWindows::Table,
            vec![ReturnWindows::PurchaseId],
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first so the foreign keys never dangle.
        drop_table(manager, ReturnWindows::Table).await?;
        drop_table(manager, Warranties::Table).await?;
        drop_table(manager, Purchases::Table).await?;
        drop_table(manager, BreachAlerts::Table).await?;
        drop_table(manager, SecurityAudits::Table).await?;
        drop_table(manager, Accounts::Table).await?;
        drop_table(manager, Streaks::Table).await?;
        drop_table(manager, Habits::Table).await?;
        drop_table(manager, Reminders::Table).await?;
        drop_table(manager, ImportantDates::Table).await?;
        drop_table(manager, Payments::Table).await?;
        drop_table(manager, Bills::Table).await?;
        drop_table(manager, Payees::Table).await?;
        drop_table(manager, Users::Table).await
    }
}
