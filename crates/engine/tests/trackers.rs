use std::sync::Arc;

use api_types::{
    bills::{BillFilter, BillNew, BillStatus, BillingFrequency, PayeeNew, PaymentFilter, PaymentNew},
    habits::{HabitNew, StreakFilter, StreakNew},
    reminders::{DeliveryChannel, ImportantDateNew, ReminderNew, ReminderStatus},
    accounts::{AccountCategory, AccountChildFilter, AccountNew, BreachAlertNew, SecurityLevel},
    warranties::{PurchaseChildFilter, PurchaseNew, PurchaseStatus, ReturnWindowNew, WarrantyNew},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{BroadcastPublisher, Engine, EngineError, Notification};
use migration::MigratorTrait;
use uuid::Uuid;

async fn db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn engine_with_users() -> Engine {
    let engine = Engine::builder().database(db().await).build().await.unwrap();
    engine.new_user("alice", "password").await.unwrap();
    engine.new_user("bob", "password").await.unwrap();
    engine
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn payee(name: &str) -> PayeeNew {
    PayeeNew {
        name: name.to_string(),
        account_number: None,
        website: None,
        phone: None,
        notes: None,
    }
}

fn bill(payee_id: Uuid, name: &str, due_date: DateTime<Utc>) -> BillNew {
    BillNew {
        payee_id,
        name: name.to_string(),
        amount_minor: 4_200,
        due_date,
        billing_frequency: BillingFrequency::Monthly,
        status: BillStatus::Pending,
        is_autopay: false,
        notes: None,
    }
}

fn important_date(name: &str) -> ImportantDateNew {
    ImportantDateNew {
        person_name: name.to_string(),
        date_type: Default::default(),
        date_value: at(1990, 5, 17),
        recurrence_pattern: Default::default(),
        relationship: Some("friend".to_string()),
        notes: None,
        is_active: None,
    }
}

fn purchase(name: &str) -> PurchaseNew {
    PurchaseNew {
        product_name: name.to_string(),
        category: Some("electronics".to_string()),
        store_name: None,
        purchase_date: Utc::now() - Duration::days(3),
        price_minor: 99_900,
        model_number: None,
        serial_number: None,
        status: PurchaseStatus::Active,
        notes: None,
    }
}

#[tokio::test]
async fn users_authenticate_with_their_password() {
    let engine = engine_with_users().await;

    assert_eq!(
        engine.authenticate("alice", "password").await.unwrap().username,
        "alice"
    );
    assert_eq!(
        engine.authenticate("alice", "wrong").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
    assert_eq!(
        engine.authenticate("nobody", "password").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
    assert!(matches!(
        engine.new_user("alice", "again").await.unwrap_err(),
        EngineError::ExistingKey(_)
    ));

    engine.set_password("alice", "changed").await.unwrap();
    assert!(engine.authenticate("alice", "changed").await.is_ok());
    assert_eq!(engine.users().await.unwrap().len(), 2);
}

#[tokio::test]
async fn bills_are_listed_by_due_date_and_filtered() {
    let engine = engine_with_users().await;
    let power = engine.new_payee("alice", payee("Power Co")).await.unwrap();
    let water = engine.new_payee("alice", payee("Water Co")).await.unwrap();

    let later = engine
        .new_bill("alice", bill(power.id, "Electricity", at(2026, 3, 20)))
        .await
        .unwrap();
    let sooner = engine
        .new_bill("alice", bill(water.id, "Water", at(2026, 3, 5)))
        .await
        .unwrap();

    let all = engine.bills("alice", &BillFilter::default()).await.unwrap();
    let ids: Vec<_> = all.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![sooner.id, later.id]);

    let paid = engine.pay_bill(later.id, "alice").await.unwrap();
    assert_eq!(paid.status, BillStatus::Paid);

    let pending = engine
        .bills(
            "alice",
            &BillFilter {
                payee_id: None,
                status: Some(BillStatus::Pending),
            },
        )
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, sooner.id);

    let by_payee = engine
        .bills(
            "alice",
            &BillFilter {
                payee_id: Some(power.id),
                status: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(by_payee.len(), 1);
    assert_eq!(by_payee[0].name, "Electricity");
}

#[tokio::test]
async fn deleting_a_payee_cascades_to_bills_and_payments() {
    let engine = engine_with_users().await;
    let payee = engine.new_payee("alice", payee("Landlord")).await.unwrap();
    let bill = engine
        .new_bill("alice", bill(payee.id, "Rent", at(2026, 1, 1)))
        .await
        .unwrap();
    let payment = engine
        .new_payment(
            "alice",
            PaymentNew {
                bill_id: bill.id,
                amount_minor: 4_200,
                payment_date: at(2026, 1, 1),
                payment_method: Some("transfer".to_string()),
                confirmation_number: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    engine.delete_payee(payee.id, "alice").await.unwrap();

    assert!(matches!(
        engine.bill(bill.id, "alice").await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.payment(payment.id, "alice").await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(
        engine
            .payments("alice", &PaymentFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn other_users_cannot_see_or_touch_records() {
    let engine = engine_with_users().await;
    let payee = engine.new_payee("alice", payee("Gym")).await.unwrap();
    let bill = engine
        .new_bill("alice", bill(payee.id, "Membership", at(2026, 2, 1)))
        .await
        .unwrap();

    assert!(matches!(
        engine.payee(payee.id, "bob").await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.pay_bill(bill.id, "bob").await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine
            .new_bill("bob", bill_for(payee.id))
            .await
            .unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(
        engine
            .bills("bob", &BillFilter::default())
            .await
            .unwrap()
            .is_empty()
    );

    // The failed attempts left alice's data alone.
    assert_eq!(
        engine.bill(bill.id, "alice").await.unwrap().status,
        BillStatus::Pending
    );
}

fn bill_for(payee_id: Uuid) -> BillNew {
    bill(payee_id, "Sneaky", at(2026, 2, 2))
}

#[tokio::test]
async fn new_and_snoozed_reminders_are_published() {
    let publisher = Arc::new(BroadcastPublisher::new(8));
    let mut rx = publisher.subscribe();
    let engine = Engine::builder()
        .database(db().await)
        .publisher(publisher)
        .build()
        .await
        .unwrap();
    engine.new_user("alice", "password").await.unwrap();

    let date = engine
        .new_important_date("alice", important_date("Carla"))
        .await
        .unwrap();
    let scheduled_time = at(2026, 5, 10);
    let reminder = engine
        .new_reminder(
            "alice",
            ReminderNew {
                important_date_id: date.id,
                scheduled_time,
                advance_notice_days: 7,
                delivery_channel: DeliveryChannel::Push,
            },
        )
        .await
        .unwrap();

    assert_eq!(
        rx.recv().await.unwrap(),
        Notification::ReminderScheduled {
            reminder_id: reminder.id,
            important_date_id: date.id,
            user_id: "alice".to_string(),
            scheduled_time,
            delivery_channel: "push".to_string(),
        }
    );

    let snoozed = engine.snooze_reminder(reminder.id, "alice", 30).await.unwrap();
    assert_eq!(snoozed.status, ReminderStatus::Snoozed);
    assert_eq!(snoozed.scheduled_time, scheduled_time + Duration::minutes(30));
    assert_eq!(
        rx.recv().await.unwrap(),
        Notification::ReminderSnoozed {
            reminder_id: reminder.id,
            user_id: "alice".to_string(),
            scheduled_time: scheduled_time + Duration::minutes(30),
        }
    );
}

#[tokio::test]
async fn engine_without_subscribers_still_schedules_reminders() {
    let publisher = Arc::new(BroadcastPublisher::new(1));
    let engine = Engine::builder()
        .database(db().await)
        .publisher(publisher)
        .build()
        .await
        .unwrap();
    engine.new_user("alice", "password").await.unwrap();
    let date = engine
        .new_important_date("alice", important_date("Dario"))
        .await
        .unwrap();

    let reminder = engine
        .new_reminder(
            "alice",
            ReminderNew {
                important_date_id: date.id,
                scheduled_time: at(2026, 1, 1),
                advance_notice_days: 0,
                delivery_channel: DeliveryChannel::Email,
            },
        )
        .await
        .unwrap();
    assert_eq!(engine.reminder(reminder.id, "alice").await.unwrap().id, reminder.id);
}

#[tokio::test]
async fn due_reminders_skip_future_sent_and_dismissed() {
    let engine = engine_with_users().await;
    let date = engine
        .new_important_date("alice", important_date("Elena"))
        .await
        .unwrap();
    let now = at(2026, 6, 1);

    let mut ids = Vec::new();
    for offset in [-2, -1, 1] {
        let reminder = engine
            .new_reminder(
                "alice",
                ReminderNew {
                    important_date_id: date.id,
                    scheduled_time: now + Duration::hours(offset),
                    advance_notice_days: 0,
                    delivery_channel: DeliveryChannel::InApp,
                },
            )
            .await
            .unwrap();
        ids.push(reminder.id);
    }
    let dismissed = engine
        .new_reminder(
            "alice",
            ReminderNew {
                important_date_id: date.id,
                scheduled_time: now - Duration::hours(3),
                advance_notice_days: 0,
                delivery_channel: DeliveryChannel::Sms,
            },
        )
        .await
        .unwrap();
    engine.dismiss_reminder(dismissed.id, "alice").await.unwrap();
    engine.mark_reminder_sent(ids[0], "alice", now).await.unwrap();

    let due = engine.due_reminders("alice", now).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, ids[1]);
    assert!(engine.due_reminders("bob", now).await.unwrap().is_empty());

    let err = engine
        .snooze_reminder(ids[0], "alice", 10)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn streak_completion_persists_and_resets() {
    let engine = engine_with_users().await;
    let habit = engine
        .new_habit(
            "alice",
            HabitNew {
                name: "Read".to_string(),
                description: None,
                frequency: Default::default(),
                target_days_per_week: None,
                start_date: None,
                is_active: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(habit.target_days_per_week, 7);

    let streak = engine
        .new_streak("alice", StreakNew { habit_id: habit.id })
        .await
        .unwrap();
    engine
        .complete_streak(streak.id, "alice", at(2026, 3, 1))
        .await
        .unwrap();
    engine
        .complete_streak(streak.id, "alice", at(2026, 3, 2))
        .await
        .unwrap();
    let streak = engine
        .complete_streak(streak.id, "alice", at(2026, 3, 3))
        .await
        .unwrap();
    assert_eq!(streak.current_streak, 3);
    assert_eq!(streak.longest_streak, 3);

    let reset = engine.reset_streak(streak.id, "alice").await.unwrap();
    assert_eq!(reset.current_streak, 0);
    assert_eq!(reset.longest_streak, 3);

    let restarted = engine
        .complete_streak(streak.id, "alice", at(2026, 3, 3))
        .await
        .unwrap();
    assert_eq!(restarted.current_streak, 1);
    assert!(restarted.is_active);
    assert_eq!(restarted.streak_start_date, Some(at(2026, 3, 3)));
    let extended = engine
        .complete_streak(streak.id, "alice", at(2026, 3, 4))
        .await
        .unwrap();
    assert_eq!(extended.current_streak, 2);
    assert_eq!(extended.streak_start_date, Some(at(2026, 3, 3)));

    let listed = engine
        .streaks(
            "alice",
            &StreakFilter {
                habit_id: Some(habit.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].longest_streak, 3);

    engine.delete_habit(habit.id, "alice").await.unwrap();
    assert!(matches!(
        engine.streak(streak.id, "alice").await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn account_security_level_follows_two_factor_and_password_age() {
    let engine = engine_with_users().await;
    let account = engine
        .new_account(
            "alice",
            AccountNew {
                account_name: "Mail".to_string(),
                username: "alice@example.com".to_string(),
                website_url: None,
                category: AccountCategory::Email,
                has_two_factor_auth: false,
                last_password_change: None,
                notes: None,
                is_active: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(account.security_level, SecurityLevel::Low);

    let now = Utc::now();
    engine
        .record_password_change(account.id, "alice", now)
        .await
        .unwrap();
    let account = engine
        .set_two_factor(account.id, "alice", true, now)
        .await
        .unwrap();
    assert_eq!(account.security_level, SecurityLevel::High);
    assert!(!account.needs_password_change(now));

    let alert = engine
        .new_breach_alert(
            "alice",
            BreachAlertNew {
                account_id: account.id,
                severity: Default::default(),
                status: Default::default(),
                description: "Leaked in a dump".to_string(),
                source: None,
                breach_date: None,
                discovered_at: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    let filter = AccountChildFilter {
        account_id: Some(account.id),
    };
    assert_eq!(engine.breach_alerts("alice", &filter).await.unwrap().len(), 1);
    assert!(engine.breach_alerts("bob", &filter).await.unwrap().is_empty());

    engine.delete_account(account.id, "alice").await.unwrap();
    assert!(matches!(
        engine.breach_alert(alert.id, "alice").await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn purchases_carry_their_warranties_and_return_windows() {
    let engine = engine_with_users().await;
    let now = Utc::now();
    let laptop = engine.new_purchase("alice", purchase("Laptop")).await.unwrap();

    let warranty = engine
        .new_warranty(
            "alice",
            WarrantyNew {
                purchase_id: laptop.purchase.id,
                warranty_type: Default::default(),
                provider: Some("Maker".to_string()),
                start_date: now - Duration::days(3),
                end_date: now + Duration::days(365),
                duration_months: 12,
                coverage_details: None,
                registration_number: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    engine
        .new_return_window(
            "alice",
            ReturnWindowNew {
                purchase_id: laptop.purchase.id,
                start_date: now - Duration::days(3),
                end_date: now + Duration::days(11),
                duration_days: 14,
                policy_details: None,
                restocking_fee_percent: Some(15.0),
            },
        )
        .await
        .unwrap();

    let detail = engine.purchase(laptop.purchase.id, "alice").await.unwrap();
    assert_eq!(detail.warranties.len(), 1);
    assert_eq!(detail.return_windows.len(), 1);
    assert!(detail.has_active_warranty(now));
    assert!(detail.can_be_returned(now));

    let claimed = engine.file_claim(warranty.id, "alice", now).await.unwrap();
    assert_eq!(claimed.claim_filed_date, Some(now));

    let returned = engine
        .return_purchase(laptop.purchase.id, "alice", now)
        .await
        .unwrap();
    assert_eq!(returned.purchase.status, PurchaseStatus::Returned);

    let listed = engine.purchases("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].warranties.len(), 1);
    assert!(engine.purchases("bob").await.unwrap().is_empty());

    engine.delete_purchase(laptop.purchase.id, "alice").await.unwrap();
    assert!(
        engine
            .warranties("alice", &PurchaseChildFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        engine
            .return_windows("alice", &PurchaseChildFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}
