use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, accounts, bills, breach_alerts, habits, important_dates, payees,
    payments, purchases, reminders, return_windows, security_audits, streaks, warranties,
};

use super::Engine;

/// Generates a lookup returning the row of a top-level entity only when it
/// belongs to `user_id`.
macro_rules! impl_owned_lookup {
    ($fn:ident, $entity:path, $user_col:expr, $what:literal) => {
        pub(super) async fn $fn<C: ConnectionTrait>(
            &self,
            db: &C,
            id: Uuid,
            user_id: &str,
        ) -> ResultEngine<<$entity as EntityTrait>::Model> {
            <$entity>::find_by_id(id.to_string())
                .filter($user_col.eq(user_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(concat!($what, " not exists").to_string()))
        }
    };
}

/// Generates a lookup for a child entity, joined to the parent that carries
/// the owner.
macro_rules! impl_child_lookup {
    ($fn:ident, $entity:path, $parent:expr, $parent_user_col:expr, $what:literal) => {
        pub(super) async fn $fn<C: ConnectionTrait>(
            &self,
            db: &C,
            id: Uuid,
            user_id: &str,
        ) -> ResultEngine<<$entity as EntityTrait>::Model> {
            <$entity>::find_by_id(id.to_string())
                .inner_join($parent)
                .filter($parent_user_col.eq(user_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(concat!($what, " not exists").to_string()))
        }
    };
}

impl Engine {
    impl_owned_lookup!(
        require_payee,
        payees::Entity,
        payees::Column::UserId,
        "payee"
    );

    impl_owned_lookup!(
        require_bill,
        bills::Entity,
        bills::Column::UserId,
        "bill"
    );

    impl_owned_lookup!(
        require_important_date,
        important_dates::Entity,
        important_dates::Column::UserId,
        "important_date"
    );

    impl_owned_lookup!(
        require_habit,
        habits::Entity,
        habits::Column::UserId,
        "habit"
    );

    impl_owned_lookup!(
        require_account,
        accounts::Entity,
        accounts::Column::UserId,
        "account"
    );

    impl_owned_lookup!(
        require_purchase,
        purchases::Entity,
        purchases::Column::UserId,
        "purchase"
    );

    impl_child_lookup!(
        require_payment,
        payments::Entity,
        bills::Entity,
        bills::Column::UserId,
        "payment"
    );

    impl_child_lookup!(
        require_reminder,
        reminders::Entity,
        important_dates::Entity,
        important_dates::Column::UserId,
        "reminder"
    );

    impl_child_lookup!(
        require_streak,
        streaks::Entity,
        habits::Entity,
        habits::Column::UserId,
        "streak"
    );

    impl_child_lookup!(
        require_security_audit,
        security_audits::Entity,
        accounts::Entity,
        accounts::Column::UserId,
        "security_audit"
    );

    impl_child_lookup!(
        require_breach_alert,
        breach_alerts::Entity,
        accounts::Entity,
        accounts::Column::UserId,
        "breach_alert"
    );

    impl_child_lookup!(
        require_warranty,
        warranties::Entity,
        purchases::Entity,
        purchases::Column::UserId,
        "warranty"
    );

    impl_child_lookup!(
        require_return_window,
        return_windows::Entity,
        purchases::Entity,
        purchases::Column::UserId,
        "return_window"
    );
}
