use api_types::accounts::{
    AccountChildFilter, AccountNew, AccountUpdate, BreachAlertNew, BreachAlertUpdate,
    SecurityAuditNew, SecurityAuditUpdate,
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, BreachAlert, ResultEngine, SecurityAudit, accounts, breach_alerts, security_audits,
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn accounts(&self, user_id: &str) -> ResultEngine<Vec<Account>> {
        accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(accounts::Column::AccountName)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    pub async fn account(&self, id: Uuid, user_id: &str) -> ResultEngine<Account> {
        let model = self.require_account(&self.database, id, user_id).await?;
        Account::try_from(model)
    }

    pub async fn new_account(&self, user_id: &str, input: AccountNew) -> ResultEngine<Account> {
        let account = Account::new(user_id, input, Utc::now())?;
        accounts::ActiveModel::from(&account)
            .insert(&self.database)
            .await?;
        Ok(account)
    }

    pub async fn update_account(
        &self,
        id: Uuid,
        user_id: &str,
        input: AccountUpdate,
    ) -> ResultEngine<Account> {
        let now = Utc::now();
        self.change_account(id, user_id, |account| account.apply(input, now))
            .await
    }

    pub async fn record_password_change(
        &self,
        id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Account> {
        self.change_account(id, user_id, |account| {
            account.record_password_change(now);
            Ok(())
        })
        .await
    }

    pub async fn set_two_factor(
        &self,
        id: Uuid,
        user_id: &str,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> ResultEngine<Account> {
        self.change_account(id, user_id, |account| {
            if enabled {
                account.enable_two_factor_auth(now);
            } else {
                account.disable_two_factor_auth(now);
            }
            Ok(())
        })
        .await
    }

    pub async fn record_account_access(
        &self,
        id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Account> {
        self.change_account(id, user_id, |account| {
            account.record_access(now);
            Ok(())
        })
        .await
    }

    pub async fn toggle_account(&self, id: Uuid, user_id: &str) -> ResultEngine<Account> {
        self.change_account(id, user_id, |account| {
            account.toggle_active();
            Ok(())
        })
        .await
    }

    /// Delete an account with its audits and breach alerts.
    pub async fn delete_account(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, id, user_id).await?;
            accounts::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn change_account<F>(&self, id: Uuid, user_id: &str, change: F) -> ResultEngine<Account>
    where
        F: FnOnce(&mut Account) -> ResultEngine<()>,
    {
        with_tx!(self, |db_tx| {
            let mut account = Account::try_from(self.require_account(&db_tx, id, user_id).await?)?;
            change(&mut account)?;
            accounts::ActiveModel::from(&account).update(&db_tx).await?;
            Ok(account)
        })
    }

    pub async fn security_audits(
        &self,
        user_id: &str,
        filter: &AccountChildFilter,
    ) -> ResultEngine<Vec<SecurityAudit>> {
        let mut query = security_audits::Entity::find()
            .inner_join(accounts::Entity)
            .filter(accounts::Column::UserId.eq(user_id.to_string()));
        if let Some(account_id) = filter.account_id {
            query = query.filter(security_audits::Column::AccountId.eq(account_id.to_string()));
        }
        query
            .order_by_desc(security_audits::Column::AuditDate)
            .all(&self.database)
            .await?
            .into_iter()
            .map(SecurityAudit::try_from)
            .collect()
    }

    pub async fn security_audit(&self, id: Uuid, user_id: &str) -> ResultEngine<SecurityAudit> {
        let model = self
            .require_security_audit(&self.database, id, user_id)
            .await?;
        SecurityAudit::try_from(model)
    }

    /// Record an audit. A missing `audit_date` means now.
    pub async fn new_security_audit(
        &self,
        user_id: &str,
        input: SecurityAuditNew,
    ) -> ResultEngine<SecurityAudit> {
        let now = Utc::now();
        let SecurityAuditNew {
            account_id,
            audit_type,
            status,
            security_score,
            findings,
            recommendations,
            audit_date,
        } = input;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id, user_id).await?;
            let audit = SecurityAudit::new(
                account_id,
                SecurityAuditUpdate {
                    audit_type,
                    status,
                    security_score,
                    findings,
                    recommendations,
                    audit_date: audit_date.unwrap_or(now),
                },
                now,
            )?;
            security_audits::ActiveModel::from(&audit)
                .insert(&db_tx)
                .await?;
            Ok(audit)
        })
    }

    pub async fn update_security_audit(
        &self,
        id: Uuid,
        user_id: &str,
        input: SecurityAuditUpdate,
    ) -> ResultEngine<SecurityAudit> {
        with_tx!(self, |db_tx| {
            let model = self.require_security_audit(&db_tx, id, user_id).await?;
            let mut audit = SecurityAudit::try_from(model)?;
            audit.apply(input)?;
            security_audits::ActiveModel::from(&audit)
                .update(&db_tx)
                .await?;
            Ok(audit)
        })
    }

    pub async fn delete_security_audit(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_security_audit(&db_tx, id, user_id).await?;
            security_audits::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn breach_alerts(
        &self,
        user_id: &str,
        filter: &AccountChildFilter,
    ) -> ResultEngine<Vec<BreachAlert>> {
        let mut query = breach_alerts::Entity::find()
            .inner_join(accounts::Entity)
            .filter(accounts::Column::UserId.eq(user_id.to_string()));
        if let Some(account_id) = filter.account_id {
            query = query.filter(breach_alerts::Column::AccountId.eq(account_id.to_string()));
        }
        query
            .order_by_desc(breach_alerts::Column::DiscoveredAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(BreachAlert::try_from)
            .collect()
    }

    pub async fn breach_alert(&self, id: Uuid, user_id: &str) -> ResultEngine<BreachAlert> {
        let model = self
            .require_breach_alert(&self.database, id, user_id)
            .await?;
        BreachAlert::try_from(model)
    }

    /// Record a breach. A missing `discovered_at` means now.
    pub async fn new_breach_alert(
        &self,
        user_id: &str,
        input: BreachAlertNew,
    ) -> ResultEngine<BreachAlert> {
        let now = Utc::now();
        let BreachAlertNew {
            account_id,
            severity,
            status,
            description,
            source,
            breach_date,
            discovered_at,
            notes,
        } = input;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id, user_id).await?;
            let alert = BreachAlert::new(
                account_id,
                BreachAlertUpdate {
                    severity,
                    status,
                    description,
                    source,
                    breach_date,
                    discovered_at: discovered_at.unwrap_or(now),
                    notes,
                },
                now,
            )?;
            breach_alerts::ActiveModel::from(&alert)
                .insert(&db_tx)
                .await?;
            Ok(alert)
        })
    }

    pub async fn update_breach_alert(
        &self,
        id: Uuid,
        user_id: &str,
        input: BreachAlertUpdate,
    ) -> ResultEngine<BreachAlert> {
        with_tx!(self, |db_tx| {
            let model = self.require_breach_alert(&db_tx, id, user_id).await?;
            let mut alert = BreachAlert::try_from(model)?;
            alert.apply(input)?;
            breach_alerts::ActiveModel::from(&alert)
                .update(&db_tx)
                .await?;
            Ok(alert)
        })
    }

    pub async fn delete_breach_alert(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_breach_alert(&db_tx, id, user_id).await?;
            breach_alerts::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
