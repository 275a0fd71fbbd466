use api_types::bills::{
    BillFilter, BillNew, BillUpdate, PayeeNew, PayeeUpdate, PaymentFilter, PaymentNew,
    PaymentUpdate,
};
use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Bill, Payee, Payment, ResultEngine, bills, payees, payments};

use super::{Engine, with_tx};

impl Engine {
    pub async fn payees(&self, user_id: &str) -> ResultEngine<Vec<Payee>> {
        payees::Entity::find()
            .filter(payees::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(payees::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Payee::try_from)
            .collect()
    }

    pub async fn payee(&self, id: Uuid, user_id: &str) -> ResultEngine<Payee> {
        let model = self.require_payee(&self.database, id, user_id).await?;
        Payee::try_from(model)
    }

    pub async fn new_payee(&self, user_id: &str, input: PayeeNew) -> ResultEngine<Payee> {
        let payee = Payee::new(user_id, input, Utc::now())?;
        payees::ActiveModel::from(&payee)
            .insert(&self.database)
            .await?;
        tracing::debug!(payee_id = %payee.id, "payee created");
        Ok(payee)
    }

    pub async fn update_payee(
        &self,
        id: Uuid,
        user_id: &str,
        input: PayeeUpdate,
    ) -> ResultEngine<Payee> {
        with_tx!(self, |db_tx| {
            let mut payee = Payee::try_from(self.require_payee(&db_tx, id, user_id).await?)?;
            payee.apply(input)?;
            payees::ActiveModel::from(&payee).update(&db_tx).await?;
            Ok(payee)
        })
    }

    /// Delete a payee together with its bills and their payments.
    pub async fn delete_payee(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_payee(&db_tx, id, user_id).await?;
            payees::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// List bills ordered by due date.
    pub async fn bills(&self, user_id: &str, filter: &BillFilter) -> ResultEngine<Vec<Bill>> {
        let mut query = bills::Entity::find().filter(bills::Column::UserId.eq(user_id.to_string()));
        if let Some(payee_id) = filter.payee_id {
            query = query.filter(bills::Column::PayeeId.eq(payee_id.to_string()));
        }
        if let Some(status) = filter.status {
            query = query.filter(bills::Column::Status.eq(status.as_str()));
        }
        query
            .order_by_asc(bills::Column::DueDate)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Bill::try_from)
            .collect()
    }

    pub async fn bill(&self, id: Uuid, user_id: &str) -> ResultEngine<Bill> {
        let model = self.require_bill(&self.database, id, user_id).await?;
        Bill::try_from(model)
    }

    pub async fn new_bill(&self, user_id: &str, input: BillNew) -> ResultEngine<Bill> {
        with_tx!(self, |db_tx| {
            self.require_payee(&db_tx, input.payee_id, user_id).await?;
            let bill = Bill::new(user_id, input, Utc::now())?;
            bills::ActiveModel::from(&bill).insert(&db_tx).await?;
            Ok(bill)
        })
    }

    pub async fn update_bill(
        &self,
        id: Uuid,
        user_id: &str,
        input: BillUpdate,
    ) -> ResultEngine<Bill> {
        with_tx!(self, |db_tx| {
            let mut bill = Bill::try_from(self.require_bill(&db_tx, id, user_id).await?)?;
            if input.payee_id != bill.payee_id {
                self.require_payee(&db_tx, input.payee_id, user_id).await?;
            }
            bill.apply(input)?;
            bills::ActiveModel::from(&bill).update(&db_tx).await?;
            Ok(bill)
        })
    }

    pub async fn delete_bill(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_bill(&db_tx, id, user_id).await?;
            bills::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Mark a bill as paid.
    pub async fn pay_bill(&self, id: Uuid, user_id: &str) -> ResultEngine<Bill> {
        with_tx!(self, |db_tx| {
            let mut bill = Bill::try_from(self.require_bill(&db_tx, id, user_id).await?)?;
            bill.mark_paid()?;
            bills::ActiveModel::from(&bill).update(&db_tx).await?;
            Ok(bill)
        })
    }

    /// List payments, newest first.
    pub async fn payments(
        &self,
        user_id: &str,
        filter: &PaymentFilter,
    ) -> ResultEngine<Vec<Payment>> {
        let mut query = payments::Entity::find()
            .inner_join(bills::Entity)
            .filter(bills::Column::UserId.eq(user_id.to_string()));
        if let Some(bill_id) = filter.bill_id {
            query = query.filter(payments::Column::BillId.eq(bill_id.to_string()));
        }
        query
            .order_by_desc(payments::Column::PaymentDate)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    pub async fn payment(&self, id: Uuid, user_id: &str) -> ResultEngine<Payment> {
        let model = self.require_payment(&self.database, id, user_id).await?;
        Payment::try_from(model)
    }

    pub async fn new_payment(&self, user_id: &str, input: PaymentNew) -> ResultEngine<Payment> {
        let PaymentNew {
            bill_id,
            amount_minor,
            payment_date,
            payment_method,
            confirmation_number,
            notes,
        } = input;
        with_tx!(self, |db_tx| {
            self.require_bill(&db_tx, bill_id, user_id).await?;
            let payment = Payment::new(
                bill_id,
                PaymentUpdate {
                    amount_minor,
                    payment_date,
                    payment_method,
                    confirmation_number,
                    notes,
                },
                Utc::now(),
            )?;
            payments::ActiveModel::from(&payment).insert(&db_tx).await?;
            Ok(payment)
        })
    }

    pub async fn update_payment(
        &self,
        id: Uuid,
        user_id: &str,
        input: PaymentUpdate,
    ) -> ResultEngine<Payment> {
        with_tx!(self, |db_tx| {
            let mut payment =
                Payment::try_from(self.require_payment(&db_tx, id, user_id).await?)?;
            payment.apply(input)?;
            payments::ActiveModel::from(&payment).update(&db_tx).await?;
            Ok(payment)
        })
    }

    pub async fn delete_payment(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_payment(&db_tx, id, user_id).await?;
            payments::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
