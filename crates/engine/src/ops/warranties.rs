use std::collections::HashMap;

use api_types::warranties::{
    PurchaseChildFilter, PurchaseNew, PurchaseUpdate, ReturnWindowNew, ReturnWindowUpdate,
    WarrantyNew, WarrantyUpdate,
};
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Purchase, ResultEngine, ReturnWindow, Warranty, purchases, return_windows, warranties,
};

use super::{Engine, with_tx};

/// A purchase loaded together with its warranties and return windows, which
/// its derived flags depend on.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseDetail {
    pub purchase: Purchase,
    pub warranties: Vec<Warranty>,
    pub return_windows: Vec<ReturnWindow>,
}

impl PurchaseDetail {
    pub fn has_active_warranty(&self, now: DateTime<Utc>) -> bool {
        self.purchase.has_active_warranty(&self.warranties, now)
    }

    pub fn can_be_returned(&self, now: DateTime<Utc>) -> bool {
        self.purchase.can_be_returned(&self.return_windows, now)
    }
}

impl Engine {
    pub async fn purchases(&self, user_id: &str) -> ResultEngine<Vec<PurchaseDetail>> {
        let purchases = purchases::Entity::find()
            .filter(purchases::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(purchases::Column::PurchaseDate)
            .all(&self.database)
            .await?;
        let mut warranties = group_by_purchase(
            self.warranties(user_id, &PurchaseChildFilter::default())
                .await?,
            |w| w.purchase_id,
        );
        let mut windows = group_by_purchase(
            self.return_windows(user_id, &PurchaseChildFilter::default())
                .await?,
            |w| w.purchase_id,
        );

        purchases
            .into_iter()
            .map(|model| {
                let purchase = Purchase::try_from(model)?;
                Ok(PurchaseDetail {
                    warranties: warranties.remove(&purchase.id).unwrap_or_default(),
                    return_windows: windows.remove(&purchase.id).unwrap_or_default(),
                    purchase,
                })
            })
            .collect()
    }

    pub async fn purchase(&self, id: Uuid, user_id: &str) -> ResultEngine<PurchaseDetail> {
        let purchase = Purchase::try_from(self.require_purchase(&self.database, id, user_id).await?)?;
        self.purchase_detail(&self.database, purchase).await
    }

    pub async fn new_purchase(
        &self,
        user_id: &str,
        input: PurchaseNew,
    ) -> ResultEngine<PurchaseDetail> {
        let purchase = Purchase::new(user_id, input, Utc::now())?;
        purchases::ActiveModel::from(&purchase)
            .insert(&self.database)
            .await?;
        Ok(PurchaseDetail {
            purchase,
            warranties: Vec::new(),
            return_windows: Vec::new(),
        })
    }

    pub async fn update_purchase(
        &self,
        id: Uuid,
        user_id: &str,
        input: PurchaseUpdate,
    ) -> ResultEngine<PurchaseDetail> {
        self.change_purchase(id, user_id, |purchase| purchase.apply(input))
            .await
    }

    /// Mark a purchase as returned on `returned_on`.
    pub async fn return_purchase(
        &self,
        id: Uuid,
        user_id: &str,
        returned_on: DateTime<Utc>,
    ) -> ResultEngine<PurchaseDetail> {
        self.change_purchase(id, user_id, |purchase| {
            purchase.mark_as_returned(returned_on)
        })
        .await
    }

    pub async fn dispose_purchase(&self, id: Uuid, user_id: &str) -> ResultEngine<PurchaseDetail> {
        self.change_purchase(id, user_id, Purchase::mark_as_disposed)
            .await
    }

    /// Delete a purchase along with its warranties and return windows.
    pub async fn delete_purchase(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_purchase(&db_tx, id, user_id).await?;
            purchases::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn change_purchase<F>(
        &self,
        id: Uuid,
        user_id: &str,
        change: F,
    ) -> ResultEngine<PurchaseDetail>
    where
        F: FnOnce(&mut Purchase) -> ResultEngine<()>,
    {
        with_tx!(self, |db_tx| {
            let mut purchase =
                Purchase::try_from(self.require_purchase(&db_tx, id, user_id).await?)?;
            change(&mut purchase)?;
            purchases::ActiveModel::from(&purchase)
                .update(&db_tx)
                .await?;
            self.purchase_detail(&db_tx, purchase).await
        })
    }

    async fn purchase_detail<C: ConnectionTrait>(
        &self,
        db: &C,
        purchase: Purchase,
    ) -> ResultEngine<PurchaseDetail> {
        let warranties = warranties::Entity::find()
            .filter(warranties::Column::PurchaseId.eq(purchase.id.to_string()))
            .order_by_asc(warranties::Column::EndDate)
            .all(db)
            .await?
            .into_iter()
            .map(Warranty::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        let return_windows = return_windows::Entity::find()
            .filter(return_windows::Column::PurchaseId.eq(purchase.id.to_string()))
            .order_by_asc(return_windows::Column::EndDate)
            .all(db)
            .await?
            .into_iter()
            .map(ReturnWindow::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(PurchaseDetail {
            purchase,
            warranties,
            return_windows,
        })
    }

    pub async fn warranties(
        &self,
        user_id: &str,
        filter: &PurchaseChildFilter,
    ) -> ResultEngine<Vec<Warranty>> {
        let mut query = warranties::Entity::find()
            .inner_join(purchases::Entity)
            .filter(purchases::Column::UserId.eq(user_id.to_string()));
        if let Some(purchase_id) = filter.purchase_id {
            query = query.filter(warranties::Column::PurchaseId.eq(purchase_id.to_string()));
        }
        query
            .order_by_asc(warranties::Column::EndDate)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Warranty::try_from)
            .collect()
    }

    pub async fn warranty(&self, id: Uuid, user_id: &str) -> ResultEngine<Warranty> {
        let model = self.require_warranty(&self.database, id, user_id).await?;
        Warranty::try_from(model)
    }

    pub async fn new_warranty(&self, user_id: &str, input: WarrantyNew) -> ResultEngine<Warranty> {
        with_tx!(self, |db_tx| {
            self.require_purchase(&db_tx, input.purchase_id, user_id)
                .await?;
            let warranty = Warranty::new(input)?;
            warranties::ActiveModel::from(&warranty)
                .insert(&db_tx)
                .await?;
            Ok(warranty)
        })
    }

    pub async fn update_warranty(
        &self,
        id: Uuid,
        user_id: &str,
        input: WarrantyUpdate,
    ) -> ResultEngine<Warranty> {
        self.change_warranty(id, user_id, |warranty| warranty.apply(input))
            .await
    }

    pub async fn file_claim(
        &self,
        id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Warranty> {
        self.change_warranty(id, user_id, |warranty| warranty.file_claim(now))
            .await
    }

    pub async fn approve_claim(&self, id: Uuid, user_id: &str) -> ResultEngine<Warranty> {
        self.change_warranty(id, user_id, Warranty::approve_claim)
            .await
    }

    pub async fn reject_claim(
        &self,
        id: Uuid,
        user_id: &str,
        reason: &str,
    ) -> ResultEngine<Warranty> {
        self.change_warranty(id, user_id, |warranty| warranty.reject_claim(reason))
            .await
    }

    pub async fn void_warranty(
        &self,
        id: Uuid,
        user_id: &str,
        reason: &str,
    ) -> ResultEngine<Warranty> {
        self.change_warranty(id, user_id, |warranty| warranty.void_warranty(reason))
            .await
    }

    pub async fn expire_warranty(&self, id: Uuid, user_id: &str) -> ResultEngine<Warranty> {
        self.change_warranty(id, user_id, |warranty| {
            warranty.mark_as_expired();
            Ok(())
        })
        .await
    }

    pub async fn delete_warranty(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_warranty(&db_tx, id, user_id).await?;
            warranties::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn change_warranty<F>(&self, id: Uuid, user_id: &str, change: F) -> ResultEngine<Warranty>
    where
        F: FnOnce(&mut Warranty) -> ResultEngine<()>,
    {
        with_tx!(self, |db_tx| {
            let mut warranty =
                Warranty::try_from(self.require_warranty(&db_tx, id, user_id).await?)?;
            change(&mut warranty)?;
            warranties::ActiveModel::from(&warranty)
                .update(&db_tx)
                .await?;
            Ok(warranty)
        })
    }

    pub async fn return_windows(
        &self,
        user_id: &str,
        filter: &PurchaseChildFilter,
    ) -> ResultEngine<Vec<ReturnWindow>> {
        let mut query = return_windows::Entity::find()
            .inner_join(purchases::Entity)
            .filter(purchases::Column::UserId.eq(user_id.to_string()));
        if let Some(purchase_id) = filter.purchase_id {
            query = query.filter(return_windows::Column::PurchaseId.eq(purchase_id.to_string()));
        }
        query
            .order_by_asc(return_windows::Column::EndDate)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ReturnWindow::try_from)
            .collect()
    }

    pub async fn return_window(&self, id: Uuid, user_id: &str) -> ResultEngine<ReturnWindow> {
        let model = self
            .require_return_window(&self.database, id, user_id)
            .await?;
        ReturnWindow::try_from(model)
    }

    pub async fn new_return_window(
        &self,
        user_id: &str,
        input: ReturnWindowNew,
    ) -> ResultEngine<ReturnWindow> {
        with_tx!(self, |db_tx| {
            self.require_purchase(&db_tx, input.purchase_id, user_id)
                .await?;
            let window = ReturnWindow::new(input)?;
            return_windows::ActiveModel::from(&window)
                .insert(&db_tx)
                .await?;
            Ok(window)
        })
    }

    pub async fn update_return_window(
        &self,
        id: Uuid,
        user_id: &str,
        input: ReturnWindowUpdate,
    ) -> ResultEngine<ReturnWindow> {
        self.change_return_window(id, user_id, |window| window.apply(input))
            .await
    }

    pub async fn use_return_window(&self, id: Uuid, user_id: &str) -> ResultEngine<ReturnWindow> {
        self.change_return_window(id, user_id, ReturnWindow::mark_as_used)
            .await
    }

    pub async fn delete_return_window(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_return_window(&db_tx, id, user_id).await?;
            return_windows::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn change_return_window<F>(
        &self,
        id: Uuid,
        user_id: &str,
        change: F,
    ) -> ResultEngine<ReturnWindow>
    where
        F: FnOnce(&mut ReturnWindow) -> ResultEngine<()>,
    {
        with_tx!(self, |db_tx| {
            let mut window =
                ReturnWindow::try_from(self.require_return_window(&db_tx, id, user_id).await?)?;
            change(&mut window)?;
            return_windows::ActiveModel::from(&window)
                .update(&db_tx)
                .await?;
            Ok(window)
        })
    }
}

fn group_by_purchase<T>(items: Vec<T>, key: impl Fn(&T) -> Uuid) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for item in items {
        grouped.entry(key(&item)).or_default().push(item);
    }
    grouped
}
