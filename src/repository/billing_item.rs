//! Repository implementation for billing items.

use diesel::prelude::*;

use crate::domain::billing_item::{BillingItem, NewBillingItem, UpdateBillingItem};
use crate::domain::invoice::Invoice;
use crate::models::billing_item::{
    BillingItem as DbBillingItem, NewBillingItem as DbNewBillingItem,
    UpdateBillingItem as DbUpdateBillingItem,
};
use crate::models::invoice::Invoice as DbInvoice;
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    BillingItemListQuery, BillingItemReader, BillingItemWriter, DieselRepository,
};

impl BillingItemReader for DieselRepository {
    fn get_billing_item(&self, id: i32) -> RepositoryResult<Option<BillingItem>> {
        use crate::schema::billing_items;

        let mut conn = self.conn()?;
        let item = billing_items::table
            .find(id)
            .first::<DbBillingItem>(&mut conn)
            .optional()?;

        Ok(item.map(Into::into))
    }

    fn list_billing_items(
        &self,
        query: BillingItemListQuery,
    ) -> RepositoryResult<(usize, Vec<BillingItem>)> {
        use crate::schema::billing_items;

        let mut conn = self.conn()?;

        let build = || {
            let mut q = billing_items::table
                .filter(billing_items::matter_id.eq(query.matter_id))
                .into_boxed();
            if let Some((start, end)) = query.period {
                q = q
                    .filter(billing_items::work_date.ge(start))
                    .filter(billing_items::work_date.le(end));
            }
            if query.billable_only {
                q = q.filter(billing_items::is_billable.eq(true));
            }
            q
        };

        let total: i64 = build().count().get_result(&mut conn)?;

        let mut q = build().order(billing_items::work_date.asc());
        if let Some(p) = &query.pagination {
            let page = p.page.max(1) as i64;
            let per_page = p.per_page as i64;
            q = q.limit(per_page).offset((page - 1) * per_page);
        }

        let items = q
            .load::<DbBillingItem>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok((total as usize, items))
    }

    fn list_invoice_items(&self, invoice_id: i32) -> RepositoryResult<Vec<BillingItem>> {
        use crate::schema::{billing_items, invoice_items};

        let mut conn = self.conn()?;
        let items = invoice_items::table
            .inner_join(billing_items::table)
            .filter(invoice_items::invoice_id.eq(invoice_id))
            .select(billing_items::all_columns)
            .order(billing_items::work_date.asc())
            .load::<DbBillingItem>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(items)
    }

    fn list_item_invoices(&self, billing_item_id: i32) -> RepositoryResult<Vec<Invoice>> {
        use crate::schema::{invoice_items, invoices};

        let mut conn = self.conn()?;
        let rows = invoice_items::table
            .inner_join(invoices::table)
            .filter(invoice_items::billing_item_id.eq(billing_item_id))
            .select(invoices::all_columns)
            .load::<DbInvoice>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(rows)
    }
}

impl BillingItemWriter for DieselRepository {
    fn create_billing_item(&self, item: &NewBillingItem) -> RepositoryResult<BillingItem> {
        use crate::schema::billing_items;

        let mut conn = self.conn()?;
        let insertable: DbNewBillingItem = item.into();
        let created = diesel::insert_into(billing_items::table)
            .values(&insertable)
            .get_result::<DbBillingItem>(&mut conn)?;

        Ok(created.into())
    }

    fn update_billing_item(
        &self,
        item_id: i32,
        updates: &UpdateBillingItem,
    ) -> RepositoryResult<BillingItem> {
        use crate::schema::billing_items;

        let mut conn = self.conn()?;
        let db_updates: DbUpdateBillingItem = updates.into();
        let updated = diesel::update(billing_items::table.find(item_id))
            .set(&db_updates)
            .get_result::<DbBillingItem>(&mut conn)?;

        Ok(updated.into())
    }

    fn delete_billing_item(&self, item_id: i32) -> RepositoryResult<()> {
        use crate::schema::{billing_items, invoice_items};

        let mut conn = self.conn()?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(
                invoice_items::table.filter(invoice_items::billing_item_id.eq(item_id)),
            )
            .execute(conn)?;
            diesel::delete(billing_items::table.find(item_id)).execute(conn)?;
            Ok(())
        })?;

        Ok(())
    }
}
