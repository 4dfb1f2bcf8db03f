//! Repository implementation for invoices and their payments.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::invoice::{Invoice, InvoiceActivity, InvoiceStatus, NewInvoice};
use crate::domain::payment::{NewPayment, Payment, PaymentState};
use crate::models::invoice::{
    Invoice as DbInvoice, InvoiceActivity as DbInvoiceActivity, InvoiceStateChange,
    NewInvoice as DbNewInvoice, NewInvoiceActivity, NewInvoiceItem,
};
use crate::models::payment::{
    NewPayment as DbNewPayment, Payment as DbPayment, PaymentStateChange,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    DieselRepository, InvoiceListQuery, InvoiceReader, InvoiceWriter, PaymentReader,
    PaymentWriter,
};

impl InvoiceReader for DieselRepository {
    fn get_invoice_by_id(&self, id: i32) -> RepositoryResult<Option<Invoice>> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let invoice = invoices::table
            .find(id)
            .first::<DbInvoice>(&mut conn)
            .optional()?;

        Ok(invoice.map(Into::into))
    }

    fn get_invoice_by_processor_id(
        &self,
        processor_id: &str,
    ) -> RepositoryResult<Option<Invoice>> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let invoice = invoices::table
            .filter(invoices::processor_id.eq(processor_id))
            .first::<DbInvoice>(&mut conn)
            .optional()?;

        Ok(invoice.map(Into::into))
    }

    fn find_invoice_for_period(
        &self,
        matter_id: i32,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> RepositoryResult<Option<Invoice>> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let invoice = invoices::table
            .filter(invoices::matter_id.eq(matter_id))
            .filter(invoices::period_start.eq(period_start))
            .filter(invoices::period_end.eq(period_end))
            .filter(invoices::status.ne(InvoiceStatus::Voided.as_str()))
            .first::<DbInvoice>(&mut conn)
            .optional()?;

        Ok(invoice.map(Into::into))
    }

    fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;

        let statuses: Vec<&'static str> =
            query.statuses.iter().map(|s| s.as_str()).collect();

        let build = || {
            let mut q = invoices::table.into_boxed();
            if let Some(mediator_id) = query.mediator_id {
                q = q.filter(invoices::mediator_id.eq(mediator_id));
            }
            if let Some(client_id) = query.client_id {
                q = q.filter(invoices::client_id.eq(client_id));
            }
            if let Some(matter_id) = query.matter_id {
                q = q.filter(invoices::matter_id.eq(matter_id));
            }
            if !statuses.is_empty() {
                q = q.filter(invoices::status.eq_any(statuses.clone()));
            }
            q
        };

        let total: i64 = build().count().get_result(&mut conn)?;

        let mut q = build().order(invoices::id.desc());
        if let Some(p) = &query.pagination {
            let page = p.page.max(1) as i64;
            let per_page = p.per_page as i64;
            q = q.limit(per_page).offset((page - 1) * per_page);
        }

        let items = q
            .load::<DbInvoice>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok((total as usize, items))
    }

    fn list_invoices_past_due(&self, today: NaiveDate) -> RepositoryResult<Vec<Invoice>> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let items = invoices::table
            .filter(invoices::status.eq(InvoiceStatus::Open.as_str()))
            .filter(invoices::due_date.lt(today))
            .load::<DbInvoice>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(items)
    }

    fn list_invoice_activities(
        &self,
        invoice_id: i32,
    ) -> RepositoryResult<Vec<InvoiceActivity>> {
        use crate::schema::invoice_activities;

        let mut conn = self.conn()?;
        let rows = invoice_activities::table
            .filter(invoice_activities::invoice_id.eq(invoice_id))
            .order(invoice_activities::id.asc())
            .load::<DbInvoiceActivity>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(rows)
    }
}

impl InvoiceWriter for DieselRepository {
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let insertable: DbNewInvoice = new_invoice.into();
        let created = diesel::insert_into(invoices::table)
            .values(&insertable)
            .get_result::<DbInvoice>(&mut conn)?;

        Ok(created.into())
    }

    fn attach_billing_items(
        &self,
        invoice_id: i32,
        billing_item_ids: &[i32],
    ) -> RepositoryResult<usize> {
        use crate::schema::invoice_items;

        let mut conn = self.conn()?;
        let rows: Vec<NewInvoiceItem> = billing_item_ids
            .iter()
            .map(|&billing_item_id| NewInvoiceItem {
                invoice_id,
                billing_item_id,
            })
            .collect();

        let mut inserted = 0;
        for row in &rows {
            inserted += diesel::insert_into(invoice_items::table)
                .values(row)
                .on_conflict_do_nothing()
                .execute(&mut conn)?;
        }

        Ok(inserted)
    }

    fn detach_billing_item(&self, invoice_id: i32, billing_item_id: i32) -> RepositoryResult<()> {
        use crate::schema::invoice_items;

        let mut conn = self.conn()?;
        diesel::delete(
            invoice_items::table
                .filter(invoice_items::invoice_id.eq(invoice_id))
                .filter(invoice_items::billing_item_id.eq(billing_item_id)),
        )
        .execute(&mut conn)?;

        Ok(())
    }

    fn detach_items_from_other_invoices(&self, invoice_id: i32) -> RepositoryResult<usize> {
        use crate::schema::invoice_items;

        let mut conn = self.conn()?;

        let item_ids: Vec<i32> = invoice_items::table
            .filter(invoice_items::invoice_id.eq(invoice_id))
            .select(invoice_items::billing_item_id)
            .load(&mut conn)?;

        if item_ids.is_empty() {
            return Ok(0);
        }

        let removed = diesel::delete(
            invoice_items::table
                .filter(invoice_items::billing_item_id.eq_any(item_ids))
                .filter(invoice_items::invoice_id.ne(invoice_id)),
        )
        .execute(&mut conn)?;

        Ok(removed)
    }

    fn save_invoice_state(&self, invoice: &Invoice) -> RepositoryResult<Invoice> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let changes: InvoiceStateChange = invoice.into();
        let updated = diesel::update(invoices::table.find(invoice.id))
            .set(&changes)
            .get_result::<DbInvoice>(&mut conn)?;

        Ok(updated.into())
    }

    fn log_invoice_activity(&self, invoice_id: i32, activity: &str) -> RepositoryResult<()> {
        use crate::schema::invoice_activities;

        let mut conn = self.conn()?;
        diesel::insert_into(invoice_activities::table)
            .values(&NewInvoiceActivity {
                invoice_id,
                activity,
            })
            .execute(&mut conn)?;

        Ok(())
    }
}

impl PaymentReader for DieselRepository {
    fn get_payment_by_id(&self, id: i32) -> RepositoryResult<Option<Payment>> {
        use crate::schema::payments;

        let mut conn = self.conn()?;
        let payment = payments::table
            .find(id)
            .first::<DbPayment>(&mut conn)
            .optional()?;

        Ok(payment.map(Into::into))
    }

    fn get_payment_by_intent(&self, intent_id: &str) -> RepositoryResult<Option<Payment>> {
        use crate::schema::payments;

        let mut conn = self.conn()?;
        let payment = payments::table
            .filter(payments::intent_id.eq(intent_id))
            .first::<DbPayment>(&mut conn)
            .optional()?;

        Ok(payment.map(Into::into))
    }

    fn get_payment_for_invoice(&self, invoice_id: i32) -> RepositoryResult<Option<Payment>> {
        use crate::schema::payments;

        let mut conn = self.conn()?;
        let payment = payments::table
            .filter(payments::invoice_id.eq(invoice_id))
            .order(payments::id.desc())
            .first::<DbPayment>(&mut conn)
            .optional()?;

        Ok(payment.map(Into::into))
    }

    fn list_stale_failed_payments(
        &self,
        cutoff: NaiveDateTime,
    ) -> RepositoryResult<Vec<Payment>> {
        use crate::schema::payments;

        let mut conn = self.conn()?;
        let rows = payments::table
            .filter(payments::status.eq(PaymentState::Failed.as_str()))
            .filter(payments::updated_at.le(cutoff))
            .load::<DbPayment>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(rows)
    }
}

impl PaymentWriter for DieselRepository {
    fn create_payment(&self, new_payment: &NewPayment) -> RepositoryResult<Payment> {
        use crate::schema::payments;

        let mut conn = self.conn()?;
        let insertable: DbNewPayment = new_payment.into();
        let created = diesel::insert_into(payments::table)
            .values(&insertable)
            .get_result::<DbPayment>(&mut conn)?;

        Ok(created.into())
    }

    fn save_payment_state(&self, payment: &Payment) -> RepositoryResult<Payment> {
        use crate::schema::payments;

        let mut conn = self.conn()?;
        let changes: PaymentStateChange = payment.into();
        let updated = diesel::update(payments::table.find(payment.id))
            .set(&changes)
            .get_result::<DbPayment>(&mut conn)?;

        Ok(updated.into())
    }
}
