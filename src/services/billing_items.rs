use chrono::NaiveDate;

use crate::auth::AuthenticatedUser;
use crate::domain::billing_item::{BillingItem, NewBillingItem, UpdateBillingItem};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::{
    BillingItemListQuery, BillingItemReader, BillingItemWriter, ClientReader, MatterReader,
    MatterWriter, MediatorWriter,
};
use crate::services::{ServiceError, ServiceResult, clients, matters};

/// A billing item may be edited while every invoice it is attached to is
/// still editable.
fn ensure_item_editable<R>(repo: &R, item_id: i32) -> ServiceResult<()>
where
    R: BillingItemReader + ?Sized,
{
    let attached = repo.list_item_invoices(item_id)?;
    if attached.iter().all(|inv| inv.available_for_editing()) {
        Ok(())
    } else {
        Err(ServiceError::Conflict(
            "billing item is attached to an invoice that is no longer editable".to_string(),
        ))
    }
}

pub fn add_billing_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    matter_id: i32,
    item: NewBillingItem,
) -> ServiceResult<BillingItem>
where
    R: BillingItemReader
        + BillingItemWriter
        + MatterReader
        + MediatorWriter
        + ClientReader
        + ?Sized,
{
    let mediator = clients::resolve_mediator(repo, user)?;
    let matter = matters::get_matter(repo, user, matter_id)?;

    if !matter.is_hourly_rated() {
        return Err(ServiceError::Validation(
            "billing items can only be recorded on hourly matters".to_string(),
        ));
    }
    if !matter.is_open() {
        return Err(ServiceError::Conflict(
            "matter is not open for billing".to_string(),
        ));
    }

    let item = NewBillingItem {
        matter_id: matter.id,
        client_id: matter.client_id,
        mediator_id: mediator.id,
        ..item
    }
    .validated()?;

    repo.create_billing_item(&item).map_err(ServiceError::from)
}

pub fn update_billing_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    item_id: i32,
    updates: UpdateBillingItem,
) -> ServiceResult<BillingItem>
where
    R: BillingItemReader
        + BillingItemWriter
        + MatterReader
        + MatterWriter
        + MediatorWriter
        + ClientReader
        + ?Sized,
{
    let item = repo
        .get_billing_item(item_id)?
        .ok_or(ServiceError::NotFound("billing item"))?;
    // Access control rides on the matter.
    matters::get_matter(repo, user, item.matter_id)?;
    ensure_item_editable(repo, item_id)?;

    repo.update_billing_item(item_id, &updates)
        .map_err(ServiceError::from)
}

pub fn delete_billing_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    item_id: i32,
) -> ServiceResult<()>
where
    R: BillingItemReader
        + BillingItemWriter
        + MatterReader
        + MediatorWriter
        + ClientReader
        + ?Sized,
{
    let item = repo
        .get_billing_item(item_id)?
        .ok_or(ServiceError::NotFound("billing item"))?;
    matters::get_matter(repo, user, item.matter_id)?;
    ensure_item_editable(repo, item_id)?;

    repo.delete_billing_item(item_id).map_err(ServiceError::from)
}

pub fn list_billing_items<R>(
    repo: &R,
    user: &AuthenticatedUser,
    matter_id: i32,
    page: usize,
    period: Option<(NaiveDate, NaiveDate)>,
) -> ServiceResult<(usize, Vec<BillingItem>)>
where
    R: BillingItemReader + MatterReader + MediatorWriter + ClientReader + ?Sized,
{
    matters::get_matter(repo, user, matter_id)?;

    let mut query =
        BillingItemListQuery::new(matter_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some((start, end)) = period {
        query = query.period(start, end);
    }

    repo.list_billing_items(query).map_err(ServiceError::from)
}
