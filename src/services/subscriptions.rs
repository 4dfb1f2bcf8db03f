use crate::auth::AuthenticatedUser;
use crate::billing::PaymentGateway;
use crate::domain::subscription::{NewSubscription, PlanType, Subscription};
use crate::repository::{
    MediatorReader, MediatorWriter, SubscriptionReader, SubscriptionWriter,
};
use crate::services::{ServiceError, ServiceResult, clients};

/// Subscribes the calling mediator to a plan. The processor customer and
/// subscription are created first; the local mirror is written only after
/// both succeeded.
pub async fn subscribe<R, G>(
    repo: &R,
    gateway: &G,
    user: &AuthenticatedUser,
    plan: PlanType,
) -> ServiceResult<Subscription>
where
    R: MediatorReader + MediatorWriter + SubscriptionReader + SubscriptionWriter + ?Sized,
    G: PaymentGateway,
{
    let mediator = clients::resolve_mediator(repo, user)?;

    if let Some(existing) = repo.get_current_subscription(mediator.id)? {
        if existing.status.grants_access() {
            return Err(ServiceError::Conflict(
                "an active subscription already exists".to_string(),
            ));
        }
    }

    let profile = repo.ensure_finance_profile(mediator.id)?;
    let customer_id = match profile.customer_id {
        Some(customer_id) => customer_id,
        None => {
            let customer = gateway
                .create_customer(&mediator.email, &mediator.name)
                .await?;
            repo.set_profile_customer_id(mediator.id, &customer.id)?;
            customer.id
        }
    };

    let created = gateway.create_subscription(&customer_id, plan).await?;

    let subscription = repo.upsert_subscription(&NewSubscription {
        mediator_id: mediator.id,
        processor_id: created.id,
        plan,
        status: created.status,
        current_period_end: created.current_period_end,
    })?;

    Ok(subscription)
}

pub fn current_subscription<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<Option<Subscription>>
where
    R: MediatorWriter + SubscriptionReader + ?Sized,
{
    let mediator = clients::resolve_mediator(repo, user)?;
    repo.get_current_subscription(mediator.id)
        .map_err(ServiceError::from)
}

/// Schedules the subscription to end at the period boundary.
pub async fn cancel_subscription<R, G>(
    repo: &R,
    gateway: &G,
    user: &AuthenticatedUser,
) -> ServiceResult<Subscription>
where
    R: MediatorWriter + SubscriptionReader + SubscriptionWriter + ?Sized,
    G: PaymentGateway,
{
    let mediator = clients::resolve_mediator(repo, user)?;
    let subscription = repo
        .get_current_subscription(mediator.id)?
        .ok_or(ServiceError::NotFound("subscription"))?;

    if !subscription.status.grants_access() {
        return Err(ServiceError::Conflict(
            "you cannot change an inactive subscription".to_string(),
        ));
    }

    let updated = gateway
        .cancel_subscription(&subscription.processor_id, true)
        .await?;

    let synced = repo
        .sync_subscription(
            &subscription.processor_id,
            &crate::domain::subscription::SubscriptionSync {
                status: updated.status,
                current_period_end: updated.current_period_end,
                cancel_at_period_end: updated.cancel_at_period_end,
            },
        )?
        .ok_or(ServiceError::NotFound("subscription"))?;

    Ok(synced)
}

/// Clears a scheduled cancellation before the period ends.
pub async fn resume_subscription<R, G>(
    repo: &R,
    gateway: &G,
    user: &AuthenticatedUser,
) -> ServiceResult<Subscription>
where
    R: MediatorWriter + SubscriptionReader + SubscriptionWriter + ?Sized,
    G: PaymentGateway,
{
    let mediator = clients::resolve_mediator(repo, user)?;
    let subscription = repo
        .get_current_subscription(mediator.id)?
        .ok_or(ServiceError::NotFound("subscription"))?;

    if !subscription.cancel_at_period_end {
        return Err(ServiceError::Conflict(
            "the subscription is not scheduled for cancellation".to_string(),
        ));
    }

    let updated = gateway
        .resume_subscription(&subscription.processor_id)
        .await?;

    let synced = repo
        .sync_subscription(
            &subscription.processor_id,
            &crate::domain::subscription::SubscriptionSync {
                status: updated.status,
                current_period_end: updated.current_period_end,
                cancel_at_period_end: updated.cancel_at_period_end,
            },
        )?
        .ok_or(ServiceError::NotFound("subscription"))?;

    Ok(synced)
}

/// Creates the mediator's deposit account (first call) and returns a hosted
/// onboarding link for it.
pub async fn deposit_onboarding_link<R, G>(
    repo: &R,
    gateway: &G,
    user: &AuthenticatedUser,
    refresh_url: &str,
    return_url: &str,
) -> ServiceResult<String>
where
    R: MediatorReader + MediatorWriter + ?Sized,
    G: PaymentGateway,
{
    let mediator = clients::resolve_mediator(repo, user)?;
    let profile = repo.ensure_finance_profile(mediator.id)?;

    let account_id = match profile.deposit_account_id {
        Some(account_id) => account_id,
        None => {
            let account = gateway.create_deposit_account(&mediator.email).await?;
            repo.set_profile_deposit_account(mediator.id, &account.id)?;
            account.id
        }
    };

    let link = gateway
        .create_onboarding_link(&account_id, refresh_url, return_url)
        .await?;

    Ok(link.url)
}
