//! Repository implementation for subscription mirrors.

use diesel::prelude::*;
use diesel::upsert::excluded;

use crate::domain::subscription::{
    NewSubscription, Subscription, SubscriptionStatus, SubscriptionSync,
};
use crate::models::subscription::{
    NewSubscription as DbNewSubscription, Subscription as DbSubscription,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, SubscriptionReader, SubscriptionWriter};

impl SubscriptionReader for DieselRepository {
    fn get_subscription_by_processor_id(
        &self,
        processor_id: &str,
    ) -> RepositoryResult<Option<Subscription>> {
        use crate::schema::subscriptions;

        let mut conn = self.conn()?;
        let sub = subscriptions::table
            .filter(subscriptions::processor_id.eq(processor_id))
            .first::<DbSubscription>(&mut conn)
            .optional()?;

        Ok(sub.map(Into::into))
    }

    fn get_current_subscription(
        &self,
        mediator_id: i32,
    ) -> RepositoryResult<Option<Subscription>> {
        use crate::schema::subscriptions;

        let mut conn = self.conn()?;
        let sub = subscriptions::table
            .filter(subscriptions::mediator_id.eq(mediator_id))
            .filter(subscriptions::status.ne(SubscriptionStatus::Canceled.as_str()))
            .order(subscriptions::id.desc())
            .first::<DbSubscription>(&mut conn)
            .optional()?;

        Ok(sub.map(Into::into))
    }
}

impl SubscriptionWriter for DieselRepository {
    fn upsert_subscription(&self, sub: &NewSubscription) -> RepositoryResult<Subscription> {
        use crate::schema::subscriptions;

        let mut conn = self.conn()?;
        let insertable: DbNewSubscription = sub.into();

        let row = diesel::insert_into(subscriptions::table)
            .values(&insertable)
            .on_conflict(subscriptions::processor_id)
            .do_update()
            .set((
                subscriptions::plan.eq(excluded(subscriptions::plan)),
                subscriptions::status.eq(excluded(subscriptions::status)),
                subscriptions::current_period_end
                    .eq(excluded(subscriptions::current_period_end)),
                subscriptions::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .get_result::<DbSubscription>(&mut conn)?;

        Ok(row.into())
    }

    fn sync_subscription(
        &self,
        processor_id: &str,
        sync: &SubscriptionSync,
    ) -> RepositoryResult<Option<Subscription>> {
        use crate::schema::subscriptions;

        let mut conn = self.conn()?;
        let row = diesel::update(
            subscriptions::table.filter(subscriptions::processor_id.eq(processor_id)),
        )
        .set((
            subscriptions::status.eq(sync.status.as_str()),
            subscriptions::current_period_end.eq(sync.current_period_end),
            subscriptions::cancel_at_period_end.eq(sync.cancel_at_period_end),
            subscriptions::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .get_result::<DbSubscription>(&mut conn)
        .optional()?;

        Ok(row.map(Into::into))
    }
}
