//! Repository implementation for mediators and their finance profiles.

use diesel::prelude::*;
use diesel::upsert::excluded;

use crate::domain::mediator::{DepositAccountState, FinanceProfile, Mediator, NewMediator};
use crate::domain::types::Email;
use crate::models::mediator::{
    FinanceProfile as DbFinanceProfile, Mediator as DbMediator, NewFinanceProfile,
    NewMediator as DbNewMediator,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, MediatorReader, MediatorWriter};

impl MediatorReader for DieselRepository {
    fn get_mediator_by_id(&self, id: i32) -> RepositoryResult<Option<Mediator>> {
        use crate::schema::mediators;

        let mut conn = self.conn()?;
        let mediator = mediators::table
            .find(id)
            .first::<DbMediator>(&mut conn)
            .optional()?;

        Ok(mediator.map(Into::into))
    }

    fn get_mediator_by_email(&self, email: &Email) -> RepositoryResult<Option<Mediator>> {
        use crate::schema::mediators;

        let mut conn = self.conn()?;
        let mediator = mediators::table
            .filter(mediators::email.eq(email.as_str()))
            .first::<DbMediator>(&mut conn)
            .optional()?;

        Ok(mediator.map(Into::into))
    }

    fn get_finance_profile(&self, mediator_id: i32) -> RepositoryResult<Option<FinanceProfile>> {
        use crate::schema::finance_profiles;

        let mut conn = self.conn()?;
        let profile = finance_profiles::table
            .filter(finance_profiles::mediator_id.eq(mediator_id))
            .first::<DbFinanceProfile>(&mut conn)
            .optional()?;

        Ok(profile.map(Into::into))
    }

    fn get_finance_profile_by_account(
        &self,
        deposit_account_id: &str,
    ) -> RepositoryResult<Option<FinanceProfile>> {
        use crate::schema::finance_profiles;

        let mut conn = self.conn()?;
        let profile = finance_profiles::table
            .filter(finance_profiles::deposit_account_id.eq(deposit_account_id))
            .first::<DbFinanceProfile>(&mut conn)
            .optional()?;

        Ok(profile.map(Into::into))
    }

    fn get_finance_profile_by_customer(
        &self,
        customer_id: &str,
    ) -> RepositoryResult<Option<FinanceProfile>> {
        use crate::schema::finance_profiles;

        let mut conn = self.conn()?;
        let profile = finance_profiles::table
            .filter(finance_profiles::customer_id.eq(customer_id))
            .first::<DbFinanceProfile>(&mut conn)
            .optional()?;

        Ok(profile.map(Into::into))
    }
}

impl MediatorWriter for DieselRepository {
    fn create_or_update_mediator(&self, new_mediator: &NewMediator) -> RepositoryResult<Mediator> {
        use crate::schema::mediators;

        let mut conn = self.conn()?;
        let insertable: DbNewMediator = new_mediator.into();

        let mediator = diesel::insert_into(mediators::table)
            .values(&insertable)
            .on_conflict(mediators::email)
            .do_update()
            .set(mediators::name.eq(excluded(mediators::name)))
            .get_result::<DbMediator>(&mut conn)?;

        Ok(mediator.into())
    }

    fn set_mediator_featured(&self, mediator_id: i32, featured: bool) -> RepositoryResult<()> {
        use crate::schema::mediators;

        let mut conn = self.conn()?;
        diesel::update(mediators::table.find(mediator_id))
            .set(mediators::featured.eq(featured))
            .execute(&mut conn)?;

        Ok(())
    }

    fn ensure_finance_profile(&self, mediator_id: i32) -> RepositoryResult<FinanceProfile> {
        use crate::schema::finance_profiles;

        let mut conn = self.conn()?;

        diesel::insert_into(finance_profiles::table)
            .values(&NewFinanceProfile { mediator_id })
            .on_conflict(finance_profiles::mediator_id)
            .do_nothing()
            .execute(&mut conn)?;

        let profile = finance_profiles::table
            .filter(finance_profiles::mediator_id.eq(mediator_id))
            .first::<DbFinanceProfile>(&mut conn)?;

        Ok(profile.into())
    }

    fn set_profile_customer_id(
        &self,
        mediator_id: i32,
        customer_id: &str,
    ) -> RepositoryResult<()> {
        use crate::schema::finance_profiles;

        let mut conn = self.conn()?;
        diesel::update(
            finance_profiles::table.filter(finance_profiles::mediator_id.eq(mediator_id)),
        )
        .set(finance_profiles::customer_id.eq(customer_id))
        .execute(&mut conn)?;

        Ok(())
    }

    fn set_profile_deposit_account(
        &self,
        mediator_id: i32,
        deposit_account_id: &str,
    ) -> RepositoryResult<()> {
        use crate::schema::finance_profiles;

        let mut conn = self.conn()?;
        diesel::update(
            finance_profiles::table.filter(finance_profiles::mediator_id.eq(mediator_id)),
        )
        .set(finance_profiles::deposit_account_id.eq(deposit_account_id))
        .execute(&mut conn)?;

        Ok(())
    }

    fn set_deposit_account_state(
        &self,
        deposit_account_id: &str,
        state: DepositAccountState,
    ) -> RepositoryResult<FinanceProfile> {
        use crate::schema::finance_profiles;

        let mut conn = self.conn()?;
        let profile = diesel::update(
            finance_profiles::table
                .filter(finance_profiles::deposit_account_id.eq(deposit_account_id)),
        )
        .set((
            finance_profiles::charges_enabled.eq(state.charges_enabled),
            finance_profiles::payouts_enabled.eq(state.payouts_enabled),
            finance_profiles::account_verified.eq(state.is_verified()),
            finance_profiles::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .get_result::<DbFinanceProfile>(&mut conn)
        .optional()?;

        profile.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn mark_promo_period_provided(&self, mediator_id: i32) -> RepositoryResult<()> {
        use crate::schema::finance_profiles;

        let mut conn = self.conn()?;
        diesel::update(
            finance_profiles::table.filter(finance_profiles::mediator_id.eq(mediator_id)),
        )
        .set(finance_profiles::was_promo_period_provided.eq(true))
        .execute(&mut conn)?;

        Ok(())
    }
}
