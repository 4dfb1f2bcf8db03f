//! Idempotency claims for processor webhook events.

use diesel::prelude::*;

use crate::domain::processor_event::{EventRecordStatus, ProcessorEventRecord};
use crate::models::processor_event::{
    NewProcessorEvent, ProcessorEvent as DbProcessorEvent,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, ProcessorEventStore};

impl ProcessorEventStore for DieselRepository {
    fn claim_event(&self, event_id: &str, event_type: &str) -> RepositoryResult<bool> {
        use crate::schema::processor_events;

        let mut conn = self.conn()?;

        // INSERT OR IGNORE keyed by the unique event id: exactly one delivery
        // wins the claim.
        let inserted = diesel::insert_into(processor_events::table)
            .values(&NewProcessorEvent {
                event_id,
                event_type,
                status: EventRecordStatus::Processing.as_str(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)?;

        if inserted > 0 {
            return Ok(true);
        }

        // A claim that previously ended in `error` is released back to the
        // processor's redelivery, so take it over again.
        let reclaimed = diesel::update(
            processor_events::table
                .filter(processor_events::event_id.eq(event_id))
                .filter(processor_events::status.eq(EventRecordStatus::Error.as_str())),
        )
        .set((
            processor_events::status.eq(EventRecordStatus::Processing.as_str()),
            processor_events::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        Ok(reclaimed > 0)
    }

    fn record_event_result(
        &self,
        event_id: &str,
        status: EventRecordStatus,
        error: Option<&str>,
    ) -> RepositoryResult<()> {
        use crate::schema::processor_events;

        let mut conn = self.conn()?;
        diesel::update(
            processor_events::table.filter(processor_events::event_id.eq(event_id)),
        )
        .set((
            processor_events::status.eq(status.as_str()),
            processor_events::error.eq(error),
            processor_events::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        Ok(())
    }

    fn get_event_record(
        &self,
        event_id: &str,
    ) -> RepositoryResult<Option<ProcessorEventRecord>> {
        use crate::schema::processor_events;

        let mut conn = self.conn()?;
        let row = processor_events::table
            .filter(processor_events::event_id.eq(event_id))
            .first::<DbProcessorEvent>(&mut conn)
            .optional()?;

        Ok(row.map(Into::into))
    }
}
