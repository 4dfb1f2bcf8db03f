use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::processor_event::{
    EventRecordStatus, ProcessorEventRecord as DomainProcessorEventRecord,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::processor_events)]
/// Idempotency claim row for one processor webhook event.
pub struct ProcessorEvent {
    pub id: i32,
    pub event_id: String,
    pub event_type: String,
    pub status: String,
    pub error: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::processor_events)]
pub struct NewProcessorEvent<'a> {
    pub event_id: &'a str,
    pub event_type: &'a str,
    pub status: &'a str,
}

impl From<ProcessorEvent> for DomainProcessorEventRecord {
    fn from(e: ProcessorEvent) -> Self {
        Self {
            id: e.id,
            event_id: e.event_id,
            event_type: e.event_type,
            status: EventRecordStatus::from(e.status.as_str()),
            error: e.error,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}
