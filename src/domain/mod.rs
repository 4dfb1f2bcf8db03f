//! Domain aggregates exposed by the practice-management service layer.

use thiserror::Error;

pub mod billing_item;
pub mod chat;
pub mod client;
pub mod document;
pub mod invoice;
pub mod matter;
pub mod mediator;
pub mod notification;
pub mod payment;
pub mod processor_event;
pub mod subscription;
pub mod types;

/// Returned by state-machine methods when the requested transition is not
/// legal from the current state. The entity is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("transition from `{from}` to `{to}` is not allowed")]
pub struct TransitionNotAllowed {
    pub from: &'static str,
    pub to: &'static str,
}
