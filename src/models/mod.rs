//! Diesel row mirrors for the domain entities.

pub mod billing_item;
pub mod chat;
pub mod client;
#[cfg(feature = "server")]
pub mod config;
pub mod document;
pub mod invoice;
pub mod matter;
pub mod mediator;
pub mod notification;
pub mod payment;
pub mod processor_event;
pub mod subscription;
