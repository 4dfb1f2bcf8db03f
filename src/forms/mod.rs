//! Deserialized and validated request payloads.

pub mod billing_items;
pub mod chats;
pub mod clients;
pub mod documents;
pub mod invoices;
pub mod matters;
pub mod subscriptions;
