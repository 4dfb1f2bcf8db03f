use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{Email, PhoneNumber};

/// A client: the party that is billed for mediation work.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    /// Customer identifier at the payment processor, set lazily the first
    /// time the client pays an invoice.
    pub customer_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewClient {
    pub email: Email,
    pub name: String,
    pub phone: Option<PhoneNumber>,
}

impl NewClient {
    #[must_use]
    pub fn new(email: Email, name: String, phone: Option<PhoneNumber>) -> Self {
        Self {
            email,
            name: name.trim().to_string(),
            phone,
        }
    }
}

#[derive(Clone, Debug)]
pub struct UpdateClient {
    pub name: String,
    pub phone: Option<PhoneNumber>,
}
