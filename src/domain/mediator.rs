use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::Email;

/// A mediator: the practitioner who owns matters and bills clients.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Mediator {
    pub id: i32,
    pub email: String,
    pub name: String,
    /// Featured placement in the public directory, granted while a premium
    /// subscription keeps paying.
    pub featured: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewMediator {
    pub email: Email,
    pub name: String,
}

/// Financial state attached to a mediator: the processor customer used for
/// subscription billing and the connected deposit account invoices are paid
/// into.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FinanceProfile {
    pub id: i32,
    pub mediator_id: i32,
    pub customer_id: Option<String>,
    pub deposit_account_id: Option<String>,
    pub account_verified: bool,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    /// The one-time promo period has already been granted.
    pub was_promo_period_provided: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl FinanceProfile {
    /// A deposit account exists and passed the processor's verification.
    pub fn deposit_account_ready(&self) -> bool {
        self.deposit_account_id.is_some() && self.account_verified
    }
}

/// Verification facts mirrored from the processor's account object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepositAccountState {
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub details_submitted: bool,
}

impl DepositAccountState {
    /// The processor considers the account ready for charges and payouts.
    pub fn is_verified(&self) -> bool {
        self.charges_enabled && self.payouts_enabled && self.details_submitted
    }
}
