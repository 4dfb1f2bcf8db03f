use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Months of free service granted once after the first renewal cycle.
pub const PROMO_PERIOD_MONTHS: u32 = 6;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Standard,
    /// Premium keeps the mediator featured in the public directory.
    Premium,
}

impl PlanType {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanType::Standard => "standard",
            PlanType::Premium => "premium",
        }
    }

    pub fn is_premium(self) -> bool {
        self == PlanType::Premium
    }
}

impl Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for PlanType {
    fn from(s: &str) -> Self {
        match s {
            "premium" => PlanType::Premium,
            _ => PlanType::Standard,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }

    /// Paid features stay available while the subscription is in one of
    /// these states.
    pub fn grants_access(self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Trialing | SubscriptionStatus::Active
        )
    }
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for SubscriptionStatus {
    fn from(s: &str) -> Self {
        match s {
            "trialing" => SubscriptionStatus::Trialing,
            "active" => SubscriptionStatus::Active,
            "past_due" => SubscriptionStatus::PastDue,
            _ => SubscriptionStatus::Canceled,
        }
    }
}

/// Local mirror of a processor subscription for one mediator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: i32,
    pub mediator_id: i32,
    /// Subscription identifier at the processor.
    pub processor_id: String,
    pub plan: PlanType,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<NaiveDateTime>,
    pub cancel_at_period_end: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewSubscription {
    pub mediator_id: i32,
    pub processor_id: String,
    pub plan: PlanType,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<NaiveDateTime>,
}

/// Fields re-synced from the processor on webhook delivery.
#[derive(Clone, Debug)]
pub struct SubscriptionSync {
    pub status: SubscriptionStatus,
    pub current_period_end: Option<NaiveDateTime>,
    pub cancel_at_period_end: bool,
}
