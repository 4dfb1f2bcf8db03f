use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::TransitionNotAllowed;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    Hourly,
    Flat,
}

impl RateType {
    pub fn as_str(self) -> &'static str {
        match self {
            RateType::Hourly => "hourly",
            RateType::Flat => "flat",
        }
    }
}

impl Display for RateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for RateType {
    fn from(s: &str) -> Self {
        match s {
            "flat" => RateType::Flat,
            _ => RateType::Hourly,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatterStatus {
    Open,
    Referral,
    Closed,
}

impl MatterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatterStatus::Open => "open",
            MatterStatus::Referral => "referral",
            MatterStatus::Closed => "closed",
        }
    }
}

impl Display for MatterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for MatterStatus {
    fn from(s: &str) -> Self {
        match s {
            "referral" => MatterStatus::Referral,
            "closed" => MatterStatus::Closed,
            _ => MatterStatus::Open,
        }
    }
}

/// A matter: one engagement between a mediator and a client, the anchor for
/// billing items, invoices, and documents.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Matter {
    pub id: i32,
    /// Human-readable code, unique across the system.
    pub code: String,
    pub mediator_id: i32,
    pub client_id: i32,
    pub title: String,
    pub description: String,
    pub rate_type: RateType,
    pub rate_cents: i64,
    pub status: MatterStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Matter {
    /// Billing items and invoices may only be attached to hourly matters.
    pub fn is_hourly_rated(&self) -> bool {
        self.rate_type == RateType::Hourly
    }

    pub fn is_open(&self) -> bool {
        self.status == MatterStatus::Open
    }

    /// `open` -> `referral`: hand the matter to another mediator.
    pub fn send_referral(&mut self) -> Result<(), TransitionNotAllowed> {
        self.status = transition(self.status, MatterStatus::Referral, &[MatterStatus::Open])?;
        Ok(())
    }

    /// `referral` -> `open`: the receiving mediator accepted.
    pub fn accept_referral(&mut self) -> Result<(), TransitionNotAllowed> {
        self.status = transition(self.status, MatterStatus::Open, &[MatterStatus::Referral])?;
        Ok(())
    }

    /// `open` -> `closed`.
    pub fn close(&mut self) -> Result<(), TransitionNotAllowed> {
        self.status = transition(self.status, MatterStatus::Closed, &[MatterStatus::Open])?;
        Ok(())
    }
}

fn transition(
    current: MatterStatus,
    target: MatterStatus,
    sources: &[MatterStatus],
) -> Result<MatterStatus, TransitionNotAllowed> {
    if sources.contains(&current) {
        Ok(target)
    } else {
        Err(TransitionNotAllowed {
            from: current.as_str(),
            to: target.as_str(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct NewMatter {
    pub code: String,
    pub mediator_id: i32,
    pub client_id: i32,
    pub title: String,
    pub description: String,
    pub rate_type: RateType,
    pub rate_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn matter(status: MatterStatus) -> Matter {
        let now = Utc::now().naive_utc();
        Matter {
            id: 1,
            code: "MA-0001".into(),
            mediator_id: 1,
            client_id: 1,
            title: "Estate".into(),
            description: String::new(),
            rate_type: RateType::Hourly,
            rate_cents: 15000,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn referral_round_trip() {
        let mut m = matter(MatterStatus::Open);
        m.send_referral().unwrap();
        assert_eq!(m.status, MatterStatus::Referral);
        m.accept_referral().unwrap();
        assert_eq!(m.status, MatterStatus::Open);
    }

    #[test]
    fn cannot_close_a_referral() {
        let mut m = matter(MatterStatus::Referral);
        assert!(m.close().is_err());
        assert_eq!(m.status, MatterStatus::Referral);
    }

    #[test]
    fn closed_is_terminal() {
        let mut m = matter(MatterStatus::Closed);
        assert!(m.send_referral().is_err());
        assert!(m.close().is_err());
    }
}
