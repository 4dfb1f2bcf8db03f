use serde::Deserialize;
use validator::Validate;

use crate::domain::matter::RateType;
use crate::services::matters::{CreateMatter, MatterAction};

#[derive(Deserialize, Validate)]
/// Payload for opening a new matter.
pub struct CreateMatterForm {
    pub client_id: i32,
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rate_type: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub rate_cents: i64,
}

impl From<&CreateMatterForm> for CreateMatter {
    fn from(form: &CreateMatterForm) -> Self {
        CreateMatter {
            client_id: form.client_id,
            title: form.title.clone(),
            description: form.description.clone(),
            rate_type: form
                .rate_type
                .as_deref()
                .map(RateType::from)
                .unwrap_or(RateType::Hourly),
            rate_cents: form.rate_cents,
        }
    }
}

#[derive(Deserialize)]
/// Payload requesting a matter status change.
pub struct MatterActionForm {
    pub action: String,
}

impl MatterActionForm {
    pub fn parsed(&self) -> Option<MatterAction> {
        match self.action.as_str() {
            "send_referral" => Some(MatterAction::SendReferral),
            "accept_referral" => Some(MatterAction::AcceptReferral),
            "close" => Some(MatterAction::Close),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
/// Query parameters for matter listings.
pub struct MatterListParams {
    pub page: Option<usize>,
    pub search: Option<String>,
}
