use serde::Deserialize;
use validator::Validate;

use crate::domain::subscription::PlanType;

#[derive(Deserialize)]
/// Payload for starting a subscription.
pub struct SubscribeForm {
    pub plan: String,
}

impl SubscribeForm {
    pub fn plan_type(&self) -> PlanType {
        PlanType::from(self.plan.as_str())
    }
}

#[derive(Deserialize, Validate)]
/// Payload requesting a deposit-account onboarding link.
pub struct OnboardingForm {
    #[validate(url)]
    pub refresh_url: String,
    #[validate(url)]
    pub return_url: String,
}
