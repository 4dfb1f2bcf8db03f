use serde::Deserialize;
use validator::Validate;

use crate::domain::client::{NewClient, UpdateClient};
use crate::domain::types::{Email, PhoneNumber, TypeConstraintError};

#[derive(Deserialize, Validate)]
/// Payload for registering a new client.
pub struct RegisterClientForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub phone: Option<String>,
}

impl TryFrom<&RegisterClientForm> for NewClient {
    type Error = TypeConstraintError;

    fn try_from(form: &RegisterClientForm) -> Result<Self, Self::Error> {
        let phone = form
            .phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PhoneNumber::new)
            .transpose()?;
        Ok(NewClient::new(
            Email::new(form.email.as_str())?,
            form.name.clone(),
            phone,
        ))
    }
}

#[derive(Deserialize, Validate)]
/// Payload for updating an existing client.
pub struct UpdateClientForm {
    #[validate(length(min = 1))]
    pub name: String,
    pub phone: Option<String>,
}

impl TryFrom<&UpdateClientForm> for UpdateClient {
    type Error = TypeConstraintError;

    fn try_from(form: &UpdateClientForm) -> Result<Self, Self::Error> {
        let phone = form
            .phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PhoneNumber::new)
            .transpose()?;
        Ok(UpdateClient {
            name: form.name.trim().to_string(),
            phone,
        })
    }
}
