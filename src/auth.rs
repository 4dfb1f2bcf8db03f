//! Bearer-token authentication.
//!
//! Tokens are issued by the external auth service and verified here with the
//! shared secret. The [`AuthenticatedUser`] extractor makes the verified
//! claims available to route handlers.

use std::future::{Ready, ready};

use actix_web::error::ErrorUnauthorized;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::mediator::NewMediator;
use crate::domain::types::{Email, TypeConstraintError};
use crate::models::config::ServerConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Subject: stable user identifier at the auth service.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Returns `true` when the user carries the given role.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

/// Guard used at the top of handlers: `Err` holds a ready 403 response.
pub fn ensure_role(
    user: &AuthenticatedUser,
    role: &str,
) -> Result<(), actix_web::HttpResponse> {
    if check_role(role, &user.roles) {
        Ok(())
    } else {
        Err(actix_web::HttpResponse::Forbidden().finish())
    }
}

impl TryFrom<&AuthenticatedUser> for NewMediator {
    type Error = TypeConstraintError;

    fn try_from(user: &AuthenticatedUser) -> Result<Self, Self::Error> {
        Ok(NewMediator {
            email: Email::new(user.email.as_str())?,
            name: user.name.clone(),
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = (|| {
            let config = req
                .app_data::<web::Data<ServerConfig>>()
                .ok_or_else(|| ErrorUnauthorized("server configuration missing"))?;

            let token =
                bearer_token(req).ok_or_else(|| ErrorUnauthorized("missing bearer token"))?;

            let decoded = decode::<AuthenticatedUser>(
                token,
                &DecodingKey::from_secret(config.secret.as_bytes()),
                &Validation::default(),
            )
            .map_err(|e| {
                log::debug!("Token verification failed: {e}");
                ErrorUnauthorized("invalid bearer token")
            })?;

            Ok(decoded.claims)
        })();

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_role_matches_exactly() {
        let roles = vec!["mediator".to_string(), "admin".to_string()];
        assert!(check_role("mediator", &roles));
        assert!(check_role("admin", &roles));
        assert!(!check_role("client", &roles));
        assert!(!check_role("median", &roles));
    }

    #[test]
    fn new_mediator_from_user_normalizes_email() {
        let user = AuthenticatedUser {
            sub: "u1".into(),
            email: "Jane@Example.COM".into(),
            name: "Jane".into(),
            roles: vec!["mediator".into()],
            exp: 0,
        };
        let mediator = NewMediator::try_from(&user).unwrap();
        assert_eq!(mediator.email.as_str(), "jane@example.com");
    }

    #[test]
    fn bad_email_in_claims_is_rejected() {
        let user = AuthenticatedUser {
            sub: "u1".into(),
            email: "not-an-email".into(),
            name: "Jane".into(),
            roles: vec![],
            exp: 0,
        };
        assert!(NewMediator::try_from(&user).is_err());
    }
}
