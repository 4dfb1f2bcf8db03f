use crate::auth::{AuthenticatedUser, check_role};
use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::mediator::Mediator;
use crate::domain::types::Email;
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::{ClientReader, ClientWriter, MediatorWriter, Pagination};
use crate::services::{ServiceError, ServiceResult};
use crate::{ROLE_ADMIN, ROLE_MEDIATOR};

/// Resolves the calling mediator, creating the local row on first sight.
/// Tokens are minted by the auth service, so the local table lags behind it.
pub fn resolve_mediator<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Mediator>
where
    R: MediatorWriter + ?Sized,
{
    if !check_role(ROLE_MEDIATOR, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let new_mediator: crate::domain::mediator::NewMediator = user.try_into()?;
    repo.create_or_update_mediator(&new_mediator)
        .map_err(ServiceError::from)
}

/// Resolves the calling client by email; clients are registered by their
/// mediator, so a missing row means the caller has no access yet.
pub fn resolve_client<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Client>
where
    R: ClientReader + ?Sized,
{
    let email = Email::new(user.email.as_str())?;
    repo.get_client_by_email(&email)?
        .ok_or(ServiceError::Unauthorized)
}

/// Registers a client the mediator will open matters for. Registering an
/// email that already exists returns the existing record.
pub fn register_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    new_client: NewClient,
) -> ServiceResult<Client>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    if !check_role(ROLE_MEDIATOR, &user.roles) && !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    if let Some(existing) = repo.get_client_by_email(&new_client.email)? {
        return Ok(existing);
    }

    repo.create_client(&new_client).map_err(ServiceError::from)
}

pub fn get_client<R>(repo: &R, user: &AuthenticatedUser, client_id: i32) -> ServiceResult<Client>
where
    R: ClientReader + ?Sized,
{
    if !check_role(ROLE_MEDIATOR, &user.roles) && !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.get_client_by_id(client_id)?
        .ok_or(ServiceError::NotFound("client"))
}

pub fn list_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    page: usize,
) -> ServiceResult<(usize, Vec<Client>)>
where
    R: ClientReader + ?Sized,
{
    if !check_role(ROLE_MEDIATOR, &user.roles) && !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.list_clients(Some(Pagination {
        page,
        per_page: DEFAULT_ITEMS_PER_PAGE,
    }))
    .map_err(ServiceError::from)
}

pub fn update_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    updates: UpdateClient,
) -> ServiceResult<Client>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    if !check_role(ROLE_MEDIATOR, &user.roles) && !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.get_client_by_id(client_id)?
        .ok_or(ServiceError::NotFound("client"))?;
    repo.update_client(client_id, &updates)
        .map_err(ServiceError::from)
}
