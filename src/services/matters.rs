use rand::RngExt;

use crate::auth::{AuthenticatedUser, check_role};
use crate::domain::matter::{Matter, NewMatter, RateType};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::{
    ClientReader, MatterListQuery, MatterReader, MatterWriter, MediatorWriter,
};
use crate::services::{ServiceError, ServiceResult, clients};
use crate::{ROLE_ADMIN, ROLE_CLIENT, ROLE_MEDIATOR};

/// Status changes a caller can request on a matter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatterAction {
    SendReferral,
    AcceptReferral,
    Close,
}

/// Generates a human-readable matter code, e.g. `MA-48213`.
fn generate_matter_code() -> String {
    let mut rng = rand::rng();
    format!("MA-{:05}", rng.random_range(0..100_000))
}

pub struct CreateMatter {
    pub client_id: i32,
    pub title: String,
    pub description: String,
    pub rate_type: RateType,
    pub rate_cents: i64,
}

pub fn create_matter<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: CreateMatter,
) -> ServiceResult<Matter>
where
    R: MatterReader + MatterWriter + MediatorWriter + ClientReader + ?Sized,
{
    let mediator = clients::resolve_mediator(repo, user)?;

    repo.get_client_by_id(params.client_id)?
        .ok_or(ServiceError::NotFound("client"))?;

    // Retry on the (unlikely) collision of the random code.
    for _ in 0..5 {
        let new_matter = NewMatter {
            code: generate_matter_code(),
            mediator_id: mediator.id,
            client_id: params.client_id,
            title: params.title.trim().to_string(),
            description: params.description.trim().to_string(),
            rate_type: params.rate_type,
            rate_cents: params.rate_cents,
        };
        match repo.create_matter(&new_matter) {
            Ok(matter) => return Ok(matter),
            Err(crate::repository::errors::RepositoryError::ConstraintViolation(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(ServiceError::Internal(
        "could not allocate a unique matter code".to_string(),
    ))
}

/// Loads a matter the caller participates in (or any matter for admins).
pub fn get_matter<R>(repo: &R, user: &AuthenticatedUser, matter_id: i32) -> ServiceResult<Matter>
where
    R: MatterReader + MediatorWriter + ClientReader + ?Sized,
{
    let matter = repo
        .get_matter_by_id(matter_id)?
        .ok_or(ServiceError::NotFound("matter"))?;

    if check_role(ROLE_ADMIN, &user.roles) {
        return Ok(matter);
    }
    if check_role(ROLE_MEDIATOR, &user.roles) {
        let mediator = clients::resolve_mediator(repo, user)?;
        if matter.mediator_id == mediator.id {
            return Ok(matter);
        }
    }
    if check_role(ROLE_CLIENT, &user.roles) {
        let client = clients::resolve_client(repo, user)?;
        if matter.client_id == client.id {
            return Ok(matter);
        }
    }

    Err(ServiceError::Unauthorized)
}

pub struct MatterListPage {
    pub total: usize,
    pub matters: Vec<Matter>,
}

pub fn list_matters<R>(
    repo: &R,
    user: &AuthenticatedUser,
    page: usize,
    search: Option<String>,
) -> ServiceResult<MatterListPage>
where
    R: MatterReader + MediatorWriter + ClientReader + ?Sized,
{
    let mut query = MatterListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        query = query.search(term);
    }

    if check_role(ROLE_MEDIATOR, &user.roles) {
        let mediator = clients::resolve_mediator(repo, user)?;
        query = query.mediator(mediator.id);
    } else if check_role(ROLE_CLIENT, &user.roles) {
        let client = clients::resolve_client(repo, user)?;
        query = query.client(client.id);
    } else if !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let (total, matters) = repo.list_matters(query)?;
    Ok(MatterListPage { total, matters })
}

/// Applies a status transition; an illegal move surfaces as a conflict and
/// leaves the record untouched.
pub fn transition_matter<R>(
    repo: &R,
    user: &AuthenticatedUser,
    matter_id: i32,
    action: MatterAction,
) -> ServiceResult<Matter>
where
    R: MatterReader + MatterWriter + MediatorWriter + ClientReader + ?Sized,
{
    let mut matter = get_matter(repo, user, matter_id)?;

    if !check_role(ROLE_MEDIATOR, &user.roles) && !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    match action {
        MatterAction::SendReferral => matter.send_referral()?,
        MatterAction::AcceptReferral => matter.accept_referral()?,
        MatterAction::Close => matter.close()?,
    }

    repo.set_matter_status(matter_id, matter.status)
        .map_err(ServiceError::from)
}
