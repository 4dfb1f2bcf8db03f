use crate::auth::AuthenticatedUser;
use crate::domain::chat::{Chat, Message, NewChat, NewMessage};
use crate::domain::types::{Email, SanitizedText};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::{ChatReader, ChatWriter, Pagination};
use crate::services::{ServiceError, ServiceResult};

/// Creates a chat. The caller is always added to the participant set.
pub fn create_chat<R>(
    repo: &R,
    user: &AuthenticatedUser,
    title: String,
    matter_id: Option<i32>,
    participant_emails: Vec<String>,
) -> ServiceResult<Chat>
where
    R: ChatWriter + ?Sized,
{
    let caller = Email::new(user.email.as_str())?;
    let mut participants = vec![caller];
    for raw in participant_emails {
        let email = Email::new(raw)?;
        if !participants.contains(&email) {
            participants.push(email);
        }
    }
    if participants.len() < 2 {
        return Err(ServiceError::Validation(
            "a chat needs at least one other participant".to_string(),
        ));
    }

    repo.create_chat(&NewChat::new(title, matter_id, participants))
        .map_err(ServiceError::from)
}

pub fn list_chats<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Chat>>
where
    R: ChatReader + ?Sized,
{
    repo.list_chats(&user.email.to_lowercase())
        .map_err(ServiceError::from)
}

fn ensure_participant<R>(repo: &R, chat_id: i32, user: &AuthenticatedUser) -> ServiceResult<()>
where
    R: ChatReader + ?Sized,
{
    repo.get_chat(chat_id)?
        .ok_or(ServiceError::NotFound("chat"))?;
    if repo.is_chat_participant(chat_id, &user.email.to_lowercase())? {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

pub fn list_messages<R>(
    repo: &R,
    user: &AuthenticatedUser,
    chat_id: i32,
    page: usize,
) -> ServiceResult<(usize, Vec<Message>)>
where
    R: ChatReader + ?Sized,
{
    ensure_participant(repo, chat_id, user)?;

    repo.list_messages(
        chat_id,
        Some(Pagination {
            page,
            per_page: DEFAULT_ITEMS_PER_PAGE,
        }),
    )
    .map_err(ServiceError::from)
}

/// Posts a message; the body is sanitized before it is stored.
pub fn post_message<R>(
    repo: &R,
    user: &AuthenticatedUser,
    chat_id: i32,
    body: String,
) -> ServiceResult<Message>
where
    R: ChatReader + ChatWriter + ?Sized,
{
    ensure_participant(repo, chat_id, user)?;

    let message = NewMessage {
        chat_id,
        author_email: Email::new(user.email.as_str())?,
        body: SanitizedText::new(body)?,
    };

    repo.create_message(&message).map_err(ServiceError::from)
}
