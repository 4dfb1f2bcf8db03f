use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::chat::{Chat as DomainChat, Message as DomainMessage};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::chats)]
/// Diesel model for [`crate::domain::chat::Chat`]. The channel UUID is
/// stored as text; rows written by this application always parse.
pub struct Chat {
    pub id: i32,
    pub channel: String,
    pub title: String,
    pub is_group: bool,
    pub matter_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::chats)]
pub struct NewChat<'a> {
    pub channel: &'a str,
    pub title: &'a str,
    pub is_group: bool,
    pub matter_id: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::chat_participants)]
pub struct ChatParticipant {
    pub chat_id: i32,
    pub email: String,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::messages)]
pub struct Message {
    pub id: i32,
    pub chat_id: i32,
    pub author_email: String,
    pub body: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::messages)]
pub struct NewMessage<'a> {
    pub chat_id: i32,
    pub author_email: &'a str,
    pub body: &'a str,
}

impl From<Chat> for DomainChat {
    fn from(c: Chat) -> Self {
        Self {
            id: c.id,
            channel: Uuid::parse_str(&c.channel).unwrap_or(Uuid::nil()),
            title: c.title,
            is_group: c.is_group,
            matter_id: c.matter_id,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<Message> for DomainMessage {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            chat_id: m.chat_id,
            author_email: m.author_email,
            body: m.body,
            created_at: m.created_at,
        }
    }
}
