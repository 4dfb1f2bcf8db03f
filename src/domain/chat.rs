use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{Email, SanitizedText};

/// A chat room, addressed by a stable channel UUID so real-time transports
/// can subscribe without knowing the row id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Chat {
    pub id: i32,
    pub channel: Uuid,
    pub title: String,
    pub is_group: bool,
    pub matter_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewChat {
    pub channel: Uuid,
    pub title: String,
    pub is_group: bool,
    pub matter_id: Option<i32>,
    pub participants: Vec<Email>,
}

impl NewChat {
    /// Creates a chat with a fresh channel id. A chat is a group chat once
    /// it has more than two participants.
    #[must_use]
    pub fn new(title: String, matter_id: Option<i32>, participants: Vec<Email>) -> Self {
        let is_group = participants.len() > 2;
        Self {
            channel: Uuid::new_v4(),
            title: title.trim().to_string(),
            is_group,
            matter_id,
            participants,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: i32,
    pub chat_id: i32,
    pub author_email: String,
    pub body: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewMessage {
    pub chat_id: i32,
    pub author_email: Email,
    pub body: SanitizedText,
}
