use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
/// Payload for creating a chat.
pub struct CreateChatForm {
    #[validate(length(min = 1))]
    pub title: String,
    pub matter_id: Option<i32>,
    /// Other participants; the caller is added automatically.
    pub participants: Vec<String>,
}

#[derive(Deserialize, Validate)]
/// Payload for posting a message.
pub struct PostMessageForm {
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Deserialize)]
/// Query parameters for message listings.
pub struct MessageListParams {
    pub page: Option<usize>,
}
