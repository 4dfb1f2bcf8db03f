//! Repository implementation for chats and messages.

use diesel::prelude::*;

use crate::domain::chat::{Chat, Message, NewChat, NewMessage};
use crate::models::chat::{
    Chat as DbChat, ChatParticipant, Message as DbMessage, NewChat as DbNewChat,
    NewMessage as DbNewMessage,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{ChatReader, ChatWriter, DieselRepository, Pagination};

impl ChatReader for DieselRepository {
    fn get_chat(&self, id: i32) -> RepositoryResult<Option<Chat>> {
        use crate::schema::chats;

        let mut conn = self.conn()?;
        let chat = chats::table.find(id).first::<DbChat>(&mut conn).optional()?;

        Ok(chat.map(Into::into))
    }

    fn list_chats(&self, participant_email: &str) -> RepositoryResult<Vec<Chat>> {
        use crate::schema::{chat_participants, chats};

        let mut conn = self.conn()?;
        let rows = chats::table
            .inner_join(chat_participants::table)
            .filter(chat_participants::email.eq(participant_email))
            .select(chats::all_columns)
            .order(chats::updated_at.desc())
            .load::<DbChat>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(rows)
    }

    fn is_chat_participant(&self, chat_id: i32, email: &str) -> RepositoryResult<bool> {
        use crate::schema::chat_participants;

        let mut conn = self.conn()?;
        let count: i64 = chat_participants::table
            .filter(chat_participants::chat_id.eq(chat_id))
            .filter(chat_participants::email.eq(email))
            .count()
            .get_result(&mut conn)?;

        Ok(count > 0)
    }

    fn list_messages(
        &self,
        chat_id: i32,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<Message>)> {
        use crate::schema::messages;

        let mut conn = self.conn()?;

        let total: i64 = messages::table
            .filter(messages::chat_id.eq(chat_id))
            .count()
            .get_result(&mut conn)?;

        let mut query = messages::table
            .filter(messages::chat_id.eq(chat_id))
            .order(messages::id.asc())
            .into_boxed();
        if let Some(p) = pagination {
            let page = p.page.max(1) as i64;
            let per_page = p.per_page as i64;
            query = query.limit(per_page).offset((page - 1) * per_page);
        }

        let items = query
            .load::<DbMessage>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok((total as usize, items))
    }
}

impl ChatWriter for DieselRepository {
    fn create_chat(&self, new_chat: &NewChat) -> RepositoryResult<Chat> {
        use crate::schema::{chat_participants, chats};

        let mut conn = self.conn()?;
        let channel = new_chat.channel.to_string();

        let chat = conn.transaction::<DbChat, diesel::result::Error, _>(|conn| {
            let chat = diesel::insert_into(chats::table)
                .values(&DbNewChat {
                    channel: &channel,
                    title: &new_chat.title,
                    is_group: new_chat.is_group,
                    matter_id: new_chat.matter_id,
                })
                .get_result::<DbChat>(conn)?;

            let participants: Vec<ChatParticipant> = new_chat
                .participants
                .iter()
                .map(|email| ChatParticipant {
                    chat_id: chat.id,
                    email: email.as_str().to_string(),
                    is_favorite: false,
                })
                .collect();

            for participant in &participants {
                diesel::insert_into(chat_participants::table)
                    .values(participant)
                    .on_conflict_do_nothing()
                    .execute(conn)?;
            }

            Ok(chat)
        })?;

        Ok(chat.into())
    }

    fn create_message(&self, new_message: &NewMessage) -> RepositoryResult<Message> {
        use crate::schema::{chats, messages};

        let mut conn = self.conn()?;
        let created = diesel::insert_into(messages::table)
            .values(&DbNewMessage {
                chat_id: new_message.chat_id,
                author_email: new_message.author_email.as_str(),
                body: new_message.body.as_str(),
            })
            .get_result::<DbMessage>(&mut conn)?;

        // Bump the chat so it sorts to the top of the list.
        diesel::update(chats::table.find(new_message.chat_id))
            .set(chats::updated_at.eq(chrono::Utc::now().naive_utc()))
            .execute(&mut conn)?;

        Ok(created.into())
    }
}
