use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::notification::{
    NewNotification as DomainNewNotification, Notification as DomainNotification,
    NotificationKind,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::notifications)]
pub struct Notification {
    pub id: i32,
    pub recipient_email: String,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::notifications)]
pub struct NewNotification<'a> {
    pub recipient_email: &'a str,
    pub kind: String,
    pub title: &'a str,
    pub body: &'a str,
}

impl From<Notification> for DomainNotification {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            recipient_email: n.recipient_email,
            kind: NotificationKind::from(n.kind.as_str()),
            title: n.title,
            body: n.body,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

impl<'a> From<&'a DomainNewNotification> for NewNotification<'a> {
    fn from(n: &'a DomainNewNotification) -> Self {
        Self {
            recipient_email: n.recipient_email.as_str(),
            kind: n.kind.to_string(),
            title: n.title.as_str(),
            body: n.body.as_str(),
        }
    }
}
