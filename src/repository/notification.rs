//! Repository implementation for the notification inbox.

use diesel::prelude::*;

use crate::domain::notification::{NewNotification, Notification};
use crate::models::notification::{
    NewNotification as DbNewNotification, Notification as DbNotification,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, NotificationReader, NotificationWriter, Pagination};

impl NotificationReader for DieselRepository {
    fn list_notifications(
        &self,
        recipient_email: &str,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<Notification>)> {
        use crate::schema::notifications;

        let mut conn = self.conn()?;

        let total: i64 = notifications::table
            .filter(notifications::recipient_email.eq(recipient_email))
            .count()
            .get_result(&mut conn)?;

        let mut query = notifications::table
            .filter(notifications::recipient_email.eq(recipient_email))
            .order(notifications::id.desc())
            .into_boxed();
        if let Some(p) = pagination {
            let page = p.page.max(1) as i64;
            let per_page = p.per_page as i64;
            query = query.limit(per_page).offset((page - 1) * per_page);
        }

        let items = query
            .load::<DbNotification>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok((total as usize, items))
    }
}

impl NotificationWriter for DieselRepository {
    fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> RepositoryResult<Notification> {
        use crate::schema::notifications;

        let mut conn = self.conn()?;
        let insertable: DbNewNotification = notification.into();
        let created = diesel::insert_into(notifications::table)
            .values(&insertable)
            .get_result::<DbNotification>(&mut conn)?;

        Ok(created.into())
    }

    fn mark_notification_read(
        &self,
        notification_id: i32,
        recipient_email: &str,
    ) -> RepositoryResult<()> {
        use crate::schema::notifications;

        let mut conn = self.conn()?;
        diesel::update(
            notifications::table
                .find(notification_id)
                .filter(notifications::recipient_email.eq(recipient_email)),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)?;

        Ok(())
    }
}
