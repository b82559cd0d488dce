use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::{sessions, users};
use crate::error::AppError;
use crate::external::{MailMessage, Mailer};
use crate::models::{NewUserRequest, User};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    #[serde(flatten)]
    pub user: User,
    pub credentials_delivered: bool,
}

/// Creates accounts and delivers their access token by mail.
pub struct AccountService {
    db: SqlitePool,
    mailer: Arc<dyn Mailer>,
}

impl AccountService {
    pub fn new(db: SqlitePool, mailer: Arc<dyn Mailer>) -> Self {
        Self { db, mailer }
    }

    /// The account is kept even when mail delivery fails; an admin can issue
    /// a new token later.
    pub async fn create_user(&self, req: NewUserRequest) -> Result<CreatedUser, AppError> {
        let user = users::insert_user(&self.db, req).await?;
        let token = sessions::issue_token(&self.db, &user.id).await?;
        info!(user_id = %user.id, role = ?user.role, "user created");

        let credentials_delivered = match self.mailer.send(&credentials_mail(&user, &token)).await {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = %user.id, "failed to deliver credentials: {}", e);
                false
            }
        };

        Ok(CreatedUser {
            user,
            credentials_delivered,
        })
    }

    /// Issues an additional token and mails it. Earlier tokens stay valid.
    pub async fn reissue_credentials(&self, user_id: &str) -> Result<(), AppError> {
        let user = users::find_user(&self.db, user_id)
            .await?
            .ok_or(AppError::NotFound("user"))?;
        let token = sessions::issue_token(&self.db, &user.id).await?;
        self.mailer.send(&credentials_mail(&user, &token)).await
    }
}

fn credentials_mail(user: &User, token: &str) -> MailMessage {
    MailMessage {
        to: user.email.clone(),
        subject: "Your training portal access".to_string(),
        body: format!(
            "Hello {},\n\nAn account with the {:?} role was created for you.\n\
             Use this access token to sign in:\n\n{}\n",
            user.name, user.role, token
        ),
    }
}
