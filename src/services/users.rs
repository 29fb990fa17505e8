//! User management service

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
    repository::Repository,
};

use super::validation::{non_blank, require_text, validate_payload};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        validate_payload(&user)?;
        let name = require_text(user.name.as_deref(), "Name has to be not empty")?;
        let email = require_text(user.email.as_deref(), "Email has to be not empty")?;

        if self.repository.users.email_exists(&email, None).await? {
            return Err(AppError::Conflict(format!("User with email {} already exists", email)));
        }

        let created = self.repository.users.create(&name, &email).await?;
        tracing::info!("User {} created", created.id);
        Ok(created)
    }

    pub async fn update_user(&self, id: i64, update: UpdateUser) -> AppResult<User> {
        // Blank fields are ignored, so only the remaining ones are validated
        let update = UpdateUser {
            name: non_blank(update.name.as_deref()),
            email: non_blank(update.email.as_deref()),
        };
        validate_payload(&update)?;
        let current = self.repository.users.get_by_id(id).await?;

        let name = update.name.unwrap_or(current.name);
        let email = match update.email {
            Some(email) => {
                if self.repository.users.email_exists(&email, Some(id)).await? {
                    return Err(AppError::Conflict(format!(
                        "User with email {} already exists",
                        email
                    )));
                }
                email
            }
            None => current.email,
        };

        let updated = self.repository.users.update(id, &name, &email).await?;
        tracing::info!("User {} updated", id);
        Ok(updated)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        self.repository.users.delete(id).await?;
        tracing::info!("User {} deleted", id);
        Ok(())
    }
}
