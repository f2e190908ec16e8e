//! User account rows

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};

use crate::errors::{LinkpulseError, Result};
use migration::entities::{UserEntity, user};

use super::SeaOrmStorage;

impl SeaOrmStorage {
    pub async fn create_user(&self, email: &str, password_hash: &str) -> Result<user::Model> {
        if self.find_user_by_email(email).await?.is_some() {
            return Err(LinkpulseError::conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        Ok(user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        Ok(UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }
}
