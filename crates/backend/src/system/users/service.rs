use anyhow::Result;
use chrono::Utc;
use contracts::system::users::{CreateUserDto, User};

use super::repository;
use crate::system::auth::password;

/// Create a new user, returning its id
pub async fn create(dto: CreateUserDto) -> Result<String> {
    if dto.username.trim().is_empty() {
        return Err(anyhow::anyhow!("Username cannot be empty"));
    }

    if repository::get_by_username(&dto.username).await?.is_some() {
        return Err(anyhow::anyhow!("Username already exists"));
    }

    password::validate_password_strength(&dto.password)?;
    let password_hash = password::hash_password(&dto.password)?;

    let user_id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let user = User {
        id: user_id.clone(),
        username: dto.username,
        salesman_id: dto.salesman_id,
        full_name: dto.full_name,
        is_active: true,
        created_at: now.clone(),
        updated_at: now,
        last_login_at: None,
    };

    repository::create_with_password(&user, &password_hash).await?;

    Ok(user_id)
}

/// Active user whose password matches, if any
pub async fn verify_credentials(username: &str, password: &str) -> Result<Option<User>> {
    let user = match repository::get_by_username(username).await? {
        Some(user) if user.is_active => user,
        _ => return Ok(None),
    };

    let hash = match repository::get_password_hash(&user.id).await? {
        Some(hash) => hash,
        None => return Ok(None),
    };

    if !password::verify_password(password, &hash)? {
        return Ok(None);
    }

    repository::update_last_login(&user.id).await?;
    Ok(Some(user))
}

pub async fn get_by_username(username: &str) -> Result<Option<User>> {
    repository::get_by_username(username).await
}
