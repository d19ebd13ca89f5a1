use anyhow::{Context, Result};
use contracts::system::users::User;
use sea_orm::{ConnectionTrait, DatabaseBackend, QueryResult, Statement};

use crate::shared::data::db::get_connection;

const USER_COLUMNS: &str =
    "id, username, salesman_id, full_name, is_active, created_at, updated_at, last_login_at";

fn user_from_row(row: &QueryResult) -> Result<User> {
    Ok(User {
        id: row.try_get("", "id")?,
        username: row.try_get("", "username")?,
        salesman_id: row.try_get("", "salesman_id")?,
        full_name: row.try_get("", "full_name")?,
        is_active: row.try_get::<i64>("", "is_active")? != 0,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
        last_login_at: row.try_get("", "last_login_at")?,
    })
}

/// Create user with password hash
pub async fn create_with_password(user: &User, password_hash: &str) -> Result<()> {
    let conn = get_connection()?;

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_users
            (id, username, password_hash, salesman_id, full_name, is_active,
             created_at, updated_at, last_login_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        [
            user.id.clone().into(),
            user.username.clone().into(),
            password_hash.to_string().into(),
            user.salesman_id.into(),
            user.full_name.clone().into(),
            (if user.is_active { 1 } else { 0 }).into(),
            user.created_at.clone().into(),
            user.updated_at.clone().into(),
            user.last_login_at.clone().into(),
        ],
    ))
    .await
    .context("Failed to insert user")?;

    Ok(())
}

/// Get user by username
pub async fn get_by_username(username: &str) -> Result<Option<User>> {
    let conn = get_connection()?;

    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!("SELECT {} FROM sys_users WHERE username = ?", USER_COLUMNS),
            [username.into()],
        ))
        .await?;

    result.as_ref().map(user_from_row).transpose()
}

/// Get password hash for user
pub async fn get_password_hash(user_id: &str) -> Result<Option<String>> {
    let conn = get_connection()?;

    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT password_hash FROM sys_users WHERE id = ?",
            [user_id.into()],
        ))
        .await?;

    match result {
        Some(row) => Ok(Some(row.try_get("", "password_hash")?)),
        None => Ok(None),
    }
}

pub async fn update_last_login(user_id: &str) -> Result<()> {
    let conn = get_connection()?;
    let now = chrono::Utc::now().to_rfc3339();

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE sys_users SET last_login_at = ? WHERE id = ?",
        [now.into(), user_id.into()],
    ))
    .await?;

    Ok(())
}

pub async fn count_users() -> Result<i64> {
    let conn = get_connection()?;

    let result = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) as count FROM sys_users".to_string(),
        ))
        .await?;

    match result {
        Some(row) => Ok(row.try_get("", "count")?),
        None => Ok(0),
    }
}
