use anyhow::{Context, Result};
use chrono::Utc;
use contracts::system::auth::{role_flags, TokenClaims};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;

use crate::shared::config;

/// Why a bearer token was rejected
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error(transparent)]
    Secret(#[from] anyhow::Error),
}

/// Build the claims of a freshly authenticated user
pub fn build_claims(
    username: &str,
    salesman_id: Option<i64>,
    lifetime_minutes: i64,
) -> TokenClaims {
    let now = Utc::now();
    let exp = (now + chrono::Duration::minutes(lifetime_minutes)).timestamp() as usize;
    let (is_admin, is_superadmin) = role_flags(salesman_id);

    TokenClaims {
        sub: username.to_string(),
        salesman_id,
        is_admin,
        is_superadmin,
        exp,
        iat: now.timestamp() as usize,
    }
}

pub fn encode_claims(claims: &TokenClaims, secret: &str) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

pub fn decode_claims(token: &str, secret: &str) -> Result<TokenClaims, TokenError> {
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

/// Generate a signed access token with the configured lifetime
pub async fn generate_access_token(username: &str, salesman_id: Option<i64>) -> Result<String> {
    let minutes = config::current().auth.access_token_minutes;
    let claims = build_claims(username, salesman_id, minutes);
    let secret = get_jwt_secret().await?;
    encode_claims(&claims, &secret)
}

/// Validate JWT token and extract claims
pub async fn validate_token(token: &str) -> Result<TokenClaims, TokenError> {
    let secret = get_jwt_secret().await?;
    decode_claims(token, &secret)
}

/// Configured secret, or the one kept in `sys_settings` (created on first use)
pub async fn get_jwt_secret() -> Result<String> {
    let configured = &config::current().auth.jwt_secret;
    if !configured.is_empty() {
        return Ok(configured.clone());
    }

    match get_jwt_secret_from_db().await {
        Ok(Some(secret)) => Ok(secret),
        Ok(None) => {
            let secret = generate_jwt_secret();
            save_jwt_secret_to_db(&secret).await?;
            Ok(secret)
        }
        Err(e) => Err(e.context("Failed to read JWT secret")),
    }
}

/// Generate a cryptographically secure JWT secret (256 bits)
fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(&random_bytes)
}

async fn get_jwt_secret_from_db() -> Result<Option<String>> {
    use crate::shared::data::db::get_connection;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    let conn = get_connection()?;

    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value FROM sys_settings WHERE key = ?",
            ["jwt_secret".into()],
        ))
        .await?;

    match result {
        Some(row) => {
            let secret: String = row.try_get("", "value")?;
            Ok(Some(secret))
        }
        None => Ok(None),
    }
}

async fn save_jwt_secret_to_db(secret: &str) -> Result<()> {
    use crate::shared::data::db::get_connection;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    let conn = get_connection()?;
    let now = Utc::now().to_rfc3339();

    // an existing secret wins if another request raced us here
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT OR IGNORE INTO sys_settings (key, value, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
        [
            "jwt_secret".into(),
            secret.to_string().into(),
            "Auto-generated JWT secret for authentication".into(),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await?;

    Ok(())
}
