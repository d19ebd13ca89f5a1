use axum::{body::Body, extract::Request, http::header, middleware::Next, response::Response};
use contracts::system::auth::TokenClaims;

use super::jwt::{self, TokenError};
use crate::shared::error::ApiError;

fn bearer_token(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

async fn authenticate(token: Option<String>) -> Result<TokenClaims, ApiError> {
    let token = token.ok_or(ApiError::Unauthorized)?;

    jwt::validate_token(&token).await.map_err(|e| match e {
        TokenError::Expired => ApiError::TokenExpired,
        TokenError::Invalid => ApiError::InvalidToken,
        TokenError::Secret(err) => ApiError::internal("Failed to validate token", err),
    })
}

/// Middleware that requires valid JWT authentication
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let claims = authenticate(bearer_token(&req)).await?;

    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Middleware that requires admin privileges
pub async fn require_admin(mut req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let claims = authenticate(bearer_token(&req)).await?;

    if !claims.is_admin {
        tracing::warn!(
            "Admin route {} refused for {}",
            req.uri().path(),
            claims.sub
        );
        return Err(ApiError::admin_required());
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
