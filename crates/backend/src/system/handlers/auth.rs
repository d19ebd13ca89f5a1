use axum::{Form, Json};
use contracts::system::auth::{role_flags, LoginForm, LoginResponse, UserInfo};

use crate::domain::salesperson::repository as salespeople;
use crate::shared::error::{ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;
use crate::system::{auth::jwt, users::service as user_service};

/// POST /login
pub async fn login(Form(form): Form<LoginForm>) -> ApiResult<Json<LoginResponse>> {
    let user = user_service::verify_credentials(&form.username, &form.password)
        .await
        .map_err(|e| ApiError::internal("Login failed", e))?
        .ok_or_else(|| {
            tracing::warn!("Failed login attempt for '{}'", form.username);
            ApiError::BadCredentials
        })?;

    let access_token = jwt::generate_access_token(&user.username, user.salesman_id)
        .await
        .map_err(|e| ApiError::internal("Failed to issue token", e))?;

    let (is_admin, is_superadmin) = role_flags(user.salesman_id);
    let salesperson = match user.salesman_id {
        Some(no) if !is_admin => salespeople::get_by_no(no)
            .await
            .map_err(|e| ApiError::internal("Failed to load salesperson", e))?,
        _ => None,
    };

    tracing::info!("User '{}' logged in (admin: {})", user.username, is_admin);

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        is_admin,
        is_superadmin,
        salesperson,
    }))
}

/// GET /api/me
pub async fn current_user(CurrentUser(claims): CurrentUser) -> Json<UserInfo> {
    Json(UserInfo {
        username: claims.sub,
        is_admin: claims.is_admin,
    })
}
