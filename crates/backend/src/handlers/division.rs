use axum::{extract::Path, Json};
use contracts::domain::division::{
    DivisionAllocationsResponse, GroupAllocationsResponse, ResetOverridesResponse,
    SaveRatiosRequest, SaveRatiosResponse,
};
use contracts::shared::keys::GroupRef;

use super::admin_info;
use crate::domain::division::service as division_service;
use crate::shared::error::{ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/division/allocations
pub async fn allocations(
    CurrentUser(claims): CurrentUser,
) -> ApiResult<Json<DivisionAllocationsResponse>> {
    let data = division_service::allocations()
        .await
        .map_err(|e| ApiError::internal("Error fetching division allocations", e))?;

    Ok(Json(DivisionAllocationsResponse {
        success: true,
        total_records: data.len(),
        data,
        user_info: admin_info(claims),
    }))
}

/// GET /api/division/allocations/:salesperson_id/:customer_class/:group_key
pub async fn group_allocations(
    CurrentUser(claims): CurrentUser,
    Path((salesperson_id, customer_class, group_key)): Path<(i64, String, String)>,
) -> ApiResult<Json<GroupAllocationsResponse>> {
    let group = GroupRef::new(salesperson_id, &customer_class, &group_key);
    let data = division_service::group_allocations(&group)
        .await
        .map_err(|e| ApiError::internal("Error fetching group allocations", e))?;

    Ok(Json(GroupAllocationsResponse {
        success: true,
        count: data.len(),
        data,
        user_info: admin_info(claims),
    }))
}

/// POST /api/division/save-ratios
pub async fn save_ratios(
    CurrentUser(claims): CurrentUser,
    Json(request): Json<SaveRatiosRequest>,
) -> ApiResult<Json<SaveRatiosResponse>> {
    division_service::validate_overrides(&request.overrides).map_err(ApiError::validation)?;

    let result = division_service::save_overrides(&request.overrides)
        .await
        .map_err(|e| ApiError::internal("Error saving division ratios", e))?;

    Ok(Json(SaveRatiosResponse {
        success: true,
        message: result.message(),
        result,
        user_info: admin_info(claims),
    }))
}

/// DELETE /api/division/reset-group/:salesperson_id/:customer_class/:group_key
pub async fn reset_group(
    CurrentUser(claims): CurrentUser,
    Path((salesperson_id, customer_class, group_key)): Path<(i64, String, String)>,
) -> ApiResult<Json<ResetOverridesResponse>> {
    let group = GroupRef::new(salesperson_id, &customer_class, &group_key);
    let deleted_count = division_service::reset_group(&group)
        .await
        .map_err(|e| ApiError::internal("Error resetting group overrides", e))?;

    Ok(Json(ResetOverridesResponse {
        success: true,
        message: format!(
            "Successfully reset {} custom overrides for group",
            deleted_count
        ),
        deleted_count,
        user_info: admin_info(claims),
    }))
}

/// DELETE /api/division/reset-all
pub async fn reset_all(
    CurrentUser(claims): CurrentUser,
) -> ApiResult<Json<ResetOverridesResponse>> {
    let deleted_count = division_service::reset_all()
        .await
        .map_err(|e| ApiError::internal("Error resetting overrides", e))?;

    Ok(Json(ResetOverridesResponse {
        success: true,
        message: format!("Successfully reset {} custom overrides", deleted_count),
        deleted_count,
        user_info: admin_info(claims),
    }))
}
