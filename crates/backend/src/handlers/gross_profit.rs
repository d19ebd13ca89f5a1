use axum::{extract::Path, Json};
use contracts::domain::gross_profit::{
    GroupGrossProfitResponse, GrossProfitResponse, SaveGpOverridesRequest, SaveGpOverridesResponse,
};
use contracts::domain::division::ResetOverridesResponse;
use contracts::shared::keys::GroupRef;

use super::admin_info;
use crate::domain::gross_profit::service as gp_service;
use crate::shared::error::{ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/gross-profit
pub async fn list() -> ApiResult<Json<GrossProfitResponse>> {
    let data = gp_service::gross_profit_rows()
        .await
        .map_err(|e| ApiError::internal("Error fetching gross profit data", e))?;

    Ok(Json(GrossProfitResponse {
        success: true,
        total_records: data.len(),
        data,
    }))
}

/// GET /api/gross-profit/:salesperson_id/:customer_class/:group_key
pub async fn group(
    Path((salesperson_id, customer_class, group_key)): Path<(i64, String, String)>,
) -> ApiResult<Json<GroupGrossProfitResponse>> {
    let group = GroupRef::new(salesperson_id, &customer_class, &group_key);
    let data = gp_service::group_rows(&group)
        .await
        .map_err(|e| ApiError::internal("Error fetching group gross profit", e))?;

    Ok(Json(GroupGrossProfitResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

/// POST /api/gross-profit/overrides
pub async fn save_overrides(
    CurrentUser(claims): CurrentUser,
    Json(request): Json<SaveGpOverridesRequest>,
) -> ApiResult<Json<SaveGpOverridesResponse>> {
    gp_service::validate_overrides(&request.overrides).map_err(ApiError::validation)?;

    let result = gp_service::save_overrides(&request.overrides)
        .await
        .map_err(|e| ApiError::internal("Error saving gross profit overrides", e))?;

    Ok(Json(SaveGpOverridesResponse {
        success: true,
        message: format!(
            "Successfully saved {} new overrides and updated {} existing overrides",
            result.saved_count, result.updated_count
        ),
        result,
        user_info: admin_info(claims),
    }))
}

/// DELETE /api/gross-profit/reset-group/:salesperson_id/:customer_class/:group_key
pub async fn reset_group(
    CurrentUser(claims): CurrentUser,
    Path((salesperson_id, customer_class, group_key)): Path<(i64, String, String)>,
) -> ApiResult<Json<ResetOverridesResponse>> {
    let group = GroupRef::new(salesperson_id, &customer_class, &group_key);
    let deleted_count = gp_service::reset_group(&group)
        .await
        .map_err(|e| ApiError::internal("Error resetting gross profit overrides", e))?;

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
