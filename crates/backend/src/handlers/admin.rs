use axum::Json;
use contracts::dashboards::admin_summary::AdminSummaryResponse;

use super::admin_info;
use crate::dashboards::admin_summary::service as summary_service;
use crate::shared::error::{ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/admin/summary
pub async fn summary(CurrentUser(claims): CurrentUser) -> ApiResult<Json<AdminSummaryResponse>> {
    let data = summary_service::get_admin_summary()
        .await
        .map_err(|e| ApiError::internal("Error fetching admin summary", e))?;

    Ok(Json(AdminSummaryResponse {
        success: true,
        total_salespeople: data.len(),
        data,
        user_info: admin_info(claims),
    }))
}
