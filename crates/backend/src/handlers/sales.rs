use axum::{extract::Path, Json};
use contracts::domain::sales::{
    SaleRow, SalesResponse, SalesSummary, SalesSummaryResponse, SalesUserInfo,
    SalespersonSalesResponse,
};
use contracts::domain::salesperson::{Salesperson, SalespersonInfoResponse};

use crate::domain::sales::service as sales_service;
use crate::domain::salesperson::repository as salespeople;
use crate::shared::error::{ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

async fn own_salesperson(username: &str) -> ApiResult<Option<Salesperson>> {
    salespeople::get_for_username(username)
        .await
        .map_err(|e| ApiError::internal("Error fetching salesperson", e))
}

pub(crate) async fn salesperson_or_404(salesperson_id: i64) -> ApiResult<Salesperson> {
    salespeople::get_by_no(salesperson_id)
        .await
        .map_err(|e| ApiError::internal("Error fetching salesperson", e))?
        .ok_or_else(|| {
            ApiError::not_found(format!("Salesperson with ID {} not found", salesperson_id))
        })
}

async fn rows_of(salesperson: Option<&Salesperson>) -> ApiResult<Vec<SaleRow>> {
    match salesperson {
        Some(sp) => sales_service::sales_rows(sp)
            .await
            .map_err(|e| ApiError::internal("Error fetching sales data", e)),
        None => Ok(Vec::new()),
    }
}

/// GET /api/sales
pub async fn list_own(CurrentUser(claims): CurrentUser) -> ApiResult<Json<SalesResponse>> {
    let salesperson = own_salesperson(&claims.sub).await?;
    let rows = rows_of(salesperson.as_ref()).await?;
    let role = salesperson
        .as_ref()
        .and_then(|sp| sp.role.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(Json(SalesResponse {
        success: true,
        summary: SalesSummary::from_rows(&rows),
        user_info: SalesUserInfo {
            username: claims.sub,
            is_hospitality: salesperson
                .as_ref()
                .map(Salesperson::is_hospitality)
                .unwrap_or(false),
            role,
            salesperson_id: salesperson.as_ref().map(|sp| sp.salesman_no),
        },
        total_records: rows.len(),
        data: rows,
    }))
}

/// GET /api/sales/summary
pub async fn summary_own(
    CurrentUser(claims): CurrentUser,
) -> ApiResult<Json<SalesSummaryResponse>> {
    let salesperson = own_salesperson(&claims.sub).await?;
    let rows = rows_of(salesperson.as_ref()).await?;

    Ok(Json(SalesSummaryResponse {
        success: true,
        summary: SalesSummary::from_rows(&rows),
    }))
}

/// GET /api/sales/:salesperson_id
pub async fn list_for_salesperson(
    Path(salesperson_id): Path<i64>,
) -> ApiResult<Json<SalespersonSalesResponse>> {
    let salesperson = salesperson_or_404(salesperson_id).await?;
    let rows = rows_of(Some(&salesperson)).await?;

    Ok(Json(SalespersonSalesResponse {
        success: true,
        summary: SalesSummary::from_rows(&rows),
        salesperson_info: salesperson.info(),
        total_records: rows.len(),
        data: rows,
    }))
}

/// GET /api/salesperson/:salesperson_id/info
pub async fn salesperson_info(
    Path(salesperson_id): Path<i64>,
) -> ApiResult<Json<SalespersonInfoResponse>> {
    let salesperson = salesperson_or_404(salesperson_id).await?;
    Ok(Json(SalespersonInfoResponse {
        success: true,
        data: salesperson.info(),
    }))
}
