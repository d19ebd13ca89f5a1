use axum::{extract::Path, Json};
use contracts::domain::budget::{
    AutosuggestResponse, BudgetCreate, BudgetListResponse, BudgetOwnerInfo, BudgetResponse,
    BudgetSummary, BudgetUpdate, GeneratedBudgetsResponse,
};
use contracts::domain::salesperson::Salesperson;
use contracts::shared::response::MessageResponse;
use contracts::system::auth::TokenClaims;

use super::sales::salesperson_or_404;
use crate::domain::budget::service::{self as budget_service, BudgetError, BudgetScope};
use crate::domain::salesperson::repository as salespeople;
use crate::shared::error::{ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

impl From<BudgetError> for ApiError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::NotFound => ApiError::not_found(err.to_string()),
            BudgetError::Forbidden => ApiError::Forbidden(err.to_string()),
            BudgetError::Invalid(message) => ApiError::validation(message),
            BudgetError::Other(e) => ApiError::internal("Budget operation failed", e),
        }
    }
}

async fn own_salesperson(username: &str) -> ApiResult<Option<Salesperson>> {
    salespeople::get_for_username(username)
        .await
        .map_err(|e| ApiError::internal("Error fetching salesperson", e))
}

async fn require_own_salesperson(username: &str) -> ApiResult<Salesperson> {
    own_salesperson(username)
        .await?
        .ok_or_else(|| ApiError::not_found("Salesperson not found"))
}

/// Scope of a caller addressing a budget by id alone
async fn caller_scope(claims: &TokenClaims) -> ApiResult<BudgetScope> {
    if claims.is_admin {
        return Ok(BudgetScope::Admin);
    }
    let salesperson = require_own_salesperson(&claims.sub).await?;
    Ok(BudgetScope::Owner(salesperson.salesman_no))
}

async fn list_response(
    salesperson: &Salesperson,
    username: Option<String>,
) -> ApiResult<BudgetListResponse> {
    let budgets = budget_service::list(salesperson.salesman_no)
        .await
        .map_err(|e| ApiError::internal("Error fetching budget data", e))?;

    let owner = BudgetOwnerInfo {
        username: username.clone(),
        salesperson_id: salesperson.salesman_no,
        salesperson_name: salesperson.salesman_name.clone(),
        role: salesperson.role.clone(),
    };
    let (user_info, salesperson_info) = match username {
        Some(_) => (Some(owner), None),
        None => (None, Some(owner)),
    };

    Ok(BudgetListResponse {
        success: true,
        summary: BudgetSummary::from_budgets(&budgets),
        user_info,
        salesperson_info,
        total_records: budgets.len(),
        data: budgets,
    })
}

/// GET /api/budget
pub async fn list_own(CurrentUser(claims): CurrentUser) -> ApiResult<Json<BudgetListResponse>> {
    let salesperson = require_own_salesperson(&claims.sub).await?;
    Ok(Json(list_response(&salesperson, Some(claims.sub)).await?))
}

/// POST /api/budget
pub async fn create_own(
    CurrentUser(claims): CurrentUser,
    Json(mut dto): Json<BudgetCreate>,
) -> ApiResult<Json<BudgetResponse>> {
    if let Some(salesperson) = own_salesperson(&claims.sub).await? {
        dto.salesperson_id = salesperson.salesman_no;
        dto.salesperson_name = salesperson.salesman_name;
    } else if !claims.is_admin {
        return Err(ApiError::not_found("Salesperson not found"));
    }

    let budget = budget_service::create(dto).await?;
    Ok(Json(BudgetResponse {
        success: true,
        data: budget,
    }))
}

/// PUT /api/budget/:budget_id
pub async fn update(
    CurrentUser(claims): CurrentUser,
    Path(budget_id): Path<i64>,
    Json(changes): Json<BudgetUpdate>,
) -> ApiResult<Json<BudgetResponse>> {
    let scope = caller_scope(&claims).await?;
    let budget = budget_service::update(budget_id, scope, changes).await?;
    Ok(Json(BudgetResponse {
        success: true,
        data: budget,
    }))
}

/// DELETE /api/budget/:budget_id
pub async fn delete(
    CurrentUser(claims): CurrentUser,
    Path(budget_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let scope = caller_scope(&claims).await?;
    budget_service::delete(budget_id, scope).await?;
    Ok(Json(MessageResponse::ok("Budget deleted successfully")))
}

/// GET /api/budget/autosuggest
pub async fn autosuggest() -> ApiResult<Json<AutosuggestResponse>> {
    let data = budget_service::autosuggest()
        .await
        .map_err(|e| ApiError::internal("Error fetching autosuggest data", e))?;
    Ok(Json(AutosuggestResponse {
        success: true,
        data,
    }))
}

async fn generate_for(salesperson: &Salesperson) -> ApiResult<Json<GeneratedBudgetsResponse>> {
    let created = budget_service::generate_from_sales(salesperson)
        .await
        .map_err(|e| ApiError::internal("Error generating budget from sales", e))?;
    Ok(Json(GeneratedBudgetsResponse {
        success: true,
        message: format!("Generated {} budget entries from sales data", created.len()),
        data: created,
    }))
}

/// POST /api/budget/generate-from-sales
pub async fn generate_own(
    CurrentUser(claims): CurrentUser,
) -> ApiResult<Json<GeneratedBudgetsResponse>> {
    let salesperson = require_own_salesperson(&claims.sub).await?;
    generate_for(&salesperson).await
}

/// GET /api/budget/:salesperson_id
pub async fn list_for_salesperson(
    Path(salesperson_id): Path<i64>,
) -> ApiResult<Json<BudgetListResponse>> {
    let salesperson = salesperson_or_404(salesperson_id).await?;
    Ok(Json(list_response(&salesperson, None).await?))
}

/// POST /api/budget/:salesperson_id
pub async fn create_for_salesperson(
    Path(salesperson_id): Path<i64>,
    Json(mut dto): Json<BudgetCreate>,
) -> ApiResult<Json<BudgetResponse>> {
    let salesperson = salesperson_or_404(salesperson_id).await?;
    dto.salesperson_id = salesperson.salesman_no;
    dto.salesperson_name = salesperson.salesman_name;

    let budget = budget_service::create(dto).await?;
    Ok(Json(BudgetResponse {
        success: true,
        data: budget,
    }))
}

/// PUT /api/budget/:salesperson_id/:budget_id
pub async fn update_for_salesperson(
    Path((salesperson_id, budget_id)): Path<(i64, i64)>,
    Json(changes): Json<BudgetUpdate>,
) -> ApiResult<Json<BudgetResponse>> {
    salesperson_or_404(salesperson_id).await?;
    let budget =
        budget_service::update(budget_id, BudgetScope::AdminFor(salesperson_id), changes).await?;
    Ok(Json(BudgetResponse {
        success: true,
        data: budget,
    }))
}

/// DELETE /api/budget/:salesperson_id/:budget_id
pub async fn delete_for_salesperson(
    Path((salesperson_id, budget_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    salesperson_or_404(salesperson_id).await?;
    budget_service::delete(budget_id, BudgetScope::AdminFor(salesperson_id)).await?;
    Ok(Json(MessageResponse::ok("Budget deleted successfully")))
}

/// POST /api/budget/:salesperson_id/generate-from-sales
pub async fn generate_for_salesperson(
    Path(salesperson_id): Path<i64>,
) -> ApiResult<Json<GeneratedBudgetsResponse>> {
    let salesperson = salesperson_or_404(salesperson_id).await?;
    generate_for(&salesperson).await
}
