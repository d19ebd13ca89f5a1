use contracts::domain::sales::{
    zero_percent_rate, SaleRow, SalesResponse, SalesSummary, SalespersonSalesResponse,
};
use contracts::domain::salesperson::SalespersonInfo;
use contracts::shared::quarter::Quarter;

use crate::api::ApiClient;
use crate::error::ClientResult;

/// Sales lines of one salesperson with the derived column totals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesData {
    pub rows: Vec<SaleRow>,
    pub summary: SalesSummary,
    pub is_hospitality: bool,
    /// Set when an admin looked up someone else's sales
    pub salesperson: Option<SalespersonInfo>,
}

impl SalesData {
    pub fn quarter_total(&self, quarter: Quarter) -> f64 {
        self.rows.iter().map(|r| r.quarter_sales(quarter)).sum()
    }

    pub fn q4_orders_total(&self) -> f64 {
        self.rows.iter().map(|r| r.q4_orders).sum()
    }

    pub fn open_next_year_total(&self) -> f64 {
        self.rows.iter().map(|r| r.open_next_year).sum()
    }

    pub fn total_sales(&self) -> f64 {
        self.rows.iter().map(|r| r.total_sales).sum()
    }

    pub fn zero_percent_total(&self) -> f64 {
        self.rows.iter().map(|r| r.zero_perc_sales_total).sum()
    }

    pub fn zero_percent_rate(&self) -> f64 {
        zero_percent_rate(&self.rows)
    }
}

/// GET /api/sales
pub async fn fetch_own(api: &ApiClient) -> ClientResult<SalesData> {
    let response: SalesResponse = api.get("/api/sales").await.map_err(|e| {
        tracing::error!("Error fetching sales data: {}", e);
        e
    })?;

    Ok(SalesData {
        rows: response.data,
        summary: response.summary,
        is_hospitality: response.user_info.is_hospitality,
        salesperson: None,
    })
}

/// GET /api/sales/{salesperson_id}
pub async fn fetch_for_salesperson(
    api: &ApiClient,
    salesperson_id: i64,
) -> ClientResult<SalesData> {
    let response: SalespersonSalesResponse = api
        .get(&format!("/api/sales/{}", salesperson_id))
        .await
        .map_err(|e| {
            tracing::error!(
                "Error fetching sales of salesperson {}: {}",
                salesperson_id,
                e
            );
            e
        })?;

    Ok(SalesData {
        rows: response.data,
        summary: response.summary,
        is_hospitality: response.salesperson_info.is_hospitality,
        salesperson: Some(response.salesperson_info),
    })
}
