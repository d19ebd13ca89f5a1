use serde::{Deserialize, Serialize};

use crate::domain::salesperson::SalespersonInfo;
use crate::shared::keys::budget_key;
use crate::shared::math::{percent_of, round2};
use crate::shared::quarter::Quarter;

/// One grouped sales line of a salesperson.
///
/// Non-hospitality rows are keyed by customer name and class (brand/flag are
/// `None`); hospitality rows by flag and brand (customer fields are `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRow {
    pub customer_name: Option<String>,
    pub derived_customer_class: Option<String>,
    pub brand: Option<String>,
    pub flag: Option<String>,
    pub q1_sales: f64,
    pub q2_sales: f64,
    pub q3_sales: f64,
    /// Q4 from the sales ledger only
    pub q4_sales: f64,
    /// Open orders shipping in Q4 of the actuals year
    pub q4_orders: f64,
    /// Open orders shipping in the year after the actuals year
    pub open_next_year: f64,
    pub zero_perc_sales_total: f64,
    /// Ledger sales of the whole year plus `q4_orders`
    pub total_sales: f64,
    pub zero_perc_sales_percent: f64,
}

impl SaleRow {
    pub fn budget_key(&self) -> String {
        budget_key(
            self.brand.as_deref(),
            self.flag.as_deref(),
            self.customer_name.as_deref(),
        )
    }

    pub fn quarter_sales(&self, quarter: Quarter) -> f64 {
        match quarter {
            Quarter::Q1 => self.q1_sales,
            Quarter::Q2 => self.q2_sales,
            Quarter::Q3 => self.q3_sales,
            Quarter::Q4 => self.q4_sales,
        }
    }

    /// Quarters plus Q4 open orders
    pub fn computed_total(&self) -> f64 {
        self.q1_sales + self.q2_sales + self.q3_sales + self.q4_sales + self.q4_orders
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_customers: usize,
    pub total_sales: f64,
    pub total_q1: f64,
    pub total_q2: f64,
    pub total_q3: f64,
    pub total_q4_sales: f64,
    pub total_q4_orders: f64,
    pub total_q4: f64,
    pub total_open_next_year: f64,
    /// Mean of the non-zero per-row zero-percent shares
    pub avg_zero_perc_sales: f64,
}

impl SalesSummary {
    pub fn from_rows(rows: &[SaleRow]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }

        let total_q4_sales: f64 = rows.iter().map(|r| r.q4_sales).sum();
        let total_q4_orders: f64 = rows.iter().map(|r| r.q4_orders).sum();

        let zero_perc_values: Vec<f64> = rows
            .iter()
            .map(|r| r.zero_perc_sales_percent)
            .filter(|v| *v > 0.0)
            .collect();
        let avg_zero_perc_sales = if zero_perc_values.is_empty() {
            0.0
        } else {
            zero_perc_values.iter().sum::<f64>() / zero_perc_values.len() as f64
        };

        Self {
            total_customers: rows.len(),
            total_sales: rows.iter().map(|r| r.total_sales).sum(),
            total_q1: rows.iter().map(|r| r.q1_sales).sum(),
            total_q2: rows.iter().map(|r| r.q2_sales).sum(),
            total_q3: rows.iter().map(|r| r.q3_sales).sum(),
            total_q4_sales,
            total_q4_orders,
            total_q4: total_q4_sales + total_q4_orders,
            total_open_next_year: rows.iter().map(|r| r.open_next_year).sum(),
            avg_zero_perc_sales: round2(avg_zero_perc_sales),
        }
    }
}

/// Overall zero-percent share of the given rows, in percent
pub fn zero_percent_rate(rows: &[SaleRow]) -> f64 {
    let total: f64 = rows.iter().map(|r| r.total_sales).sum();
    let zero: f64 = rows.iter().map(|r| r.zero_perc_sales_total).sum();
    if total > 0.0 {
        percent_of(zero, total)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesUserInfo {
    pub username: String,
    pub role: String,
    pub is_hospitality: bool,
    pub salesperson_id: Option<i64>,
}

/// `GET /api/sales`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesResponse {
    pub success: bool,
    pub data: Vec<SaleRow>,
    pub summary: SalesSummary,
    pub user_info: SalesUserInfo,
    pub total_records: usize,
}

/// `GET /api/sales/summary`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesSummaryResponse {
    pub success: bool,
    pub summary: SalesSummary,
}

/// `GET /api/sales/{salesperson_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalespersonSalesResponse {
    pub success: bool,
    pub data: Vec<SaleRow>,
    pub summary: SalesSummary,
    pub salesperson_info: SalespersonInfo,
    pub total_records: usize,
}
