use serde::{Deserialize, Serialize};

use crate::domain::salesperson::is_hospitality_role;
use crate::shared::math::{growth_percent, percent_of};
use crate::system::auth::UserInfo;

/// Sales against budget of one salesperson for the actuals year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalespersonSummary {
    pub salesperson_id: i64,
    pub salesperson_name: String,
    pub role: String,
    pub q1_sales: f64,
    pub q2_sales: f64,
    pub q3_sales: f64,
    pub q4_sales: f64,
    pub q4_orders: f64,
    pub open_next_year: f64,
    /// Quarters plus Q4 open orders
    pub total_sales: f64,
    pub zero_perc_sales: f64,
    pub zero_perc_sales_percent: f64,
    pub q1_budget: f64,
    pub q2_budget: f64,
    pub q3_budget: f64,
    pub q4_budget: f64,
    pub total_budget: f64,
    /// `total_sales - total_budget`
    pub variance: f64,
}

impl SalespersonSummary {
    pub fn is_hospitality(&self) -> bool {
        is_hospitality_role(&self.role)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSummaryResponse {
    pub success: bool,
    pub data: Vec<SalespersonSummary>,
    pub total_salespeople: usize,
    pub user_info: UserInfo,
}

/// Column sums over a set of salespeople
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subtotals {
    pub q1_sales: f64,
    pub q2_sales: f64,
    pub q3_sales: f64,
    pub q4_sales: f64,
    pub q4_orders: f64,
    pub total_sales: f64,
    pub zero_perc_sales: f64,
    pub zero_perc_sales_percent: f64,
    pub open_next_year: f64,
    pub q1_budget: f64,
    pub q2_budget: f64,
    pub q3_budget: f64,
    pub q4_budget: f64,
    pub total_budget: f64,
    pub growth_percent: f64,
}

impl Subtotals {
    pub fn compute(rows: &[&SalespersonSummary]) -> Self {
        let mut t = Self::default();
        for p in rows {
            t.q1_sales += p.q1_sales;
            t.q2_sales += p.q2_sales;
            t.q3_sales += p.q3_sales;
            t.q4_sales += p.q4_sales;
            t.q4_orders += p.q4_orders;
            t.zero_perc_sales += p.zero_perc_sales;
            t.open_next_year += p.open_next_year;
            t.q1_budget += p.q1_budget;
            t.q2_budget += p.q2_budget;
            t.q3_budget += p.q3_budget;
            t.q4_budget += p.q4_budget;
        }

        t.total_sales = t.q1_sales + t.q2_sales + t.q3_sales + t.q4_sales + t.q4_orders;
        t.total_budget = t.q1_budget + t.q2_budget + t.q3_budget + t.q4_budget;
        t.growth_percent = growth_percent(t.total_budget, t.total_sales);
        t.zero_perc_sales_percent = percent_of(t.zero_perc_sales, t.total_sales);
        t
    }
}

/// `(hospitality, everyone else)`; a missing role counts as non-hospitality
pub fn split_by_hospitality(
    rows: &[SalespersonSummary],
) -> (Vec<&SalespersonSummary>, Vec<&SalespersonSummary>) {
    rows.iter().partition(|p| p.is_hospitality())
}

/// Grand totals of the summary table
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub total_sales: f64,
    pub total_budget: f64,
    pub growth_percent: f64,
}

impl SummaryTotals {
    pub fn compute(rows: &[SalespersonSummary]) -> Self {
        let total_sales: f64 = rows.iter().map(|p| p.total_sales).sum();
        let total_budget: f64 = rows.iter().map(|p| p.total_budget).sum();
        Self {
            total_sales,
            total_budget,
            growth_percent: growth_percent(total_budget, total_sales),
        }
    }
}
