use anyhow::Result;
use sea_orm::{DatabaseBackend, FromQueryResult, Statement};

use crate::shared::data::db::get_connection;
use crate::shared::fiscal::FiscalYear;

/// Actuals-year totals of one salesperson
#[derive(Debug, Clone, Default, PartialEq, FromQueryResult)]
pub struct SalesTotals {
    pub q1_sales: f64,
    pub q2_sales: f64,
    pub q3_sales: f64,
    pub q4_sales: f64,
    pub zero_perc_sales: f64,
    pub q4_orders: f64,
    pub q4_orders_zero_perc_sales: f64,
    pub open_next_year: f64,
}

#[derive(Debug, Clone, Default, PartialEq, FromQueryResult)]
pub struct BudgetTotals {
    pub q1_budget: f64,
    pub q2_budget: f64,
    pub q3_budget: f64,
    pub q4_budget: f64,
}

pub async fn sales_totals(salesman_no: i64, fiscal: FiscalYear) -> Result<SalesTotals> {
    let sql = r#"
        SELECT
            (SELECT TOTAL(CASE WHEN CAST(strftime('%m', period) AS INTEGER) BETWEEN 1 AND 3 THEN ext_sales ELSE 0 END)
               FROM sales WHERE salesperson = ?1 AND period >= ?2 AND period < ?3) AS q1_sales,
            (SELECT TOTAL(CASE WHEN CAST(strftime('%m', period) AS INTEGER) BETWEEN 4 AND 6 THEN ext_sales ELSE 0 END)
               FROM sales WHERE salesperson = ?1 AND period >= ?2 AND period < ?3) AS q2_sales,
            (SELECT TOTAL(CASE WHEN CAST(strftime('%m', period) AS INTEGER) BETWEEN 7 AND 9 THEN ext_sales ELSE 0 END)
               FROM sales WHERE salesperson = ?1 AND period >= ?2 AND period < ?3) AS q3_sales,
            (SELECT TOTAL(CASE WHEN CAST(strftime('%m', period) AS INTEGER) BETWEEN 10 AND 12 THEN ext_sales ELSE 0 END)
               FROM sales WHERE salesperson = ?1 AND period >= ?2 AND period < ?3) AS q4_sales,
            (SELECT TOTAL(CASE WHEN zero_perc_sales = 'yes' THEN ext_sales ELSE 0 END)
               FROM sales WHERE salesperson = ?1 AND period >= ?2 AND period < ?3) AS zero_perc_sales,
            (SELECT TOTAL(ext_sales)
               FROM open_orders WHERE salesperson = ?1 AND requested_ship_date >= ?4 AND requested_ship_date < ?3) AS q4_orders,
            (SELECT TOTAL(CASE WHEN zero_perc_sales = 'yes' THEN ext_sales ELSE 0 END)
               FROM open_orders WHERE salesperson = ?1 AND requested_ship_date >= ?4 AND requested_ship_date < ?3) AS q4_orders_zero_perc_sales,
            (SELECT TOTAL(ext_sales)
               FROM open_orders WHERE salesperson = ?1 AND requested_ship_date >= ?3 AND requested_ship_date < ?5) AS open_next_year
    "#;

    use contracts::shared::quarter::Quarter;
    let row = SalesTotals::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        sql,
        [
            salesman_no.into(),
            fiscal.actuals_start().into(),
            fiscal.actuals_end().into(),
            fiscal.quarter_start(Quarter::Q4).into(),
            fiscal.next_year_end().into(),
        ],
    ))
    .one(get_connection()?)
    .await?;
    Ok(row.unwrap_or_default())
}

pub async fn budget_totals(salesperson_id: i64) -> Result<BudgetTotals> {
    let row = BudgetTotals::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        r#"
        SELECT
            TOTAL(quarter_1_sales) AS q1_budget,
            TOTAL(quarter_2_sales) AS q2_budget,
            TOTAL(quarter_3_sales) AS q3_budget,
            TOTAL(quarter_4_sales) AS q4_budget
        FROM budgets
        WHERE salesperson_id = ?
        "#,
        [salesperson_id.into()],
    ))
    .one(get_connection()?)
    .await?;
    Ok(row.unwrap_or_default())
}
