use anyhow::Result;
use sea_orm::{DatabaseBackend, FromQueryResult, Statement};

use crate::shared::data::db::get_connection;
use crate::shared::fiscal::FiscalYear;

/// How sales lines of a salesperson are bucketed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// `(customer_name, derived_customer_class)`
    Customer,
    /// `(flag, brand)`
    FlagBrand,
}

impl Grouping {
    pub fn for_hospitality(is_hospitality: bool) -> Self {
        if is_hospitality {
            Grouping::FlagBrand
        } else {
            Grouping::Customer
        }
    }

    fn key_columns(self) -> (&'static str, &'static str) {
        match self {
            Grouping::Customer => (
                "customer_name",
                "COALESCE(derived_customer_class, 'Unknown')",
            ),
            Grouping::FlagBrand => ("flag", "brand"),
        }
    }
}

/// Sales-ledger totals of one bucket in the actuals year
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct LedgerTotals {
    pub key_a: Option<String>,
    pub key_b: Option<String>,
    pub q1_sales: f64,
    pub q2_sales: f64,
    pub q3_sales: f64,
    pub q4_sales: f64,
    pub zero_perc_sales: f64,
}

/// Open-order totals of one bucket
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct OpenOrderTotals {
    pub key_a: Option<String>,
    pub key_b: Option<String>,
    /// Shipping in Q4 of the actuals year
    pub q4_orders: f64,
    pub q4_zero_perc_sales: f64,
    /// Shipping in the year after
    pub next_year: f64,
}

pub async fn ledger_totals(
    salesman_no: i64,
    grouping: Grouping,
    fiscal: FiscalYear,
) -> Result<Vec<LedgerTotals>> {
    let (a, b) = grouping.key_columns();
    let sql = format!(
        r#"
        SELECT
            {a} AS key_a,
            {b} AS key_b,
            TOTAL(CASE WHEN CAST(strftime('%m', period) AS INTEGER) BETWEEN 1 AND 3 THEN ext_sales ELSE 0 END) AS q1_sales,
            TOTAL(CASE WHEN CAST(strftime('%m', period) AS INTEGER) BETWEEN 4 AND 6 THEN ext_sales ELSE 0 END) AS q2_sales,
            TOTAL(CASE WHEN CAST(strftime('%m', period) AS INTEGER) BETWEEN 7 AND 9 THEN ext_sales ELSE 0 END) AS q3_sales,
            TOTAL(CASE WHEN CAST(strftime('%m', period) AS INTEGER) BETWEEN 10 AND 12 THEN ext_sales ELSE 0 END) AS q4_sales,
            TOTAL(CASE WHEN zero_perc_sales = 'yes' THEN ext_sales ELSE 0 END) AS zero_perc_sales
        FROM sales
        WHERE salesperson = ?
          AND period >= ? AND period < ?
        GROUP BY key_a, key_b
        "#
    );

    let rows = LedgerTotals::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        &sql,
        [
            salesman_no.into(),
            fiscal.actuals_start().into(),
            fiscal.actuals_end().into(),
        ],
    ))
    .all(get_connection()?)
    .await?;
    Ok(rows)
}

pub async fn open_order_totals(
    salesman_no: i64,
    grouping: Grouping,
    fiscal: FiscalYear,
) -> Result<Vec<OpenOrderTotals>> {
    use contracts::shared::quarter::Quarter;

    let (a, b) = grouping.key_columns();
    let sql = format!(
        r#"
        SELECT
            {a} AS key_a,
            {b} AS key_b,
            TOTAL(CASE WHEN requested_ship_date < ?1 THEN ext_sales ELSE 0 END) AS q4_orders,
            TOTAL(CASE WHEN requested_ship_date < ?1 AND zero_perc_sales = 'yes' THEN ext_sales ELSE 0 END) AS q4_zero_perc_sales,
            TOTAL(CASE WHEN requested_ship_date >= ?1 THEN ext_sales ELSE 0 END) AS next_year
        FROM open_orders
        WHERE salesperson = ?2
          AND requested_ship_date >= ?3 AND requested_ship_date < ?4
        GROUP BY key_a, key_b
        "#
    );

    let rows = OpenOrderTotals::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        &sql,
        [
            fiscal.next_year_start().into(),
            salesman_no.into(),
            fiscal.quarter_start(Quarter::Q4).into(),
            fiscal.next_year_end().into(),
        ],
    ))
    .all(get_connection()?)
    .await?;
    Ok(rows)
}

/// Distinct non-empty values of a sales column, sorted
pub async fn distinct_values(column: SalesColumn) -> Result<Vec<String>> {
    #[derive(FromQueryResult)]
    struct DistinctValue {
        value: String,
    }

    let name = column.name();
    let sql = format!(
        "SELECT DISTINCT {name} AS value FROM sales \
         WHERE {name} IS NOT NULL AND {name} != '' ORDER BY {name}"
    );

    let statement = Statement::from_string(DatabaseBackend::Sqlite, sql);
    let rows = DistinctValue::find_by_statement(statement)
        .all(get_connection()?)
        .await?;
    Ok(rows.into_iter().map(|r| r.value).collect())
}

/// Columns offered as autosuggest values
#[derive(Debug, Clone, Copy)]
pub enum SalesColumn {
    CustomerClass,
    CustomerName,
    Brand,
    Flag,
}

impl SalesColumn {
    fn name(self) -> &'static str {
        match self {
            SalesColumn::CustomerClass => "derived_customer_class",
            SalesColumn::CustomerName => "customer_name",
            SalesColumn::Brand => "brand",
            SalesColumn::Flag => "flag",
        }
    }
}
