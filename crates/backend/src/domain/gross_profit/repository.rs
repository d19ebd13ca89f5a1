use anyhow::{Context, Result};
use chrono::Utc;
use contracts::domain::gross_profit::{GpPeriod, GrossProfitOverride, SaveGpOverridesResult};
use contracts::shared::keys::GroupRef;
use sea_orm::{ConnectionTrait, DatabaseBackend, FromQueryResult, Statement, TransactionTrait};

use crate::shared::data::db::get_connection;
use crate::shared::fiscal::FiscalYear;

/// Actuals-year sales and cost of one group, restricted to valid orders
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct GroupCosts {
    pub group_key: String,
    pub customer_class: String,
    pub q1_sales: f64,
    pub q1_cost: f64,
    pub q2_sales: f64,
    pub q2_cost: f64,
    pub q3_sales: f64,
    pub q3_cost: f64,
    pub q4_sales: f64,
    pub q4_cost: f64,
}

/// An order is valid when its quantities do not net negative and none of its
/// lines is a warranty line.
const GROUP_COSTS_SQL: &str = r#"
WITH valid_orders AS (
    SELECT so.order_no
    FROM sales so
    WHERE so.period >= ?1 AND so.period < ?2 AND so.order_no IS NOT NULL
    GROUP BY so.order_no
    HAVING TOTAL(so.qty) >= 0
       AND TOTAL(CASE WHEN so.is_warranty = 'yes' THEN 1 ELSE 0 END) = 0
)
SELECT
    CASE WHEN s.derived_customer_class = 'Hospitality' THEN s.flag ELSE s.customer_name END AS group_key,
    s.derived_customer_class AS customer_class,
    TOTAL(CASE WHEN CAST(strftime('%m', s.period) AS INTEGER) BETWEEN 1 AND 3 THEN s.ext_sales ELSE 0 END) AS q1_sales,
    TOTAL(CASE WHEN CAST(strftime('%m', s.period) AS INTEGER) BETWEEN 1 AND 3 THEN s.ext_cost ELSE 0 END) AS q1_cost,
    TOTAL(CASE WHEN CAST(strftime('%m', s.period) AS INTEGER) BETWEEN 4 AND 6 THEN s.ext_sales ELSE 0 END) AS q2_sales,
    TOTAL(CASE WHEN CAST(strftime('%m', s.period) AS INTEGER) BETWEEN 4 AND 6 THEN s.ext_cost ELSE 0 END) AS q2_cost,
    TOTAL(CASE WHEN CAST(strftime('%m', s.period) AS INTEGER) BETWEEN 7 AND 9 THEN s.ext_sales ELSE 0 END) AS q3_sales,
    TOTAL(CASE WHEN CAST(strftime('%m', s.period) AS INTEGER) BETWEEN 7 AND 9 THEN s.ext_cost ELSE 0 END) AS q3_cost,
    TOTAL(CASE WHEN CAST(strftime('%m', s.period) AS INTEGER) BETWEEN 10 AND 12 THEN s.ext_sales ELSE 0 END) AS q4_sales,
    TOTAL(CASE WHEN CAST(strftime('%m', s.period) AS INTEGER) BETWEEN 10 AND 12 THEN s.ext_cost ELSE 0 END) AS q4_cost
FROM sales s
JOIN valid_orders vo ON vo.order_no = s.order_no
WHERE s.period >= ?1 AND s.period < ?2
  AND ((s.derived_customer_class = 'Hospitality' AND s.flag IS NOT NULL AND s.flag <> '')
    OR (s.derived_customer_class <> 'Hospitality' AND s.customer_name IS NOT NULL AND s.customer_name <> ''))
GROUP BY group_key, s.derived_customer_class
"#;

pub async fn group_costs(fiscal: FiscalYear) -> Result<Vec<GroupCosts>> {
    let rows = GroupCosts::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        GROUP_COSTS_SQL,
        [fiscal.actuals_start().into(), fiscal.actuals_end().into()],
    ))
    .all(get_connection()?)
    .await
    .context("Failed to load gross profit costs")?;
    Ok(rows)
}

#[derive(Debug, FromQueryResult)]
struct OverrideRow {
    salesperson_id: i64,
    customer_class: String,
    group_key: String,
    period: String,
    gp_percent: f64,
}

/// Stored overrides; rows with an unknown period are skipped
pub async fn list_overrides() -> Result<Vec<GrossProfitOverride>> {
    let rows = OverrideRow::find_by_statement(Statement::from_string(
        DatabaseBackend::Sqlite,
        "SELECT salesperson_id, customer_class, group_key, period, gp_percent \
         FROM gross_profit_overrides"
            .to_string(),
    ))
    .all(get_connection()?)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|r| match GpPeriod::parse(&r.period) {
            Some(period) => Some(GrossProfitOverride {
                salesperson_id: r.salesperson_id,
                customer_class: r.customer_class,
                group_key: r.group_key,
                period,
                gp_percent: r.gp_percent,
            }),
            None => {
                tracing::warn!("Skipping gross profit override with period '{}'", r.period);
                None
            }
        })
        .collect())
}

pub async fn upsert_overrides(overrides: &[GrossProfitOverride]) -> Result<SaveGpOverridesResult> {
    let conn = get_connection()?;
    let txn = conn.begin().await?;
    let now = Utc::now().to_rfc3339();
    let mut result = SaveGpOverridesResult {
        total_processed: overrides.len(),
        ..Default::default()
    };

    for o in overrides {
        let updated = txn
            .execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                r#"UPDATE gross_profit_overrides SET gp_percent = ?, updated_at = ?
                   WHERE salesperson_id = ? AND customer_class = ? AND group_key = ? AND period = ?"#,
                [
                    o.gp_percent.into(),
                    now.clone().into(),
                    o.salesperson_id.into(),
                    o.customer_class.clone().into(),
                    o.group_key.clone().into(),
                    o.period.as_str().into(),
                ],
            ))
            .await?
            .rows_affected();

        if updated > 0 {
            result.updated_count += 1;
            continue;
        }

        txn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            r#"INSERT INTO gross_profit_overrides
               (salesperson_id, customer_class, group_key, period, gp_percent, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            [
                o.salesperson_id.into(),
                o.customer_class.clone().into(),
                o.group_key.clone().into(),
                o.period.as_str().into(),
                o.gp_percent.into(),
                now.clone().into(),
                now.clone().into(),
            ],
        ))
        .await?;
        result.saved_count += 1;
    }

    txn.commit().await?;
    Ok(result)
}

pub async fn delete_group_overrides(group: &GroupRef) -> Result<u64> {
    let result = get_connection()?
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM gross_profit_overrides \
             WHERE salesperson_id = ? AND customer_class = ? AND group_key = ?",
            [
                group.salesperson_id.into(),
                group.customer_class.clone().into(),
                group.group_key.clone().into(),
            ],
        ))
        .await?;
    Ok(result.rows_affected())
}
