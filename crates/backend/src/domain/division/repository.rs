use anyhow::{Context, Result};
use chrono::Utc;
use contracts::domain::division::{DivisionAllocation, RatioOverride, SaveRatiosResult};
use contracts::shared::keys::GroupRef;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, FromQueryResult, Statement, TransactionTrait, Value,
};

use crate::shared::data::db::get_connection;
use crate::shared::fiscal::FiscalYear;

/// Historical division ratios per group, joined with the non-custom budgets
/// of every salesperson. Hospitality classes collapse into `Hospitality`.
/// Sales group by flag only when the class is exactly `Hospitality`, and by
/// customer name otherwise.
const ALLOCATIONS_SQL: &str = r#"
WITH sales_norm AS (
    SELECT
        CASE WHEN s.derived_customer_class = 'Hospitality'
             THEN NULLIF(TRIM(s.flag), '')
             ELSE NULLIF(TRIM(s.customer_name), '')
        END AS group_key,
        CASE WHEN s.derived_customer_class LIKE 'Hospitality%' THEN 'Hospitality'
             ELSE s.derived_customer_class
        END AS customer_class,
        s.item_division,
        s.ext_sales
    FROM sales s
    WHERE s.period >= ?1 AND s.period < ?2
),
grouped_sales AS (
    SELECT group_key, customer_class, item_division, TOTAL(ext_sales) AS total_sales
    FROM sales_norm
    WHERE group_key IS NOT NULL AND item_division IS NOT NULL
    GROUP BY group_key, customer_class, item_division
),
group_totals AS (
    SELECT group_key, customer_class, TOTAL(total_sales) AS total_group_sales
    FROM grouped_sales
    GROUP BY group_key, customer_class
),
ratios AS (
    SELECT
        gs.group_key, gs.customer_class, gs.item_division,
        MAX(gs.total_sales) AS division_sales,
        MAX(CASE WHEN gt.total_group_sales = 0 THEN 0.0
                 ELSE gs.total_sales / gt.total_group_sales END) AS historical_ratio
    FROM grouped_sales gs
    JOIN group_totals gt
      ON gt.group_key = gs.group_key
     AND gt.customer_class = gs.customer_class
    GROUP BY gs.group_key, gs.customer_class, gs.item_division
),
budget_norm AS (
    SELECT
        b.salesperson_id,
        b.salesperson_name,
        CASE WHEN b.customer_class LIKE 'Hospitality%' THEN 'Hospitality'
             ELSE b.customer_class END AS customer_class,
        CASE WHEN b.customer_class LIKE 'Hospitality%' THEN NULLIF(TRIM(b.flag), '')
             ELSE NULLIF(TRIM(b.customer_name), '') END AS group_key,
        CASE WHEN b.customer_class LIKE 'Hospitality%' THEN NULLIF(TRIM(b.brand), '')
             ELSE NULL END AS brand,
        b.quarter_1_sales, b.quarter_2_sales, b.quarter_3_sales, b.quarter_4_sales
    FROM budgets b
    WHERE b.is_custom = 0
),
collapsed_budget AS (
    SELECT
        salesperson_id, salesperson_name, customer_class, group_key,
        MAX(brand) AS brand,
        TOTAL(quarter_1_sales) AS q1_total,
        TOTAL(quarter_2_sales) AS q2_total,
        TOTAL(quarter_3_sales) AS q3_total,
        TOTAL(quarter_4_sales) AS q4_total
    FROM budget_norm
    WHERE group_key IS NOT NULL
    GROUP BY salesperson_id, salesperson_name, customer_class, group_key
),
divisions_dedup AS (
    SELECT div_no, MIN(div_desc) AS div_desc
    FROM division_masters
    GROUP BY div_no
)
SELECT
    b.salesperson_id, b.salesperson_name, b.customer_class, b.group_key, b.brand,
    d.div_no AS item_division, d.div_desc AS division_name,
    COALESCE(o.custom_ratio, r.historical_ratio) AS effective_ratio,
    CASE WHEN o.custom_ratio IS NOT NULL THEN 1 ELSE 0 END AS is_custom,
    ROUND(b.q1_total * COALESCE(o.custom_ratio, r.historical_ratio), 2) AS q1_allocated,
    ROUND(b.q2_total * COALESCE(o.custom_ratio, r.historical_ratio), 2) AS q2_allocated,
    ROUND(b.q3_total * COALESCE(o.custom_ratio, r.historical_ratio), 2) AS q3_allocated,
    ROUND(b.q4_total * COALESCE(o.custom_ratio, r.historical_ratio), 2) AS q4_allocated,
    ROUND((b.q1_total + b.q2_total + b.q3_total + b.q4_total)
          * COALESCE(o.custom_ratio, r.historical_ratio), 2) AS total_allocated,
    r.historical_ratio,
    r.division_sales AS historical_sales
FROM collapsed_budget b
JOIN ratios r
  ON r.group_key = b.group_key
 AND r.customer_class = b.customer_class
JOIN divisions_dedup d
  ON d.div_no = r.item_division
LEFT JOIN division_ratio_overrides o
  ON o.salesperson_id = b.salesperson_id
 AND o.customer_class = b.customer_class
 AND o.group_key = b.group_key
 AND o.item_division = d.div_no
"#;

const ALLOCATIONS_ORDER: &str =
    "ORDER BY b.customer_class, b.salesperson_name, b.group_key, d.div_no";

#[derive(Debug, FromQueryResult)]
struct AllocationRow {
    salesperson_id: i64,
    salesperson_name: String,
    customer_class: String,
    group_key: String,
    brand: Option<String>,
    item_division: i64,
    division_name: String,
    effective_ratio: Option<f64>,
    is_custom: i64,
    q1_allocated: Option<f64>,
    q2_allocated: Option<f64>,
    q3_allocated: Option<f64>,
    q4_allocated: Option<f64>,
    total_allocated: Option<f64>,
    historical_ratio: Option<f64>,
    historical_sales: Option<f64>,
}

impl From<AllocationRow> for DivisionAllocation {
    fn from(r: AllocationRow) -> Self {
        DivisionAllocation {
            salesperson_id: r.salesperson_id,
            salesperson_name: r.salesperson_name,
            customer_class: r.customer_class,
            group_key: r.group_key,
            brand: r.brand,
            item_division: r.item_division,
            division_name: r.division_name,
            effective_ratio: r.effective_ratio.unwrap_or(0.0),
            is_custom: r.is_custom != 0,
            q1_allocated: r.q1_allocated.unwrap_or(0.0),
            q2_allocated: r.q2_allocated.unwrap_or(0.0),
            q3_allocated: r.q3_allocated.unwrap_or(0.0),
            q4_allocated: r.q4_allocated.unwrap_or(0.0),
            total_allocated: r.total_allocated.unwrap_or(0.0),
            historical_ratio: r.historical_ratio.unwrap_or(0.0),
            historical_sales: r.historical_sales.unwrap_or(0.0),
        }
    }
}

/// Allocation rows of every group, or of one group when `group` is given
pub async fn allocations(
    fiscal: FiscalYear,
    group: Option<&GroupRef>,
) -> Result<Vec<DivisionAllocation>> {
    let mut values: Vec<Value> = vec![fiscal.actuals_start().into(), fiscal.actuals_end().into()];
    let filter = match group {
        Some(g) => {
            values.push(g.salesperson_id.into());
            values.push(g.customer_class.clone().into());
            values.push(g.group_key.clone().into());
            "WHERE b.salesperson_id = ?3 AND b.customer_class = ?4 AND b.group_key = ?5"
        }
        None => "",
    };
    let sql = format!("{}{}\n{}", ALLOCATIONS_SQL, filter, ALLOCATIONS_ORDER);

    let rows = AllocationRow::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        &sql,
        values,
    ))
    .all(get_connection()?)
    .await
    .context("Failed to load division allocations")?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Insert or update custom ratios in one transaction
pub async fn upsert_overrides(overrides: &[RatioOverride]) -> Result<SaveRatiosResult> {
    let conn = get_connection()?;
    let txn = conn.begin().await?;
    let now = Utc::now().to_rfc3339();
    let mut result = SaveRatiosResult {
        total_processed: overrides.len(),
        ..Default::default()
    };

    for o in overrides {
        let updated = txn
            .execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                r#"UPDATE division_ratio_overrides
                   SET custom_ratio = ?, salesperson_name = ?, updated_at = ?
                   WHERE salesperson_id = ? AND customer_class = ? AND group_key = ? AND item_division = ?"#,
                [
                    o.custom_ratio.into(),
                    o.salesperson_name.clone().into(),
                    now.clone().into(),
                    o.salesperson_id.into(),
                    o.customer_class.clone().into(),
                    o.group_key.clone().into(),
                    o.item_division.into(),
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
            r#"INSERT INTO division_ratio_overrides
               (salesperson_id, salesperson_name, customer_class, group_key, item_division, custom_ratio, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            [
                o.salesperson_id.into(),
                o.salesperson_name.clone().into(),
                o.customer_class.clone().into(),
                o.group_key.clone().into(),
                o.item_division.into(),
                o.custom_ratio.into(),
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
            "DELETE FROM division_ratio_overrides \
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

pub async fn delete_all_overrides() -> Result<u64> {
    let result = get_connection()?
        .execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "DELETE FROM division_ratio_overrides".to_string(),
        ))
        .await?;
    Ok(result.rows_affected())
}
