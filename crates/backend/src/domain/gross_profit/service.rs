use std::collections::HashMap;

use anyhow::Result;
use contracts::domain::budget::Budget;
use contracts::domain::gross_profit::{
    GpPeriod, GrossProfitOverride, GrossProfitRow, SaveGpOverridesResult,
};
use contracts::shared::keys::{GroupRef, Grouped};
use contracts::shared::math::{round2, round_to};
use contracts::shared::quarter::Quarter;

use super::repository::{self, GroupCosts};
use crate::domain::budget::repository as budgets;
use crate::shared::fiscal::FiscalYear;

/// Gross-profit fractions computed from actuals, before overrides
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GpPercents {
    /// Per quarter; `None` when the quarter had no sales
    pub quarters: [Option<f64>; 4],
    /// `None` when the whole year had no sales
    pub full_year: Option<f64>,
}

impl GpPercents {
    pub fn from_costs(c: &GroupCosts) -> Self {
        let ratio = |sales: f64, cost: f64| {
            if sales == 0.0 {
                None
            } else {
                Some(round_to(1.0 - cost / sales, 6))
            }
        };
        let total_sales = c.q1_sales + c.q2_sales + c.q3_sales + c.q4_sales;
        let total_cost = c.q1_cost + c.q2_cost + c.q3_cost + c.q4_cost;

        Self {
            quarters: [
                ratio(c.q1_sales, c.q1_cost),
                ratio(c.q2_sales, c.q2_cost),
                ratio(c.q3_sales, c.q3_cost),
                ratio(c.q4_sales, c.q4_cost),
            ],
            full_year: ratio(total_sales, total_cost),
        }
    }
}

/// Group key a budget is matched on: flag for hospitality, customer otherwise
fn budget_group_key(budget: &Budget) -> String {
    let key = if budget.customer_class == "Hospitality" {
        &budget.flag
    } else {
        &budget.customer_name
    };
    key.clone().unwrap_or_default()
}

/// Estimated gross profit of every non-custom budget
pub fn build_rows(
    budgets: &[Budget],
    costs: &[GroupCosts],
    overrides: &[GrossProfitOverride],
) -> Vec<GrossProfitRow> {
    let percents: HashMap<(&str, &str), GpPercents> = costs
        .iter()
        .map(|c| {
            (
                (c.group_key.as_str(), c.customer_class.as_str()),
                GpPercents::from_costs(c),
            )
        })
        .collect();

    let mut by_group: HashMap<GroupRef, HashMap<GpPeriod, f64>> = HashMap::new();
    for o in overrides {
        by_group
            .entry(GroupRef::new(o.salesperson_id, &o.customer_class, &o.group_key))
            .or_default()
            .insert(o.period, o.gp_percent);
    }
    let no_overrides = HashMap::new();

    let mut rows: Vec<GrossProfitRow> = budgets
        .iter()
        .filter(|b| !b.is_custom)
        .map(|b| {
            let group_key = budget_group_key(b);
            let computed = percents
                .get(&(group_key.as_str(), b.customer_class.as_str()))
                .copied()
                .unwrap_or_default();
            let group = GroupRef::new(b.salesperson_id, &b.customer_class, &group_key);
            let custom = by_group.get(&group).unwrap_or(&no_overrides);

            let full_year = custom
                .get(&GpPeriod::FullYear)
                .copied()
                .or(computed.full_year);
            let percent = |q: Quarter| {
                custom
                    .get(&GpPeriod::from(q))
                    .copied()
                    .or(computed.quarters[q.index()])
                    .or(full_year)
            };
            let value = |q: Quarter| percent(q).map(|p| round2(b.quarter(q) * p));

            let mut overridden_periods: Vec<GpPeriod> = custom.keys().copied().collect();
            overridden_periods.sort();

            GrossProfitRow {
                budget_id: b.id,
                salesperson_id: b.salesperson_id,
                salesperson_name: b.salesperson_name.clone(),
                customer_class: b.customer_class.clone(),
                group_key,
                quarter_1_sales: b.quarter_1_sales,
                quarter_2_sales: b.quarter_2_sales,
                quarter_3_sales: b.quarter_3_sales,
                quarter_4_sales: b.quarter_4_sales,
                q1_gp_percent: percent(Quarter::Q1),
                q2_gp_percent: percent(Quarter::Q2),
                q3_gp_percent: percent(Quarter::Q3),
                q4_gp_percent: percent(Quarter::Q4),
                full_year_gp_percent: full_year,
                q1_gp_value: value(Quarter::Q1),
                q2_gp_value: value(Quarter::Q2),
                q3_gp_value: value(Quarter::Q3),
                q4_gp_value: value(Quarter::Q4),
                total_gp_value: round2(b.quarters_sum() * full_year.unwrap_or(0.0)),
                is_custom: !overridden_periods.is_empty(),
                overridden_periods,
            }
        })
        .collect();

    rows.sort_by(|x, y| {
        (&x.customer_class, &x.salesperson_name, &x.group_key).cmp(&(
            &y.customer_class,
            &y.salesperson_name,
            &y.group_key,
        ))
    });
    rows
}

pub async fn gross_profit_rows() -> Result<Vec<GrossProfitRow>> {
    let budgets = budgets::list_non_custom().await?;
    let costs = repository::group_costs(FiscalYear::current()).await?;
    let overrides = repository::list_overrides().await?;
    Ok(build_rows(&budgets, &costs, &overrides))
}

pub async fn group_rows(group: &GroupRef) -> Result<Vec<GrossProfitRow>> {
    let rows = gross_profit_rows().await?;
    Ok(rows
        .into_iter()
        .filter(|r| &r.group_ref() == group)
        .collect())
}

/// Percentages are fractions; anything outside `-1..=1` is rejected
pub fn validate_overrides(overrides: &[GrossProfitOverride]) -> Result<(), String> {
    for o in overrides {
        if !o.gp_percent.is_finite() || !(-1.0..=1.0).contains(&o.gp_percent) {
            return Err(format!(
                "gp_percent for {} of '{}' must be between -1 and 1",
                o.period.as_str(),
                o.group_key
            ));
        }
        if o.group_key.is_empty() || o.customer_class.is_empty() {
            return Err("customer_class and group_key are required".to_string());
        }
    }
    Ok(())
}

pub async fn save_overrides(overrides: &[GrossProfitOverride]) -> Result<SaveGpOverridesResult> {
    let result = repository::upsert_overrides(overrides).await?;
    tracing::info!(
        "Gross profit overrides saved: {} new, {} updated",
        result.saved_count,
        result.updated_count
    );
    Ok(result)
}

pub async fn reset_group(group: &GroupRef) -> Result<u64> {
    let deleted = repository::delete_group_overrides(group).await?;
    tracing::info!(
        "Reset {} gross profit overrides for group {}",
        deleted,
        group.key()
    );
    Ok(deleted)
}
