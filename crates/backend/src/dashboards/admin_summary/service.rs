use anyhow::Result;
use contracts::dashboards::admin_summary::SalespersonSummary;
use contracts::domain::salesperson::Salesperson;
use contracts::shared::math::{percent_of, round2};

use super::repository::{self, BudgetTotals, SalesTotals};
use crate::domain::salesperson::repository as salespeople;
use crate::shared::fiscal::FiscalYear;

/// Sales against budget of every salesperson with a login, best sellers first
pub async fn get_admin_summary() -> Result<Vec<SalespersonSummary>> {
    let fiscal = FiscalYear::current();
    let people = salespeople::list_with_accounts().await?;

    let mut rows = Vec::with_capacity(people.len());
    for person in &people {
        let sales = repository::sales_totals(person.salesman_no, fiscal).await?;
        let budget = repository::budget_totals(person.salesman_no).await?;
        rows.push(summarize(person, &sales, &budget));
    }

    sort_by_total_sales(&mut rows);
    tracing::debug!("Admin summary built for {} salespeople", rows.len());
    Ok(rows)
}

pub fn summarize(person: &Salesperson, s: &SalesTotals, b: &BudgetTotals) -> SalespersonSummary {
    let total_sales = s.q1_sales + s.q2_sales + s.q3_sales + s.q4_sales + s.q4_orders;
    let total_budget = b.q1_budget + b.q2_budget + b.q3_budget + b.q4_budget;
    let zero_perc_sales = s.zero_perc_sales + s.q4_orders_zero_perc_sales;

    SalespersonSummary {
        salesperson_id: person.salesman_no,
        salesperson_name: person.salesman_name.clone(),
        role: person.role.clone().unwrap_or_else(|| "Unknown".to_string()),
        q1_sales: s.q1_sales,
        q2_sales: s.q2_sales,
        q3_sales: s.q3_sales,
        q4_sales: s.q4_sales,
        q4_orders: s.q4_orders,
        open_next_year: s.open_next_year,
        total_sales,
        zero_perc_sales,
        zero_perc_sales_percent: round2(percent_of(zero_perc_sales, total_sales)),
        q1_budget: b.q1_budget,
        q2_budget: b.q2_budget,
        q3_budget: b.q3_budget,
        q4_budget: b.q4_budget,
        total_budget,
        variance: total_sales - total_budget,
    }
}

fn sort_by_total_sales(rows: &mut [SalespersonSummary]) {
    rows.sort_by(|a, b| {
        b.total_sales
            .partial_cmp(&a.total_sales)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(no: i64, role: Option<&str>) -> Salesperson {
        Salesperson {
            salesman_no: no,
            salesman_name: format!("SP {}", no),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn test_summary_totals_and_variance() {
        let sales = SalesTotals {
            q1_sales: 100.0,
            q2_sales: 100.0,
            q3_sales: 100.0,
            q4_sales: 50.0,
            zero_perc_sales: 30.0,
            q4_orders: 50.0,
            q4_orders_zero_perc_sales: 10.0,
            open_next_year: 25.0,
        };
        let budget = BudgetTotals {
            q1_budget: 120.0,
            q2_budget: 120.0,
            q3_budget: 120.0,
            q4_budget: 140.0,
        };
        let row = summarize(&person(3, None), &sales, &budget);

        assert_eq!(row.role, "Unknown");
        assert_eq!(row.total_sales, 400.0);
        assert_eq!(row.total_budget, 500.0);
        assert_eq!(row.variance, -100.0);
        assert_eq!(row.zero_perc_sales, 40.0);
        assert_eq!(row.zero_perc_sales_percent, 10.0);
        assert_eq!(row.open_next_year, 25.0);
    }

    #[test]
    fn test_no_sales_has_zero_percent() {
        let row = summarize(
            &person(4, Some("Retail")),
            &SalesTotals::default(),
            &BudgetTotals::default(),
        );
        assert_eq!(row.zero_perc_sales_percent, 0.0);
        assert_eq!(row.variance, 0.0);
    }

    #[test]
    fn test_sorted_descending() {
        let mut rows: Vec<SalespersonSummary> = [10.0, 30.0, 20.0]
            .iter()
            .enumerate()
            .map(|(i, total)| SalespersonSummary {
                salesperson_id: i as i64,
                total_sales: *total,
                ..Default::default()
            })
            .collect();
        sort_by_total_sales(&mut rows);
        let ids: Vec<_> = rows.iter().map(|r| r.salesperson_id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }
}
