use std::collections::HashMap;

use anyhow::Result;
use contracts::domain::sales::SaleRow;
use contracts::domain::salesperson::Salesperson;
use contracts::shared::math::{percent_of, round2};

use super::repository::{self, Grouping, LedgerTotals, OpenOrderTotals};
use crate::shared::fiscal::FiscalYear;

/// Grouped sales rows of a salesperson, largest groups first
pub async fn sales_rows(salesperson: &Salesperson) -> Result<Vec<SaleRow>> {
    let grouping = Grouping::for_hospitality(salesperson.is_hospitality());
    let fiscal = FiscalYear::current();

    let ledger = repository::ledger_totals(salesperson.salesman_no, grouping, fiscal).await?;
    let orders = repository::open_order_totals(salesperson.salesman_no, grouping, fiscal).await?;

    let rows = build_rows(ledger, orders, grouping);
    tracing::debug!(
        "Built {} sales rows for salesperson {}",
        rows.len(),
        salesperson.salesman_no
    );
    Ok(rows)
}

type BucketKey = (Option<String>, Option<String>);

/// Merge ledger and open-order totals into sale rows.
///
/// Buckets come from the ledger; open orders of a bucket without ledger
/// sales are ignored. Rows whose total is not positive are dropped.
pub fn build_rows(
    ledger: Vec<LedgerTotals>,
    orders: Vec<OpenOrderTotals>,
    grouping: Grouping,
) -> Vec<SaleRow> {
    let orders: HashMap<BucketKey, OpenOrderTotals> = orders
        .into_iter()
        .map(|o| ((o.key_a.clone(), o.key_b.clone()), o))
        .collect();

    let mut rows: Vec<SaleRow> = ledger
        .into_iter()
        .map(|l| {
            let order = orders.get(&(l.key_a.clone(), l.key_b.clone()));
            let q4_orders = order.map(|o| o.q4_orders).unwrap_or(0.0);
            let zero_total = l.zero_perc_sales + order.map(|o| o.q4_zero_perc_sales).unwrap_or(0.0);
            let total_sales = l.q1_sales + l.q2_sales + l.q3_sales + l.q4_sales + q4_orders;
            let zero_percent = if total_sales > 0.0 {
                round2(percent_of(zero_total, total_sales))
            } else {
                0.0
            };

            let (customer_name, derived_customer_class, flag, brand) = match grouping {
                Grouping::Customer => (l.key_a, l.key_b, None, None),
                Grouping::FlagBrand => (None, None, l.key_a, l.key_b),
            };

            SaleRow {
                customer_name,
                derived_customer_class,
                brand,
                flag,
                q1_sales: l.q1_sales,
                q2_sales: l.q2_sales,
                q3_sales: l.q3_sales,
                q4_sales: l.q4_sales,
                q4_orders,
                open_next_year: order.map(|o| o.next_year).unwrap_or(0.0),
                zero_perc_sales_total: zero_total,
                total_sales,
                zero_perc_sales_percent: zero_percent,
            }
        })
        .filter(|r| r.total_sales > 0.0)
        .collect();

    sort_by_group_totals(&mut rows, grouping);
    rows
}

/// Stable descending sort by `(group total, sub-group total)`: customer class
/// then class+customer, or brand then brand+flag for hospitality.
pub fn sort_by_group_totals(rows: &mut [SaleRow], grouping: Grouping) {
    let keys = |r: &SaleRow| -> (String, String) {
        match grouping {
            Grouping::Customer => {
                let class = r
                    .derived_customer_class
                    .clone()
                    .unwrap_or_else(|| "Unknown Class".to_string());
                let customer = r.customer_name.as_deref().unwrap_or("Unknown Customer");
                let sub = format!("{}_{}", class, customer);
                (class, sub)
            }
            Grouping::FlagBrand => {
                let brand = r
                    .brand
                    .clone()
                    .unwrap_or_else(|| "Unknown Brand".to_string());
                let flag = r.flag.as_deref().unwrap_or("Unknown Flag");
                let sub = format!("{}_{}", brand, flag);
                (brand, sub)
            }
        }
    };

    let mut group_totals: HashMap<String, f64> = HashMap::new();
    let mut sub_totals: HashMap<String, f64> = HashMap::new();
    for r in rows.iter() {
        let (group, sub) = keys(r);
        *group_totals.entry(group).or_insert(0.0) += r.total_sales;
        *sub_totals.entry(sub).or_insert(0.0) += r.total_sales;
    }

    rows.sort_by(|x, y| {
        let (xg, xs) = keys(x);
        let (yg, ys) = keys(y);
        let xk = (group_totals[&xg], sub_totals[&xs]);
        let yk = (group_totals[&yg], sub_totals[&ys]);
        yk.partial_cmp(&xk).unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(a: &str, b: &str, q: [f64; 4], zero: f64) -> LedgerTotals {
        LedgerTotals {
            key_a: Some(a.into()),
            key_b: Some(b.into()),
            q1_sales: q[0],
            q2_sales: q[1],
            q3_sales: q[2],
            q4_sales: q[3],
            zero_perc_sales: zero,
        }
    }

    fn orders(a: &str, b: &str, q4: f64, zero: f64, next: f64) -> OpenOrderTotals {
        OpenOrderTotals {
            key_a: Some(a.into()),
            key_b: Some(b.into()),
            q4_orders: q4,
            q4_zero_perc_sales: zero,
            next_year: next,
        }
    }

    #[test]
    fn test_customer_rows_include_open_orders() {
        let rows = build_rows(
            vec![ledger("Acme", "Dealer", [100.0, 100.0, 100.0, 100.0], 40.0)],
            vec![orders("Acme", "Dealer", 100.0, 10.0, 75.0)],
            Grouping::Customer,
        );

        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.customer_name.as_deref(), Some("Acme"));
        assert_eq!(r.derived_customer_class.as_deref(), Some("Dealer"));
        assert!(r.brand.is_none() && r.flag.is_none());
        assert_eq!(r.q4_orders, 100.0);
        assert_eq!(r.total_sales, 500.0);
        assert_eq!(r.total_sales, r.computed_total());
        assert_eq!(r.zero_perc_sales_total, 50.0);
        assert_eq!(r.zero_perc_sales_percent, 10.0);
        assert_eq!(r.open_next_year, 75.0);
    }

    #[test]
    fn test_hospitality_rows_use_flag_and_brand() {
        let rows = build_rows(
            vec![ledger("Courtyard", "Marriott", [10.0, 0.0, 0.0, 0.0], 0.0)],
            vec![],
            Grouping::FlagBrand,
        );
        assert_eq!(rows[0].flag.as_deref(), Some("Courtyard"));
        assert_eq!(rows[0].brand.as_deref(), Some("Marriott"));
        assert!(rows[0].customer_name.is_none());
        assert!(rows[0].derived_customer_class.is_none());
    }

    #[test]
    fn test_non_positive_totals_are_dropped() {
        let rows = build_rows(
            vec![
                ledger("Zero", "Dealer", [0.0; 4], 0.0),
                ledger("Credit", "Dealer", [-50.0, 0.0, 0.0, 0.0], 0.0),
                ledger("Keep", "Dealer", [1.0, 0.0, 0.0, 0.0], 0.0),
            ],
            vec![orders("Ghost", "Dealer", 500.0, 0.0, 0.0)],
            Grouping::Customer,
        );
        let names: Vec<_> = rows
            .iter()
            .map(|r| r.customer_name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["Keep"]);
    }

    #[test]
    fn test_sorted_by_class_total_then_customer_total() {
        let rows = build_rows(
            vec![
                ledger("Small retail", "Retail", [10.0, 0.0, 0.0, 0.0], 0.0),
                ledger("Big dealer", "Dealer", [60.0, 0.0, 0.0, 0.0], 0.0),
                ledger("Big retail", "Retail", [50.0, 0.0, 0.0, 0.0], 0.0),
                ledger("Small dealer", "Dealer", [20.0, 0.0, 0.0, 0.0], 0.0),
            ],
            vec![],
            Grouping::Customer,
        );
        // Dealer 80 > Retail 60
        let names: Vec<_> = rows
            .iter()
            .map(|r| r.customer_name.clone().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["Big dealer", "Small dealer", "Big retail", "Small retail"]
        );
    }
}
