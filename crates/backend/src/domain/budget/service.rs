use std::collections::HashSet;

use contracts::domain::budget::{AutosuggestData, Budget, BudgetCreate, BudgetUpdate};
use contracts::domain::sales::SaleRow;
use contracts::domain::salesperson::Salesperson;

use super::repository;
use crate::domain::sales::repository::{distinct_values, SalesColumn};
use crate::domain::sales::service::sales_rows;

/// Who is touching a budget row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetScope {
    /// A salesperson acting on their own budgets
    Owner(i64),
    /// An admin addressing the budget by id alone
    Admin,
    /// An admin acting on the budgets of the given salesperson
    AdminFor(i64),
}

#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    #[error("Budget not found")]
    NotFound,
    #[error("You can only modify your own budgets")]
    Forbidden,
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub async fn list(salesperson_id: i64) -> anyhow::Result<Vec<Budget>> {
    repository::list_by_salesperson(salesperson_id).await
}

pub async fn create(dto: BudgetCreate) -> Result<Budget, BudgetError> {
    validate_create(&dto)?;
    let budget = repository::insert(&dto).await?;
    tracing::info!(
        "Created budget {} for salesperson {}",
        budget.id,
        budget.salesperson_id
    );
    Ok(budget)
}

pub async fn update(
    id: i64,
    scope: BudgetScope,
    changes: BudgetUpdate,
) -> Result<Budget, BudgetError> {
    validate_update(&changes)?;
    let mut budget = load_in_scope(id, scope).await?;
    budget.apply(&changes);
    let stored = repository::update(&budget).await?;
    Ok(stored)
}

pub async fn delete(id: i64, scope: BudgetScope) -> Result<(), BudgetError> {
    load_in_scope(id, scope).await?;
    if !repository::delete(id).await? {
        return Err(BudgetError::NotFound);
    }
    tracing::info!("Deleted budget {}", id);
    Ok(())
}

async fn load_in_scope(id: i64, scope: BudgetScope) -> Result<Budget, BudgetError> {
    let budget = repository::get_by_id(id)
        .await?
        .ok_or(BudgetError::NotFound)?;
    check_scope(&budget, scope)?;
    Ok(budget)
}

fn check_scope(budget: &Budget, scope: BudgetScope) -> Result<(), BudgetError> {
    match scope {
        BudgetScope::Owner(id) if budget.salesperson_id != id => Err(BudgetError::Forbidden),
        // an admin addressing the wrong salesperson sees no such budget
        BudgetScope::AdminFor(id) if budget.salesperson_id != id => Err(BudgetError::NotFound),
        _ => Ok(()),
    }
}

fn validate_create(dto: &BudgetCreate) -> Result<(), BudgetError> {
    if dto.customer_class.trim().is_empty() {
        return Err(BudgetError::Invalid("customer_class is required".into()));
    }
    validate_amounts([
        Some(dto.quarter_1_sales),
        Some(dto.quarter_2_sales),
        Some(dto.quarter_3_sales),
        Some(dto.quarter_4_sales),
    ])
}

fn validate_update(changes: &BudgetUpdate) -> Result<(), BudgetError> {
    if matches!(&changes.customer_class, Some(c) if c.trim().is_empty()) {
        return Err(BudgetError::Invalid("customer_class cannot be empty".into()));
    }
    validate_amounts([
        changes.quarter_1_sales,
        changes.quarter_2_sales,
        changes.quarter_3_sales,
        changes.quarter_4_sales,
    ])
}

fn validate_amounts(values: [Option<f64>; 4]) -> Result<(), BudgetError> {
    if values.iter().flatten().any(|v| !v.is_finite()) {
        return Err(BudgetError::Invalid(
            "Quarter amounts must be finite numbers".into(),
        ));
    }
    Ok(())
}

/// Seed budgets from the salesperson's sales rows. Rows that already have a
/// budget with the same key are skipped.
pub async fn generate_from_sales(salesperson: &Salesperson) -> anyhow::Result<Vec<Budget>> {
    let rows = sales_rows(salesperson).await?;
    let existing = repository::list_by_salesperson(salesperson.salesman_no).await?;

    let drafts = drafts_from_sales(salesperson, &rows, &existing);
    let created = repository::insert_many(&drafts).await?;
    tracing::info!(
        "Generated {} budget entries for salesperson {}",
        created.len(),
        salesperson.salesman_no
    );
    Ok(created)
}

pub fn drafts_from_sales(
    salesperson: &Salesperson,
    rows: &[SaleRow],
    existing: &[Budget],
) -> Vec<BudgetCreate> {
    let mut seen: HashSet<String> = existing.iter().map(Budget::key).collect();
    let fallback_class = if salesperson.is_hospitality() {
        "Hospitality"
    } else {
        "Unknown"
    };

    rows.iter()
        .filter(|row| seen.insert(row.budget_key()))
        .map(|row| BudgetCreate {
            salesperson_id: salesperson.salesman_no,
            salesperson_name: salesperson.salesman_name.clone(),
            brand: row.brand.clone(),
            flag: row.flag.clone(),
            customer_name: row.customer_name.clone(),
            customer_class: row
                .derived_customer_class
                .clone()
                .unwrap_or_else(|| fallback_class.to_string()),
            quarter_1_sales: row.q1_sales,
            quarter_2_sales: row.q2_sales,
            quarter_3_sales: row.q3_sales,
            quarter_4_sales: row.q4_sales,
            is_custom: false,
        })
        .collect()
}

pub async fn autosuggest() -> anyhow::Result<AutosuggestData> {
    Ok(AutosuggestData {
        customer_classes: distinct_values(SalesColumn::CustomerClass).await?,
        customer_names: distinct_values(SalesColumn::CustomerName).await?,
        brands: distinct_values(SalesColumn::Brand).await?,
        flags: distinct_values(SalesColumn::Flag).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salesperson(role: &str) -> Salesperson {
        Salesperson {
            salesman_no: 7,
            salesman_name: "Ann".into(),
            role: Some(role.into()),
        }
    }

    fn sale(customer: &str, q1: f64) -> SaleRow {
        SaleRow {
            customer_name: Some(customer.into()),
            derived_customer_class: Some("Dealer".into()),
            brand: None,
            flag: None,
            q1_sales: q1,
            q2_sales: 0.0,
            q3_sales: 0.0,
            q4_sales: 5.0,
            q4_orders: 0.0,
            open_next_year: 0.0,
            zero_perc_sales_total: 0.0,
            total_sales: q1 + 5.0,
            zero_perc_sales_percent: 0.0,
        }
    }

    fn budget_for(customer: &str) -> Budget {
        Budget {
            id: 1,
            salesperson_id: 7,
            salesperson_name: "Ann".into(),
            brand: None,
            flag: None,
            customer_name: Some(customer.into()),
            customer_class: "Dealer".into(),
            quarter_1_sales: 0.0,
            quarter_2_sales: 0.0,
            quarter_3_sales: 0.0,
            quarter_4_sales: 0.0,
            is_custom: false,
            total_sales: 0.0,
        }
    }

    #[test]
    fn test_drafts_skip_existing_keys() {
        let rows = vec![sale("Acme", 10.0), sale("Bolt", 20.0)];
        let drafts = drafts_from_sales(&salesperson("Retail"), &rows, &[budget_for("Acme")]);

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].customer_name.as_deref(), Some("Bolt"));
        assert_eq!(drafts[0].quarter_1_sales, 20.0);
        assert_eq!(drafts[0].quarter_4_sales, 5.0);
        assert!(!drafts[0].is_custom);
    }

    #[test]
    fn test_hospitality_drafts_default_class() {
        let mut row = sale("ignored", 1.0);
        row.customer_name = None;
        row.derived_customer_class = None;
        row.brand = Some("Marriott".into());
        row.flag = Some("Courtyard".into());

        let drafts = drafts_from_sales(&salesperson("Hospitality"), &[row], &[]);
        assert_eq!(drafts[0].customer_class, "Hospitality");
        assert_eq!(drafts[0].brand.as_deref(), Some("Marriott"));
    }

    #[test]
    fn test_scope_checks() {
        let b = budget_for("Acme");
        assert!(check_scope(&b, BudgetScope::Owner(7)).is_ok());
        assert!(matches!(
            check_scope(&b, BudgetScope::Owner(8)),
            Err(BudgetError::Forbidden)
        ));
        assert!(check_scope(&b, BudgetScope::AdminFor(7)).is_ok());
        assert!(check_scope(&b, BudgetScope::Admin).is_ok());
        assert!(matches!(
            check_scope(&b, BudgetScope::AdminFor(8)),
            Err(BudgetError::NotFound)
        ));
    }

    #[test]
    fn test_update_validation() {
        assert!(validate_update(&BudgetUpdate::default()).is_ok());
        let bad = BudgetUpdate {
            quarter_2_sales: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(validate_update(&bad), Err(BudgetError::Invalid(_))));
        let empty_class = BudgetUpdate {
            customer_class: Some("  ".into()),
            ..Default::default()
        };
        assert!(validate_update(&empty_class).is_err());
    }
}
