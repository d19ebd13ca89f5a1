//! Admin overview: every salesperson's sales against budget, plus the
//! spreadsheet exports built from it.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use contracts::dashboards::admin_summary::{
    split_by_hospitality, AdminSummaryResponse, SalespersonSummary, Subtotals, SummaryTotals,
};

use crate::api::ApiClient;
use crate::budget::{BudgetBackend, SalespersonBudgets};
use crate::error::{ClientError, ClientResult};
use crate::export::{
    export_to_file, full_sheet_filename, merge_rows, salesperson_filename, BudgetSheet,
    SheetLayout, SheetOwner, SheetRow,
};
use crate::sales;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminDashboard {
    pub people: Vec<SalespersonSummary>,
}

impl AdminDashboard {
    /// GET /api/admin/summary
    pub async fn fetch(api: &ApiClient) -> ClientResult<Self> {
        let response: AdminSummaryResponse = api.get("/api/admin/summary").await.map_err(|e| {
            tracing::error!("Error fetching admin summary: {}", e);
            e
        })?;
        Ok(Self {
            people: response.data,
        })
    }

    pub fn totals(&self) -> SummaryTotals {
        SummaryTotals::compute(&self.people)
    }

    pub fn hospitality(&self) -> Vec<&SalespersonSummary> {
        split_by_hospitality(&self.people).0
    }

    pub fn non_hospitality(&self) -> Vec<&SalespersonSummary> {
        split_by_hospitality(&self.people).1
    }

    /// `(hospitality, everyone else)` subtotals
    pub fn subtotals(&self) -> (Subtotals, Subtotals) {
        let (hospitality, other) = split_by_hospitality(&self.people);
        (Subtotals::compute(&hospitality), Subtotals::compute(&other))
    }

    pub fn find(&self, salesperson_id: i64) -> Option<&SalespersonSummary> {
        self.people
            .iter()
            .find(|p| p.salesperson_id == salesperson_id)
    }

    /// Name and role from the summary; `Unknown` for someone not listed
    pub fn sheet_owner(&self, salesperson_id: i64) -> SheetOwner {
        match self.find(salesperson_id) {
            Some(p) => SheetOwner {
                salesperson_id,
                salesperson_name: p.salesperson_name.clone(),
                role: p.role.clone(),
            },
            None => SheetOwner {
                salesperson_id,
                salesperson_name: "Unknown".to_string(),
                role: "Unknown".to_string(),
            },
        }
    }

    fn layout(&self) -> SheetLayout {
        let hospitality = self.people.iter().any(|p| p.is_hospitality());
        let other = self.people.iter().any(|p| !p.is_hospitality());
        SheetLayout::new(hospitality, other)
    }
}

/// Sales and budgets of one salesperson merged into sheet rows
pub async fn salesperson_rows(
    api: &ApiClient,
    dashboard: &AdminDashboard,
    salesperson_id: i64,
) -> ClientResult<Vec<SheetRow>> {
    let budgets = SalespersonBudgets::new(api.clone(), salesperson_id);
    let (sales, budgets) = tokio::try_join!(
        sales::fetch_for_salesperson(api, salesperson_id),
        budgets.list_budgets()
    )?;

    Ok(merge_rows(
        &dashboard.sheet_owner(salesperson_id),
        &sales.rows,
        &budgets,
    ))
}

/// Write one salesperson's sheet into `dir`; returns the file path
pub async fn export_salesperson_sheet(
    api: &ApiClient,
    dashboard: &AdminDashboard,
    salesperson_id: i64,
    dir: &Path,
    today: NaiveDate,
) -> ClientResult<PathBuf> {
    let rows = salesperson_rows(api, dashboard, salesperson_id).await?;
    let owner = dashboard.sheet_owner(salesperson_id);
    let is_hospitality = dashboard
        .find(salesperson_id)
        .map(SalespersonSummary::is_hospitality)
        .unwrap_or(false);

    let layout = SheetLayout::new(is_hospitality, !is_hospitality);
    let sheet = BudgetSheet::with_totals(layout, rows, "Total")?;
    let path = dir.join(salesperson_filename(&owner.salesperson_name, today));
    export_to_file(&sheet, &path)?;
    Ok(path)
}

/// Write every listed salesperson's rows plus a grand total into `dir`.
/// A salesperson whose data cannot be fetched is left out.
pub async fn export_full_sheet(
    api: &ApiClient,
    dashboard: &AdminDashboard,
    dir: &Path,
    today: NaiveDate,
) -> ClientResult<PathBuf> {
    let mut rows = Vec::new();
    for person in &dashboard.people {
        match salesperson_rows(api, dashboard, person.salesperson_id).await {
            Ok(person_rows) => rows.extend(person_rows),
            Err(e) if e.is_auth() => return Err(e),
            Err(e) => tracing::error!(
                "Error fetching data for salesperson {}: {}",
                person.salesperson_id,
                e
            ),
        }
    }

    if rows.is_empty() {
        return Err(ClientError::NoData);
    }

    let sheet = BudgetSheet::with_totals(dashboard.layout(), rows, "Grand Total")?;
    let path = dir.join(full_sheet_filename(today));
    export_to_file(&sheet, &path)?;
    Ok(path)
}
