//! CSV export of the sales-vs-budget sheets.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use contracts::domain::budget::Budget;
use contracts::domain::sales::SaleRow;
use contracts::shared::math::{growth_percent, percent_of};
use contracts::shared::quarter::Quarter;

use crate::error::{ClientError, ClientResult};

/// Table that can be written as CSV
pub trait CsvExportable {
    fn headers(&self) -> Vec<&'static str>;
    fn rows(&self) -> Vec<Vec<String>>;
}

/// Write `data` with every field quoted
pub fn write_csv<T: CsvExportable, W: Write>(data: &T, writer: W) -> ClientResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    csv.write_record(data.headers())?;
    for row in data.rows() {
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn export_to_file<T: CsvExportable>(data: &T, path: &Path) -> ClientResult<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(data, file)?;
    tracing::info!("Exported {}", path.display());
    Ok(())
}

/// `Jane_O_Neil_budget_2025-03-01.csv`
pub fn salesperson_filename(salesperson_name: &str, date: NaiveDate) -> String {
    let safe: String = salesperson_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_budget_{}.csv", safe, date.format("%Y-%m-%d"))
}

pub fn full_sheet_filename(date: NaiveDate) -> String {
    format!("full_budget_sheet_{}.csv", date.format("%Y-%m-%d"))
}

/// Salesperson whose rows are being exported
#[derive(Debug, Clone, PartialEq)]
pub struct SheetOwner {
    pub salesperson_id: i64,
    pub salesperson_name: String,
    pub role: String,
}

/// One line of a sales-vs-budget sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    pub salesperson_name: String,
    /// `None` on totals rows
    pub salesperson_id: Option<i64>,
    pub role: String,
    pub brand: String,
    pub flag: String,
    pub customer_class: String,
    pub customer_name: String,
    pub sales: [f64; 4],
    pub q4_orders: f64,
    pub total_sales: f64,
    pub zero_perc_sales: f64,
    pub zero_perc_percent: f64,
    pub open_next_year: f64,
    pub budget: [f64; 4],
    pub growth_percent: f64,
}

impl SheetRow {
    pub fn budget_total(&self) -> f64 {
        self.budget.iter().sum()
    }
}

fn same_target(budget: &Budget, sale: &SaleRow) -> bool {
    budget.brand == sale.brand
        && budget.flag == sale.flag
        && budget.customer_name == sale.customer_name
}

fn budget_quarters(budget: Option<&Budget>) -> [f64; 4] {
    let mut quarters = [0.0; 4];
    if let Some(b) = budget {
        for q in Quarter::ALL {
            quarters[q.index()] = b.quarter(q);
        }
    }
    quarters
}

/// One row per sales line with its matching budget, then one row per custom
/// budget that matched no sales line
pub fn merge_rows(owner: &SheetOwner, sales: &[SaleRow], budgets: &[Budget]) -> Vec<SheetRow> {
    let base = SheetRow {
        salesperson_name: owner.salesperson_name.clone(),
        salesperson_id: Some(owner.salesperson_id),
        role: owner.role.clone(),
        ..Default::default()
    };

    let mut rows: Vec<SheetRow> = sales
        .iter()
        .map(|sale| {
            let budget = budget_quarters(budgets.iter().find(|b| same_target(b, sale)));
            let mut row = SheetRow {
                brand: sale.brand.clone().unwrap_or_default(),
                flag: sale.flag.clone().unwrap_or_default(),
                customer_class: sale.derived_customer_class.clone().unwrap_or_default(),
                customer_name: sale.customer_name.clone().unwrap_or_default(),
                sales: [sale.q1_sales, sale.q2_sales, sale.q3_sales, sale.q4_sales],
                q4_orders: sale.q4_orders,
                total_sales: sale.total_sales,
                zero_perc_sales: sale.zero_perc_sales_total,
                zero_perc_percent: sale.zero_perc_sales_percent,
                open_next_year: sale.open_next_year,
                budget,
                ..base.clone()
            };
            row.growth_percent = growth_percent(row.budget_total(), row.total_sales);
            row
        })
        .collect();

    for budget in budgets
        .iter()
        .filter(|b| b.is_custom && !sales.iter().any(|s| same_target(b, s)))
    {
        let mut row = SheetRow {
            brand: budget.brand.clone().unwrap_or_default(),
            flag: budget.flag.clone().unwrap_or_default(),
            customer_class: budget.customer_class.clone(),
            customer_name: budget.customer_name.clone().unwrap_or_default(),
            budget: budget_quarters(Some(budget)),
            ..base.clone()
        };
        row.growth_percent = if row.budget_total() > 0.0 { 100.0 } else { 0.0 };
        rows.push(row);
    }

    rows
}

/// Column sums of `rows` labelled `label`; `None` for no rows
pub fn totals_row(rows: &[SheetRow], label: &str) -> Option<SheetRow> {
    if rows.is_empty() {
        return None;
    }

    let mut totals = SheetRow {
        salesperson_name: label.to_string(),
        ..Default::default()
    };
    for row in rows {
        for i in 0..4 {
            totals.sales[i] += row.sales[i];
            totals.budget[i] += row.budget[i];
        }
        totals.q4_orders += row.q4_orders;
        totals.total_sales += row.total_sales;
        totals.zero_perc_sales += row.zero_perc_sales;
        totals.open_next_year += row.open_next_year;
    }

    if totals.total_sales == 0.0 {
        totals.total_sales = totals.sales.iter().sum::<f64>() + totals.q4_orders;
    }
    totals.zero_perc_percent = percent_of(totals.zero_perc_sales, totals.total_sales);
    totals.growth_percent = growth_percent(totals.budget_total(), totals.total_sales);
    Some(totals)
}

/// Identifying columns of a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetLayout {
    /// Customer class and name
    Customer,
    /// Brand and flag
    Hospitality,
    /// Both, for sheets spanning both kinds of salespeople
    Mixed,
}

impl SheetLayout {
    pub fn new(has_hospitality: bool, has_other: bool) -> Self {
        match (has_hospitality, has_other) {
            (true, true) => SheetLayout::Mixed,
            (true, false) => SheetLayout::Hospitality,
            _ => SheetLayout::Customer,
        }
    }

    fn identifying_headers(self) -> &'static [&'static str] {
        match self {
            SheetLayout::Customer => &["Customer Class", "Customer Name"],
            SheetLayout::Hospitality => &["Brand", "Flag"],
            SheetLayout::Mixed => &["Brand", "Flag", "Customer Class", "Customer Name"],
        }
    }

    fn identifying_cells(self, row: &SheetRow) -> Vec<String> {
        match self {
            SheetLayout::Customer => vec![row.customer_class.clone(), row.customer_name.clone()],
            SheetLayout::Hospitality => vec![row.brand.clone(), row.flag.clone()],
            SheetLayout::Mixed => vec![
                row.brand.clone(),
                row.flag.clone(),
                row.customer_class.clone(),
                row.customer_name.clone(),
            ],
        }
    }
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

/// Sheet rows under a layout, the last row being the totals
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSheet {
    pub layout: SheetLayout,
    pub rows: Vec<SheetRow>,
}

impl BudgetSheet {
    /// Append a totals row labelled `totals_label` to `rows`
    pub fn with_totals(
        layout: SheetLayout,
        mut rows: Vec<SheetRow>,
        totals_label: &str,
    ) -> ClientResult<Self> {
        let totals = totals_row(&rows, totals_label).ok_or(ClientError::NoData)?;
        rows.push(totals);
        Ok(Self { layout, rows })
    }
}

impl CsvExportable for BudgetSheet {
    fn headers(&self) -> Vec<&'static str> {
        let mut headers = vec!["Salesperson Name", "Salesperson ID", "Role"];
        headers.extend_from_slice(self.layout.identifying_headers());
        headers.extend_from_slice(&[
            "Q1 Sales",
            "Q2 Sales",
            "Q3 Sales",
            "Q4 Sales",
            "Total Sales",
            "Zero % Sales",
            "Zero % %",
            "Q1 Budget",
            "Q2 Budget",
            "Q3 Budget",
            "Q4 Budget",
            "Growth",
        ]);
        headers
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut cells = vec![
                    row.salesperson_name.clone(),
                    row.salesperson_id
                        .map(|id| id.to_string())
                        .unwrap_or_default(),
                    row.role.clone(),
                ];
                cells.extend(self.layout.identifying_cells(row));
                cells.extend(row.sales.iter().map(|v| money(*v)));
                cells.push(money(row.total_sales));
                cells.push(money(row.zero_perc_sales));
                cells.push(money(row.zero_perc_percent));
                cells.extend(row.budget.iter().map(|v| money(*v)));
                cells.push(money(row.growth_percent));
                cells
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> SheetOwner {
        SheetOwner {
            salesperson_id: 101,
            salesperson_name: "Ann O'Neil".into(),
            role: "Retail".into(),
        }
    }

    fn sale(name: &str, q1: f64, q4_orders: f64) -> SaleRow {
        SaleRow {
            customer_name: Some(name.into()),
            derived_customer_class: Some("Retail".into()),
            brand: None,
            flag: None,
            q1_sales: q1,
            q2_sales: 0.0,
            q3_sales: 0.0,
            q4_sales: 0.0,
            q4_orders,
            open_next_year: 0.0,
            zero_perc_sales_total: 0.0,
            total_sales: q1 + q4_orders,
            zero_perc_sales_percent: 0.0,
        }
    }

    fn budget(name: &str, q1: f64, is_custom: bool) -> Budget {
        Budget {
            id: 1,
            salesperson_id: 101,
            salesperson_name: "Ann O'Neil".into(),
            brand: None,
            flag: None,
            customer_name: Some(name.into()),
            customer_class: "Retail".into(),
            quarter_1_sales: q1,
            quarter_2_sales: 0.0,
            quarter_3_sales: 0.0,
            quarter_4_sales: 0.0,
            is_custom,
            total_sales: q1,
        }
    }

    #[test]
    fn test_merge_matches_budgets_and_appends_unmatched_custom() {
        let sales = vec![sale("Acme", 100.0, 0.0), sale("Beta", 50.0, 0.0)];
        let budgets = vec![
            budget("Acme", 120.0, false),
            budget("Prospect", 30.0, true),
            budget("Acme", 999.0, true),
            budget("Ghost", 0.0, true),
        ];

        let rows = merge_rows(&owner(), &sales, &budgets);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].budget[0], 120.0);
        assert_eq!(rows[0].growth_percent, 20.0);
        assert_eq!(rows[1].budget_total(), 0.0);
        assert_eq!(rows[1].growth_percent, -100.0);
        assert_eq!(rows[2].customer_name, "Prospect");
        assert_eq!(rows[2].total_sales, 0.0);
        assert_eq!(rows[2].growth_percent, 100.0);
        assert_eq!(rows[3].growth_percent, 0.0);
    }

    #[test]
    fn test_totals_row() {
        let rows = merge_rows(
            &owner(),
            &[sale("Acme", 100.0, 20.0)],
            &[budget("Acme", 240.0, false)],
        );
        let totals = totals_row(&rows, "Total").unwrap();

        assert_eq!(totals.salesperson_name, "Total");
        assert_eq!(totals.salesperson_id, None);
        assert_eq!(totals.total_sales, 120.0);
        assert_eq!(totals.growth_percent, 100.0);
        assert!(totals_row(&[], "Total").is_none());
    }

    #[test]
    fn test_csv_has_header_rows_and_totals() {
        let rows = merge_rows(
            &owner(),
            &[sale("Acme, Inc.", 100.0, 0.0), sale("Beta", 50.0, 0.0)],
            &[],
        );
        let sheet = BudgetSheet::with_totals(SheetLayout::Customer, rows, "Total").unwrap();

        let mut out = Vec::new();
        write_csv(&sheet, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1 + 2 + 1);
        assert!(lines[0].starts_with("\"Salesperson Name\",\"Salesperson ID\",\"Role\","));
        assert!(lines[0].contains("\"Role\",\"Customer Class\",\"Customer Name\",\"Q1 Sales\""));
        assert!(lines[0].ends_with("\"Q4 Budget\",\"Growth\""));
        assert!(lines[1].contains("\"Acme, Inc.\""));
        assert!(lines[1].contains("\"Ann O'Neil\",\"101\",\"Retail\""));
        assert!(lines[3].starts_with("\"Total\",\"\",\"\""));
        assert!(lines[3].contains("\"150.00\""));
    }

    #[test]
    fn test_headers_per_layout() {
        let sheet = |layout| BudgetSheet {
            layout,
            rows: vec![],
        };
        assert_eq!(
            sheet(SheetLayout::Hospitality).headers()[3..5],
            ["Brand", "Flag"]
        );
        assert_eq!(sheet(SheetLayout::Mixed).headers().len(), 3 + 4 + 12);
        assert_eq!(SheetLayout::new(true, true), SheetLayout::Mixed);
        assert_eq!(SheetLayout::new(false, false), SheetLayout::Customer);
    }

    #[test]
    fn test_empty_sheet_is_no_data() {
        let result = BudgetSheet::with_totals(SheetLayout::Customer, vec![], "Total");
        assert!(matches!(result, Err(ClientError::NoData)));
    }

    #[test]
    fn test_filenames() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(
            salesperson_filename("Ann O'Neil", date),
            "Ann_O_Neil_budget_2025-03-01.csv"
        );
        assert_eq!(
            full_sheet_filename(date),
            "full_budget_sheet_2025-03-01.csv"
        );
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("sheet.csv");
        let rows = merge_rows(&owner(), &[sale("Acme", 1.0, 0.0)], &[]);
        let sheet = BudgetSheet::with_totals(SheetLayout::Customer, rows, "Total").unwrap();

        export_to_file(&sheet, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);
    }
}
