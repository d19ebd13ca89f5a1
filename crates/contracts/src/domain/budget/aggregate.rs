use serde::{Deserialize, Serialize};

use crate::shared::keys::budget_key;
use crate::shared::quarter::Quarter;

/// Budget target of a salesperson for one customer or brand/flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub salesperson_id: i64,
    pub salesperson_name: String,
    pub brand: Option<String>,
    pub flag: Option<String>,
    pub customer_name: Option<String>,
    pub customer_class: String,
    pub quarter_1_sales: f64,
    pub quarter_2_sales: f64,
    pub quarter_3_sales: f64,
    pub quarter_4_sales: f64,
    pub is_custom: bool,
    /// Sum of the four quarters
    #[serde(default)]
    pub total_sales: f64,
}

impl Budget {
    pub fn key(&self) -> String {
        budget_key(
            self.brand.as_deref(),
            self.flag.as_deref(),
            self.customer_name.as_deref(),
        )
    }

    pub fn quarter(&self, quarter: Quarter) -> f64 {
        match quarter {
            Quarter::Q1 => self.quarter_1_sales,
            Quarter::Q2 => self.quarter_2_sales,
            Quarter::Q3 => self.quarter_3_sales,
            Quarter::Q4 => self.quarter_4_sales,
        }
    }

    pub fn set_quarter(&mut self, quarter: Quarter, value: f64) {
        match quarter {
            Quarter::Q1 => self.quarter_1_sales = value,
            Quarter::Q2 => self.quarter_2_sales = value,
            Quarter::Q3 => self.quarter_3_sales = value,
            Quarter::Q4 => self.quarter_4_sales = value,
        }
        self.recompute_total();
    }

    pub fn quarters_sum(&self) -> f64 {
        Quarter::ALL.iter().map(|q| self.quarter(*q)).sum()
    }

    pub fn recompute_total(&mut self) {
        self.total_sales = self.quarters_sum();
    }

    /// Apply the fields present in `update`
    pub fn apply(&mut self, update: &BudgetUpdate) {
        if let Some(v) = &update.brand {
            self.brand = Some(v.clone());
        }
        if let Some(v) = &update.flag {
            self.flag = Some(v.clone());
        }
        if let Some(v) = &update.customer_name {
            self.customer_name = Some(v.clone());
        }
        if let Some(v) = &update.customer_class {
            self.customer_class = v.clone();
        }
        for quarter in Quarter::ALL {
            if let Some(v) = update.quarter(quarter) {
                self.set_quarter(quarter, v);
            }
        }
        if let Some(v) = update.is_custom {
            self.is_custom = v;
        }
        self.recompute_total();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetCreate {
    pub salesperson_id: i64,
    pub salesperson_name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub customer_class: String,
    #[serde(default)]
    pub quarter_1_sales: f64,
    #[serde(default)]
    pub quarter_2_sales: f64,
    #[serde(default)]
    pub quarter_3_sales: f64,
    #[serde(default)]
    pub quarter_4_sales: f64,
    #[serde(default)]
    pub is_custom: bool,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter_1_sales: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter_2_sales: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter_3_sales: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter_4_sales: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_custom: Option<bool>,
}

impl BudgetUpdate {
    /// Update that changes a single quarter
    pub fn for_quarter(quarter: Quarter, value: f64) -> Self {
        let mut update = Self::default();
        match quarter {
            Quarter::Q1 => update.quarter_1_sales = Some(value),
            Quarter::Q2 => update.quarter_2_sales = Some(value),
            Quarter::Q3 => update.quarter_3_sales = Some(value),
            Quarter::Q4 => update.quarter_4_sales = Some(value),
        }
        update
    }

    pub fn quarter(&self, quarter: Quarter) -> Option<f64> {
        match quarter {
            Quarter::Q1 => self.quarter_1_sales,
            Quarter::Q2 => self.quarter_2_sales,
            Quarter::Q3 => self.quarter_3_sales,
            Quarter::Q4 => self.quarter_4_sales,
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub total_budgets: usize,
    pub total_q1: f64,
    pub total_q2: f64,
    pub total_q3: f64,
    pub total_q4: f64,
    pub total_sales: f64,
    pub custom_budgets: usize,
}

impl BudgetSummary {
    pub fn from_budgets(budgets: &[Budget]) -> Self {
        let sum = |q: Quarter| budgets.iter().map(|b| b.quarter(q)).sum::<f64>();
        let (q1, q2, q3, q4) = (
            sum(Quarter::Q1),
            sum(Quarter::Q2),
            sum(Quarter::Q3),
            sum(Quarter::Q4),
        );

        Self {
            total_budgets: budgets.len(),
            total_q1: q1,
            total_q2: q2,
            total_q3: q3,
            total_q4: q4,
            total_sales: q1 + q2 + q3 + q4,
            custom_budgets: budgets.iter().filter(|b| b.is_custom).count(),
        }
    }
}

/// Owner block of a budget list: `user_info` for the caller's own list,
/// `salesperson_info` when an admin lists someone else's
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetOwnerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub salesperson_id: i64,
    pub salesperson_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetListResponse {
    pub success: bool,
    pub data: Vec<Budget>,
    pub summary: BudgetSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<BudgetOwnerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesperson_info: Option<BudgetOwnerInfo>,
    pub total_records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetResponse {
    pub success: bool,
    pub data: Budget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedBudgetsResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<Budget>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutosuggestData {
    pub customer_classes: Vec<String>,
    pub customer_names: Vec<String>,
    pub brands: Vec<String>,
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosuggestResponse {
    pub success: bool,
    pub data: AutosuggestData,
}
