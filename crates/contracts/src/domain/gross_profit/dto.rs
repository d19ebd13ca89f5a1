use serde::{Deserialize, Serialize};

use crate::shared::keys::{GroupRef, Grouped};
use crate::shared::quarter::Quarter;
use crate::system::auth::UserInfo;

/// Period a gross-profit percentage applies to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GpPeriod {
    Q1,
    Q2,
    Q3,
    Q4,
    FullYear,
}

impl GpPeriod {
    pub const ALL: [GpPeriod; 5] = [
        GpPeriod::Q1,
        GpPeriod::Q2,
        GpPeriod::Q3,
        GpPeriod::Q4,
        GpPeriod::FullYear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GpPeriod::Q1 => "q1",
            GpPeriod::Q2 => "q2",
            GpPeriod::Q3 => "q3",
            GpPeriod::Q4 => "q4",
            GpPeriod::FullYear => "full_year",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        GpPeriod::ALL.into_iter().find(|p| p.as_str() == value)
    }

    pub fn quarter(self) -> Option<Quarter> {
        match self {
            GpPeriod::Q1 => Some(Quarter::Q1),
            GpPeriod::Q2 => Some(Quarter::Q2),
            GpPeriod::Q3 => Some(Quarter::Q3),
            GpPeriod::Q4 => Some(Quarter::Q4),
            GpPeriod::FullYear => None,
        }
    }
}

impl From<Quarter> for GpPeriod {
    fn from(quarter: Quarter) -> Self {
        match quarter {
            Quarter::Q1 => GpPeriod::Q1,
            Quarter::Q2 => GpPeriod::Q2,
            Quarter::Q3 => GpPeriod::Q3,
            Quarter::Q4 => GpPeriod::Q4,
        }
    }
}

/// Estimated gross profit of one non-custom budget.
///
/// Percentages are fractions (`0.25` is 25%). A quarter without actuals
/// falls back to the full-year percentage; `None` means no sales at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrossProfitRow {
    pub budget_id: i64,
    pub salesperson_id: i64,
    pub salesperson_name: String,
    pub customer_class: String,
    pub group_key: String,
    pub quarter_1_sales: f64,
    pub quarter_2_sales: f64,
    pub quarter_3_sales: f64,
    pub quarter_4_sales: f64,
    pub q1_gp_percent: Option<f64>,
    pub q2_gp_percent: Option<f64>,
    pub q3_gp_percent: Option<f64>,
    pub q4_gp_percent: Option<f64>,
    pub full_year_gp_percent: Option<f64>,
    pub q1_gp_value: Option<f64>,
    pub q2_gp_value: Option<f64>,
    pub q3_gp_value: Option<f64>,
    pub q4_gp_value: Option<f64>,
    pub total_gp_value: f64,
    pub is_custom: bool,
    #[serde(default)]
    pub overridden_periods: Vec<GpPeriod>,
}

impl GrossProfitRow {
    pub fn gp_percent(&self, quarter: Quarter) -> Option<f64> {
        match quarter {
            Quarter::Q1 => self.q1_gp_percent,
            Quarter::Q2 => self.q2_gp_percent,
            Quarter::Q3 => self.q3_gp_percent,
            Quarter::Q4 => self.q4_gp_percent,
        }
    }

    pub fn gp_value(&self, quarter: Quarter) -> Option<f64> {
        match quarter {
            Quarter::Q1 => self.q1_gp_value,
            Quarter::Q2 => self.q2_gp_value,
            Quarter::Q3 => self.q3_gp_value,
            Quarter::Q4 => self.q4_gp_value,
        }
    }
}

impl Grouped for GrossProfitRow {
    fn group_ref(&self) -> GroupRef {
        GroupRef::new(self.salesperson_id, &self.customer_class, &self.group_key)
    }
}

/// Custom gross-profit percentage for a group and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrossProfitOverride {
    pub salesperson_id: i64,
    pub customer_class: String,
    pub group_key: String,
    pub period: GpPeriod,
    pub gp_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGpOverridesRequest {
    pub overrides: Vec<GrossProfitOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveGpOverridesResult {
    pub saved_count: usize,
    pub updated_count: usize,
    pub total_processed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGpOverridesResponse {
    pub success: bool,
    pub message: String,
    pub result: SaveGpOverridesResult,
    pub user_info: UserInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrossProfitResponse {
    pub success: bool,
    pub data: Vec<GrossProfitRow>,
    pub total_records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupGrossProfitResponse {
    pub success: bool,
    pub data: Vec<GrossProfitRow>,
    pub count: usize,
}
