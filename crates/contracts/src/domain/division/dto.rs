use serde::{Deserialize, Serialize};

use crate::shared::keys::{GroupRef, Grouped};
use crate::system::auth::UserInfo;

/// Budget of one salesperson group split across an item division
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionAllocation {
    pub salesperson_id: i64,
    pub salesperson_name: String,
    pub customer_class: String,
    pub group_key: String,
    pub brand: Option<String>,
    pub item_division: i64,
    pub division_name: String,
    /// Override when present, otherwise `historical_ratio`
    pub effective_ratio: f64,
    pub is_custom: bool,
    pub q1_allocated: f64,
    pub q2_allocated: f64,
    pub q3_allocated: f64,
    pub q4_allocated: f64,
    pub total_allocated: f64,
    /// Share of the group's actuals-year sales in this division
    pub historical_ratio: f64,
    /// Actuals-year sales of this group in this division
    pub historical_sales: f64,
}

impl Grouped for DivisionAllocation {
    fn group_ref(&self) -> GroupRef {
        GroupRef::new(self.salesperson_id, &self.customer_class, &self.group_key)
    }
}

/// One custom ratio, as sent to `save-ratios`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioOverride {
    pub salesperson_id: i64,
    pub salesperson_name: String,
    pub customer_class: String,
    pub group_key: String,
    pub item_division: i64,
    pub custom_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRatiosRequest {
    pub overrides: Vec<RatioOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveRatiosResult {
    pub saved_count: usize,
    pub updated_count: usize,
    pub total_processed: usize,
}

impl SaveRatiosResult {
    pub fn message(&self) -> String {
        format!(
            "Successfully saved {} new overrides and updated {} existing overrides",
            self.saved_count, self.updated_count
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRatiosResponse {
    pub success: bool,
    pub message: String,
    pub result: SaveRatiosResult,
    pub user_info: UserInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivisionAllocationsResponse {
    pub success: bool,
    pub data: Vec<DivisionAllocation>,
    pub total_records: usize,
    pub user_info: UserInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAllocationsResponse {
    pub success: bool,
    pub data: Vec<DivisionAllocation>,
    pub count: usize,
    pub user_info: UserInfo,
}

/// Reply of the per-group and global override resets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetOverridesResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: u64,
    pub user_info: UserInfo,
}
