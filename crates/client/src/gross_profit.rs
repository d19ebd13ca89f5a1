use contracts::domain::division::ResetOverridesResponse;
use contracts::domain::gross_profit::{
    GroupGrossProfitResponse, GrossProfitOverride, GrossProfitResponse, GrossProfitRow,
    SaveGpOverridesRequest, SaveGpOverridesResponse,
};
use contracts::shared::keys::{replace_group_rows, GroupRef, Grouped};
use contracts::shared::quarter::Quarter;

use crate::api::{group_path, ApiClient};
use crate::error::ClientResult;

/// Estimated gross profit per budget row
pub struct GrossProfitBoard {
    api: ApiClient,
    rows: Vec<GrossProfitRow>,
}

impl GrossProfitBoard {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            rows: Vec::new(),
        }
    }

    /// GET /api/gross-profit
    pub async fn load(&mut self) -> ClientResult<()> {
        let response: GrossProfitResponse = self.api.get("/api/gross-profit").await.map_err(|e| {
            tracing::error!("Error fetching gross profit data: {}", e);
            e
        })?;
        self.rows = response.data;
        Ok(())
    }

    pub fn rows(&self) -> &[GrossProfitRow] {
        &self.rows
    }

    pub fn group_rows(&self, group: &GroupRef) -> Vec<&GrossProfitRow> {
        self.rows
            .iter()
            .filter(|r| &r.group_ref() == group)
            .collect()
    }

    pub fn total_gp_value(&self) -> f64 {
        self.rows.iter().map(|r| r.total_gp_value).sum()
    }

    pub fn quarter_gp_value(&self, quarter: Quarter) -> f64 {
        self.rows.iter().filter_map(|r| r.gp_value(quarter)).sum()
    }

    pub async fn refresh_group(&mut self, group: &GroupRef) -> ClientResult<()> {
        let response: GroupGrossProfitResponse =
            self.api.get(&group_path("/api/gross-profit", group)).await?;
        replace_group_rows(&mut self.rows, group, response.data);
        Ok(())
    }

    /// Save overrides, then refresh every group they touch
    pub async fn save_overrides(
        &mut self,
        overrides: Vec<GrossProfitOverride>,
    ) -> ClientResult<SaveGpOverridesResponse> {
        let mut groups: Vec<GroupRef> = overrides
            .iter()
            .map(|o| GroupRef::new(o.salesperson_id, &o.customer_class, &o.group_key))
            .collect();
        groups.dedup();

        let response: SaveGpOverridesResponse = self
            .api
            .post(
                "/api/gross-profit/overrides",
                &SaveGpOverridesRequest { overrides },
            )
            .await
            .map_err(|e| {
                tracing::error!("Error saving gross profit overrides: {}", e);
                e
            })?;

        for group in &groups {
            self.refresh_group(group).await?;
        }
        Ok(response)
    }

    pub async fn reset_group(&mut self, group: &GroupRef) -> ClientResult<u64> {
        let response: ResetOverridesResponse = self
            .api
            .delete(&group_path("/api/gross-profit/reset-group", group))
            .await
            .map_err(|e| {
                tracing::error!("Error resetting gross profit group {}: {}", group.key(), e);
                e
            })?;
        self.refresh_group(group).await?;
        Ok(response.deleted_count)
    }
}
