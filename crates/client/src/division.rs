//! Division allocation board: each budget group split across item divisions
//! by historical or custom ratios.

use std::sync::Arc;

use async_trait::async_trait;
use contracts::domain::division::{
    changed_overrides, group_allocations, DivisionAllocation, DivisionAllocationsResponse,
    DivisionGroup, GroupAllocationsResponse, RatioOverride, ResetOverridesResponse,
    SaveRatiosRequest, SaveRatiosResponse,
};
use contracts::shared::keys::{replace_group_rows, GroupRef};
use tokio::task::JoinSet;

use crate::api::{group_path, ApiClient};
use crate::error::{ClientError, ClientResult};

#[async_trait]
pub trait DivisionBackend: Send + Sync + 'static {
    async fn allocations(&self) -> ClientResult<Vec<DivisionAllocation>>;
    async fn group_allocations(&self, group: &GroupRef) -> ClientResult<Vec<DivisionAllocation>>;
    async fn save_ratios(&self, overrides: Vec<RatioOverride>) -> ClientResult<SaveRatiosResponse>;
    async fn reset_group(&self, group: &GroupRef) -> ClientResult<ResetOverridesResponse>;
}

#[async_trait]
impl DivisionBackend for ApiClient {
    async fn allocations(&self) -> ClientResult<Vec<DivisionAllocation>> {
        let response: DivisionAllocationsResponse = self.get("/api/division/allocations").await?;
        Ok(response.data)
    }

    async fn group_allocations(&self, group: &GroupRef) -> ClientResult<Vec<DivisionAllocation>> {
        let response: GroupAllocationsResponse = self
            .get(&group_path("/api/division/allocations", group))
            .await?;
        Ok(response.data)
    }

    async fn save_ratios(&self, overrides: Vec<RatioOverride>) -> ClientResult<SaveRatiosResponse> {
        self.post(
            "/api/division/save-ratios",
            &SaveRatiosRequest { overrides },
        )
        .await
    }

    async fn reset_group(&self, group: &GroupRef) -> ClientResult<ResetOverridesResponse> {
        self.delete(&group_path("/api/division/reset-group", group))
            .await
    }
}

/// Outcome of resetting every customized group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResetAllOutcome {
    pub reset_groups: usize,
    pub failed: Vec<(GroupRef, String)>,
}

impl ResetAllOutcome {
    pub fn message(&self) -> String {
        if self.reset_groups == 0 && self.failed.is_empty() {
            "No overrides to reset".to_string()
        } else {
            format!("Reset overrides for {} groups", self.reset_groups)
        }
    }
}

pub struct DivisionBoard<B: DivisionBackend> {
    backend: Arc<B>,
    rows: Vec<DivisionAllocation>,
}

impl<B: DivisionBackend> DivisionBoard<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            rows: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> ClientResult<()> {
        self.rows = self.backend.allocations().await.map_err(|e| {
            tracing::error!("Error fetching division data: {}", e);
            e
        })?;
        Ok(())
    }

    pub fn rows(&self) -> &[DivisionAllocation] {
        &self.rows
    }

    pub fn groups(&self) -> Vec<DivisionGroup> {
        group_allocations(&self.rows)
    }

    pub fn group(&self, group: &GroupRef) -> Option<DivisionGroup> {
        self.groups().into_iter().find(|g| &g.group_ref() == group)
    }

    /// Refetch one group and splice it back in place
    pub async fn refresh_group(&mut self, group: &GroupRef) -> ClientResult<()> {
        let fresh = self.backend.group_allocations(group).await?;
        replace_group_rows(&mut self.rows, group, fresh);
        Ok(())
    }

    /// Persist the edited ratios of a group. Returns `None` when nothing
    /// differs from the historical split.
    pub async fn save_ratios(
        &mut self,
        group: &GroupRef,
        divisions: &[DivisionAllocation],
    ) -> ClientResult<Option<SaveRatiosResponse>> {
        let current = self
            .group(group)
            .ok_or_else(|| ClientError::Invalid("Group not found".to_string()))?;

        let overrides = changed_overrides(&current, divisions);
        if overrides.is_empty() {
            return Ok(None);
        }

        let response = self.backend.save_ratios(overrides).await.map_err(|e| {
            tracing::error!("Error saving ratios for {}: {}", group.key(), e);
            e
        })?;
        self.refresh_group(group).await?;
        Ok(Some(response))
    }

    pub async fn reset_group(&mut self, group: &GroupRef) -> ClientResult<u64> {
        let response = self.backend.reset_group(group).await.map_err(|e| {
            tracing::error!("Error resetting group {}: {}", group.key(), e);
            e
        })?;
        self.refresh_group(group).await?;
        Ok(response.deleted_count)
    }

    /// Reset every group that has custom ratios, one request per group, all
    /// in flight together. Groups that fail keep their custom ratios.
    pub async fn reset_all(&mut self) -> ClientResult<ResetAllOutcome> {
        let custom: Vec<GroupRef> = self
            .groups()
            .iter()
            .filter(|g| g.has_custom_ratios)
            .map(DivisionGroup::group_ref)
            .collect();

        let mut outcome = ResetAllOutcome::default();
        if custom.is_empty() {
            return Ok(outcome);
        }

        let mut unfinished = custom.clone();
        let mut tasks = JoinSet::new();
        for group in custom {
            let backend = self.backend.clone();
            tasks.spawn(async move {
                let result = match backend.reset_group(&group).await {
                    Ok(_) => backend.group_allocations(&group).await,
                    Err(e) => Err(e),
                };
                (group, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (group, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!("Reset task failed: {}", e);
                    continue;
                }
            };
            unfinished.retain(|g| g != &group);
            match result {
                Ok(fresh) => {
                    replace_group_rows(&mut self.rows, &group, fresh);
                    outcome.reset_groups += 1;
                }
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    tracing::error!("Error resetting group {}: {}", group.key(), e);
                    outcome.failed.push((group, e.to_string()));
                }
            }
        }

        // tasks that panicked never reported their group
        for group in unfinished {
            tracing::error!("Reset of group {} did not finish", group.key());
            let reason = "Reset task failed".to_string();
            outcome.failed.push((group, reason));
        }

        tracing::info!("{}", outcome.message());
        Ok(outcome)
    }
}
