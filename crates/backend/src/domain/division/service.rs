use anyhow::Result;
use contracts::domain::division::{DivisionAllocation, RatioOverride, SaveRatiosResult};
use contracts::shared::keys::GroupRef;

use super::repository;
use crate::shared::fiscal::FiscalYear;

pub async fn allocations() -> Result<Vec<DivisionAllocation>> {
    let rows = repository::allocations(FiscalYear::current(), None).await?;
    tracing::debug!("Loaded {} division allocation rows", rows.len());
    Ok(rows)
}

pub async fn group_allocations(group: &GroupRef) -> Result<Vec<DivisionAllocation>> {
    repository::allocations(FiscalYear::current(), Some(group)).await
}

/// Reject the whole batch when any ratio is outside `0..=1`
pub fn validate_overrides(overrides: &[RatioOverride]) -> Result<(), String> {
    for o in overrides {
        if !o.custom_ratio.is_finite() || !(0.0..=1.0).contains(&o.custom_ratio) {
            return Err(format!(
                "custom_ratio for division {} of '{}' must be between 0 and 1",
                o.item_division, o.group_key
            ));
        }
        if o.group_key.is_empty() || o.customer_class.is_empty() {
            return Err("customer_class and group_key are required".to_string());
        }
    }
    Ok(())
}

pub async fn save_overrides(overrides: &[RatioOverride]) -> Result<SaveRatiosResult> {
    let result = repository::upsert_overrides(overrides).await?;
    tracing::info!(
        "Division overrides saved: {} new, {} updated",
        result.saved_count,
        result.updated_count
    );
    Ok(result)
}

pub async fn reset_group(group: &GroupRef) -> Result<u64> {
    let deleted = repository::delete_group_overrides(group).await?;
    tracing::info!(
        "Reset {} division overrides for group {}",
        deleted,
        group.key()
    );
    Ok(deleted)
}

pub async fn reset_all() -> Result<u64> {
    let deleted = repository::delete_all_overrides().await?;
    tracing::info!("Reset all {} division overrides", deleted);
    Ok(deleted)
}
