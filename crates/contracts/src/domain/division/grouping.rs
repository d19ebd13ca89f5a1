use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::dto::{DivisionAllocation, RatioOverride};
use crate::shared::keys::{GroupRef, Grouped};

/// Allocation rows of one salesperson/class/group bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionGroup {
    pub salesperson_id: i64,
    pub salesperson_name: String,
    pub customer_class: String,
    pub group_key: String,
    pub brand: Option<String>,
    pub display_key: String,
    pub divisions: Vec<DivisionAllocation>,
    pub total_ratio: f64,
    pub has_custom_ratios: bool,
}

impl DivisionGroup {
    fn from_first(row: &DivisionAllocation) -> Self {
        let display_key = match &row.brand {
            Some(brand) if row.customer_class == "Hospitality" && !brand.is_empty() => {
                format!("{} ({})", row.group_key, brand)
            }
            _ => row.group_key.clone(),
        };

        Self {
            salesperson_id: row.salesperson_id,
            salesperson_name: row.salesperson_name.clone(),
            customer_class: row.customer_class.clone(),
            group_key: row.group_key.clone(),
            brand: row.brand.clone(),
            display_key,
            divisions: Vec::new(),
            total_ratio: 0.0,
            has_custom_ratios: false,
        }
    }

    pub fn group_ref(&self) -> GroupRef {
        GroupRef::new(self.salesperson_id, &self.customer_class, &self.group_key)
    }
}

/// Group allocation rows by bucket. Groups keep the order in which they are
/// first seen; divisions inside a group are sorted by division number.
pub fn group_allocations(rows: &[DivisionAllocation]) -> Vec<DivisionGroup> {
    let mut index: HashMap<GroupRef, usize> = HashMap::new();
    let mut groups: Vec<DivisionGroup> = Vec::new();

    for row in rows {
        let key = row.group_ref();
        let position = *index.entry(key).or_insert_with(|| {
            groups.push(DivisionGroup::from_first(row));
            groups.len() - 1
        });

        let group = &mut groups[position];
        group.total_ratio += row.effective_ratio;
        group.has_custom_ratios |= row.is_custom;
        group.divisions.push(row.clone());
    }

    for group in &mut groups {
        group.divisions.sort_by_key(|d| d.item_division);
    }

    groups
}

/// Overrides to persist for a group: rows already custom, or whose effective
/// ratio was edited away from the historical one
pub fn changed_overrides(
    group: &DivisionGroup,
    divisions: &[DivisionAllocation],
) -> Vec<RatioOverride> {
    divisions
        .iter()
        .filter(|d| d.is_custom || d.effective_ratio != d.historical_ratio)
        .map(|d| RatioOverride {
            salesperson_id: group.salesperson_id,
            salesperson_name: group.salesperson_name.clone(),
            customer_class: group.customer_class.clone(),
            group_key: group.group_key.clone(),
            item_division: d.item_division,
            custom_ratio: d.effective_ratio,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alloc(
        sp: i64,
        class: &str,
        group: &str,
        div: i64,
        ratio: f64,
        custom: bool,
    ) -> DivisionAllocation {
        DivisionAllocation {
            salesperson_id: sp,
            salesperson_name: format!("SP {}", sp),
            customer_class: class.into(),
            group_key: group.into(),
            brand: Some("Marriott".into()),
            item_division: div,
            division_name: format!("Div {}", div),
            effective_ratio: ratio,
            is_custom: custom,
            q1_allocated: 0.0,
            q2_allocated: 0.0,
            q3_allocated: 0.0,
            q4_allocated: 0.0,
            total_allocated: 0.0,
            historical_ratio: if custom { 0.5 } else { ratio },
            historical_sales: 0.0,
        }
    }

    #[test]
    fn test_grouping_keeps_first_seen_order_and_sorts_divisions() {
        let rows = vec![
            alloc(2, "Dealer", "Zeta", 30, 0.25, false),
            alloc(1, "Hospitality", "Courtyard", 20, 0.4, true),
            alloc(2, "Dealer", "Zeta", 10, 0.75, false),
            alloc(1, "Hospitality", "Courtyard", 10, 0.6, false),
        ];

        let groups = group_allocations(&rows);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group_key, "Zeta");
        assert_eq!(groups[0].display_key, "Zeta");
        assert!(!groups[0].has_custom_ratios);
        assert_eq!(groups[0].total_ratio, 1.0);
        let divs: Vec<i64> = groups[0].divisions.iter().map(|d| d.item_division).collect();
        assert_eq!(divs, vec![10, 30]);

        assert_eq!(groups[1].display_key, "Courtyard (Marriott)");
        assert!(groups[1].has_custom_ratios);
    }

    #[test]
    fn test_changed_overrides_selects_custom_or_edited_rows() {
        let mut rows = vec![
            alloc(1, "Dealer", "Acme", 10, 0.5, false),
            alloc(1, "Dealer", "Acme", 20, 0.3, true),
            alloc(1, "Dealer", "Acme", 30, 0.2, false),
        ];
        let group = group_allocations(&rows).remove(0);

        // user edits division 30 away from its historical ratio
        rows[2].effective_ratio = 0.15;

        let overrides = changed_overrides(&group, &rows);
        let divs: Vec<i64> = overrides.iter().map(|o| o.item_division).collect();
        assert_eq!(divs, vec![20, 30]);
        assert_eq!(overrides[1].custom_ratio, 0.15);
        assert_eq!(overrides[0].group_key, "Acme");
    }

    #[test]
    fn test_unchanged_group_has_no_overrides() {
        let rows = vec![alloc(1, "Dealer", "Acme", 10, 1.0, false)];
        let group = group_allocations(&rows).remove(0);
        assert!(changed_overrides(&group, &rows).is_empty());
    }
}
