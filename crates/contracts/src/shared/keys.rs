//! Composite string keys used to match rows across lists.
//!
//! Keys are plain `_`/`-` joins of their parts. Two different tuples can
//! produce the same key when a part itself contains the separator; callers
//! treat keys as unique anyway.

use serde::{Deserialize, Serialize};

use super::quarter::Quarter;

fn part(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "null",
    }
}

/// Key matching a budget record to a sales row: `brand_flag_customer`
pub fn budget_key(brand: Option<&str>, flag: Option<&str>, customer_name: Option<&str>) -> String {
    format!("{}_{}_{}", part(brand), part(flag), part(customer_name))
}

/// Key of a single editable budget cell: `brand_flag_customer_quarter`
pub fn cell_key(budget_key: &str, quarter: Quarter) -> String {
    format!("{}_{}", budget_key, quarter.number())
}

/// Salesperson / customer class / group key bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRef {
    pub salesperson_id: i64,
    pub customer_class: String,
    pub group_key: String,
}

impl GroupRef {
    pub fn new(salesperson_id: i64, customer_class: &str, group_key: &str) -> Self {
        Self {
            salesperson_id,
            customer_class: customer_class.to_string(),
            group_key: group_key.to_string(),
        }
    }

    pub fn key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.salesperson_id, self.customer_class, self.group_key
        )
    }
}

/// Rows that belong to a [`GroupRef`] bucket
pub trait Grouped {
    fn group_ref(&self) -> GroupRef;
}

/// Replace every row of `group` in `rows` with `fresh`, keeping the group's
/// position. If the group was absent, `fresh` is appended.
pub fn replace_group_rows<T: Grouped>(rows: &mut Vec<T>, group: &GroupRef, fresh: Vec<T>) {
    let first_index = rows.iter().position(|r| &r.group_ref() == group);
    rows.retain(|r| &r.group_ref() != group);

    match first_index {
        Some(index) => {
            let tail = rows.split_off(index);
            rows.extend(fresh);
            rows.extend(tail);
        }
        None => rows.extend(fresh),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        group: GroupRef,
        value: u32,
    }

    impl Grouped for Row {
        fn group_ref(&self) -> GroupRef {
            self.group.clone()
        }
    }

    fn row(sp: i64, group: &str, value: u32) -> Row {
        Row {
            group: GroupRef::new(sp, "Retail", group),
            value,
        }
    }

    #[test]
    fn test_budget_key_uses_null_for_missing_parts() {
        assert_eq!(budget_key(None, None, Some("Acme")), "null_null_Acme");
        assert_eq!(budget_key(Some("B1"), Some(""), None), "B1_null_null");
        assert_eq!(cell_key("B1_F1_null", Quarter::Q3), "B1_F1_null_3");
    }

    #[test]
    fn test_group_key_format() {
        let group = GroupRef::new(12, "Hospitality", "Marriott");
        assert_eq!(group.key(), "12-Hospitality-Marriott");
    }

    #[test]
    fn test_replace_group_keeps_position() {
        let mut rows = vec![
            row(1, "a", 1),
            row(1, "b", 2),
            row(1, "b", 3),
            row(1, "c", 4),
        ];
        let group = GroupRef::new(1, "Retail", "b");

        replace_group_rows(
            &mut rows,
            &group,
            vec![row(1, "b", 20), row(1, "b", 30), row(1, "b", 40)],
        );

        let values: Vec<u32> = rows.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1, 20, 30, 40, 4]);
    }

    #[test]
    fn test_replace_missing_group_appends() {
        let mut rows = vec![row(1, "a", 1)];
        let group = GroupRef::new(2, "Retail", "z");

        replace_group_rows(&mut rows, &group, vec![row(2, "z", 9)]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].value, 9);
    }
}
