use serde::{Deserialize, Serialize};

/// Calendar quarter of a fiscal year
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn number(self) -> u8 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Quarter::Q1),
            2 => Some(Quarter::Q2),
            3 => Some(Quarter::Q3),
            4 => Some(Quarter::Q4),
            _ => None,
        }
    }

    /// Quarter containing the given month (1..=12)
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            1..=3 => Some(Quarter::Q1),
            4..=6 => Some(Quarter::Q2),
            7..=9 => Some(Quarter::Q3),
            10..=12 => Some(Quarter::Q4),
            _ => None,
        }
    }

    /// Index into a `[f64; 4]` of quarterly values
    pub fn index(self) -> usize {
        self.number() as usize - 1
    }

    /// JSON field name of this quarter on a budget record
    pub fn budget_field(self) -> &'static str {
        match self {
            Quarter::Q1 => "quarter_1_sales",
            Quarter::Q2 => "quarter_2_sales",
            Quarter::Q3 => "quarter_3_sales",
            Quarter::Q4 => "quarter_4_sales",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_month_covers_year() {
        assert_eq!(Quarter::from_month(1), Some(Quarter::Q1));
        assert_eq!(Quarter::from_month(3), Some(Quarter::Q1));
        assert_eq!(Quarter::from_month(4), Some(Quarter::Q2));
        assert_eq!(Quarter::from_month(9), Some(Quarter::Q3));
        assert_eq!(Quarter::from_month(12), Some(Quarter::Q4));
        assert_eq!(Quarter::from_month(0), None);
        assert_eq!(Quarter::from_month(13), None);
    }

    #[test]
    fn test_budget_field_names() {
        assert_eq!(Quarter::Q1.budget_field(), "quarter_1_sales");
        let q4 = Quarter::from_number(4).map(Quarter::budget_field);
        assert_eq!(q4, Some("quarter_4_sales"));
        assert_eq!(Quarter::from_number(5), None);
    }
}
