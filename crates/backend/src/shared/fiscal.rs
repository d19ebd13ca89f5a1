use contracts::shared::quarter::Quarter;

/// Date bounds derived from the configured actuals year.
///
/// Dates are stored as `YYYY-MM-DD` text, so every bound is a half-open
/// string range that compares lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiscalYear {
    pub actuals_year: i32,
}

impl FiscalYear {
    pub fn new(actuals_year: i32) -> Self {
        Self { actuals_year }
    }

    /// Year configured in `[fiscal]`
    pub fn current() -> Self {
        Self::new(crate::shared::config::current().fiscal.actuals_year)
    }

    /// Year the budgets are entered for
    pub fn budget_year(&self) -> i32 {
        self.actuals_year + 1
    }

    pub fn actuals_start(&self) -> String {
        format!("{}-01-01", self.actuals_year)
    }

    pub fn actuals_end(&self) -> String {
        format!("{}-01-01", self.actuals_year + 1)
    }

    pub fn quarter_start(&self, quarter: Quarter) -> String {
        let month = (quarter.index() as u32) * 3 + 1;
        format!("{}-{:02}-01", self.actuals_year, month)
    }

    pub fn quarter_end(&self, quarter: Quarter) -> String {
        match quarter {
            Quarter::Q4 => self.actuals_end(),
            _ => {
                let month = (quarter.index() as u32) * 3 + 4;
                format!("{}-{:02}-01", self.actuals_year, month)
            }
        }
    }

    pub fn next_year_start(&self) -> String {
        self.actuals_end()
    }

    pub fn next_year_end(&self) -> String {
        format!("{}-01-01", self.actuals_year + 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let fy = FiscalYear::new(2025);
        assert_eq!(fy.budget_year(), 2026);
        assert_eq!(fy.actuals_start(), "2025-01-01");
        assert_eq!(fy.quarter_start(Quarter::Q2), "2025-04-01");
        assert_eq!(fy.quarter_end(Quarter::Q3), "2025-10-01");
        assert_eq!(fy.quarter_start(Quarter::Q4), "2025-10-01");
        assert_eq!(fy.quarter_end(Quarter::Q4), "2026-01-01");
        assert_eq!(fy.next_year_end(), "2027-01-01");
    }
}
