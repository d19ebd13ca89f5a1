/// Round half away from zero to `decimals` places (SQL `ROUND` semantics)
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// `part / whole * 100`, or 0 when `whole` is zero
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Budget growth over actual sales, in percent; 0 when there were no sales
pub fn growth_percent(budget: f64, sales: f64) -> f64 {
    if sales == 0.0 || !sales.is_finite() || !budget.is_finite() {
        0.0
    } else {
        (budget - sales) / sales * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round2(2.3456), 2.35);
        assert_eq!(round2(-2.5), -2.5);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round_to(0.1234567, 6), 0.123457);
        assert_eq!(round_to(12.5, 0), 13.0);
    }

    #[test]
    fn test_percent_and_growth() {
        assert_eq!(percent_of(25.0, 200.0), 12.5);
        assert_eq!(percent_of(25.0, 0.0), 0.0);
        assert_eq!(growth_percent(120.0, 100.0), 20.0);
        assert_eq!(growth_percent(80.0, 100.0), -20.0);
        assert_eq!(growth_percent(80.0, 0.0), 0.0);
    }
}
