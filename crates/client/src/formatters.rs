use contracts::shared::math::round2;

/// Whole currency units with thousands separators: `1234567.4` -> `1,234,567`
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Two decimals, no percent sign
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }
    format!("{:.2}", round2(value))
}

/// Highlight level of a zero-percent share
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroPercentLevel {
    Success,
    Warning,
    Error,
}

pub fn zero_percent_level(percent: f64) -> ZeroPercentLevel {
    if percent == 0.0 {
        ZeroPercentLevel::Success
    } else if percent < 10.0 {
        ZeroPercentLevel::Warning
    } else {
        ZeroPercentLevel::Error
    }
}
