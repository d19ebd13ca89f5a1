/// Format a byte count with `,` thousands separators
///
/// # Examples
/// ```
/// use backend::shared::format::format_size;
/// assert_eq!(format_size(1234567), "1,234,567");
/// assert_eq!(format_size(42), "42");
/// ```
pub fn format_size(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0");
        assert_eq!(format_size(999), "999");
        assert_eq!(format_size(1000), "1,000");
        assert_eq!(format_size(1234567890), "1,234,567,890");
    }
}
