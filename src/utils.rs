pub mod date_formatter;

/// Formats a number with at most `places` decimals, dropping trailing zeros.
pub fn format_decimal(value: f64, places: usize) -> String {
    if !value.is_finite() {
        return String::from("-");
    }
    let fixed = format!("{:.*}", places, value);
    if !fixed.contains('.') {
        return fixed;
    }
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        String::from("0")
    } else {
        trimmed.to_string()
    }
}
