//! Currency formatting for report cells

/// Format an amount as whole dollars with thousands separators.
///
/// Negative amounts (tax credits) are written as `-$1,234`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    // Avoid printing "-$0" for tiny negative credits
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Format an optional amount, marking missing years
#[must_use]
pub fn format_cell(amount: Option<f64>) -> String {
    amount.map_or_else(|| "n/a".to_string(), format_currency)
}
