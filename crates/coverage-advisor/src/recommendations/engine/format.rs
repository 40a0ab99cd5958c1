//! Display formatting shared by every rule so renderers never reformat figures.

pub(crate) const NOT_AVAILABLE: &str = "N/A";

/// `1234567.4` -> `1.234.567€`. Amounts round to whole euros; negatives clamp to zero.
pub(crate) fn euros(amount: f64) -> String {
    let rounded = if amount.is_finite() && amount > 0.0 {
        amount.round() as u64
    } else {
        0
    };
    format!("{}€", group_thousands(rounded))
}

pub(crate) fn euros_or_na(amount: Option<f64>) -> String {
    amount.map(euros).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub(crate) fn percent_of_capital(percent: u8) -> String {
    format!("{percent}% de los capitales asegurados")
}

pub(crate) fn percent(percent: u8) -> String {
    format!("{percent}%")
}

pub(crate) fn square_meters_or_na(area: Option<f64>) -> String {
    match area {
        Some(value) if value.is_finite() && value >= 0.0 => {
            format!("{} m²", group_thousands(value.round() as u64))
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub(crate) fn months(count: u32) -> String {
    if count == 1 {
        "1 mes".to_string()
    } else {
        format!("{count} meses")
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}
