// Remaining engine time until overhaul

// `inf`, `NaN` and friends parse as f64 but are not hours
fn parse_hours(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', "")
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
}

/// `total - current`, two decimals. `None` if either side is not a number.
pub fn engine_left_time(total: &str, current: &str) -> Option<String> {
    let total = parse_hours(total)?;
    let current = parse_hours(current)?;
    Some(format!("{:.2}", total - current))
}
