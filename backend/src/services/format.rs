/// Shown in place of a missing cell.
pub const MISSING: &str = "N/A";

const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;
const THOUSAND: f64 = 1_000.0;

/// Compact human-readable magnitude: `1234567.0` -> `"1.23M"`.
///
/// Tiers are checked largest first and each lower bound is inclusive, so
/// `1000.0` is `"1.00K"` while `999.0` stays `"999.00"`. Missing and NaN
/// and non-finite values render as [`MISSING`].
pub fn format_number(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return MISSING.to_string();
    };

    let magnitude = value.abs();
    if magnitude >= BILLION {
        format!("{:.2}B", value / BILLION)
    } else if magnitude >= MILLION {
        format!("{:.2}M", value / MILLION)
    } else if magnitude >= THOUSAND {
        format!("{:.2}K", value / THOUSAND)
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_price(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}
