//! Display helpers shared by every front end.

use crate::types::Idr;

/// Badge colour for a tier grade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Error,
    Warning,
    Success,
    Info,
}

/// Format an IDR amount the short way: `2.8M IDR`, `150K IDR`, `750 IDR`.
///
/// Rounding is half-up on integers, so `1500` reads `2K IDR` and
/// `2_750_000` reads `2.8M IDR`.
pub fn format_idr(amount: Idr) -> String {
    if amount >= 1_000_000 {
        let tenths = amount / 100_000 + u64::from(amount % 100_000 >= 50_000);
        format!("{}.{}M IDR", tenths / 10, tenths % 10)
    } else if amount >= 1_000 {
        format!("{}K IDR", amount / 1_000 + u64::from(amount % 1_000 >= 500))
    } else {
        format!("{} IDR", amount)
    }
}

/// Budget range as shown in the header; `0` means no bound was set
pub fn format_budget_range(min: Idr, max: Idr) -> String {
    format!("{} - {}", format_idr(min), format_idr(max))
}

/// `0.873` -> `87%`
pub fn format_confidence(score: f64) -> String {
    format!("{}%", (score * 100.0).round() as i64)
}

/// Millimetre reading with one decimal
pub fn format_mm(value: f64) -> String {
    format!("{:.1}mm", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_idr_millions() {
        assert_eq!(format_idr(2_799_000), "2.8M IDR");
        assert_eq!(format_idr(3_000_000), "3.0M IDR");
        assert_eq!(format_idr(1_000_000), "1.0M IDR");
        assert_eq!(format_idr(12_340_000), "12.3M IDR");
    }

    #[test]
    fn test_format_idr_thousands() {
        assert_eq!(format_idr(1_500), "2K IDR");
        assert_eq!(format_idr(150_000), "150K IDR");
        assert_eq!(format_idr(999_999), "1000K IDR");
    }

    #[test]
    fn test_format_idr_largest_amount() {
        assert_eq!(format_idr(u64::MAX), "18446744073709.6M IDR");
        let decoded: Idr = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(format_idr(decoded), "18446744073709.6M IDR");
    }

    #[test]
    fn test_format_idr_small_amounts() {
        assert_eq!(format_idr(0), "0 IDR");
        assert_eq!(format_idr(750), "750 IDR");
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(0.873), "87%");
        assert_eq!(format_confidence(1.0), "100%");
        assert_eq!(format_confidence(0.0), "0%");
    }

    #[test]
    fn test_format_budget_range() {
        assert_eq!(
            format_budget_range(1_000_000, 3_000_000),
            "1.0M IDR - 3.0M IDR"
        );
    }
}
