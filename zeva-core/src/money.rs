//! All amounts in the engine are integer paisa (1 rupee = 100 paisa).
//! Formatting to rupees happens only at presentation edges: the EasyPaisa
//! wire format and notification payloads.

/// Render a paisa amount as a fixed-2-decimal rupee string, e.g. 90000 -> "900.00".
/// Negative amounts (refund deltas) carry a single leading sign.
pub fn format_rupees(paisa: i64) -> String {
    let sign = if paisa < 0 { "-" } else { "" };
    let abs = paisa.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_rupees() {
        assert_eq!(format_rupees(90000), "900.00");
        assert_eq!(format_rupees(100), "1.00");
        assert_eq!(format_rupees(0), "0.00");
    }

    #[test]
    fn formats_fractional_rupees() {
        assert_eq!(format_rupees(45050), "450.50");
        assert_eq!(format_rupees(5), "0.05");
    }

    #[test]
    fn formats_negative_amounts_with_one_sign() {
        assert_eq!(format_rupees(-950), "-9.50");
        assert_eq!(format_rupees(-5), "-0.05");
        assert_eq!(format_rupees(-90000), "-900.00");
    }
}
