//! Input checks performed before any gateway traffic. Rejections here must
//! never result in a transaction reference being minted or a network call.

use crate::reconciler::PaymentError;

/// Pakistani mobile numbers as the wallets accept them: exactly 11 digits,
/// `03` prefix (e.g. `03211234567`).
pub fn mobile_number(mobile: &str) -> Result<(), PaymentError> {
    let well_formed =
        mobile.len() == 11 && mobile.starts_with("03") && mobile.bytes().all(|b| b.is_ascii_digit());
    if well_formed {
        Ok(())
    } else {
        Err(PaymentError::Validation(
            "Invalid mobile number format".into(),
        ))
    }
}

/// Wallets verify the holder by the last four CNIC digits.
pub fn cnic_last4(cnic: &str) -> Result<(), PaymentError> {
    if cnic.len() == 4 && cnic.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(PaymentError::Validation(
            "Invalid CNIC (last 4 digits)".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_mobile_numbers() {
        assert!(mobile_number("03111234567").is_ok());
        assert!(mobile_number("03001234567").is_ok());
    }

    #[test]
    fn rejects_bad_mobile_numbers() {
        assert!(mobile_number("12345").is_err());
        assert!(mobile_number("0311123456").is_err()); // 10 digits
        assert!(mobile_number("031112345678").is_err()); // 12 digits
        assert!(mobile_number("04111234567").is_err()); // wrong prefix
        assert!(mobile_number("0311123456a").is_err());
        assert!(mobile_number("").is_err());
    }

    #[test]
    fn cnic_must_be_four_digits() {
        assert!(cnic_last4("1234").is_ok());
        assert!(cnic_last4("0000").is_ok());
        assert!(cnic_last4("123").is_err());
        assert!(cnic_last4("12345").is_err());
        assert!(cnic_last4("12a4").is_err());
    }
}
