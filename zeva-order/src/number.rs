//! Human-readable order numbers: `ZV-YYYYMMDD-XXXXXXXX`, a date prefix plus
//! eight uppercase hex characters of fresh uuid entropy. The suffix makes
//! numbers unique per store; the prefix makes the creation date recoverable
//! without a lookup.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

pub const PREFIX: &str = "ZV";

pub fn generate() -> String {
    let date = Utc::now().format("%Y%m%d");
    let entropy = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", PREFIX, date, entropy[..8].to_uppercase())
}

/// Recover the creation date from an order number. Returns `None` for
/// anything that is not a well-formed `ZV-YYYYMMDD-XXXXXXXX` string.
pub fn creation_date(order_number: &str) -> Option<NaiveDate> {
    let mut parts = order_number.splitn(3, '-');
    if parts.next()? != PREFIX {
        return None;
    }
    let date = parts.next()?;
    let suffix = parts.next()?;
    if suffix.len() != 8 || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y%m%d").ok()
}
