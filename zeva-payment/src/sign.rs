//! Keyed hashes for the two wallet providers. Both take an already-built
//! canonical string; the field order of that string is owned by each gateway
//! module and must be byte-identical everywhere a signature is produced or
//! re-checked.

use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// JazzCash `pp_SecureHash`: lowercase hex HMAC-SHA256 of the canonical
/// string, keyed by the merchant integrity salt.
pub fn jazzcash_secure_hash(canonical: &str, integrity_salt: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(integrity_salt.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(canonical.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Recompute-and-compare check for payloads that echo the hash back.
/// Providers are inconsistent about hex casing.
pub fn verify_jazzcash_hash(canonical: &str, integrity_salt: &str, given: &str) -> bool {
    jazzcash_secure_hash(canonical, integrity_salt).eq_ignore_ascii_case(given)
}

/// EasyPaisa `merchantHashedReq`: lowercase hex MD5 of the canonical string
/// (which already carries the hash key as its final component).
pub fn easypaisa_hash(canonical: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
