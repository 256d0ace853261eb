use serde::Deserialize;

/// JazzCash MWALLET credentials and endpoints. Injected at construction;
/// sandbox defaults live in `config/default.toml`, never in code.
#[derive(Debug, Deserialize, Clone)]
pub struct JazzCashConfig {
    pub merchant_id: String,
    pub password: String,
    /// Keys the HMAC-SHA256 secure hash and prefixes the canonical string.
    pub integrity_salt: String,
    pub endpoint: String,
    pub return_url: String,
}

/// EasyPaisa hosted-checkout credentials.
#[derive(Debug, Deserialize, Clone)]
pub struct EasyPaisaConfig {
    pub store_id: String,
    /// Appended to the canonical string before MD5 hashing.
    pub hash_key: String,
    pub endpoint: String,
    /// Where the provider posts the callback after checkout.
    pub postback_url: String,
}
