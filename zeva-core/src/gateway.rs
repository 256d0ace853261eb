use async_trait::async_trait;
use serde_json::Value;

/// A single charge attempt against a mobile wallet provider.
#[derive(Debug, Clone)]
pub struct WalletCharge {
    pub order_number: String,
    pub amount_paisa: i64,
    pub mobile_number: String,
    pub cnic_last4: String,
    pub transaction_ref: String,
}

/// What the provider handed back after accepting a submission.
#[derive(Debug, Clone)]
pub struct GatewaySubmission {
    pub transaction_ref: String,
    pub message: String,
    /// Hosted-checkout providers return a redirect URL instead of
    /// charging the wallet directly.
    pub payment_url: Option<String>,
}

/// The identifier a provider uses for the order in its callback payload.
/// JazzCash reports our transaction reference; EasyPaisa reports the
/// order number we sent as `orderRefNum`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackKey {
    TransactionRef(String),
    OrderNumber(String),
}

impl CallbackKey {
    pub fn as_str(&self) -> &str {
        match self {
            CallbackKey::TransactionRef(s) => s,
            CallbackKey::OrderNumber(s) => s,
        }
    }
}

/// A provider callback normalized to gateway-neutral terms.
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    pub key: CallbackKey,
    pub success: bool,
    pub provider_code: String,
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway transport failure: {0}")]
    Transport(String),

    #[error("gateway rejected submission: {0}")]
    Rejected(String),

    #[error("malformed callback payload: {0}")]
    MalformedCallback(String),
}

/// Adapter for one mobile wallet provider. Each implementation owns its
/// wire format: parameter layout, canonical signing string and keyed hash.
#[async_trait]
pub trait WalletGateway: Send + Sync {
    /// Stable lowercase name used in routes and configuration.
    fn name(&self) -> &'static str;

    /// Generate a transaction reference unique to this attempt. A retried
    /// payment gets a fresh reference, never the previous one.
    fn new_transaction_ref(&self) -> String;

    /// Submit the charge to the provider. Must not mutate any order state;
    /// transport errors and non-success responses surface as `GatewayError`.
    async fn submit(&self, charge: &WalletCharge) -> Result<GatewaySubmission, GatewayError>;

    /// Interpret an out-of-band callback payload from the provider.
    fn parse_callback(&self, payload: &Value) -> Result<CallbackOutcome, GatewayError>;
}
