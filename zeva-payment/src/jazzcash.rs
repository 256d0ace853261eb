//! JazzCash MWALLET direct-charge gateway. The provider expects a signed
//! form POST with the amount in paisa and reports outcomes keyed by our
//! transaction reference (`pp_TxnRefNo`).

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;
use zeva_core::gateway::{
    CallbackKey, CallbackOutcome, GatewayError, GatewaySubmission, WalletCharge, WalletGateway,
};

use crate::config::JazzCashConfig;
use crate::sign;

/// `pp_ResponseCode` for an approved transaction.
pub const SUCCESS_CODE: &str = "000";

const VERSION: &str = "1.1";
const TXN_TYPE: &str = "MWALLET";
const LANGUAGE: &str = "EN";
const CURRENCY: &str = "PKR";
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct JazzCashGateway {
    config: JazzCashConfig,
    http: reqwest::Client,
}

/// Per-transaction fields in wire form, separated from the config-derived
/// constants so the canonical string can be built and tested deterministically.
struct TxnParams {
    amount: String,
    bill_reference: String,
    description: String,
    txn_datetime: String,
    expiry_datetime: String,
    txn_ref: String,
    cnic: String,
}

impl JazzCashGateway {
    pub fn new(config: JazzCashConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn params_for(&self, charge: &WalletCharge) -> TxnParams {
        let now = Utc::now();
        let expiry = now + ChronoDuration::days(1);
        TxnParams {
            amount: charge.amount_paisa.to_string(),
            bill_reference: charge.order_number.clone(),
            description: format!("Payment for order {}", charge.order_number),
            txn_datetime: now.format("%Y%m%d%H%M%S").to_string(),
            expiry_datetime: expiry.format("%Y%m%d%H%M%S").to_string(),
            txn_ref: charge.transaction_ref.clone(),
            cnic: charge.cnic_last4.clone(),
        }
    }

    /// The provider-mandated signing string: integrity salt first, then the
    /// transaction fields in fixed alphabetical-by-parameter order, joined
    /// by `&`. Any reordering invalidates the hash.
    fn canonical_string(&self, p: &TxnParams) -> String {
        [
            self.config.integrity_salt.as_str(),
            p.amount.as_str(),
            p.bill_reference.as_str(),
            p.description.as_str(),
            LANGUAGE,
            self.config.merchant_id.as_str(),
            self.config.password.as_str(),
            self.config.return_url.as_str(),
            CURRENCY,
            p.txn_datetime.as_str(),
            p.expiry_datetime.as_str(),
            p.txn_ref.as_str(),
            TXN_TYPE,
            VERSION,
            p.cnic.as_str(),
        ]
        .join("&")
    }

    fn form(&self, p: &TxnParams, mobile_number: &str) -> Vec<(&'static str, String)> {
        let secure_hash = sign::jazzcash_secure_hash(&self.canonical_string(p), &self.config.integrity_salt);
        vec![
            ("pp_Version", VERSION.to_string()),
            ("pp_TxnType", TXN_TYPE.to_string()),
            ("pp_Language", LANGUAGE.to_string()),
            ("pp_MerchantID", self.config.merchant_id.clone()),
            ("pp_Password", self.config.password.clone()),
            ("pp_TxnRefNo", p.txn_ref.clone()),
            ("pp_Amount", p.amount.clone()),
            ("pp_TxnCurrency", CURRENCY.to_string()),
            ("pp_TxnDateTime", p.txn_datetime.clone()),
            ("pp_BillReference", p.bill_reference.clone()),
            ("pp_Description", p.description.clone()),
            ("pp_TxnExpiryDateTime", p.expiry_datetime.clone()),
            ("pp_ReturnURL", self.config.return_url.clone()),
            ("pp_MobileNumber", mobile_number.to_string()),
            ("ppmpf_1", p.cnic.clone()),
            ("pp_SecureHash", secure_hash),
        ]
    }
}

#[async_trait]
impl WalletGateway for JazzCashGateway {
    fn name(&self) -> &'static str {
        "jazzcash"
    }

    /// `T` + second-resolution timestamp + 4 hex chars. The random tail keeps
    /// same-second retries distinct.
    fn new_transaction_ref(&self) -> String {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let entropy = Uuid::new_v4().simple().to_string();
        format!("T{}{}", stamp, entropy[..4].to_uppercase())
    }

    async fn submit(&self, charge: &WalletCharge) -> Result<GatewaySubmission, GatewayError> {
        let params = self.params_for(charge);
        let form = self.form(&params, &charge.mobile_number);

        let response = self
            .http
            .post(&self.config.endpoint)
            .timeout(SUBMIT_TIMEOUT)
            .form(&form)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Rejected(format!(
                "JazzCash API error: HTTP {}",
                response.status()
            )));
        }

        tracing::info!(txn_ref = %params.txn_ref, order = %charge.order_number, "jazzcash submission accepted");
        Ok(GatewaySubmission {
            transaction_ref: params.txn_ref,
            message: "JazzCash payment initiated successfully".to_string(),
            payment_url: None,
        })
    }

    fn parse_callback(&self, payload: &Value) -> Result<CallbackOutcome, GatewayError> {
        let txn_ref = payload["pp_TxnRefNo"]
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GatewayError::MalformedCallback("missing pp_TxnRefNo".into()))?;
        let code = payload["pp_ResponseCode"].as_str().unwrap_or_default();
        let message = payload["pp_ResponseMessage"].as_str().map(str::to_string);

        Ok(CallbackOutcome {
            key: CallbackKey::TransactionRef(txn_ref.to_string()),
            success: code == SUCCESS_CODE,
            provider_code: code.to_string(),
            message,
        })
    }
}
