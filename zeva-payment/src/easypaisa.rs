//! EasyPaisa hosted-checkout gateway. Submission builds a signed redirect
//! URL rather than charging the wallet directly; the charge happens on the
//! provider's page and the outcome arrives on the postback, keyed by the
//! order number we sent as `orderRefNum`.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;
use zeva_core::gateway::{
    CallbackKey, CallbackOutcome, GatewayError, GatewaySubmission, WalletCharge, WalletGateway,
};
use zeva_core::money::format_rupees;

use crate::config::EasyPaisaConfig;
use crate::sign;

/// Postback `status` for a completed payment.
pub const SUCCESS_CODE: &str = "0000";

pub struct EasyPaisaGateway {
    config: EasyPaisaConfig,
}

impl EasyPaisaGateway {
    pub fn new(config: EasyPaisaConfig) -> Self {
        Self { config }
    }

    /// Signing string: store id, fixed-2-decimal rupee amount, order
    /// reference, hash key — concatenated without separators, MD5-hashed.
    fn hashed_request(&self, amount_rupees: &str, order_ref: &str) -> String {
        let canonical = format!(
            "{}{}{}{}",
            self.config.store_id, amount_rupees, order_ref, self.config.hash_key
        );
        sign::easypaisa_hash(&canonical)
    }

    fn checkout_url(&self, amount_rupees: &str, order_ref: &str) -> String {
        let hashed = self.hashed_request(amount_rupees, order_ref);
        format!(
            "{}?storeId={}&amount={}&postBackURL={}&orderRefNum={}&expiryDate=&merchantHashedReq={}&autoRedirect=1&paymentMethod=MA_PAYMENT_METHOD",
            self.config.endpoint, self.config.store_id, amount_rupees, self.config.postback_url, order_ref, hashed
        )
    }
}

#[async_trait]
impl WalletGateway for EasyPaisaGateway {
    fn name(&self) -> &'static str {
        "easypaisa"
    }

    /// `EP` + unix seconds + 6 hex chars, fresh for every attempt.
    fn new_transaction_ref(&self) -> String {
        let entropy = Uuid::new_v4().simple().to_string();
        format!("EP{}{}", Utc::now().timestamp(), entropy[..6].to_uppercase())
    }

    async fn submit(&self, charge: &WalletCharge) -> Result<GatewaySubmission, GatewayError> {
        let amount_rupees = format_rupees(charge.amount_paisa);
        let url = self.checkout_url(&amount_rupees, &charge.order_number);

        tracing::info!(txn_ref = %charge.transaction_ref, order = %charge.order_number, "easypaisa checkout prepared");
        Ok(GatewaySubmission {
            transaction_ref: charge.transaction_ref.clone(),
            message: "EasyPaisa payment initiated successfully".to_string(),
            payment_url: Some(url),
        })
    }

    fn parse_callback(&self, payload: &Value) -> Result<CallbackOutcome, GatewayError> {
        let order_ref = payload["orderRefNum"]
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GatewayError::MalformedCallback("missing orderRefNum".into()))?;
        let code = payload["status"].as_str().unwrap_or_default();
        let message = payload["desc"].as_str().map(str::to_string);

        Ok(CallbackOutcome {
            key: CallbackKey::OrderNumber(order_ref.to_string()),
            success: code == SUCCESS_CODE,
            provider_code: code.to_string(),
            message,
        })
    }
}
