use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use zeva_core::gateway::{CallbackKey, GatewayError, WalletCharge, WalletGateway};
use zeva_core::notify::Notifier;
use zeva_order::models::{Order, PaymentStatus};
use zeva_order::repository::OrderRepository;

use crate::validate;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("{0}")]
    Validation(String),

    #[error("Order {0} not found")]
    OrderNotFound(String),

    #[error("Unsupported payment gateway: {0}")]
    UnsupportedGateway(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Everything the checkout form sends to start a wallet payment.
#[derive(Debug, Clone)]
pub struct InitiateRequest {
    pub order_number: String,
    pub amount_paisa: i64,
    pub mobile_number: String,
    pub cnic_last4: String,
}

/// Result of an accepted submission, echoed to the client for polling.
#[derive(Debug, Clone)]
pub struct InitiateOutcome {
    pub transaction_ref: String,
    pub message: String,
    pub payment_url: Option<String>,
}

/// What a callback did to the order, reported back to the provider.
#[derive(Debug, Clone)]
pub struct CallbackReceipt {
    pub reference: String,
    pub status: PaymentStatus,
    /// False when the callback was a duplicate or matched no order.
    pub applied: bool,
}

/// Snapshot for client polling. `status` is `"not_found"` for unknown
/// references — polling clients get a sentinel, not an error.
#[derive(Debug, Clone)]
pub struct PaymentStatusView {
    pub transaction_ref: String,
    pub status: String,
    pub message: String,
    pub order_number: Option<String>,
    pub amount_paisa: Option<i64>,
}

/// Drives wallet payments end to end: validates and submits charge
/// attempts, reconciles provider callbacks onto orders exactly once, and
/// answers status polls.
pub struct PaymentReconciler {
    orders: Arc<dyn OrderRepository>,
    notifier: Arc<dyn Notifier>,
    gateways: HashMap<&'static str, Arc<dyn WalletGateway>>,
}

impl PaymentReconciler {
    pub fn new(orders: Arc<dyn OrderRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            orders,
            notifier,
            gateways: HashMap::new(),
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn WalletGateway>) -> Self {
        self.gateways.insert(gateway.name(), gateway);
        self
    }

    fn gateway(&self, name: &str) -> Result<&Arc<dyn WalletGateway>, PaymentError> {
        self.gateways
            .get(name)
            .ok_or_else(|| PaymentError::UnsupportedGateway(name.to_string()))
    }

    /// Validate inputs, mint a fresh transaction reference and submit the
    /// charge. Order state is only touched after the provider accepts; a
    /// failed submission leaves the order exactly as it was, and a retry
    /// gets a new reference.
    pub async fn initiate(
        &self,
        gateway_name: &str,
        req: &InitiateRequest,
    ) -> Result<InitiateOutcome, PaymentError> {
        validate::mobile_number(&req.mobile_number)?;
        validate::cnic_last4(&req.cnic_last4)?;
        if req.amount_paisa <= 0 {
            return Err(PaymentError::Validation("Amount must be positive".into()));
        }

        let gateway = self.gateway(gateway_name)?;
        let order = self
            .orders
            .get_order_by_number(&req.order_number)
            .await
            .map_err(|e| PaymentError::Storage(e.to_string()))?
            .ok_or_else(|| PaymentError::OrderNotFound(req.order_number.clone()))?;

        let charge = WalletCharge {
            order_number: order.order_number.clone(),
            amount_paisa: req.amount_paisa,
            mobile_number: req.mobile_number.clone(),
            cnic_last4: req.cnic_last4.clone(),
            transaction_ref: gateway.new_transaction_ref(),
        };
        let submission = gateway.submit(&charge).await?;

        self.orders
            .attach_transaction(order.id, &submission.transaction_ref)
            .await
            .map_err(|e| PaymentError::Storage(e.to_string()))?;

        tracing::info!(
            gateway = gateway_name,
            order = %order.order_number,
            txn_ref = %submission.transaction_ref,
            "payment initiated, awaiting callback"
        );
        Ok(InitiateOutcome {
            transaction_ref: submission.transaction_ref,
            message: submission.message,
            payment_url: submission.payment_url,
        })
    }

    /// Apply an out-of-band provider callback. Idempotent per transaction:
    /// once an order has left `pending`, a repeat of the same terminal
    /// status is a no-op and a conflicting one is ignored (first writer
    /// wins) — neither sends a second notification.
    pub async fn handle_callback(
        &self,
        gateway_name: &str,
        payload: &Value,
    ) -> Result<CallbackReceipt, PaymentError> {
        let gateway = self.gateway(gateway_name)?;
        let outcome = gateway.parse_callback(payload)?;
        let incoming = if outcome.success {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        };

        let Some(order) = self.find_order_for_callback(&outcome.key).await? else {
            tracing::warn!(
                gateway = gateway_name,
                reference = outcome.key.as_str(),
                "callback matched no order"
            );
            return Ok(CallbackReceipt {
                reference: outcome.key.as_str().to_string(),
                status: incoming,
                applied: false,
            });
        };

        if order.payment_status.is_terminal() {
            if order.payment_status != incoming {
                tracing::warn!(
                    order = %order.order_number,
                    current = order.payment_status.as_str(),
                    incoming = incoming.as_str(),
                    "conflicting terminal callback ignored"
                );
            }
            return Ok(CallbackReceipt {
                reference: outcome.key.as_str().to_string(),
                status: order.payment_status,
                applied: false,
            });
        }

        // The repository only settles a pending payment; when two callbacks
        // for the same transaction race past the read above, one of them
        // loses here and must not notify.
        let settled = self
            .orders
            .settle_payment(order.id, incoming)
            .await
            .map_err(|e| PaymentError::Storage(e.to_string()))?;
        if !settled {
            let current = self
                .find_order_for_callback(&outcome.key)
                .await?
                .map(|o| o.payment_status)
                .unwrap_or(incoming);
            tracing::warn!(
                order = %order.order_number,
                current = current.as_str(),
                incoming = incoming.as_str(),
                "callback lost the settlement race"
            );
            return Ok(CallbackReceipt {
                reference: outcome.key.as_str().to_string(),
                status: current,
                applied: false,
            });
        }

        let delivered = self
            .notifier
            .notify(
                &order.customer.email,
                &order.order_number,
                order.total_amount_paisa,
                incoming.as_str(),
            )
            .await;
        if !delivered {
            tracing::debug!(order = %order.order_number, "payment notification not delivered");
        }

        tracing::info!(
            gateway = gateway_name,
            order = %order.order_number,
            status = incoming.as_str(),
            code = %outcome.provider_code,
            "payment reconciled from callback"
        );
        Ok(CallbackReceipt {
            reference: outcome.key.as_str().to_string(),
            status: incoming,
            applied: true,
        })
    }

    /// Resolve whichever identifier the provider reports. JazzCash echoes
    /// our transaction reference, EasyPaisa echoes the order number; both
    /// funnel through this one lookup.
    async fn find_order_for_callback(
        &self,
        key: &CallbackKey,
    ) -> Result<Option<Order>, PaymentError> {
        let found = match key {
            CallbackKey::TransactionRef(r) => self.orders.get_order_by_transaction(r).await,
            CallbackKey::OrderNumber(n) => self.orders.get_order_by_number(n).await,
        };
        found.map_err(|e| PaymentError::Storage(e.to_string()))
    }

    /// Pure read for polling clients.
    pub async fn status(&self, transaction_ref: &str) -> Result<PaymentStatusView, PaymentError> {
        let order = self
            .orders
            .get_order_by_transaction(transaction_ref)
            .await
            .map_err(|e| PaymentError::Storage(e.to_string()))?;

        Ok(match order {
            None => PaymentStatusView {
                transaction_ref: transaction_ref.to_string(),
                status: "not_found".to_string(),
                message: "Transaction not found".to_string(),
                order_number: None,
                amount_paisa: None,
            },
            Some(order) => PaymentStatusView {
                transaction_ref: transaction_ref.to_string(),
                status: order.payment_status.as_str().to_string(),
                message: format!("Payment is {}", order.payment_status.as_str()),
                order_number: Some(order.order_number),
                amount_paisa: Some(order.total_amount_paisa),
            },
        })
    }
}
