use async_trait::async_trait;

/// Best-effort notification sink for payment outcomes. Delivery failure is
/// reported as `false`, never as an error; callers must not treat a missed
/// notification as a failed payment.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, contact: &str, order_number: &str, amount_paisa: i64, status: &str) -> bool;
}

/// Swallows every notification. Used in tests and when notifications are
/// disabled in configuration.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _contact: &str, _order_number: &str, _amount_paisa: i64, _status: &str) -> bool {
        true
    }
}
