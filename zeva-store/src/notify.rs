use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::warn;
use zeva_core::notify::Notifier;
use zeva_core::money::format_rupees;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts payment outcomes to a configured webhook. Delivery is best effort;
/// a failed POST is logged and reported as `false`.
pub struct WebhookNotifier {
    url: String,
    http: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(
        &self,
        contact: &str,
        order_number: &str,
        amount_paisa: i64,
        status: &str,
    ) -> bool {
        let payload = json!({
            "contact": contact,
            "order_number": order_number,
            "amount": format_rupees(amount_paisa),
            "status": status,
        });

        let sent = self
            .http
            .post(&self.url)
            .timeout(DELIVERY_TIMEOUT)
            .json(&payload)
            .send()
            .await;

        match sent {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(order_number, status = %response.status(), "notification webhook rejected");
                false
            }
            Err(err) => {
                warn!(order_number, error = %err, "notification webhook unreachable");
                false
            }
        }
    }
}
