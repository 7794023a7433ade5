use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::common::phone;

// Outbound WhatsApp notifications. Handlers enqueue a message after their
// write has committed; a single worker task drains the queue and talks to
// the provider. Delivery is best-effort and at-most-once: any enqueue or
// transport failure is logged and dropped, the HTTP caller never sees it
// and nothing is retried.

const TEMPLATE_LANGUAGE: &str = "en";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub api_url: String,
    pub auth_key: String,
    /// The provider-registered sender number ("integrated number").
    pub sender_number: String,
}

/// One queued message: recipient plus a template with ordered variables.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub phone: String,
    pub template: String,
    pub variables: Vec<String>,
}

// Wire format of the provider request.
#[derive(Debug, Serialize, PartialEq)]
struct ProviderPayload {
    integrated_number: String,
    recipient_number: String,
    content_type: &'static str,
    template: TemplatePayload,
}

#[derive(Debug, Serialize, PartialEq)]
struct TemplatePayload {
    name: String,
    language: &'static str,
    /// Positional body variables, order is significant.
    variables: Vec<String>,
}

fn build_payload(sender_number: &str, msg: &OutboundMessage) -> ProviderPayload {
    ProviderPayload {
        integrated_number: sender_number.to_string(),
        recipient_number: phone::to_dispatch_format(&msg.phone),
        content_type: "template",
        template: TemplatePayload {
            name: msg.template.clone(),
            language: TEMPLATE_LANGUAGE,
            variables: msg.variables.clone(),
        },
    }
}

#[derive(Clone)]
pub struct Notifier {
    // None when dispatch is disabled; enqueue becomes a logging no-op.
    tx: Option<mpsc::UnboundedSender<OutboundMessage>>,
}

impl Notifier {
    /// Spawns the worker task and returns the cloneable handle.
    pub fn spawn(config: NotifierConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(config, rx));
        Self { tx: Some(tx) }
    }

    /// A handle that swallows every message. Used when NOTIFY_ENABLED is
    /// off or the provider is not configured, and in tests.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Queues a message. Infallible by contract: a closed channel or a
    /// disabled notifier is logged and otherwise ignored.
    pub fn enqueue(&self, phone: &str, template: &str, variables: Vec<String>) {
        let msg = OutboundMessage {
            phone: phone.to_string(),
            template: template.to_string(),
            variables,
        };
        match &self.tx {
            Some(tx) => {
                if tx.send(msg).is_err() {
                    tracing::warn!("notification worker is gone, message dropped");
                }
            }
            None => {
                tracing::debug!(template = %msg.template, "notifications disabled, message dropped");
            }
        }
    }
}

async fn run_worker(config: NotifierConfig, mut rx: mpsc::UnboundedReceiver<OutboundMessage>) {
    let client = match reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("failed to build notification HTTP client: {e}");
            return;
        }
    };

    tracing::info!("notification worker started");

    while let Some(msg) = rx.recv().await {
        let payload = build_payload(&config.sender_number, &msg);
        let result = client
            .post(&config.api_url)
            .header("authkey", &config.auth_key)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(
                    template = %msg.template,
                    recipient = %payload.recipient_number,
                    "notification dispatched"
                );
            }
            Ok(response) => {
                tracing::warn!(
                    template = %msg.template,
                    status = %response.status(),
                    "provider rejected notification, dropping"
                );
            }
            Err(e) => {
                tracing::warn!(template = %msg.template, "notification send failed, dropping: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_normalized_recipient_and_ordered_variables() {
        let msg = OutboundMessage {
            phone: "+91 99999-99999".into(),
            template: "lead_assigned".into(),
            variables: vec!["Priya".into(), "Ravi Kumar".into()],
        };
        let payload = build_payload("918800000000", &msg);

        assert_eq!(payload.integrated_number, "918800000000");
        assert_eq!(payload.recipient_number, "919999999999");
        assert_eq!(payload.content_type, "template");
        assert_eq!(payload.template.name, "lead_assigned");
        assert_eq!(payload.template.variables, vec!["Priya", "Ravi Kumar"]);
    }

    #[test]
    fn payload_prefixes_bare_subscriber_numbers() {
        let msg = OutboundMessage {
            phone: "9876543210".into(),
            template: "task_assigned".into(),
            variables: vec![],
        };
        assert_eq!(build_payload("91880", &msg).recipient_number, "919876543210");
    }

    #[tokio::test]
    async fn disabled_notifier_swallows_messages() {
        let notifier = Notifier::disabled();
        // Must not panic or block.
        notifier.enqueue("9876543210", "lead_assigned", vec!["x".into()]);
    }

    #[tokio::test]
    async fn enqueue_survives_a_dead_worker() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let notifier = Notifier { tx: Some(tx) };
        notifier.enqueue("9876543210", "lead_assigned", vec![]);
    }
}
