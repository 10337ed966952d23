use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::config::SmtpConfig;

/// Outbound mail seam. Delivery is best-effort: the service logs failures
/// and never fails a committed request over one.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, recipient: &str, template: &str, data: Value) -> anyhow::Result<()>;
}

/// Mailer that records dispatches in the log instead of talking to a relay.
/// Real SMTP delivery lives outside this service; this keeps the seam wired.
pub struct LogMailer {
    smtp: SmtpConfig,
}

impl LogMailer {
    pub fn new(smtp: SmtpConfig) -> Self {
        Self { smtp }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, recipient: &str, template: &str, data: Value) -> anyhow::Result<()> {
        // The payload carries token plaintext, so it stays out of the log.
        let _ = data;
        info!(
            recipient,
            template,
            relay = %format!("{}:{}", self.smtp.host, self.smtp.port),
            relay_user = %self.smtp.username,
            from = %self.smtp.sender,
            "email dispatched"
        );
        Ok(())
    }
}
