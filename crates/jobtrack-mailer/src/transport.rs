use async_trait::async_trait;

use crate::error::Result;

/// A fully composed message, ready to hand to a transport. The sender
/// identity lives in the transport, not here.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Common interface for anything that can deliver an email.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Transport name for logging and error messages.
    fn name(&self) -> &str;

    /// Deliver one message. Ok means the provider accepted it, not that it
    /// reached an inbox.
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}
