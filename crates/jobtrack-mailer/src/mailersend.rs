use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{MailError, Result};
use crate::transport::{MailTransport, OutboundEmail};

pub struct MailerSend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    from_email: String,
    from_name: String,
}

impl MailerSend {
    pub fn new(
        api_key: String,
        from_email: String,
        from_name: String,
        base_url: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.mailersend.com".to_string()),
            from_email,
            from_name,
        }
    }
}

#[async_trait]
impl MailTransport for MailerSend {
    fn name(&self) -> &str {
        "mailersend"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let url = format!("{}/v1/email", self.base_url);
        let body = SendRequest {
            from: Party {
                email: &self.from_email,
                name: Some(&self.from_name),
            },
            to: [Party {
                email: &email.to_email,
                name: email.to_name.as_deref(),
            }],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        debug!(to = %email.to_email, subject = %email.subject, "sending email via MailerSend");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "MailerSend API error");
            return Err(MailError::Api {
                status,
                message: text,
            });
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: Party<'a>,
    to: [Party<'a>; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct Party<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}
