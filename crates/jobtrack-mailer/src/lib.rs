//! `jobtrack-mailer` — outbound email via the MailerSend HTTP API.
//!
//! [`transport::MailTransport`] is the seam: the reminder dispatcher only
//! sees the trait, so tests substitute a recording fake and production
//! wires in [`mailersend::MailerSend`].

pub mod error;
pub mod mailersend;
pub mod transport;

pub use error::{MailError, Result};
pub use mailersend::MailerSend;
pub use transport::{MailTransport, OutboundEmail};
