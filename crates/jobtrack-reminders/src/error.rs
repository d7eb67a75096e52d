use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("Store error: {0}")]
    Store(#[from] jobtrack_store::StoreError),

    #[error("Mail error: {0}")]
    Mail(#[from] jobtrack_mailer::MailError),
}

pub type Result<T> = std::result::Result<T, ReminderError>;
