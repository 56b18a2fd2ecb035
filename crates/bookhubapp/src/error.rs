use crate::model::OrderStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookhubError {
    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Order {id} cannot be cancelled (status: {status})")]
    CannotCancel { id: String, status: OrderStatus },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),
}

impl BookhubError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Business-rule failures leave every store usable. Anything else is an
    /// infrastructure fault in the persistence layer.
    pub fn is_business(&self) -> bool {
        !matches!(
            self,
            Self::Io(_) | Self::Serialization(_) | Self::Store(_) | Self::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BookhubError>;
