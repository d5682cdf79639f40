pub mod payment;
pub mod signature;

use serde::Serialize;
use std::fmt;

/// One violated field of a cart submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Validation failed: {}", join_violations(.0))]
    ValidationError(Vec<FieldViolation>),
    #[error("Payment provider error: {0}")]
    PaymentProviderError(String),
    #[error("Order store error: {0}")]
    PersistenceError(String),
    #[error("Not found: {0}")]
    NotFoundError(String),
    #[error("Webhook authentication failed: {0}")]
    AuthenticationError(String),
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: String,
        to: String,
    },
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;
